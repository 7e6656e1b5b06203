//! CivicDesk - municipal issue-reporting backend

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use civicdesk::{
    config::Args,
    db::MongoClient,
    payments::{OfflineProvider, PaymentProvider, StripeProvider},
    server::{self, AppState},
    store::{MongoCitizenStore, MongoIssueStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("civicdesk={},info", args.log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  CivicDesk - issue reporting backend");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("Free issue quota: {}", args.free_issue_quota);
    info!(
        "Premium price: {} {}",
        args.payments.premium_price, args.payments.premium_currency
    );

    let provider: Arc<dyn PaymentProvider> = match args.payments.stripe_secret_key.clone() {
        Some(secret) => Arc::new(StripeProvider::new(
            &args.payments.stripe_api_base,
            secret,
            Duration::from_millis(args.request_timeout_ms),
        )?),
        None => {
            warn!("No STRIPE_SECRET_KEY - using offline payment provider");
            Arc::new(OfflineProvider::new())
        }
    };

    let mongo = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => Some(client),
        Err(e) if args.dev_mode => {
            warn!("MongoDB unavailable ({}), falling back to in-memory stores", e);
            None
        }
        Err(e) => {
            error!("Failed to connect to MongoDB: {}", e);
            std::process::exit(1);
        }
    };

    let state = match mongo {
        Some(ref client) => {
            info!("Store: MongoDB database '{}'", client.db_name());
            let citizens = Arc::new(MongoCitizenStore::new(client).await?);
            let issues = Arc::new(MongoIssueStore::new(client).await?);
            AppState::new(args, citizens, issues, provider)
        }
        None => AppState::in_memory(args, provider),
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let served = server::run(Arc::new(state), shutdown).await;

    if let Some(client) = mongo {
        client.shutdown().await;
    }

    served?;
    info!("CivicDesk stopped");
    Ok(())
}
