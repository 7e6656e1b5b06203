//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Request bodies are
//! collected up front and handed to [`routes::dispatch`], which owns the
//! path table.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::citizens::CitizenRegistry;
use crate::config::Args;
use crate::issues::IssueLifecycle;
use crate::payments::{PaymentProvider, PaymentUpgradeFlow, PremiumOffer};
use crate::quota::QuotaPolicy;
use crate::routes;
use crate::store::{CitizenStore, IssueStore, MemoryCitizenStore, MemoryIssueStore};
use crate::types::CivicDeskError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Citizen registration and profiles
    pub citizens: CitizenRegistry,
    /// Issue creation and mutation
    pub issues: IssueLifecycle,
    /// Premium checkout and confirmation
    pub upgrade: PaymentUpgradeFlow,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the domain components over the given stores and provider
    pub fn new(
        args: Args,
        citizen_store: Arc<dyn CitizenStore>,
        issue_store: Arc<dyn IssueStore>,
        provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        let quota = QuotaPolicy::new(args.free_issue_quota);
        let offer = PremiumOffer::from_args(&args);

        Self {
            citizens: CitizenRegistry::new(Arc::clone(&citizen_store)),
            issues: IssueLifecycle::new(Arc::clone(&citizen_store), issue_store, quota),
            upgrade: PaymentUpgradeFlow::new(citizen_store, provider, offer),
            args,
            started_at: Instant::now(),
        }
    }

    /// State backed by process-local stores (dev mode without MongoDB)
    pub fn in_memory(args: Args, provider: Arc<dyn PaymentProvider>) -> Self {
        Self::new(
            args,
            Arc::new(MemoryCitizenStore::new()),
            Arc::new(MemoryIssueStore::new()),
            provider,
        )
    }
}

/// Accept connections until `shutdown` resolves
pub async fn run<F>(state: Arc<AppState>, shutdown: F) -> Result<(), CivicDeskError>
where
    F: Future<Output = ()>,
{
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "CivicDesk listening on {} as node {}",
        state.args.listen, state.args.node_id
    );
    info!(
        store = state.issues.store_kind(),
        payments = state.upgrade.provider_kind(),
        free_issue_quota = state.issues.quota().free_limit(),
        "Services ready"
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - payments may be simulated");
    }

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received, no longer accepting connections");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);

                        let service = service_fn(move |req| {
                            let state = Arc::clone(&state);
                            async move { handle_request(state, addr, req).await }
                        });

                        if let Err(err) = http1::Builder::new()
                            .serve_connection(io, service)
                            .await
                        {
                            error!("Error serving connection from {}: {:?}", addr, err);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {:?}", e);
                }
            }
        }
    }
}

async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let (parts, body) = req.into_parts();
    let method = parts.method;
    let path = parts.uri.path().to_string();
    let query = parts.uri.query().map(str::to_string);

    info!("[{}] {} {}", addr, method, path);

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("Request body error from {}: {}", addr, e);
            return Ok(routes::error_response(&CivicDeskError::InvalidArgument(
                "Failed to read request body".into(),
            )));
        }
    };

    Ok(routes::dispatch(&state, &method, &path, query.as_deref(), &body).await)
}
