use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use usher_blob_fs::create_blob_cache;
use usher_db_memory::create_record_store;
use usher_gateways::{DynUserDirectory, create_directory, create_mailer, create_publisher};
use usher_service::{AvatarService, ProvisioningService};

use crate::{config::AppConfig, handlers, middleware as app_middleware};

/// Shared handler state: the application services plus the directory
/// gateway behind the user lookup route.
#[derive(Clone)]
pub struct AppState {
    pub provisioning: Arc<ProvisioningService>,
    pub avatars: Arc<AvatarService>,
    pub directory: DynUserDirectory,
}

pub struct UsherServer {
    addr: SocketAddr,
    app: Router,
}

/// Wires stores, gateways and services from the configuration.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let records = create_record_store();
    let blobs = create_blob_cache(&cfg.blobs.dir).await?;
    let directory = create_directory(&cfg.directory)?;
    let mailer = create_mailer(&cfg.mail)?;
    let events = create_publisher(&cfg.events)?;

    tracing::info!(
        records = %records.backend_name(),
        blob_dir = %cfg.blobs.dir,
        directory = %cfg.directory.base_url,
        "application state wired"
    );

    let avatars = Arc::new(AvatarService::new(
        records.clone(),
        blobs,
        directory.clone(),
    ));
    let provisioning = Arc::new(ProvisioningService::new(
        records,
        mailer,
        events,
        cfg.events.topic.clone(),
    ));

    Ok(AppState {
        provisioning,
        avatars,
        directory,
    })
}

pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = build_state(cfg).await?;
    let body_limit = cfg.server.body_limit_bytes;
    let app = Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        // Users and avatars
        .route("/users", post(handlers::create_user))
        .route("/users/{id}", get(handlers::fetch_user))
        .route(
            "/users/{id}/avatar",
            get(handlers::get_avatar).delete(handlers::delete_avatar),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %method,
                        http.target = %uri,
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            &tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        // Outermost so the trace span sees the request id extension
        .layer(middleware::from_fn(app_middleware::request_id));
    Ok(app)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<UsherServer> {
        let app = build_app(&self.config).await?;

        Ok(UsherServer {
            addr: self.addr,
            app,
        })
    }
}

impl UsherServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
