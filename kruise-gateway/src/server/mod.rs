//! HTTP boundary of the gateway.
//!
//! A plain HTTP/1 server on hyper. Each connection runs on its own task;
//! routing is in [`router`] and per-route logic in [`handler`].

pub mod handler;
pub mod router;

use crate::config::GatewayConfig;
use crate::operator::Operator;
use handler::{RequestContext, build_response, error_response};
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use router::{Route, query_pairs};
use std::convert::Infallible;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Shared state of the HTTP server.
#[derive(Clone)]
pub struct Gateway {
    operator: Operator,
    config: Arc<GatewayConfig>,
    ready: Arc<AtomicBool>,
}

impl Gateway {
    /// Create a gateway. It reports not ready until [`Gateway::mark_ready`].
    pub fn new(operator: Operator, config: GatewayConfig) -> Self {
        Self {
            operator,
            config: Arc::new(config),
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Report ready on `/readyz`.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// True once [`Gateway::mark_ready`] has been called.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Accept connections until `shutdown` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> std::io::Result<()> {
        info!(addr = %listener.local_addr()?, "Gateway listening");
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => accepted?,
                () = &mut shutdown => {
                    info!("Shutdown requested, no longer accepting connections");
                    return Ok(());
                }
            };

            let gateway = self.clone();
            tokio::spawn(async move {
                let io = hyper_util::rt::TokioIo::new(stream);
                let service = hyper::service::service_fn(move |req| {
                    let gateway = gateway.clone();
                    async move { Ok::<_, Infallible>(gateway.handle(req).await) }
                });

                if let Err(e) = hyper::server::conn::http1::Builder::new()
                    .serve_connection(io, service)
                    .await
                {
                    error!(peer = %peer, error = %e, "Connection error");
                }
            });
        }
    }

    /// Route and handle one request.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Display,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let Some(route) = Route::parse(&method, &path) else {
            debug!(%method, %path, "No route");
            return error_response(StatusCode::NOT_FOUND, "not found");
        };

        let params = query_pairs(req.uri().query());
        let user = req
            .headers()
            .get(self.config.owner_header.as_str())
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let ctx = RequestContext {
            operator: &self.operator,
            config: &self.config,
            user: &user,
            params: &params,
        };

        debug!(%method, %path, user = %user, "Handling request");
        match route {
            Route::Healthz => build_response(StatusCode::OK, "text/plain", "OK"),
            Route::Readyz if self.is_ready() => build_response(StatusCode::OK, "text/plain", "Ready"),
            Route::Readyz => build_response(StatusCode::SERVICE_UNAVAILABLE, "text/plain", "Not Ready"),
            Route::Pods => handler::pods(&ctx),
            Route::List {
                namespace,
                resource,
            } => handler::list(&ctx, &namespace, &resource),
            Route::Get {
                namespace,
                resource,
                name,
            } => handler::get(&ctx, &namespace, &resource, &name),
            Route::Delete {
                namespace,
                resource,
                name,
            } => handler::delete(&ctx, &namespace, &resource, &name).await,
            Route::Create {
                namespace,
                resource,
            } => match read_body(req).await {
                Ok(body) => handler::create(&ctx, &namespace, &resource, &body).await,
                Err(response) => response,
            },
            Route::Update {
                namespace,
                resource,
                name,
            } => match read_body(req).await {
                Ok(body) => handler::update(&ctx, &namespace, &resource, &name, &body).await,
                Err(response) => response,
            },
        }
    }
}

async fn read_body<B>(req: Request<B>) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Display,
{
    match req.into_body().collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) => {
            error!(error = %e, "Failed to read request body");
            Err(error_response(StatusCode::BAD_REQUEST, "failed to read request body"))
        }
    }
}
