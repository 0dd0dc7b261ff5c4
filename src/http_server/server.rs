//! # HTTP Server
//!
//! Combines the post API and the observability endpoints into one router.

use std::io;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::HttpServerConfig;
use super::observability_routes::observability_routes;
use super::post_routes::post_routes;
use crate::kv::KeyValueStore;
use crate::observability::{log_event_with_fields, Event};
use crate::posts::PostService;

/// HTTP server for the post API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over `service`. Fails on an origin that is not a
    /// valid header value.
    pub fn with_service<S: KeyValueStore + 'static>(
        config: HttpServerConfig,
        service: Arc<PostService<S>>,
    ) -> Result<Self, String> {
        let cors = Self::cors_layer(&config)?;
        let metrics = Arc::clone(service.metrics());

        let router = Router::new()
            .merge(observability_routes(metrics))
            .nest("/api", post_routes(service))
            .layer(cors);

        Ok(Self { config, router })
    }

    fn cors_layer(config: &HttpServerConfig) -> Result<CorsLayer, String> {
        let origins = config.origin_headers()?;
        let allow_origin = if origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        };

        Ok(CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any))
    }

    pub fn config(&self) -> &HttpServerConfig {
        &self.config
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the listener fails
    pub async fn start(self) -> Result<(), io::Error> {
        let addr = self
            .config
            .bind_addr()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let listener = TcpListener::bind(addr).await?;
        log_event_with_fields(Event::Serving, &[("addr", addr.to_string().as_str())]);

        axum::serve(listener, self.router).await?;

        Ok(())
    }
}
