//! # HTTP Server Module
//!
//! Thin request-handling layer over [`crate::posts::PostService`].
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/metrics` - Counter snapshot
//! - `/api/post` - Create and list posts
//! - `/api/post/:key` - Read, edit or rename, and delete a post

pub mod config;
pub mod observability_routes;
pub mod post_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
