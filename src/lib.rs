//! # servlite
//!
//! A minimal HTTP server built directly on TCP sockets: a bounded hand-rolled
//! wire parser, exact-match routing, a static-file whitelist fallback, and a
//! fixed-capacity worker pool. One request per connection; every response
//! carries `Connection: close`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use servlite::{Request, Responder, ResponseSink, Router, Server, ServerConfig};
//! use servlite::http::StatusCode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router.post("/messages", |_req: Request, mut responder: Responder<ResponseSink>| async move {
//!         responder.send_status(StatusCode::Created).await
//!     });
//!
//!     let server = Server::bind(ServerConfig::default()).await?;
//!     println!("Listening on http://{}", server.local_addr());
//!     server.run(router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod files;
pub mod http;
pub mod router;
pub mod server;

// Convenience re-exports
pub use config::{ConfigError, ServerConfig};
pub use files::StaticFiles;
pub use http::{Headers, Method, Params, ParseError, Request, Responder, StatusCode};
pub use router::{Handler, IntoHandler, ResponseSink, Router};
pub use server::{Server, ServerError};
