// ABOUTME: Server module: accept loop, handler registry, and connection liveness tracking
// ABOUTME: Mirrors the client module's split between the engine and its background tasks

//! Server-side engine for the remoting protocol.
//!
//! ```rust,no_run
//! use netrpc::server::{Context, Server};
//! use netrpc::config::ServerConfig;
//! use netrpc::message::{Request, Response};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = Server::new(ServerConfig::default());
//! server.handlers().register(1, |_ctx: Context, req: Request| async move {
//!     Some(Response::new(req.sequence, 0, req.payload))
//! }).await;
//! server.serve("0.0.0.0:9000").await?;
//! # Ok(())
//! # }
//! ```

pub mod handler;
pub mod listener;

pub use handler::{Context, HandlerRegistry, RequestHandler};
pub use listener::{ConnInfo, NoopEventListener, Server, ServerEventListener};
