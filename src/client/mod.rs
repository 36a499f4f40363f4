// ABOUTME: Client module: the RemotingClient trait and its default TCP-backed implementation
// ABOUTME: Re-exports the pieces a caller needs to connect and invoke calls

//! Client-side engine for the remoting protocol.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use netrpc::client::{Client, RemotingClient};
//! use netrpc::config::ClientConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::connect("127.0.0.1:9000", ClientConfig::default()).await?;
//!
//! let response = client.invoke_sync(1, &b"ping"[..], 1_000).await?;
//! println!("got {} bytes back", response.payload.len());
//!
//! client.invoke_oneway(2, &b"fire and forget"[..]).await?;
//!
//! client.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! * [`traits::RemotingClient`] — the three invocation modes (sync, async, one-way).
//! * [`default::Client`] — the TCP-backed implementation: one reader task
//!   dispatching responses by sequence, one scanner task sweeping timed-out
//!   calls out of the shared [`crate::pending::PendingTable`].
//! * [`scanner`] — the background timeout sweeper, split out the way the
//!   reader loop is, so each concern is independently testable.
//! * [`builder::ClientBuilder`] — convenience constructors layering
//!   [`crate::config::ClientConfig`] overrides onto `Client::connect`.

pub mod builder;
pub mod default;
pub mod scanner;
pub mod traits;

pub use builder::ClientBuilder;
pub use default::{Client, PendingResponse};
pub use traits::RemotingClient;
