//! A minimal, length-prefixed, asynchronous TCP remoting framework.
//!
//! A symmetric client/server pair lets a caller invoke a numbered request
//! code on a remote peer and receive a correlated response, over a single
//! long-lived connection, in three modes: synchronous, asynchronous, and
//! one-way.
//!
//! ```rust,no_run
//! use netrpc::client::{Client, RemotingClient};
//! use netrpc::config::ClientConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::connect("127.0.0.1:9000", ClientConfig::default()).await?;
//!
//!     let response = client.invoke_sync(1, &b"hello"[..], 1_000).await?;
//!     println!("got {} bytes back", response.payload.len());
//!
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod message;
pub mod pending;
pub mod server;
pub mod timing;

#[cfg(test)]
mod tests;

pub use codec::{check_length, decode_header, encode, encode_to_bytes};
pub use config::{ClientConfig, ServerConfig};
pub use error::{RemotingError, RemotingResult};
pub use message::{MessageError, Request, Response};

pub use client::{Client, RemotingClient};
pub use server::{Context, RequestHandler, Server, ServerEventListener};
