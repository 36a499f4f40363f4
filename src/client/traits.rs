// ABOUTME: Public trait surface for the client engine's three invocation modes
// ABOUTME: Uses native async fn in traits, no async_trait dependency needed

use crate::error::RemotingResult;
use crate::message::Response;
use bytes::Bytes;
use std::future::Future;

/// The three invocation modes a caller can drive against a connected peer.
///
/// All three share the same wire format and the same pending-call
/// lifecycle; they differ only in whether a reply is awaited and whether
/// the call is registered in the correlation table at all.
pub trait RemotingClient {
    /// The future returned by `invoke_async`, resolving the same way
    /// `invoke_sync` would (response, timeout, or send failure).
    type PendingResponse: Future<Output = RemotingResult<Response>> + Send;

    /// Send a request and block the caller until a response arrives, the
    /// deadline expires, or the send itself fails.
    fn invoke_sync(
        &self,
        code: i32,
        payload: impl Into<Bytes> + Send,
        timeout_ms: u64,
    ) -> impl Future<Output = RemotingResult<Response>> + Send;

    /// Send a request and return a future that resolves the same way
    /// `invoke_sync` would, without blocking the calling task.
    fn invoke_async(
        &self,
        code: i32,
        payload: impl Into<Bytes> + Send,
        timeout_ms: u64,
    ) -> impl Future<Output = RemotingResult<Self::PendingResponse>> + Send;

    /// Send a request with no correlation entry and no wait. A send
    /// failure is reported synchronously; there is no such thing as a
    /// timeout for a one-way call.
    fn invoke_oneway(
        &self,
        code: i32,
        payload: impl Into<Bytes> + Send,
    ) -> impl Future<Output = RemotingResult<()>> + Send;
}
