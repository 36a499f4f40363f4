// ABOUTME: Crate-wide error type shared by the client and server engines
// ABOUTME: Provides structured error reporting with automatic conversion from I/O failures

use std::io;
use thiserror::Error;

/// Comprehensive error type for netrpc client and server operations.
///
/// Mirrors the error kinds enumerated in the correlation engine's design:
/// a send failure, a timed-out call, a duplicate sequence number, a
/// framing violation, and a missing server-side handler.
#[derive(Debug, Error)]
pub enum RemotingError {
    /// The send to the peer failed (socket error, disconnect during write).
    #[error("send to {address} failed: {source}")]
    SendError {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The per-call deadline expired without a matching response.
    #[error("call to {address} (code {code}, seq {sequence}) timed out after {timeout_ms}ms")]
    TimeoutError {
        address: String,
        code: i32,
        sequence: u64,
        timeout_ms: u64,
    },

    /// `insert` into the pending-call table collided on an outstanding sequence.
    #[error("duplicate sequence number {0} in pending-call table")]
    DuplicateSequenceError(u64),

    /// Receive-side parse failure: a length prefix was negative or exceeded the configured cap.
    #[error("framing error: frame length {length} exceeds cap {max}")]
    FramingError { length: u32, max: u32 },

    /// Server has no handler registered for the request's code.
    #[error("no handler registered for request code {0}")]
    HandlerNotFoundError(i32),

    /// The client or server was shut down while the call was outstanding.
    #[error("client shut down with call outstanding")]
    ClientShutdown,

    /// Low-level I/O error not otherwise classified above.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A specialized `Result` type for netrpc operations.
pub type RemotingResult<T> = std::result::Result<T, RemotingError>;
