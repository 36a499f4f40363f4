// ABOUTME: Default client engine: owns one TCP connection, a reader task that
// ABOUTME: dispatches responses by sequence, and a scanner task that sweeps timeouts

use crate::client::scanner;
use crate::client::traits::RemotingClient;
use crate::config::ClientConfig;
use crate::connection::{self, FrameWriter};
use crate::error::{RemotingError, RemotingResult};
use crate::message::{Request, Response};
use crate::pending::{Outcome, PendingCall, PendingTable};
use crate::timing::SequenceGenerator;
use bytes::{Bytes, BytesMut};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A connected client, driving synchronous, asynchronous, and one-way
/// calls against a single peer.
///
/// Cloning shares the same underlying connection, pending-call table, and
/// background tasks — the last clone to be dropped does not itself tear
/// anything down; call [`Client::shutdown`] explicitly when done.
#[derive(Clone)]
pub struct Client {
    address: String,
    writer: FrameWriter,
    pending: Arc<PendingTable>,
    sequences: Arc<SequenceGenerator>,
    reader_task: Arc<JoinHandle<()>>,
    scanner_task: Arc<JoinHandle<()>>,
}

impl Client {
    /// Connect to `address` and start the reader and scanner background tasks.
    pub async fn connect(address: impl Into<String>, config: ClientConfig) -> RemotingResult<Self> {
        let address = address.into();
        let stream = TcpStream::connect(&address).await?;
        let (mut reader, writer) = connection::split(stream, config.max_frame_bytes);

        let pending = Arc::new(PendingTable::new());

        let reader_pending = pending.clone();
        let reader_address = address.clone();
        let reader_task = tokio::spawn(async move {
            loop {
                match reader.read_frame().await {
                    Ok(Some(frame)) => {
                        let mut body = frame;
                        match Response::decode(&mut body) {
                            Ok(response) => dispatch_response(&reader_pending, response).await,
                            Err(err) => {
                                warn!(address = %reader_address, error = %err, "discarding malformed response frame");
                            }
                        }
                    }
                    Ok(None) => {
                        debug!(address = %reader_address, "peer closed connection");
                        break;
                    }
                    Err(err) => {
                        warn!(address = %reader_address, error = %err, "connection read failed");
                        break;
                    }
                }
            }
            for call in reader_pending.drain().await {
                call.complete(Outcome::Shutdown);
            }
        });

        let scanner_task = scanner::spawn(
            pending.clone(),
            config.scanner_period_ms,
            config.scanner_initial_delay_ms,
        );

        Ok(Client {
            address,
            writer,
            pending,
            sequences: Arc::new(SequenceGenerator::new()),
            reader_task: Arc::new(reader_task),
            scanner_task: Arc::new(scanner_task),
        })
    }

    /// Stop the background tasks and complete every outstanding call with
    /// [`RemotingError::ClientShutdown`].
    pub async fn shutdown(&self) {
        self.reader_task.abort();
        self.scanner_task.abort();
        for call in self.pending.drain().await {
            call.complete(Outcome::Shutdown);
        }
    }

    /// Register a pending call, send the request, and return its future.
    ///
    /// Shared by `invoke_sync` and `invoke_async`: the two differ only in
    /// whether the caller awaits `PendingResponse` directly or wraps it in
    /// an outer timeout.
    async fn register_and_send(
        &self,
        code: i32,
        payload: Bytes,
        timeout_ms: u64,
    ) -> RemotingResult<PendingResponse> {
        let sequence = self.sequences.next();
        let request = Request::new(sequence, code, payload);
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);

        let (tx, rx) = oneshot::channel();
        let call = PendingCall::new(
            sequence,
            code,
            self.address.clone(),
            timeout_ms,
            deadline,
            tx,
        );
        self.pending
            .insert(call)
            .await
            .map_err(|_| RemotingError::DuplicateSequenceError(sequence))?;

        let mut buf = BytesMut::new();
        request.encode(&mut buf);
        let send_result = self.writer.write_frame(&buf).await;

        if let Some(failed) = self.pending.mark_send_result(sequence, send_result).await {
            let mut failed = failed;
            let err = failed.take_send_error().expect("send failure recorded");
            failed.complete(Outcome::SendFailed(err));
        }

        Ok(PendingResponse {
            receiver: rx,
            address: self.address.clone(),
            code,
            sequence,
            timeout_ms,
        })
    }
}

async fn dispatch_response(pending: &PendingTable, response: Response) {
    match pending.remove(response.sequence).await {
        Some(call) => call.complete(Outcome::Response(response)),
        None => {
            warn!(
                sequence = response.sequence,
                "response for unknown or already-resolved sequence"
            );
        }
    }
}

/// Future returned by [`Client::invoke_async`], resolving once the
/// response arrives, the deadline passes, or the send itself failed.
pub struct PendingResponse {
    receiver: oneshot::Receiver<Outcome>,
    address: String,
    code: i32,
    sequence: u64,
    timeout_ms: u64,
}

impl Future for PendingResponse {
    type Output = RemotingResult<Response>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(Outcome::Response(response))) => Poll::Ready(Ok(response)),
            Poll::Ready(Ok(Outcome::TimedOut)) => Poll::Ready(Err(RemotingError::TimeoutError {
                address: this.address.clone(),
                code: this.code,
                sequence: this.sequence,
                timeout_ms: this.timeout_ms,
            })),
            Poll::Ready(Ok(Outcome::SendFailed(source))) => Poll::Ready(Err(RemotingError::SendError {
                address: this.address.clone(),
                source,
            })),
            Poll::Ready(Ok(Outcome::Shutdown)) | Poll::Ready(Err(_)) => {
                Poll::Ready(Err(RemotingError::ClientShutdown))
            }
        }
    }
}

impl RemotingClient for Client {
    type PendingResponse = PendingResponse;

    async fn invoke_sync(
        &self,
        code: i32,
        payload: impl Into<Bytes> + Send,
        timeout_ms: u64,
    ) -> RemotingResult<Response> {
        let pending = self.register_and_send(code, payload.into(), timeout_ms).await?;
        let sequence = pending.sequence;
        match tokio::time::timeout(Duration::from_millis(timeout_ms), pending).await {
            Ok(result) => result,
            Err(_) => Err(RemotingError::TimeoutError {
                address: self.address.clone(),
                code,
                sequence,
                timeout_ms,
            }),
        }
    }

    async fn invoke_async(
        &self,
        code: i32,
        payload: impl Into<Bytes> + Send,
        timeout_ms: u64,
    ) -> RemotingResult<Self::PendingResponse> {
        self.register_and_send(code, payload.into(), timeout_ms).await
    }

    async fn invoke_oneway(&self, code: i32, payload: impl Into<Bytes> + Send) -> RemotingResult<()> {
        let sequence = self.sequences.next();
        let request = Request::oneway(sequence, code, payload.into());
        let mut buf = BytesMut::new();
        request.encode(&mut buf);
        self.writer
            .write_frame(&buf)
            .await
            .map_err(|source| RemotingError::SendError {
                address: self.address.clone(),
                source,
            })
    }
}
