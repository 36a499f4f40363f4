// ABOUTME: Accept loop, per-connection receive tasks, and the liveness sweeper
// ABOUTME: The connection map is the server-side analogue of the client's pending-call table

use crate::config::ServerConfig;
use crate::connection::{self, FrameWriter};
use crate::error::{RemotingError, RemotingResult};
use crate::message::{Request, Response};
use crate::server::handler::{Context, HandlerRegistry};
use bytes::BytesMut;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Snapshot of one accepted connection, keyed by its stable remote-endpoint string.
#[derive(Debug, Clone)]
pub struct ConnInfo {
    pub remote: String,
    pub accepted_at: Instant,
}

/// Optional callbacks for accept/disconnect/receive-error events.
///
/// Each callback runs on its own spawned task, separate from the
/// accept/receive loops, so a slow listener cannot back-pressure the server.
pub trait ServerEventListener: Send + Sync + 'static {
    fn on_accept(&self, conn: ConnInfo) -> impl Future<Output = ()> + Send {
        async move {
            let _ = conn;
        }
    }

    fn on_disconnect(&self, conn: ConnInfo) -> impl Future<Output = ()> + Send {
        async move {
            let _ = conn;
        }
    }

    fn on_receive_error(&self, conn: ConnInfo, error: String) -> impl Future<Output = ()> + Send {
        async move {
            let _ = (conn, error);
        }
    }
}

/// A listener that does nothing; used when no event callbacks are needed.
pub struct NoopEventListener;
impl ServerEventListener for NoopEventListener {}

struct ConnectionEntry {
    info: ConnInfo,
    writer: FrameWriter,
    receiver_task: JoinHandle<()>,
}

/// Accepts connections, dispatches inbound requests to registered
/// handlers, and tracks liveness of every open connection.
pub struct Server<L: ServerEventListener = NoopEventListener> {
    handlers: HandlerRegistry,
    connections: Arc<Mutex<HashMap<String, ConnectionEntry>>>,
    config: ServerConfig,
    listener: Arc<L>,
    accept_task: Option<JoinHandle<()>>,
    liveness_task: Option<JoinHandle<()>>,
}

impl Server<NoopEventListener> {
    pub fn new(config: ServerConfig) -> Self {
        Server::with_listener(config, NoopEventListener)
    }
}

impl<L: ServerEventListener> Server<L> {
    pub fn with_listener(config: ServerConfig, listener: L) -> Self {
        Server {
            handlers: HandlerRegistry::new(),
            connections: Arc::new(Mutex::new(HashMap::new())),
            config,
            listener: Arc::new(listener),
            accept_task: None,
            liveness_task: None,
        }
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Bind `addr` and start accepting connections and running the
    /// liveness sweeper. Returns the bound local address.
    pub async fn serve(&mut self, addr: impl tokio::net::ToSocketAddrs) -> RemotingResult<std::net::SocketAddr> {
        let tcp_listener = TcpListener::bind(addr).await?;
        let local_addr = tcp_listener.local_addr()?;

        let handlers = self.handlers.clone();
        let connections = self.connections.clone();
        let max_frame_bytes = self.config.max_frame_bytes;
        let event_listener = self.listener.clone();

        let accept_task = tokio::spawn(async move {
            loop {
                let (stream, peer) = match tcp_listener.accept().await {
                    Ok(pair) => pair,
                    Err(err) => {
                        error!(error = %err, "accept failed");
                        continue;
                    }
                };
                spawn_connection(
                    stream,
                    peer.to_string(),
                    handlers.clone(),
                    connections.clone(),
                    max_frame_bytes,
                    event_listener.clone(),
                )
                .await;
            }
        });
        self.accept_task = Some(accept_task);

        let liveness_connections = self.connections.clone();
        let liveness_period_ms = self.config.liveness_period_ms;
        let liveness_listener = self.listener.clone();
        let liveness_task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(liveness_period_ms.max(1)));
            loop {
                interval.tick().await;
                let dead: Vec<ConnInfo> = {
                    let guard = liveness_connections.lock().await;
                    guard
                        .values()
                        .filter(|entry| entry.receiver_task.is_finished())
                        .map(|entry| entry.info.clone())
                        .collect()
                };
                if dead.is_empty() {
                    continue;
                }
                let mut guard = liveness_connections.lock().await;
                for conn in &dead {
                    guard.remove(&conn.remote);
                }
                drop(guard);
                for conn in dead {
                    debug!(remote = %conn.remote, "liveness check removed dead connection");
                    liveness_listener.on_disconnect(conn).await;
                }
            }
        });
        self.liveness_task = Some(liveness_task);

        Ok(local_addr)
    }

    /// Stop accepting connections and abort every connection's receive task.
    pub async fn shutdown(&mut self) {
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
        if let Some(task) = self.liveness_task.take() {
            task.abort();
        }
        let mut guard = self.connections.lock().await;
        for (_, entry) in guard.drain() {
            entry.receiver_task.abort();
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

async fn spawn_connection<L: ServerEventListener>(
    stream: TcpStream,
    remote: String,
    handlers: HandlerRegistry,
    connections: Arc<Mutex<HashMap<String, ConnectionEntry>>>,
    max_frame_bytes: u32,
    listener: Arc<L>,
) {
    let (mut reader, writer) = connection::split(stream, max_frame_bytes);
    let info = ConnInfo {
        remote: remote.clone(),
        accepted_at: Instant::now(),
    };

    let receive_connections = connections.clone();
    let receive_remote = remote.clone();
    let receive_writer = writer.clone();
    let receive_handlers = handlers.clone();
    let receive_listener = listener.clone();
    let receive_info = info.clone();
    let receiver_task = tokio::spawn(async move {
        loop {
            match reader.read_frame().await {
                Ok(Some(frame)) => {
                    let mut body = frame;
                    match Request::decode(&mut body) {
                        Ok(request) => {
                            dispatch(
                                receive_handlers.clone(),
                                receive_writer.clone(),
                                receive_remote.clone(),
                                request,
                            );
                        }
                        Err(err) => {
                            warn!(remote = %receive_remote, error = %err, "discarding malformed request frame");
                        }
                    }
                }
                Ok(None) => {
                    debug!(remote = %receive_remote, "peer closed connection");
                    break;
                }
                Err(err) => {
                    receive_listener
                        .on_receive_error(receive_info.clone(), err.to_string())
                        .await;
                    warn!(remote = %receive_remote, error = %err, "connection read failed");
                    break;
                }
            }
        }
        receive_connections.lock().await.remove(&receive_remote);
        let disconnect_listener = receive_listener.clone();
        let disconnect_info = receive_info.clone();
        tokio::spawn(async move {
            disconnect_listener.on_disconnect(disconnect_info).await;
        });
    });

    connections.lock().await.insert(
        remote.clone(),
        ConnectionEntry {
            info: info.clone(),
            writer,
            receiver_task,
        },
    );

    listener.on_accept(info).await;
}

/// Dispatch one decoded request onto its own task so a slow handler only
/// stalls this request, never other connections or other frames on this
/// same connection.
fn dispatch(handlers: HandlerRegistry, writer: FrameWriter, remote: String, request: Request) {
    tokio::spawn(async move {
        let is_oneway = request.is_oneway;
        let sequence = request.sequence;
        let code = request.code;
        let context = Context::new(remote.clone(), writer.clone());

        let Some(handler) = handlers.get(code).await else {
            let err = RemotingError::HandlerNotFoundError(code);
            error!(remote = %remote, sequence, error = %err, "no handler registered for request code");
            return;
        };

        let response = handler(context, request).await;
        if is_oneway {
            return;
        }
        let Some(response) = response else {
            return;
        };

        let mut buf = BytesMut::new();
        response.encode(&mut buf);
        if let Err(err) = writer.write_frame(&buf).await {
            warn!(remote = %remote, sequence, error = %err, "failed to send response");
        }
    });
}
