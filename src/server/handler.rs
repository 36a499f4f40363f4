// ABOUTME: Request-handler registry and the per-request context handed to handlers
// ABOUTME: Handlers run on their own spawned task so a slow one cannot stall other receives

use crate::connection::FrameWriter;
use crate::message::{Request, Response};
use bytes::BytesMut;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

/// What a handler does with an inbound request.
///
/// Implemented for any closure matching the signature so registering a
/// handler rarely needs a dedicated type.
pub trait RequestHandler: Send + Sync {
    fn handle(
        &self,
        context: Context,
        request: Request,
    ) -> impl Future<Output = Option<Response>> + Send;
}

impl<F, Fut> RequestHandler for F
where
    F: Fn(Context, Request) -> Fut + Send + Sync,
    Fut: Future<Output = Option<Response>> + Send,
{
    fn handle(&self, context: Context, request: Request) -> impl Future<Output = Option<Response>> + Send {
        self(context, request)
    }
}

type BoxedHandler = Arc<
    dyn Fn(Context, Request) -> std::pin::Pin<Box<dyn Future<Output = Option<Response>> + Send>>
        + Send
        + Sync,
>;

/// `code -> handler` map. `register` overwrites; the last registration for
/// a given code wins.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Arc<RwLock<HashMap<i32, BoxedHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        HandlerRegistry::default()
    }

    pub async fn register<H>(&self, code: i32, handler: H)
    where
        H: RequestHandler + 'static,
    {
        let handler = Arc::new(handler);
        let boxed: BoxedHandler = Arc::new(move |ctx, req| {
            let handler = handler.clone();
            Box::pin(async move { handler.handle(ctx, req).await })
        });
        self.handlers.write().await.insert(code, boxed);
    }

    pub async fn get(&self, code: i32) -> Option<BoxedHandler> {
        self.handlers.read().await.get(&code).cloned()
    }
}

/// Per-request handle to the originating connection.
///
/// Exposes the caller's identity and a `send_response` escape hatch for
/// handlers that want to reply outside their return value (deferred or
/// out-of-band replies).
#[derive(Clone)]
pub struct Context {
    remote: String,
    writer: FrameWriter,
}

impl Context {
    pub(crate) fn new(remote: String, writer: FrameWriter) -> Self {
        Context { remote, writer }
    }

    /// The stable remote-endpoint string identifying the origin connection.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Send a response on the connection this request arrived on, outside
    /// of the handler's normal return value.
    pub async fn send_response(&self, response: &Response) -> std::io::Result<()> {
        let mut buf = BytesMut::new();
        response.encode(&mut buf);
        self.writer.write_frame(&buf).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_registration_for_a_code_wins() {
        let registry = HandlerRegistry::new();
        registry
            .register(1, |_ctx: Context, req: Request| async move {
                Some(Response::new(req.sequence, 1, &b"first"[..]))
            })
            .await;
        registry
            .register(1, |_ctx: Context, req: Request| async move {
                Some(Response::new(req.sequence, 2, &b"second"[..]))
            })
            .await;

        assert!(registry.get(1).await.is_some());
        assert!(registry.get(2).await.is_none());
    }
}
