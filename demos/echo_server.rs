// ABOUTME: Minimal echo server: registers code 1 to bounce the payload back unchanged

use netrpc::config::ServerConfig;
use netrpc::server::{Context, Server};
use netrpc::{Request, Response};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let mut server = Server::new(ServerConfig::default());
    server
        .handlers()
        .register(1, |_ctx: Context, req: Request| async move {
            Some(Response::new(req.sequence, 0, req.payload))
        })
        .await;

    let addr = server.serve("127.0.0.1:9000").await?;
    tracing::info!(%addr, "echo server listening");

    tokio::signal::ctrl_c().await?;
    server.shutdown().await;
    Ok(())
}
