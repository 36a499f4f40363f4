// ABOUTME: CLI entry point for running a standalone netrpc echo server

use argh::FromArgs;
use netrpc::config::ServerConfig;
use netrpc::server::{Context, Server};
use netrpc::{Request, Response};
use std::error::Error;

/// run a netrpc server with a built-in echo handler registered on code 1
#[derive(FromArgs)]
struct Args {
    /// address to bind, e.g. 0.0.0.0:9000
    #[argh(option, default = "String::from(\"0.0.0.0:9000\")")]
    bind: String,

    /// liveness-check period in milliseconds
    #[argh(option, default = "3000")]
    liveness_period_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();
    let args: Args = argh::from_env();

    let config = ServerConfig::new().with_liveness_period_ms(args.liveness_period_ms);
    let mut server = Server::new(config);
    server
        .handlers()
        .register(1, |_ctx: Context, req: Request| async move {
            Some(Response::new(req.sequence, 0, req.payload))
        })
        .await;

    let addr = server.serve(&args.bind).await?;
    tracing::info!(%addr, "netrpc server listening");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    server.shutdown().await;
    Ok(())
}
