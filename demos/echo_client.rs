// ABOUTME: Drives all three invocation modes against a running echo server

use netrpc::client::RemotingClient;
use netrpc::config::ClientConfig;
use netrpc::Client;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let client = Client::connect("127.0.0.1:9000", ClientConfig::default()).await?;

    let response = client.invoke_sync(1, &b"hello, sync"[..], 1_000).await?;
    println!("sync: {}", String::from_utf8_lossy(&response.payload));

    let pending = client.invoke_async(1, &b"hello, async"[..], 1_000).await?;
    let response = pending.await?;
    println!("async: {}", String::from_utf8_lossy(&response.payload));

    client.invoke_oneway(1, &b"hello, one-way"[..]).await?;
    println!("one-way: sent, no response expected");

    client.shutdown().await;
    Ok(())
}
