// ABOUTME: Long-lived client that periodically calls an unregistered code to
// ABOUTME: exercise the timeout scanner rather than any particular handler

use netrpc::client::RemotingClient;
use netrpc::config::ClientConfig;
use netrpc::Client;
use std::error::Error;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let client = Client::connect(
        "127.0.0.1:9000",
        ClientConfig::new()
            .with_scanner_period_ms(500)
            .with_scanner_initial_delay_ms(500),
    )
    .await?;

    loop {
        match client.invoke_sync(999, &b""[..], 1_000).await {
            Ok(response) => println!("unexpected response: {} bytes", response.payload.len()),
            Err(err) => println!("expected timeout/error: {err}"),
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
}
