// ABOUTME: CLI entry point for driving a single sync call against a netrpc server

use argh::FromArgs;
use netrpc::client::RemotingClient;
use netrpc::config::ClientConfig;
use netrpc::Client;
use std::error::Error;

/// send a single request to a netrpc server and print the response
#[derive(FromArgs)]
struct Args {
    /// address to connect to, e.g. 127.0.0.1:9000
    #[argh(option, default = "String::from(\"127.0.0.1:9000\")")]
    connect: String,

    /// request code to invoke
    #[argh(option, default = "1")]
    code: i32,

    /// payload to send, as a UTF-8 string
    #[argh(option, default = "String::from(\"hello\")")]
    payload: String,

    /// timeout in milliseconds
    #[argh(option, default = "1000")]
    timeout_ms: u64,

    /// send one-way instead of waiting for a response
    #[argh(switch)]
    oneway: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();
    let args: Args = argh::from_env();

    let client = Client::connect(args.connect, ClientConfig::default()).await?;

    if args.oneway {
        client.invoke_oneway(args.code, args.payload.into_bytes()).await?;
        println!("sent one-way");
    } else {
        let response = client
            .invoke_sync(args.code, args.payload.into_bytes(), args.timeout_ms)
            .await?;
        println!(
            "response: code={} payload={}",
            response.code,
            String::from_utf8_lossy(&response.payload)
        );
    }

    client.shutdown().await;
    Ok(())
}
