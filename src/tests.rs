// ABOUTME: End-to-end scenarios exercising client and server together over real sockets
// ABOUTME: Each test is one of the concrete scenarios the correlation engine must satisfy

use crate::client::{Client, RemotingClient};
use crate::config::{ClientConfig, ServerConfig};
use crate::error::RemotingError;
use crate::message::Response;
use crate::server::{Context, Server};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn echo_round_trip() {
    let mut server = Server::new(ServerConfig::default());
    server
        .handlers()
        .register(1, |_ctx: Context, req| async move {
            Some(Response::new(req.sequence, 0, req.payload))
        })
        .await;
    let addr = server.serve("127.0.0.1:0").await.unwrap();

    let client = Client::connect(addr.to_string(), ClientConfig::default())
        .await
        .unwrap();
    let response = client.invoke_sync(1, &b"hello"[..], 1_000).await.unwrap();
    assert_eq!(&response.payload[..], b"hello");

    client.shutdown().await;
    server.shutdown().await;
}

#[tokio::test]
async fn oneway_counter_with_no_pending_entries_left_behind() {
    let mut server = Server::new(ServerConfig::default());
    let counter = Arc::new(AtomicU32::new(0));
    let counter_handle = counter.clone();
    server
        .handlers()
        .register(2, move |_ctx: Context, _req| {
            let counter_handle = counter_handle.clone();
            async move {
                counter_handle.fetch_add(1, Ordering::SeqCst);
                None
            }
        })
        .await;
    let addr = server.serve("127.0.0.1:0").await.unwrap();

    let client = Client::connect(addr.to_string(), ClientConfig::default())
        .await
        .unwrap();
    for _ in 0..5 {
        client.invoke_oneway(2, &b""[..]).await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 5);

    client.shutdown().await;
    server.shutdown().await;
}

#[tokio::test]
async fn unregistered_code_times_out_within_the_configured_window() {
    let mut server = Server::new(ServerConfig::default());
    let addr = server.serve("127.0.0.1:0").await.unwrap();

    let client = Client::connect(
        addr.to_string(),
        ClientConfig::new()
            .with_scanner_initial_delay_ms(0)
            .with_scanner_period_ms(20),
    )
    .await
    .unwrap();

    let started = std::time::Instant::now();
    let result = client.invoke_sync(7, &b""[..], 200).await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(RemotingError::TimeoutError { .. })));
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_millis(200 + 500));

    client.shutdown().await;
    server.shutdown().await;
}

#[tokio::test]
async fn killed_server_produces_a_send_error_not_a_timeout() {
    let mut server = Server::new(ServerConfig::default());
    let addr = server.serve("127.0.0.1:0").await.unwrap();

    let client = Client::connect(addr.to_string(), ClientConfig::default())
        .await
        .unwrap();
    server.shutdown().await;
    // Give the OS time to actually tear down the listening socket.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let result = client.invoke_sync(1, &b""[..], 1_000).await;
    assert!(matches!(
        result,
        Err(RemotingError::SendError { .. }) | Err(RemotingError::ClientShutdown)
    ));

    client.shutdown().await;
}

#[tokio::test]
async fn async_calls_resolve_out_of_order_by_handler_delay() {
    let mut server = Server::new(ServerConfig::default());
    server
        .handlers()
        .register(10, |_ctx: Context, req| async move {
            let delay_ms = u64::from_le_bytes(req.payload[..8].try_into().unwrap());
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Some(Response::new(req.sequence, 0, req.payload))
        })
        .await;
    let addr = server.serve("127.0.0.1:0").await.unwrap();

    let client = Client::connect(addr.to_string(), ClientConfig::default())
        .await
        .unwrap();

    let a = client
        .invoke_async(10, 300u64.to_le_bytes().to_vec(), 2_000)
        .await
        .unwrap();
    let b = client
        .invoke_async(10, 200u64.to_le_bytes().to_vec(), 2_000)
        .await
        .unwrap();
    let c = client
        .invoke_async(10, 100u64.to_le_bytes().to_vec(), 2_000)
        .await
        .unwrap();

    let order = Arc::new(tokio::sync::Mutex::new(Vec::new()));
    let order_a = order.clone();
    let order_b = order.clone();
    let order_c = order.clone();
    let (ra, rb, rc) = tokio::join!(
        async move {
            let r = a.await;
            order_a.lock().await.push('A');
            r
        },
        async move {
            let r = b.await;
            order_b.lock().await.push('B');
            r
        },
        async move {
            let r = c.await;
            order_c.lock().await.push('C');
            r
        }
    );

    assert!(ra.is_ok() && rb.is_ok() && rc.is_ok());
    assert_eq!(*order.lock().await, vec!['C', 'B', 'A']);

    client.shutdown().await;
    server.shutdown().await;
}

#[tokio::test]
async fn fragmented_byte_at_a_time_transport_still_reassembles_correctly() {
    use crate::connection;
    use bytes::BytesMut;
    use tokio::io::AsyncWriteExt;
    use tokio::net::{TcpListener, TcpStream};

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let payload = vec![0x7Au8; 5 * 1024];
    let payload_for_writer = payload.clone();
    let writer_task = tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = crate::message::Request::new(1, 1, payload_for_writer);
        let mut body = BytesMut::new();
        request.encode(&mut body);
        let mut frame = BytesMut::new();
        crate::codec::encode(&body, &mut frame);
        for byte in frame {
            stream.write_all(&[byte]).await.unwrap();
        }
    });

    let (stream, _) = listener.accept().await.unwrap();
    let (mut reader, _writer) = connection::split(stream, crate::codec::DEFAULT_MAX_FRAME_BYTES);
    let frame = reader.read_frame().await.unwrap().unwrap();
    let mut body = frame;
    let request = crate::message::Request::decode(&mut body).unwrap();
    assert_eq!(request.payload.len(), payload.len());
    assert_eq!(&request.payload[..], &payload[..]);

    writer_task.await.unwrap();
}
