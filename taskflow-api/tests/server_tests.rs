/// Graceful shutdown behaviour of the server loop

mod common;

use axum::{routing::get, Router};
use common::TestContext;
use std::{net::SocketAddr, time::Duration};
use taskflow_api::server::{serve_with_grace, ServerError};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::oneshot,
};

async fn raw_get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        path
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_serves_until_signal_then_stops_cleanly() {
    let ctx = TestContext::new();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(serve_with_grace(
        listener,
        ctx.app.clone(),
        async move {
            let _ = stop_rx.await;
        },
        Duration::from_secs(10),
    ));

    let response = raw_get(addr, "/health").await;
    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok(), "{:?}", result);

    // The listener is gone once the server returns
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_in_flight_request_finishes_within_grace() {
    let app = Router::new().route(
        "/slow",
        get(|| async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            "done"
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(serve_with_grace(
        listener,
        app,
        async move {
            let _ = stop_rx.await;
        },
        Duration::from_secs(5),
    ));

    let request = tokio::spawn(raw_get(addr, "/slow"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    stop_tx.send(()).unwrap();

    let response = request.await.unwrap();
    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
    assert!(response.ends_with("done"));

    assert!(server.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_grace_expiry_aborts_stuck_requests() {
    let app = Router::new().route(
        "/stuck",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            "never"
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let grace = Duration::from_millis(100);

    let server = tokio::spawn(serve_with_grace(
        listener,
        app,
        async move {
            let _ = stop_rx.await;
        },
        grace,
    ));

    let request = tokio::spawn(raw_get(addr, "/stuck"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    stop_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(result, Err(ServerError::GraceExpired(d)) if d == grace));

    request.abort();
}
