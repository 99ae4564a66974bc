//! End-to-end lifecycle tests: real sockets, ephemeral ports, raw HTTP/1.1.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use moor::{Request, Server, greet};

/// Sends one `GET path` and returns the full response (head + body).
async fn get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

/// Binds an ephemeral port and starts `serve` on a background task.
async fn spawn_server(
    cancel: CancellationToken,
) -> (SocketAddr, tokio::task::JoinHandle<Result<(), moor::Error>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(Server::from_listener(listener).serve(greet, cancel));
    (addr, server)
}

#[tokio::test]
async fn echoes_the_path_segment() {
    let cancel = CancellationToken::new();
    let (addr, server) = spawn_server(cancel.clone()).await;

    let response = get(addr, "/message").await;
    assert!(response.starts_with("HTTP/1.1 200"), "got: {response}");
    assert!(response.ends_with("Hello, message!"), "got: {response}");

    cancel.cancel();
    let outcome = timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
    assert!(outcome.is_ok());
}

#[tokio::test]
async fn echoes_the_empty_segment() {
    let cancel = CancellationToken::new();
    let (addr, server) = spawn_server(cancel.clone()).await;

    let response = get(addr, "/").await;
    assert!(response.ends_with("Hello, !"), "got: {response}");

    cancel.cancel();
    timeout(Duration::from_secs(5), server).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn refuses_connections_after_shutdown() {
    let cancel = CancellationToken::new();
    let (addr, server) = spawn_server(cancel.clone()).await;

    let response = get(addr, "/ping").await;
    assert!(response.starts_with("HTTP/1.1 200"));

    cancel.cancel();
    timeout(Duration::from_secs(5), server).await.unwrap().unwrap().unwrap();

    // The listener is gone with the serving task.
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn cancelling_before_any_request_terminates_cleanly() {
    let cancel = CancellationToken::new();
    let (_addr, server) = spawn_server(cancel.clone()).await;

    cancel.cancel();
    let outcome = timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
    assert!(outcome.is_ok());
}

#[tokio::test]
async fn cancelling_twice_is_a_no_op() {
    let cancel = CancellationToken::new();
    let (addr, server) = spawn_server(cancel.clone()).await;

    let response = get(addr, "/once").await;
    assert!(response.ends_with("Hello, once!"));

    cancel.cancel();
    cancel.cancel();
    let outcome = timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
    assert!(outcome.is_ok());

    // A trigger after the server stopped changes nothing either.
    cancel.cancel();
}

#[tokio::test]
async fn bind_conflict_is_a_fatal_startup_error() {
    let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = occupied.local_addr().unwrap();

    // Never cancelled: a bind failure must return before the coordinator
    // starts waiting on the token.
    let outcome = Server::bind(&addr.to_string())
        .serve(greet, CancellationToken::new())
        .await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn handlers_may_return_plain_strings() {
    async fn version(_req: Request) -> String {
        "0.1.0".to_owned()
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let server = tokio::spawn(Server::from_listener(listener).serve(version, cancel.clone()));

    let response = get(addr, "/version").await;
    assert!(response.ends_with("0.1.0"), "got: {response}");

    cancel.cancel();
    timeout(Duration::from_secs(5), server).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn handlers_can_inspect_the_request_head() {
    async fn describe(req: Request) -> String {
        let host = req.header("Host").unwrap_or("unknown");
        format!("{} {} via {}", req.method(), req.path(), host)
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let server = tokio::spawn(Server::from_listener(listener).serve(describe, cancel.clone()));

    let response = get(addr, "/whoami").await;
    assert!(response.ends_with("GET /whoami via localhost"), "got: {response}");

    cancel.cancel();
    timeout(Duration::from_secs(5), server).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn drains_an_in_flight_request_before_stopping() {
    async fn slow(_req: Request) -> &'static str {
        tokio::time::sleep(Duration::from_millis(200)).await;
        "done"
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let server = tokio::spawn(Server::from_listener(listener).serve(slow, cancel.clone()));

    // Start a request, then cancel while the handler is still sleeping.
    let in_flight = tokio::spawn(async move { get(addr, "/job").await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let response = in_flight.await.unwrap();
    assert!(response.ends_with("done"), "got: {response}");

    let outcome = timeout(Duration::from_secs(5), server).await.unwrap().unwrap();
    assert!(outcome.is_ok());
}
