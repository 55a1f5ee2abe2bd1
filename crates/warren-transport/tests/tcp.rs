//! Integration tests for the plain TCP line transport.
//!
//! A real listener on an OS-assigned port, a real client socket.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use warren_transport::{Connection, TcpTransport, Transport};

#[tokio::test]
async fn test_tcp_accept_and_exchange_lines() {
    let mut transport = TcpTransport::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = transport.local_addr().expect("bound address");

    let server = tokio::spawn(async move {
        transport.accept().await.expect("should accept")
    });
    let client = TcpStream::connect(addr).await.expect("should connect");
    let conn = server.await.expect("accept task");

    let (read, mut write) = client.into_split();
    let mut client_lines = BufReader::new(read).lines();

    // --- Client sends, server receives ---
    write.write_all(b"say hello\r\n").await.unwrap();
    let line = conn.read_line().await.expect("read should succeed");
    assert_eq!(line.as_deref(), Some("say hello"));

    // --- Server sends, client receives ---
    conn.send_text("You say, \"hello\"\n").await.unwrap();
    let echoed = client_lines.next_line().await.unwrap();
    assert_eq!(echoed.as_deref(), Some("You say, \"hello\""));
}

#[tokio::test]
async fn test_tcp_client_disconnect_reads_none() {
    let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = transport.local_addr().unwrap();

    let server = tokio::spawn(async move { transport.accept().await.unwrap() });
    let client = TcpStream::connect(addr).await.unwrap();
    let conn = server.await.unwrap();

    drop(client);
    assert_eq!(conn.read_line().await.unwrap(), None);
}

#[tokio::test]
async fn test_tcp_connections_get_distinct_ids() {
    let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = transport.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let a = transport.accept().await.unwrap();
        let b = transport.accept().await.unwrap();
        (a, b)
    });
    let _c1 = TcpStream::connect(addr).await.unwrap();
    let _c2 = TcpStream::connect(addr).await.unwrap();
    let (a, b) = server.await.unwrap();

    assert_ne!(a.id(), b.id());
}
