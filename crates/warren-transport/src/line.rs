//! Newline-framed text connections over any async byte stream.
//!
//! This is the classic MUD wire format: the client sends a line, the
//! server writes whatever text it likes back. Telnet clients, `nc`, and
//! the integration tests (over an in-memory duplex pipe) all speak it.

use std::net::SocketAddr;

use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt,
    BufReader, DuplexStream, ReadHalf, WriteHalf,
};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Longest line a client may send, terminator included.
pub const MAX_LINE_LEN: usize = 4096;

/// A line connection over a TCP socket.
pub type TcpConnection = LineConnection<OwnedReadHalf, OwnedWriteHalf>;

/// A line connection over an in-memory pipe. Used by tests.
pub type DuplexConnection =
    LineConnection<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

/// A [`Connection`] that frames input on `\n` and writes text as-is.
///
/// The read and write halves sit behind separate locks so a task blocked
/// waiting for the next line never holds up output.
pub struct LineConnection<R, W> {
    id: ConnectionId,
    reader: Mutex<BufReader<R>>,
    writer: Mutex<W>,
}

impl<R, W> LineConnection<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            id: ConnectionId::next(),
            reader: Mutex::new(BufReader::new(reader)),
            writer: Mutex::new(writer),
        }
    }
}

impl DuplexConnection {
    /// Creates a connected pair: the server-side connection, and the raw
    /// client end of the pipe.
    pub fn pair(buffer: usize) -> (Self, DuplexStream) {
        let (server, client) = tokio::io::duplex(buffer);
        let (read, write) = tokio::io::split(server);
        (Self::new(read, write), client)
    }
}

impl<R, W> Connection for LineConnection<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    type Error = TransportError;

    async fn send_text(&self, text: &str) -> Result<(), Self::Error> {
        let mut writer = self.writer.lock().await;
        writer
            .write_all(text.as_bytes())
            .await
            .map_err(TransportError::SendFailed)?;
        writer.flush().await.map_err(TransportError::SendFailed)
    }

    async fn read_line(&self) -> Result<Option<String>, Self::Error> {
        let mut reader = self.reader.lock().await;
        let mut buf = Vec::new();
        let n = (&mut *reader)
            .take(MAX_LINE_LEN as u64)
            .read_until(b'\n', &mut buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;

        if n == 0 {
            return Ok(None);
        }
        if buf.last() != Some(&b'\n') && n == MAX_LINE_LEN {
            return Err(TransportError::LineTooLong(MAX_LINE_LEN));
        }

        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

// ---------------------------------------------------------------------------
// TCP
// ---------------------------------------------------------------------------

/// A plain TCP [`Transport`] producing [`TcpConnection`]s.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Binds a new TCP transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self { listener })
    }

    /// The address actually bound. Useful after binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener
            .local_addr()
            .map_err(TransportError::AcceptFailed)
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        // Prompts are small writes; don't let Nagle sit on them.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%addr, error = %e, "failed to set TCP_NODELAY");
        }

        let (read, write) = stream.into_split();
        let conn = LineConnection::new(read, write);
        tracing::debug!(id = %conn.id(), %addr, "accepted TCP connection");
        Ok(conn)
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_line_strips_crlf() {
        let (conn, mut client) = DuplexConnection::pair(1024);
        client.write_all(b"look\r\nnorth\n").await.unwrap();

        assert_eq!(conn.read_line().await.unwrap().as_deref(), Some("look"));
        assert_eq!(conn.read_line().await.unwrap().as_deref(), Some("north"));
    }

    #[tokio::test]
    async fn test_read_line_returns_none_on_eof() {
        let (conn, client) = DuplexConnection::pair(1024);
        drop(client);
        assert_eq!(conn.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_line_keeps_partial_line_before_eof() {
        let (conn, mut client) = DuplexConnection::pair(1024);
        client.write_all(b"quit").await.unwrap();
        drop(client);
        assert_eq!(conn.read_line().await.unwrap().as_deref(), Some("quit"));
        assert_eq!(conn.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_line_rejects_overlong_line() {
        let (conn, mut client) = DuplexConnection::pair(MAX_LINE_LEN * 2);
        client.write_all(&vec![b'a'; MAX_LINE_LEN + 10]).await.unwrap();
        let result = conn.read_line().await;
        assert!(matches!(result, Err(TransportError::LineTooLong(_))));
    }

    #[tokio::test]
    async fn test_send_text_writes_verbatim() {
        let (conn, mut client) = DuplexConnection::pair(1024);
        conn.send_text("> ").await.unwrap();

        let mut buf = [0u8; 2];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"> ");
    }
}
