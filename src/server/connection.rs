use crate::driver::{ReaderConfig, RequestReader};
use crate::protocol::Request;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// An accepted connection. Call [`read_request()`](#method.read_request) to
/// parse the request the client sends on it.
pub struct IncomingConnection {
    stream: TcpStream,
    config: ReaderConfig,
}

impl IncomingConnection {
    #[inline]
    pub fn new(stream: TcpStream, config: ReaderConfig) -> Self {
        IncomingConnection { stream, config }
    }

    /// Read and parse one request.
    ///
    /// Any bytes the client sent after the end of the request are discarded.
    /// Note that this method will not implicitly close the connection even
    /// if parsing failed.
    pub async fn read_request(&mut self) -> crate::Result<Request> {
        RequestReader::new(self.config).read_async(&mut self.stream).await
    }

    /// Set a timeout for reading the request. On expiry the partially parsed
    /// request is dropped.
    pub async fn read_request_with_timeout(&mut self, timeout: Duration) -> crate::Result<Request> {
        super::read_request_with_timeout(&mut self.stream, self.config, timeout).await
    }

    /// Causes the other peer to receive a read of length 0, indicating that no more data will be sent. This only closes the stream in one direction.
    #[inline]
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        self.stream.shutdown().await
    }

    /// Returns the remote address that this connection is connected to.
    #[inline]
    pub fn peer_addr(&self) -> std::io::Result<SocketAddr> {
        self.stream.peer_addr()
    }

    /// Returns the local address that this connection is bound to.
    #[inline]
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.stream.local_addr()
    }
}

impl std::fmt::Debug for IncomingConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncomingConnection").field("stream", &self.stream).finish()
    }
}

impl From<IncomingConnection> for TcpStream {
    #[inline]
    fn from(conn: IncomingConnection) -> Self {
        conn.stream
    }
}
