use crate::driver::{ReaderConfig, RequestReader};
use crate::protocol::Request;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

pub mod connection;

pub use connection::IncomingConnection;

/// A TCP listener that hands out connections ready to have a request read
/// from them.
///
/// Each accepted connection owns its own read window and [`Request`]; run
/// them on separate tasks to serve clients concurrently.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    config: ReaderConfig,
}

impl Server {
    /// Create a new server with the given `TcpListener` and read window sizing.
    #[inline]
    pub fn new(listener: TcpListener, config: ReaderConfig) -> Self {
        Self { listener, config }
    }

    /// Bind to `addr` with the default 1024-byte read window.
    pub async fn bind<T: ToSocketAddrs>(addr: T) -> std::io::Result<Self> {
        Self::bind_with_config(addr, ReaderConfig::default()).await
    }

    pub async fn bind_with_config<T: ToSocketAddrs>(addr: T, config: ReaderConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self::new(listener, config))
    }

    /// Accept an [`IncomingConnection`].
    ///
    /// The connection is only a freshly accepted TCP stream; nothing has
    /// been read from it yet.
    pub async fn accept(&self) -> std::io::Result<(IncomingConnection, SocketAddr)> {
        let (stream, addr) = self.listener.accept().await?;
        log::debug!("accepted connection from {addr}");
        Ok((IncomingConnection::new(stream, self.config), addr))
    }

    /// Returns the local address that this server is bound to.
    #[inline]
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    #[inline]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl From<Server> for TcpListener {
    #[inline]
    fn from(server: Server) -> Self {
        server.listener
    }
}

/// Read a single request from `stream`, giving up with
/// [`crate::Error::Timeout`] after `timeout`.
pub async fn read_request_with_timeout(stream: &mut TcpStream, config: ReaderConfig, timeout: Duration) -> crate::Result<Request> {
    tokio::time::timeout(timeout, RequestReader::new(config).read_async(stream))
        .await
        .map_err(|_| crate::Error::Timeout(timeout))?
}
