use crate::buffer::{DEFAULT_BUFFER_SIZE, ReadBuffer};
use crate::protocol::{Request, StreamOperation};
use crate::Result;
use std::io::Read;

#[cfg(feature = "tokio")]
use crate::protocol::AsyncStreamOperation;
#[cfg(feature = "tokio")]
use tokio::io::{AsyncRead, AsyncReadExt};

/// Sizing of the read window used while a request is being parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Initial window capacity in bytes.
    pub buffer_size: usize,
    /// Upper bound the window may double up to. `None` keeps it fixed at
    /// `buffer_size`, so a request head that does not fit fails with
    /// [`crate::Error::BufferFull`].
    pub max_buffer_size: Option<usize>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_buffer_size: None,
        }
    }
}

impl ReaderConfig {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            max_buffer_size: None,
        }
    }

    pub fn with_max_buffer_size(mut self, max_buffer_size: usize) -> Self {
        self.max_buffer_size = Some(max_buffer_size);
        self
    }

    fn buffer(&self) -> ReadBuffer {
        match self.max_buffer_size {
            Some(max) => ReadBuffer::with_limit(self.buffer_size, max),
            None => ReadBuffer::new(self.buffer_size),
        }
    }
}

/// Drives a [`Request`] to completion from a byte stream.
#[derive(Clone, Debug, Default)]
pub struct RequestReader {
    config: ReaderConfig,
}

impl RequestReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Reads from `reader` until one request has been parsed.
    ///
    /// Read errors are returned as they are, without retrying. End of
    /// stream before completion is [`crate::Error::ConnectionClosed`], or
    /// [`crate::Error::IncompleteBody`] if it happens inside the body.
    pub fn read<R>(&self, reader: &mut R) -> Result<Request>
    where
        R: Read + ?Sized,
    {
        let mut request = Request::new();
        let mut buffer = self.config.buffer();

        while !request.is_done() {
            let n = reader.read(buffer.spare_mut()?)?;
            if n == 0 {
                return Err(request.eof_error());
            }
            buffer.advance(n);
            log::trace!("read {n} bytes, {} buffered", buffer.len());

            let consumed = request.parse(buffer.filled())?;
            buffer.consume(consumed);
        }
        Ok(request)
    }

    /// Asynchronous counterpart of [`RequestReader::read`].
    #[cfg(feature = "tokio")]
    pub async fn read_async<R>(&self, reader: &mut R) -> Result<Request>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut request = Request::new();
        let mut buffer = self.config.buffer();

        while !request.is_done() {
            let n = reader.read(buffer.spare_mut()?).await?;
            if n == 0 {
                return Err(request.eof_error());
            }
            buffer.advance(n);
            log::trace!("read {n} bytes, {} buffered", buffer.len());

            let consumed = request.parse(buffer.filled())?;
            buffer.consume(consumed);
        }
        Ok(request)
    }
}

/// Parses one request from `reader` with a fixed 1024-byte window.
pub fn request_from_reader<R>(reader: &mut R) -> Result<Request>
where
    R: Read + ?Sized,
{
    RequestReader::default().read(reader)
}

/// Parses one request from an async `reader` with a fixed 1024-byte window.
#[cfg(feature = "tokio")]
pub async fn request_from_async_reader<R>(reader: &mut R) -> Result<Request>
where
    R: AsyncRead + Unpin + ?Sized,
{
    RequestReader::default().read_async(reader).await
}

impl StreamOperation for Request {
    fn retrieve_from_stream<R>(r: &mut R) -> Result<Self>
    where
        R: Read,
    {
        request_from_reader(r)
    }
}

#[cfg(feature = "tokio")]
#[async_trait::async_trait]
impl AsyncStreamOperation for Request {
    async fn retrieve_from_async_stream<R>(r: &mut R) -> Result<Self>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
    {
        request_from_async_reader(r).await
    }
}

impl From<ReaderConfig> for RequestReader {
    fn from(config: ReaderConfig) -> Self {
        Self::new(config)
    }
}

