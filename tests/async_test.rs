#![cfg(feature = "tokio")]

use httpfromtcp::protocol::AsyncStreamOperation;
use httpfromtcp::{Error, ReaderConfig, Request, RequestReader, request_from_async_reader};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWriteExt, ReadBuf};

/// Yields at most `chunk` bytes per poll.
struct ChunkReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl AsyncRead for ChunkReader {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<std::io::Result<()>> {
        let n = self.chunk.min(buf.remaining()).min(self.data.len() - self.pos);
        let start = self.pos;
        buf.put_slice(&self.data[start..start + n]);
        self.pos += n;
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn test_async_request_from_stream() {
    let data = b"GET /test HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let mut cursor = std::io::Cursor::new(data.to_vec());

    let request = request_from_async_reader(&mut cursor).await.unwrap();

    assert_eq!(request.method(), Some("GET"));
    assert_eq!(request.target(), Some("/test"));
    assert_eq!(request.header("Host"), Some("example.com"));
}

#[tokio::test]
async fn test_retrieve_from_async_stream_chunked() {
    let data = b"POST /upload HTTP/1.1\r\nHost: example.com\r\nContent-Length: 10\r\n\r\n0123456789";
    for chunk in [1, 4, 9, 512] {
        let mut reader = ChunkReader {
            data: data.to_vec(),
            pos: 0,
            chunk,
        };
        let request = Request::retrieve_from_async_stream(&mut reader).await.unwrap();
        assert_eq!(request.body(), b"0123456789", "chunk {chunk}");
    }
}

#[tokio::test]
async fn test_async_matches_sync() {
    let data = b"GET /a?b=c HTTP/1.1\r\nHost: x\r\nCookie: a=1\r\nCookie: b=2\r\n\r\n";
    let sync = httpfromtcp::request_from_reader(&mut &data[..]).unwrap();
    let async_ = request_from_async_reader(&mut &data[..]).await.unwrap();

    assert_eq!(sync.request_line(), async_.request_line());
    assert_eq!(sync.headers(), async_.headers());
    assert_eq!(async_.header("cookie"), Some("a=1,b=2"));
}

#[tokio::test]
async fn test_async_duplex_split_writes() {
    let (mut client, mut server) = tokio::io::duplex(8);

    let writer = tokio::spawn(async move {
        for piece in [&b"GET / HT"[..], b"TP/1.1\r\nHo", b"st: a\r\n", b"\r", b"\n"] {
            client.write_all(piece).await.unwrap();
            tokio::task::yield_now().await;
        }
        client
    });

    let request = RequestReader::new(ReaderConfig::new(64)).read_async(&mut server).await.unwrap();
    assert_eq!(request.header("host"), Some("a"));
    drop(writer.await.unwrap());
}

#[tokio::test]
async fn test_async_eof_in_body() {
    let data = b"PUT /x HTTP/1.1\r\nContent-Length: 4\r\n\r\nab";
    let err = request_from_async_reader(&mut &data[..]).await.unwrap_err();
    assert!(matches!(err, Error::IncompleteBody { expected: 4, received: 2 }), "{err:?}");
}
