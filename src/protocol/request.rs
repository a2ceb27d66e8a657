use crate::protocol::{Headers, RequestLine, Version, parse_request_line};
use crate::{Error, Result};
use bytes::{Bytes, BytesMut};

/// Header consulted to frame the message body.
const CONTENT_LENGTH: &str = "content-length";

/// Progress of a [`Request`] through the parser.
///
/// `Done` and `Error` are terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ParserState {
    #[default]
    Init,
    Headers,
    Body,
    Done,
    Error,
}

/// An HTTP/1.1 request assembled from successive byte windows.
///
/// Feed bytes with [`Request::parse`]; it reports how many were consumed and
/// the caller keeps the rest for the next call. A request must only be
/// driven from one place at a time.
#[derive(Debug, Default)]
pub struct Request {
    request_line: Option<RequestLine>,
    headers: Headers,
    state: ParserState,
    body: BytesMut,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    pub fn is_error(&self) -> bool {
        self.state == ParserState::Error
    }

    pub fn request_line(&self) -> Option<&RequestLine> {
        self.request_line.as_ref()
    }

    pub fn method(&self) -> Option<&str> {
        self.request_line.as_ref().map(RequestLine::method)
    }

    pub fn target(&self) -> Option<&str> {
        self.request_line.as_ref().map(RequestLine::target)
    }

    /// Protocol version text, `"1.1"`.
    pub fn version(&self) -> Option<&str> {
        self.request_line.as_ref().map(RequestLine::version)
    }

    pub fn http_version(&self) -> Option<Version> {
        self.request_line.as_ref().map(RequestLine::http_version)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Declared body length; absent or non-numeric `Content-Length` counts as zero.
    pub fn content_length(&self) -> usize {
        self.headers.get_usize(CONTENT_LENGTH).unwrap_or(0)
    }

    /// Body bytes drained so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body.freeze()
    }

    /// Body bytes still expected before the request is complete.
    pub fn body_remaining(&self) -> usize {
        self.content_length().saturating_sub(self.body.len())
    }

    /// Consumes as much of `data` as the parser can use and returns the
    /// number of bytes taken.
    ///
    /// Stops early, without error, when the next element is incomplete; the
    /// caller must present the unconsumed tail again, followed by new bytes.
    /// Any grammar error moves the request to [`ParserState::Error`] and
    /// every later call fails with [`Error::InErrorState`].
    pub fn parse(&mut self, data: &[u8]) -> Result<usize> {
        let mut read = 0;

        loop {
            let current = &data[read..];
            match self.state {
                ParserState::Error => return Err(Error::InErrorState),
                ParserState::Done => break,
                ParserState::Init => match parse_request_line(current) {
                    Ok(Some((request_line, n))) => {
                        log::debug!("request line: {request_line}");
                        self.request_line = Some(request_line);
                        self.state = ParserState::Headers;
                        read += n;
                    }
                    Ok(None) => break,
                    Err(e) => return Err(self.fail(e)),
                },
                ParserState::Headers => match self.headers.parse(current) {
                    Ok((n, done)) => {
                        read += n;
                        if !done {
                            break;
                        }
                        log::debug!("header section complete, {} fields", self.headers.len());
                        self.state = ParserState::Body;
                    }
                    Err(e) => return Err(self.fail(e)),
                },
                ParserState::Body => {
                    let remaining = self.body_remaining();
                    if remaining == 0 {
                        log::debug!("request complete, body {} bytes", self.body.len());
                        self.state = ParserState::Done;
                        continue;
                    }
                    if current.is_empty() {
                        break;
                    }
                    let n = remaining.min(current.len());
                    self.body.extend_from_slice(&current[..n]);
                    read += n;
                }
            }
        }

        log::trace!("consumed {read} of {} bytes in state {:?}", data.len(), self.state);
        Ok(read)
    }

    fn fail(&mut self, err: Error) -> Error {
        log::warn!("request parse failed in state {:?}: {err}", self.state);
        self.state = ParserState::Error;
        err
    }

    /// The error to report when the stream ends before this request is done.
    pub(crate) fn eof_error(&self) -> Error {
        match self.state {
            ParserState::Body => Error::IncompleteBody {
                expected: self.content_length(),
                received: self.body.len(),
            },
            ParserState::Error => Error::InErrorState,
            _ => Error::ConnectionClosed,
        }
    }
}

#[test]
fn test_request_parse_whole() {
    let mut request = Request::new();
    let data = b"GET /path HTTP/1.1\r\nHost: a\r\n\r\n";
    assert_eq!(request.parse(data).unwrap(), data.len());
    assert!(request.is_done());
    assert_eq!(request.method(), Some("GET"));
    assert_eq!(request.target(), Some("/path"));
    assert_eq!(request.version(), Some("1.1"));
    assert_eq!(request.http_version(), Some(Version::Http11));
    assert_eq!(request.header("Host"), Some("a"));
    assert!(request.body().is_empty());
}

#[test]
fn test_request_parse_incremental_commits_whole_lines() {
    let mut request = Request::new();
    assert_eq!(request.parse(b"GET / HT").unwrap(), 0);
    assert_eq!(request.state(), ParserState::Init);

    assert_eq!(request.parse(b"GET / HTTP/1.1\r\nHo").unwrap(), 16);
    assert_eq!(request.state(), ParserState::Headers);

    assert_eq!(request.parse(b"Host: a\r\nAcc").unwrap(), 9);
    assert_eq!(request.header("host"), Some("a"));

    assert_eq!(request.parse(b"Accept: */*\r\n\r").unwrap(), 13);
    assert_eq!(request.state(), ParserState::Headers);

    assert_eq!(request.parse(b"\r\n").unwrap(), 2);
    assert!(request.is_done());
}

#[test]
fn test_request_parse_body() {
    let mut request = Request::new();
    let head = b"POST /submit HTTP/1.1\r\nContent-Length: 11\r\n\r\n";
    assert_eq!(request.parse(head).unwrap(), head.len());
    assert_eq!(request.state(), ParserState::Body);
    assert_eq!(request.body_remaining(), 11);

    assert_eq!(request.parse(b"hello ").unwrap(), 6);
    assert_eq!(request.state(), ParserState::Body);

    // bytes past the declared length are left to the caller
    assert_eq!(request.parse(b"world, extra").unwrap(), 5);
    assert!(request.is_done());
    assert_eq!(request.body(), b"hello world");
    assert_eq!(request.into_body(), Bytes::from_static(b"hello world"));
}

#[test]
fn test_request_parse_terminal_states() {
    let mut request = Request::new();
    request.parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();
    assert!(request.is_done());
    assert_eq!(request.parse(b"GET /again HTTP/1.1\r\n\r\n").unwrap(), 0);
    assert_eq!(request.target(), Some("/"));

    let mut request = Request::new();
    assert!(matches!(request.parse(b"GET / HTTP/1.0\r\n\r\n"), Err(Error::UnsupportedVersion(_))));
    assert!(request.is_error());
    assert!(matches!(request.parse(b"GET / HTTP/1.1\r\n\r\n"), Err(Error::InErrorState)));
    assert!(matches!(request.parse(b""), Err(Error::InErrorState)));
    assert!(request.request_line().is_none());
}
