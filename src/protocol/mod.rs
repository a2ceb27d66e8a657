mod headers;
mod request;
mod request_line;

pub use self::{
    headers::{Headers, is_token, parse_field_line},
    request::{ParserState, Request},
    request_line::{RequestLine, parse_request_line},
};

#[cfg(feature = "tokio")]
use tokio::io::AsyncRead;

/// Line terminator shared by the request-line and field-lines.
pub const CRLF: &[u8] = b"\r\n";

/// Position of the first CRLF in `data`, if any.
#[inline]
pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    memchr::memmem::find(data, CRLF)
}

/// HTTP protocol version. Only HTTP/1.1 is accepted.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Version {
    #[default]
    Http11,
}

impl Version {
    /// The bare version number, e.g. `"1.1"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http11 => "1.1",
        }
    }
}

impl TryFrom<&[u8]> for Version {
    type Error = crate::Error;

    /// Parses an `HTTP/<version>` token.
    fn try_from(value: &[u8]) -> crate::Result<Self> {
        let unsupported = || crate::Error::UnsupportedVersion(String::from_utf8_lossy(value).into_owned());

        let mut parts = value.split(|&b| b == b'/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(b"HTTP"), Some(b"1.1"), None) => Ok(Version::Http11),
            _ => Err(unsupported()),
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP/{}", self.as_str())
    }
}

/// Types that can be read off a blocking byte stream.
pub trait StreamOperation {
    fn retrieve_from_stream<R>(r: &mut R) -> crate::Result<Self>
    where
        R: std::io::Read,
        Self: Sized;
}

/// Types that can be read off an asynchronous byte stream.
#[cfg(feature = "tokio")]
#[async_trait::async_trait]
pub trait AsyncStreamOperation {
    async fn retrieve_from_async_stream<R>(r: &mut R) -> crate::Result<Self>
    where
        R: AsyncRead + Unpin + Send + ?Sized,
        Self: Sized;
}

#[test]
fn test_version() {
    assert_eq!(Version::try_from(&b"HTTP/1.1"[..]).unwrap(), Version::Http11);
    assert_eq!(Version::Http11.as_str(), "1.1");
    assert_eq!(Version::Http11.to_string(), "HTTP/1.1");

    for bad in [&b"HTTP/1.0"[..], b"HTTP/2", b"HTTPS/1.1", b"HTTP/1.1/x", b"1.1", b"http/1.1", b""] {
        match Version::try_from(bad) {
            Err(crate::Error::UnsupportedVersion(_)) => {}
            other => panic!("{bad:?} => {other:?}"),
        }
    }
}

#[test]
fn test_find_crlf() {
    assert_eq!(find_crlf(b"GET / HTTP/1.1\r\n"), Some(14));
    assert_eq!(find_crlf(b"\r\n"), Some(0));
    assert_eq!(find_crlf(b"GET / HTTP/1.1\r"), None);
    assert_eq!(find_crlf(b"a\nb\r\n"), Some(3));
}
