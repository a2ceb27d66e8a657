use crate::protocol::{CRLF, Version, find_crlf, is_token};
use crate::{Error, Result};

/// HTTP request line
///
/// ```plain
/// +--------+----+---------+----+----------+------+
/// | METHOD | SP | TARGET  | SP | HTTP/1.1 | CRLF |
/// +--------+----+---------+----+----------+------+
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestLine {
    method: String,
    target: String,
    version: Version,
}

impl RequestLine {
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request target, exactly as sent. It is not validated as a URI.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The version number without the `HTTP/` prefix, i.e. `"1.1"`.
    pub fn version(&self) -> &str {
        self.version.as_str()
    }

    pub fn http_version(&self) -> Version {
        self.version
    }
}

impl std::fmt::Display for RequestLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.method, self.target, self.version)
    }
}

/// Parses the request line at the start of `data`.
///
/// Returns `Ok(None)` if no CRLF has arrived yet; nothing is consumed in
/// that case. Otherwise returns the parsed line and the number of bytes it
/// occupied, terminator included.
pub fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>> {
    let Some(idx) = find_crlf(data) else {
        return Ok(None);
    };
    let line = &data[..idx];

    let mut parts = line.split(|&b| b == b' ');
    let (Some(method), Some(target), Some(version), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
        return Err(Error::MalformedRequestLine);
    };

    if method.is_empty() || target.is_empty() || !is_token(method) {
        return Err(Error::MalformedRequestLine);
    }
    let version = Version::try_from(version)?;

    let method = std::str::from_utf8(method).map_err(|_| Error::MalformedRequestLine)?;
    let target = std::str::from_utf8(target).map_err(|_| Error::MalformedRequestLine)?;

    let request_line = RequestLine {
        method: method.to_owned(),
        target: target.to_owned(),
        version,
    };
    Ok(Some((request_line, idx + CRLF.len())))
}

#[test]
fn test_parse_request_line() {
    let (line, n) = parse_request_line(b"GET /coffee HTTP/1.1\r\nHost: localhost\r\n").unwrap().unwrap();
    assert_eq!(line.method(), "GET");
    assert_eq!(line.target(), "/coffee");
    assert_eq!(line.version(), "1.1");
    assert_eq!(n, 22);
    assert_eq!(line.to_string(), "GET /coffee HTTP/1.1");

    let (line, n) = parse_request_line(b"POST /search?q=a%20b HTTP/1.1\r\n").unwrap().unwrap();
    assert_eq!(line.method(), "POST");
    assert_eq!(line.target(), "/search?q=a%20b");
    assert_eq!(n, 31);
}

#[test]
fn test_parse_request_line_pending() {
    for input in [&b""[..], b"GET", b"GET / HTTP/1.1", b"GET / HTTP/1.1\r", b"GET / HTTP/1.1\n"] {
        assert!(parse_request_line(input).unwrap().is_none(), "{input:?}");
    }
}

#[test]
fn test_parse_request_line_errors() {
    for input in [
        &b"/coffee HTTP/1.1\r\n"[..],
        b"GET /coffee\r\n",
        b"BAD REQUEST LINE HERE\r\n",
        b"GET  /coffee HTTP/1.1\r\n",
        b"GET /coffee HTTP/1.1 \r\n",
        b"\r\n",
        b"G(T / HTTP/1.1\r\n",
    ] {
        match parse_request_line(input) {
            Err(Error::MalformedRequestLine) => {}
            other => panic!("{input:?} => {other:?}"),
        }
    }

    for input in [&b"GET / HTTP/1.0\r\n"[..], b"GET / HTTP/2\r\n", b"GET / HTTPS/1.1\r\n", b"GET / 1.1\r\n"] {
        match parse_request_line(input) {
            Err(Error::UnsupportedVersion(_)) => {}
            other => panic!("{input:?} => {other:?}"),
        }
    }
}
