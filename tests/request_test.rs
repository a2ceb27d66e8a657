use httpfromtcp::{Error, ParserState, Request};

/// Feeds `data` to a fresh request in pieces of the given sizes, keeping
/// unconsumed bytes around exactly like a stream driver would.
fn parse_in_pieces(data: &[u8], sizes: impl IntoIterator<Item = usize>) -> httpfromtcp::Result<Request> {
    let mut request = Request::new();
    let mut pending = Vec::new();
    let mut offset = 0;
    let mut sizes = sizes.into_iter();

    while !request.is_done() && offset < data.len() {
        let size = sizes.next().unwrap_or(data.len()).max(1);
        let end = offset.saturating_add(size).min(data.len());
        pending.extend_from_slice(&data[offset..end]);
        offset = end;

        let consumed = request.parse(&pending)?;
        pending.drain(..consumed);
    }
    Ok(request)
}

#[test]
fn test_parse_simple_get_request() {
    let mut request = Request::new();
    let raw = b"GET /path HTTP/1.1\r\nHost: a\r\n\r\n";
    let consumed = request.parse(raw).unwrap();

    assert_eq!(consumed, raw.len());
    assert_eq!(request.state(), ParserState::Done);
    let line = request.request_line().unwrap();
    assert_eq!(line.method(), "GET");
    assert_eq!(line.target(), "/path");
    assert_eq!(line.version(), "1.1");
    assert_eq!(request.header("host"), Some("a"));
    assert!(request.body().is_empty());
}

#[test]
fn test_duplicate_headers_are_joined() {
    let request = parse_in_pieces(b"GET /path HTTP/1.1\r\nHost: a\r\nHost: b\r\n\r\n", [usize::MAX]).unwrap();
    assert_eq!(request.header("Host"), Some("a,b"));
    assert_eq!(request.headers().len(), 1);
}

#[test]
fn test_malformed_request_line() {
    let mut request = Request::new();
    let err = request.parse(b"BAD REQUEST LINE HERE\r\n\r\n").unwrap_err();
    assert!(matches!(err, Error::MalformedRequestLine), "{err:?}");
    assert_eq!(request.state(), ParserState::Error);
}

#[test]
fn test_unsupported_version() {
    let mut request = Request::new();
    let err = request.parse(b"GET / HTTP/1.0\r\n\r\n").unwrap_err();
    assert!(matches!(err, Error::UnsupportedVersion(ref v) if v == "HTTP/1.0"), "{err:?}");
}

#[test]
fn test_space_before_colon() {
    let mut request = Request::new();
    let err = request.parse(b"GET / HTTP/1.1\r\nBad Header : v\r\n\r\n").unwrap_err();
    assert!(matches!(err, Error::MalformedFieldName(_)), "{err:?}");
    assert_eq!(request.state(), ParserState::Error);
}

#[test]
fn test_field_line_without_colon() {
    let mut request = Request::new();
    let err = request.parse(b"GET / HTTP/1.1\r\nHost localhost\r\n\r\n").unwrap_err();
    assert!(matches!(err, Error::MalformedFieldLine), "{err:?}");
}

#[test]
fn test_error_state_is_sticky() {
    let mut request = Request::new();
    request.parse(b"GET / HTTP/1.1\r\nHost: a\r\n").unwrap();
    assert!(request.parse(b"Host: a\r\nX Y: z\r\n").is_err());

    for input in [&b""[..], b"\r\n", b"Accept: */*\r\n\r\n"] {
        let err = request.parse(input).unwrap_err();
        assert!(matches!(err, Error::InErrorState), "{err:?}");
    }
    assert_eq!(request.method(), Some("GET"));
    assert_eq!(request.header("host"), Some("a,a"));
    assert!(!request.headers().contains("accept"));
}

#[test]
fn test_one_byte_at_a_time() {
    let raw = b"POST /submit?id=7 HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/8.5.0\r\nContent-Length: 5\r\n\r\nhello";
    let whole = parse_in_pieces(raw, [usize::MAX]).unwrap();
    let bytewise = parse_in_pieces(raw, std::iter::repeat(1)).unwrap();

    assert!(bytewise.is_done());
    assert_eq!(whole.request_line(), bytewise.request_line());
    assert_eq!(whole.headers(), bytewise.headers());
    assert_eq!(bytewise.body(), b"hello");
}

#[test]
fn test_chunk_boundary_invariance() {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    let inputs: [&[u8]; 4] = [
        b"GET / HTTP/1.1\r\n\r\n",
        b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/8.5.0\r\nAccept: */*\r\n\r\n",
        b"PUT /items/42 HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 17\r\nX-Tag: a\r\nx-tag: b\r\n\r\n{\"name\":\"kettle\"}",
        b"DELETE /a HTTP/1.1\r\nContent-Length: not-a-number\r\n\r\n",
    ];

    let mut rng = StdRng::seed_from_u64(0x5eed);
    for raw in inputs {
        let whole = parse_in_pieces(raw, [usize::MAX]).unwrap();
        assert!(whole.is_done());

        for _ in 0..64 {
            let max = rng.random_range(1..=raw.len());
            let sizes: Vec<usize> = (0..raw.len()).map(|_| rng.random_range(1..=max)).collect();
            let split = parse_in_pieces(raw, sizes.clone()).unwrap();

            assert!(split.is_done(), "sizes {sizes:?}");
            assert_eq!(whole.request_line(), split.request_line());
            assert_eq!(whole.headers(), split.headers());
            assert_eq!(whole.body(), split.body());
        }
    }
}

#[test]
fn test_errors_are_chunk_boundary_invariant() {
    let raw = b"GET / HTTP/1.1\r\nHost: a\r\nBad Header : v\r\n\r\n";
    for size in 1..raw.len() {
        let err = parse_in_pieces(raw, std::iter::repeat(size)).unwrap_err();
        assert!(matches!(err, Error::MalformedFieldName(_)), "size {size}: {err:?}");
    }
}

#[test]
fn test_non_numeric_content_length_means_no_body() {
    let mut request = Request::new();
    let raw = b"POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\ntrailing";
    let consumed = request.parse(raw).unwrap();
    assert!(request.is_done());
    assert_eq!(consumed, raw.len() - b"trailing".len());
    assert_eq!(request.content_length(), 0);
}

#[test]
fn test_empty_field_name() {
    let mut request = Request::new();
    let err = request.parse(b"GET / HTTP/1.1\r\n: v\r\n\r\n").unwrap_err();
    assert!(matches!(err, Error::MalformedFieldName(ref name) if name.is_empty()), "{err:?}");
    assert_eq!(request.state(), ParserState::Error);
}

#[test]
fn test_non_utf8_field_value_is_rejected() {
    let mut request = Request::new();
    let err = request.parse(b"GET / HTTP/1.1\r\nX-L: caf\xe9\r\n\r\n").unwrap_err();
    assert!(matches!(err, Error::MalformedFieldLine), "{err:?}");
    assert_eq!(request.state(), ParserState::Error);
    assert!(!request.headers().contains("x-l"));

    let mut request = Request::new();
    request.parse("GET / HTTP/1.1\r\nX-L: caf\u{e9}\r\n\r\n".as_bytes()).unwrap();
    assert_eq!(request.header("x-l"), Some("caf\u{e9}"));
}
