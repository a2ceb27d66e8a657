#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed request line")]
    MalformedRequestLine,

    #[error("unsupported http version: {0}")]
    UnsupportedVersion(String),

    #[error("malformed field-line")]
    MalformedFieldLine,

    #[error("malformed field name: {0:?}")]
    MalformedFieldName(String),

    #[error("request in error state")]
    InErrorState,

    #[error("incomplete body: got {received} bytes, expected {expected}")]
    IncompleteBody { expected: usize, received: usize },

    #[error("connection closed before the request was complete")]
    ConnectionClosed,

    #[error("request head exceeds the {0} byte read buffer")]
    BufferFull(usize),

    #[error("std::io::Error {0}")]
    Io(#[from] std::io::Error),

    #[error("request not complete after {0:?}")]
    Timeout(std::time::Duration),
}

impl Error {
    /// Returns `true` for grammar violations detected by the parser itself,
    /// as opposed to conditions raised by the stream driver.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedRequestLine
                | Error::UnsupportedVersion(_)
                | Error::MalformedFieldLine
                | Error::MalformedFieldName(_)
                | Error::InErrorState
        )
    }
}

impl From<Error> for std::io::Error {
    fn from(e: Error) -> Self {
        use std::io::ErrorKind;
        match e {
            Error::Io(e) => e,
            Error::ConnectionClosed | Error::IncompleteBody { .. } => std::io::Error::new(ErrorKind::UnexpectedEof, e),
            Error::BufferFull(_) => std::io::Error::new(ErrorKind::OutOfMemory, e),
            Error::Timeout(_) => std::io::Error::new(ErrorKind::TimedOut, e),
            _ => std::io::Error::new(ErrorKind::InvalidData, e),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[test]
fn test_error_into_io_error() {
    let err: std::io::Error = Error::ConnectionClosed.into();
    assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);

    let err: std::io::Error = Error::MalformedFieldLine.into();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);

    let inner = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
    let err: std::io::Error = Error::from(inner).into();
    assert_eq!(err.kind(), std::io::ErrorKind::ConnectionReset);

    assert!(Error::InErrorState.is_parse_error());
    assert!(!Error::BufferFull(1024).is_parse_error());

    let err: std::io::Error = Error::Timeout(std::time::Duration::from_secs(1)).into();
    assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
}
