#![doc = include_str!("../README.md")]

pub(crate) mod buffer;
pub(crate) mod driver;
pub(crate) mod error;
pub mod protocol;

#[cfg(feature = "server")]
pub mod server;

pub use crate::{
    buffer::{DEFAULT_BUFFER_SIZE, ReadBuffer},
    driver::{ReaderConfig, RequestReader, request_from_reader},
    error::{Error, Result},
    protocol::{Headers, ParserState, Request, RequestLine, Version},
};

#[cfg(feature = "tokio")]
pub use crate::driver::request_from_async_reader;
