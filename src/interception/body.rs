// src/interception/body.rs
//! Request bodies with at-most-once stream semantics
//!
//! A streamed body sits in a shared slot. Cloning a [`Body`] clones the handle,
//! not the data, so the original call and its reconstruction see the same
//! stream and only the first dispatch can read it.

use crate::utils::errors::{BoxError, RedirectError, Result};
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, TryStreamExt};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use parking_lot::Mutex;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

/// Body type handed to the HTTP client and returned in responses
pub type HttpBody = UnsyncBoxBody<Bytes, BoxError>;

pub type BodyStream = BoxStream<'static, std::result::Result<Bytes, BoxError>>;

/// Opaque request payload
#[derive(Clone, Default)]
pub enum Body {
    #[default]
    Empty,

    /// Fully buffered payload; cheap to clone and replayable
    Full(Bytes),

    /// Streamed payload, readable once
    Stream(OneShotStream),
}

/// Shared slot holding a stream until the first dispatch takes it
#[derive(Clone)]
pub struct OneShotStream {
    slot: Arc<Mutex<Option<BodyStream>>>,
}

impl OneShotStream {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, BoxError>> + Send + 'static,
    {
        Self {
            slot: Arc::new(Mutex::new(Some(Box::pin(stream)))),
        }
    }

    /// Take the stream out of the slot. Returns `None` once it has been taken.
    pub fn take(&self) -> Option<BodyStream> {
        self.slot.lock().take()
    }

    pub fn is_consumed(&self) -> bool {
        self.slot.lock().is_none()
    }
}

impl Body {
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, BoxError>> + Send + 'static,
    {
        Body::Stream(OneShotStream::new(stream))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }

    /// Convert into a client body. For streams this is the single read.
    pub fn into_http(self) -> Result<HttpBody> {
        match self {
            Body::Empty => Ok(Empty::<Bytes>::new()
                .map_err(|never: Infallible| -> BoxError { match never {} })
                .boxed_unsync()),
            Body::Full(bytes) => Ok(Full::new(bytes)
                .map_err(|never: Infallible| -> BoxError { match never {} })
                .boxed_unsync()),
            Body::Stream(stream) => {
                let stream = stream.take().ok_or(RedirectError::BodyConsumed)?;
                Ok(StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync())
            }
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Full(bytes)
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Full(Bytes::from(s))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::Full(Bytes::from_static(s.as_bytes()))
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Body::Full(Bytes::from(v))
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Full(bytes) => write!(f, "Body::Full({} bytes)", bytes.len()),
            Body::Stream(stream) => {
                write!(f, "Body::Stream(consumed: {})", stream.is_consumed())
            }
        }
    }
}
