//! Portable body stream.
//!
//! A `Body` is read exactly once. It is always present: "no body" is
//! represented by an already-closed empty stream, never by a missing value.

use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, BoxStream};
use futures_util::{StreamExt, TryStreamExt};

/// Boxed error produced by body streams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while reading a body.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    /// The body slot was already taken by an earlier reader.
    #[error("body has already been consumed")]
    AlreadyConsumed,

    /// The underlying stream yielded an error.
    #[error("body stream failed: {0}")]
    Stream(#[source] BoxError),

    /// The body is not valid UTF-8.
    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The body is not valid JSON for the requested type.
    #[error("body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

enum Kind {
    Empty,
    Full(Bytes),
    Stream(BoxStream<'static, Result<Bytes, BoxError>>),
}

/// A once-readable byte stream shared by portable requests and responses.
pub struct Body {
    kind: Kind,
}

impl Body {
    /// A well-formed, immediately closed stream.
    pub fn empty() -> Self {
        Self { kind: Kind::Empty }
    }

    /// Wrap a fallible byte stream. The stream is kept as-is even if it
    /// turns out to yield nothing.
    pub fn from_stream<S, E>(stream: S) -> Self
    where
        S: futures_util::Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self {
            kind: Kind::Stream(stream.map_err(Into::into).boxed()),
        }
    }

    /// True for the closed empty stream. A stream body reports `false`
    /// even when it will end up yielding zero bytes.
    pub fn is_empty(&self) -> bool {
        matches!(self.kind, Kind::Empty)
    }

    /// True when the body is backed by an arbitrary stream.
    pub fn is_stream(&self) -> bool {
        matches!(self.kind, Kind::Stream(_))
    }

    /// Exact length when known without reading.
    pub fn exact_len(&self) -> Option<u64> {
        match &self.kind {
            Kind::Empty => Some(0),
            Kind::Full(bytes) => Some(bytes.len() as u64),
            Kind::Stream(_) => None,
        }
    }

    /// Return the buffered bytes, or give the body back if it is a stream.
    pub fn try_into_bytes(self) -> Result<Bytes, Self> {
        match self.kind {
            Kind::Empty => Ok(Bytes::new()),
            Kind::Full(bytes) => Ok(bytes),
            kind @ Kind::Stream(_) => Err(Self { kind }),
        }
    }

    /// Read the whole body into memory.
    pub async fn collect(self) -> Result<Bytes, BodyError> {
        match self.kind {
            Kind::Empty => Ok(Bytes::new()),
            Kind::Full(bytes) => Ok(bytes),
            Kind::Stream(stream) => {
                let buf = stream
                    .try_fold(BytesMut::new(), |mut acc, chunk| async move {
                        acc.extend_from_slice(&chunk);
                        Ok(acc)
                    })
                    .await
                    .map_err(BodyError::Stream)?;
                Ok(buf.freeze())
            }
        }
    }

    /// Turn the body into a chunk stream.
    pub fn into_stream(self) -> BoxStream<'static, Result<Bytes, BoxError>> {
        match self.kind {
            Kind::Empty => stream::empty().boxed(),
            Kind::Full(bytes) => stream::once(async move { Ok(bytes) }).boxed(),
            Kind::Stream(stream) => stream,
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            Kind::Empty => f.write_str("Body::Empty"),
            Kind::Full(bytes) => write!(f, "Body::Full({} bytes)", bytes.len()),
            Kind::Stream(_) => f.write_str("Body::Stream"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        if bytes.is_empty() {
            Self::empty()
        } else {
            Self {
                kind: Kind::Full(bytes),
            }
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Bytes::from(text).into()
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Bytes::from_static(text.as_bytes()).into()
    }
}

impl From<&'static [u8]> for Body {
    fn from(bytes: &'static [u8]) -> Self {
        Bytes::from_static(bytes).into()
    }
}
