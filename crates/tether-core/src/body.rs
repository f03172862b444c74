//! Request/response body type
//!
//! A [`Body`] is either absent (the request carries no payload at all),
//! buffered in memory, or an arbitrary boxed [`http_body::Body`] whose frames
//! may fail. Middleware that need the whole payload use
//! [`Body::collect_bytes`].

use crate::{Error, Result};
use bytes::Bytes;
use http_body::Body as _;
use http_body::{Frame, SizeHint};
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use pin_project::pin_project;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Body used by every stage of the pipeline
#[pin_project]
pub struct Body {
    #[pin]
    kind: Kind,
}

#[pin_project(project = KindProj)]
enum Kind {
    Absent,
    Full(#[pin] Full<Bytes>),
    Boxed(#[pin] BoxBody<Bytes, Error>),
}

impl Body {
    /// A request without any body
    pub fn absent() -> Self {
        Self { kind: Kind::Absent }
    }

    /// Wrap any body producing [`Bytes`] frames
    pub fn new<B>(body: B) -> Self
    where
        B: http_body::Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<Error>,
    {
        Self {
            kind: Kind::Boxed(BoxBody::new(body.map_err(Into::into))),
        }
    }

    /// Whether the body is absent, as opposed to present but possibly empty
    pub fn is_absent(&self) -> bool {
        matches!(self.kind, Kind::Absent)
    }

    /// Read the whole body into memory
    ///
    /// An absent body yields empty bytes. Errors from the underlying body are
    /// returned as produced.
    pub async fn collect_bytes(self) -> Result<Bytes> {
        match self.kind {
            Kind::Absent => Ok(Bytes::new()),
            Kind::Full(full) => match full.collect().await {
                Ok(collected) => Ok(collected.to_bytes()),
                Err(never) => match never {},
            },
            Kind::Boxed(body) => Ok(body.collect().await?.to_bytes()),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::absent()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self {
            kind: Kind::Full(Full::new(bytes)),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from(Bytes::from(bytes))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Self::from(Bytes::from(s))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Self::from(Bytes::from_static(s.as_bytes()))
    }
}

impl http_body::Body for Body {
    type Data = Bytes;
    type Error = Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.project().kind.project() {
            KindProj::Absent => Poll::Ready(None),
            KindProj::Full(full) => full.poll_frame(cx).map_err(|never| match never {}),
            KindProj::Boxed(body) => body.poll_frame(cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        match &self.kind {
            Kind::Absent => true,
            Kind::Full(full) => full.is_end_stream(),
            Kind::Boxed(body) => body.is_end_stream(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match &self.kind {
            Kind::Absent => SizeHint::with_exact(0),
            Kind::Full(full) => full.size_hint(),
            Kind::Boxed(body) => body.size_hint(),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            Kind::Absent => "absent",
            Kind::Full(_) => "full",
            Kind::Boxed(_) => "boxed",
        };
        f.debug_struct("Body").field("kind", &kind).finish()
    }
}
