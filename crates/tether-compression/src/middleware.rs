//! Compression middleware implementation

use crate::compressor::{Compressor, ENCODING};
use crate::config::{CompressionOptions, COMPRESSION_OPTION_KEY};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, TRANSFER_ENCODING};
use http::request::Parts;
use http::{HeaderValue, Request, Response, StatusCode};
use std::sync::Arc;
use tether_core::middleware::{Middleware, Next};
use tether_core::{Body, PipelineBuilder, RequestOptionsExt, Result};
use tracing::{debug, trace};

/// Compresses outgoing request bodies with gzip
///
/// When the server answers the compressed request with
/// `415 Unsupported Media Type`, the request is sent once more through the
/// same downstream stages with the original, uncompressed body.
#[derive(Debug, Clone, Default)]
pub struct CompressionMiddleware {
    options: CompressionOptions,
}

impl CompressionMiddleware {
    /// Create a compression middleware with compression enabled
    pub fn new() -> Self {
        Self::with_options(CompressionOptions::default())
    }

    /// Create a compression middleware with the given defaults
    pub fn with_options(options: CompressionOptions) -> Self {
        Self { options }
    }

    /// Default options applied when a request carries no override
    pub fn options(&self) -> CompressionOptions {
        self.options
    }

    /// Per-request override if present and of the right type, else the defaults
    fn effective_options<B>(&self, req: &Request<B>) -> CompressionOptions {
        req.request_options()
            .and_then(|options| options.get_as::<CompressionOptions>(COMPRESSION_OPTION_KEY))
            .copied()
            .unwrap_or(self.options)
    }
}

#[async_trait]
impl Middleware for CompressionMiddleware {
    async fn call(&self, req: Request<Body>, next: Next) -> Result<Response<Body>> {
        self.forward(req, next, Compressor::gzip).await
    }
}

impl CompressionMiddleware {
    async fn forward(
        &self,
        req: Request<Body>,
        next: Next,
        encode: fn(&[u8]) -> std::io::Result<Bytes>,
    ) -> Result<Response<Body>> {
        if !self.effective_options(&req).should_compress() {
            trace!(reason = "disabled", "Skipping request compression");
            return next.run(req).await;
        }
        if req.body().is_absent() {
            trace!(reason = "no body", "Skipping request compression");
            return next.run(req).await;
        }

        let (parts, body) = req.into_parts();
        let original = body.collect_bytes().await?;
        let compressed = encode(&original)?;

        debug!(
            original_size = original.len(),
            compressed_size = compressed.len(),
            stage = next.index(),
            "Request body compressed"
        );

        let response = next
            .clone()
            .run(RequestState::Gzip(compressed).materialize(&parts))
            .await?;

        if response.status() != StatusCode::UNSUPPORTED_MEDIA_TYPE {
            return Ok(response);
        }

        debug!(
            status = response.status().as_u16(),
            size = original.len(),
            "Compressed body rejected, retrying uncompressed"
        );
        let retry = RequestState::Identity(original).materialize(&parts);
        next.run(retry).await
    }
}

/// Body representation sent on one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
enum RequestState {
    /// Original bytes, no content encoding
    Identity(Bytes),
    /// Gzip-compressed bytes
    Gzip(Bytes),
}

impl RequestState {
    fn encoding(&self) -> Option<&'static str> {
        match self {
            Self::Identity(_) => None,
            Self::Gzip(_) => Some(ENCODING),
        }
    }

    fn into_bytes(self) -> Bytes {
        match self {
            Self::Identity(bytes) | Self::Gzip(bytes) => bytes,
        }
    }

    /// Build the request forwarded for this attempt
    ///
    /// `Content-Length` always matches the body and `Content-Encoding` is set
    /// only for the compressed representation.
    fn materialize(self, parts: &Parts) -> Request<Body> {
        let encoding = self.encoding();
        let bytes = self.into_bytes();

        let mut headers = parts.headers.clone();
        headers.remove(TRANSFER_ENCODING);
        match encoding {
            Some(encoding) => {
                headers.insert(CONTENT_ENCODING, HeaderValue::from_static(encoding));
            }
            None => {
                headers.remove(CONTENT_ENCODING);
            }
        }
        headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));

        let mut req = Request::new(Body::from(bytes));
        *req.method_mut() = parts.method.clone();
        *req.uri_mut() = parts.uri.clone();
        *req.version_mut() = parts.version;
        *req.headers_mut() = headers;
        *req.extensions_mut() = parts.extensions.clone();
        req
    }
}

/// Adds compression helpers to [`PipelineBuilder`]
pub trait PipelineBuilderExt {
    /// Add compression middleware with default options
    #[must_use]
    fn with_compression(self) -> Self;

    /// Add compression middleware with the given default options
    #[must_use]
    fn with_compression_options(self, options: CompressionOptions) -> Self;
}

impl PipelineBuilderExt for PipelineBuilder {
    fn with_compression(self) -> Self {
        self.with_middleware(Arc::new(CompressionMiddleware::new()))
    }

    fn with_compression_options(self, options: CompressionOptions) -> Self {
        self.with_middleware(Arc::new(CompressionMiddleware::with_options(options)))
    }
}
