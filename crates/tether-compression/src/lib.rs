//! Request compression middleware for Tether
//!
//! Compresses outgoing request bodies with gzip and falls back to the
//! uncompressed body when the server rejects the encoding.
//!
//! Features:
//! - Single fixed codec (`Content-Encoding: gzip`)
//! - Per-request opt-in/opt-out through [`CompressionOptions`] attached to the request
//! - One uncompressed retry on `415 Unsupported Media Type`
//! - `Content-Length` kept in sync with whichever body is sent

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod compressor;
pub mod config;
pub mod middleware;

pub use compressor::{Compressor, ENCODING};
pub use config::{CompressionOptions, COMPRESSION_OPTION_KEY};
pub use middleware::{CompressionMiddleware, PipelineBuilderExt};
