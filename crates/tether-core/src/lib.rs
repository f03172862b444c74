//! # Tether Core
//!
//! Core types, traits, and error handling for the Tether request pipeline.
//!
//! This crate provides the foundational abstractions every middleware builds on:
//! - The [`Body`] type carried by requests and responses
//! - The [`Middleware`] trait and its [`Next`] continuation
//! - [`Pipeline`] assembly
//! - Per-request option overrides
//! - Error types

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod body;
pub mod error;
pub mod middleware;
pub mod options;
pub mod pipeline;

pub use body::Body;
pub use error::{Error, Result};
pub use middleware::{HandlerFn, Middleware, Next};
pub use options::{RequestOption, RequestOptionKey, RequestOptions, RequestOptionsExt};
pub use pipeline::{Pipeline, PipelineBuilder};

// Re-export commonly used HTTP types
pub use bytes::Bytes;
pub use http::{Method, Request, Response, StatusCode};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::body::Body;
    pub use crate::error::{Error, Result};
    pub use crate::middleware::{HandlerFn, Middleware, Next};
    pub use crate::options::{RequestOption, RequestOptionKey, RequestOptions, RequestOptionsExt};
    pub use crate::pipeline::{Pipeline, PipelineBuilder};
}
