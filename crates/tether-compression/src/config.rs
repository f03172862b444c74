//! Configuration for compression middleware

use serde::{Deserialize, Serialize};
use std::any::Any;
use tether_core::{RequestOption, RequestOptionKey};

/// Key under which [`CompressionOptions`] are stored on a request
pub const COMPRESSION_OPTION_KEY: RequestOptionKey = RequestOptionKey::new("CompressionHandler");

/// Compression configuration
///
/// Used both as the middleware default and, attached to a single request via
/// [`tether_core::RequestOptionsExt`], as a per-request override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionOptions {
    enable_compression: bool,
}

impl CompressionOptions {
    /// Create options with compression switched on or off
    pub const fn new(enable_compression: bool) -> Self {
        Self { enable_compression }
    }

    /// Whether request bodies should be compressed
    pub const fn should_compress(&self) -> bool {
        self.enable_compression
    }

    /// Key these options are stored under
    pub const fn option_key() -> RequestOptionKey {
        COMPRESSION_OPTION_KEY
    }
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RequestOption for CompressionOptions {
    fn key(&self) -> RequestOptionKey {
        COMPRESSION_OPTION_KEY
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
