//! Core compression functionality

use bytes::Bytes;
use std::io::{Read, Write};

/// Content-Encoding token for the gzip codec
pub const ENCODING: &str = "gzip";

/// Gzip compressor for request bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct Compressor;

impl Compressor {
    /// Compress `data` with gzip framing at the default level
    pub fn gzip(data: &[u8]) -> Result<Bytes, std::io::Error> {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let buffer = Vec::with_capacity(data.len() / 2);
        let mut encoder = GzEncoder::new(buffer, Compression::default());
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;
        Ok(Bytes::from(compressed))
    }

    /// Decompress a gzip payload
    pub fn gunzip(data: &[u8]) -> Result<Bytes, std::io::Error> {
        use flate2::read::GzDecoder;

        let mut decoder = GzDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        Ok(Bytes::from(decompressed))
    }
}
