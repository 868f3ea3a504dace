// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Block compression for chunk writing.
//!
//! Wraps the compression primitives behind the writer's chunk contract:
//! a raw block of serialized records goes in, an algorithm tag and the
//! compressed block come out. The tag is written inline into each chunk
//! record, so readers never need out-of-band knowledge.
//!
//! Decompression is not handled here; reading goes through the mcap
//! crate, which carries its own decompressors.

use crate::core::{Result, SliceError};

/// Default zstd compression level: fast with a reasonable ratio.
const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// Block compression algorithm for output chunks.
///
/// One run uses one fixed algorithm for all of its chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCompression {
    /// Zstandard at the given level
    Zstd(i32),
    /// LZ4 frame encoding
    Lz4,
    /// No compression
    None,
}

impl BlockCompression {
    /// Zstd at the default level.
    pub fn zstd() -> Self {
        BlockCompression::Zstd(DEFAULT_ZSTD_LEVEL)
    }

    /// The MCAP compression tag advertised in chunk records.
    pub fn tag(&self) -> &'static str {
        match self {
            BlockCompression::Zstd(_) => "zstd",
            BlockCompression::Lz4 => "lz4",
            BlockCompression::None => "",
        }
    }

    /// Compress one block of chunk data.
    ///
    /// Returns the algorithm tag and the compressed bytes. Deterministic
    /// for the same input within one run. A fault here is fatal to the
    /// output file being written.
    pub fn compress(&self, raw: &[u8]) -> Result<(&'static str, Vec<u8>)> {
        let compressed = match self {
            BlockCompression::Zstd(level) => zstd::bulk::compress(raw, *level)
                .map_err(|e| SliceError::compression("zstd", e.to_string()))?,
            BlockCompression::Lz4 => {
                use std::io::Write as _;
                let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
                encoder
                    .write_all(raw)
                    .map_err(|e| SliceError::compression("lz4", e.to_string()))?;
                encoder
                    .finish()
                    .map_err(|e| SliceError::compression("lz4", e.to_string()))?
            }
            BlockCompression::None => raw.to_vec(),
        };
        Ok((self.tag(), compressed))
    }
}

impl Default for BlockCompression {
    fn default() -> Self {
        Self::zstd()
    }
}
