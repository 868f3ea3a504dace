// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MCAP container I/O.
//!
//! The transforms in this crate sit between an indexed reader and one or
//! more writers:
//! - [`reader`] wraps the mcap crate's summary and message stream behind
//!   owned schema/channel tables and a lazy message iterator.
//! - [`writer`] is a chunked MCAP writer that routes every chunk through
//!   a pluggable block compressor and finalizes files with a summary
//!   section, so outputs are themselves indexed.
//! - [`compress`] selects the block compression algorithm.

pub mod compress;
pub mod reader;
pub mod writer;

pub use compress::BlockCompression;
pub use reader::{ChannelInfo, IndexedMcapReader, RawMessage, SchemaInfo};
pub use writer::{McapWriter, WriterOptions};
