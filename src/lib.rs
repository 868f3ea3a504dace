// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Roboslice
//!
//! Topic splitting and channel reduction for indexed MCAP robotics logs.
//!
//! Two transforms over a fully indexed source file:
//! - **Split** fans the message stream out into one output file per
//!   topic, lazily creating writers on first sight of a matching topic
//!   ([`split`] module).
//! - **Reduce** copies the full schema/channel namespace and keeps at
//!   most one message per channel, the first in read order ([`reduce`]
//!   module).
//!
//! Both re-derive a minimal self-consistent identifier namespace per
//! output through a per-session [`RemapTable`], and re-encode output
//! data as compressed chunks ([`io::compress`]).
//!
//! ## Example: splitting by topic
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use roboslice::{split_by_topic, TopicFilter};
//!
//! let filter = TopicFilter::from_topics(["/camera/image_raw"]);
//! let stats = split_by_topic("run.mcap", &filter)?;
//! println!("Wrote {} messages", stats.written_count);
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: reducing to one message per channel
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use roboslice::reduce_channels;
//!
//! let stats = reduce_channels("run.mcap")?;
//! println!("{} channels, {} messages kept", stats.channel_count, stats.written_count);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

pub use core::{Result, SliceError};

// Container I/O (indexed reader, chunked writer, block compression)
pub mod io;

pub use io::{BlockCompression, ChannelInfo, IndexedMcapReader, McapWriter, RawMessage,
    SchemaInfo, WriterOptions};

// Identifier remapping between source and output namespaces
pub mod remap;

pub use remap::RemapTable;

// Transforms
pub mod reduce;
pub mod split;

pub use reduce::{reduce_channels, ChannelReducer, ReduceOptions, ReduceStats};
pub use split::{split_by_topic, SplitOptions, SplitStats, TopicFilter, TopicSplitter};
