// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Indexed MCAP reader using the mcap crate.
//!
//! The reader memory-maps the file, requires a summary section (the
//! trailing index), and exposes owned schema/channel tables plus a lazy
//! message iterator. Files without a summary are rejected: the
//! transforms in this crate are defined over fully indexed sources.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use crate::core::{Result, SliceError};

/// A schema definition read from the source file.
///
/// Identifiers are source-scoped; re-registering a schema in an output
/// file assigns it a fresh identifier there.
#[derive(Debug, Clone)]
pub struct SchemaInfo {
    /// Source-scoped schema ID (never 0)
    pub id: u16,
    /// Schema name (e.g., "sensor_msgs/msg/Image")
    pub name: String,
    /// Schema encoding (e.g., "ros2msg", "protobuf")
    pub encoding: String,
    /// Raw schema definition bytes
    pub data: Vec<u8>,
}

/// A channel read from the source file.
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    /// Source-scoped channel ID
    pub id: u16,
    /// Source-scoped schema ID (0 = schema-less channel)
    pub schema_id: u16,
    /// Topic name (e.g., "/joint_states")
    pub topic: String,
    /// Message encoding (e.g., "cdr", "json")
    pub message_encoding: String,
    /// Channel metadata
    pub metadata: BTreeMap<String, String>,
}

/// A message read from the source file, undecoded.
///
/// The payload is opaque to the transforms; only the channel ID is ever
/// rewritten on the way to an output.
#[derive(Debug, Clone)]
pub struct RawMessage {
    /// Source-scoped channel ID
    pub channel_id: u16,
    /// Sequence number within the channel
    pub sequence: u32,
    /// Log timestamp (nanoseconds)
    pub log_time: u64,
    /// Publish timestamp (nanoseconds)
    pub publish_time: u64,
    /// Raw message payload
    pub data: Vec<u8>,
}

/// Indexed MCAP reader.
///
/// Opening reads the summary section eagerly into owned schema and
/// channel tables; message iteration is lazy and yields messages in the
/// order the file stores them, which the index guarantees is
/// non-decreasing in log time for indexed recordings.
pub struct IndexedMcapReader {
    /// File path
    path: String,
    /// Memory-mapped file
    mmap: memmap2::Mmap,
    /// Schema table indexed by source schema ID
    schemas: BTreeMap<u16, SchemaInfo>,
    /// Channel table indexed by source channel ID
    channels: BTreeMap<u16, ChannelInfo>,
    /// Total message count from statistics (0 if absent)
    message_count: u64,
}

impl IndexedMcapReader {
    /// Open an MCAP file and read its summary section.
    ///
    /// Fails if the file cannot be opened or mapped, or if it carries no
    /// readable summary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        let file =
            File::open(path_ref).map_err(|e| SliceError::open(&path_str, e.to_string()))?;

        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| SliceError::open(&path_str, format!("Failed to mmap file: {e}")))?;

        let summary = match mcap::Summary::read(&mmap) {
            Ok(Some(summary)) => summary,
            Ok(None) => return Err(SliceError::missing_index(&path_str)),
            Err(e) => {
                return Err(SliceError::open(
                    &path_str,
                    format!("Failed to read summary: {e}"),
                ))
            }
        };

        let mut schemas = BTreeMap::new();
        for (id, schema) in &summary.schemas {
            schemas.insert(
                *id,
                SchemaInfo {
                    id: *id,
                    name: schema.name.clone(),
                    encoding: schema.encoding.clone(),
                    data: schema.data.to_vec(),
                },
            );
        }

        let mut channels = BTreeMap::new();
        for (id, channel) in &summary.channels {
            channels.insert(
                *id,
                ChannelInfo {
                    id: *id,
                    schema_id: channel.schema.as_ref().map(|s| s.id).unwrap_or(0),
                    topic: channel.topic.clone(),
                    message_encoding: channel.message_encoding.clone(),
                    metadata: channel.metadata.clone(),
                },
            );
        }

        let message_count = summary.stats.as_ref().map(|s| s.message_count).unwrap_or(0);

        Ok(Self {
            path: path_str,
            mmap,
            schemas,
            channels,
            message_count,
        })
    }

    /// Schema table indexed by source schema ID.
    pub fn schemas(&self) -> &BTreeMap<u16, SchemaInfo> {
        &self.schemas
    }

    /// Channel table indexed by source channel ID.
    pub fn channels(&self) -> &BTreeMap<u16, ChannelInfo> {
        &self.channels
    }

    /// Look up a schema by source schema ID. ID 0 (schema-less) always
    /// resolves to `None`.
    pub fn schema(&self, id: u16) -> Option<&SchemaInfo> {
        self.schemas.get(&id)
    }

    /// Look up a channel by source channel ID.
    pub fn channel(&self, id: u16) -> Option<&ChannelInfo> {
        self.channels.get(&id)
    }

    /// Total message count from the statistics record (0 if absent).
    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Create a lazy message iterator over the data section.
    pub fn messages(&self) -> Result<MessageIter<'_>> {
        let stream = mcap::MessageStream::new(&self.mmap).map_err(|e| {
            SliceError::read(
                "IndexedMcapReader",
                format!("Failed to create message stream for '{}': {e}", self.path),
            )
        })?;

        Ok(MessageIter { stream })
    }
}

/// Lazy message iterator over an open reader.
///
/// A read failure (corrupt block, decompression fault) surfaces as an
/// `Err` item; callers treat it as fatal for the input being processed.
pub struct MessageIter<'a> {
    stream: mcap::MessageStream<'a>,
}

impl<'a> Iterator for MessageIter<'a> {
    type Item = Result<RawMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        let message = match self.stream.next()? {
            Ok(m) => m,
            Err(e) => {
                return Some(Err(SliceError::read(
                    "MessageStream",
                    format!("Read error: {e}"),
                )))
            }
        };

        Some(Ok(RawMessage {
            channel_id: message.channel.id,
            sequence: message.sequence,
            log_time: message.log_time,
            publish_time: message.publish_time,
            data: message.data.to_vec(),
        }))
    }
}
