// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Chunked MCAP writer with pluggable block compression.
//!
//! Messages are buffered and written as compressed chunks when the
//! buffer exceeds the target chunk size. Every chunk goes through the
//! configured [`BlockCompression`] and advertises the algorithm tag
//! inline. `finish()` writes a summary section (schemas, channels,
//! statistics, chunk indexes) so the output is readable by indexed
//! readers; a file that is never finished stays unreadable.
//!
//! Identifier policy: schema IDs are issued from 1 (0 means "no schema"
//! in MCAP), channel IDs from 0, both strictly monotonic. The writer
//! performs no name- or topic-keyed deduplication; translating source
//! identifiers to output identifiers is the remap table's job.
//!
//! The output format is compatible with the mcap crate v0.24; the byte
//! layout follows the MCAP specification at
//! https://github.com/foxglove/mcap/tree/main/docs/specification

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::core::{Result, SliceError};
use crate::io::compress::BlockCompression;

const MCAP_MAGIC: [u8; 8] = [0x89, b'M', b'C', b'A', b'P', 0x30, b'\r', b'\n'];

const OP_HEADER: u8 = 0x01;
const OP_FOOTER: u8 = 0x02;
const OP_SCHEMA: u8 = 0x03;
const OP_CHANNEL: u8 = 0x04;
const OP_MESSAGE: u8 = 0x05;
const OP_CHUNK: u8 = 0x06;
const OP_CHUNK_INDEX: u8 = 0x08;
const OP_STATISTICS: u8 = 0x0B;
const OP_DATA_END: u8 = 0x0F;

/// Default target chunk size (4MB uncompressed).
const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Options for a writer session.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Header profile string, identifying the producing transform
    pub profile: String,
    /// Header library string
    pub library: String,
    /// Chunk compression algorithm
    pub compression: BlockCompression,
    /// Uncompressed chunk size threshold in bytes
    pub target_chunk_size: usize,
}

impl WriterOptions {
    /// Options for the given profile with default compression.
    pub fn for_profile(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            ..Self::default()
        }
    }
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            profile: String::new(),
            library: concat!("roboslice ", env!("CARGO_PKG_VERSION")).to_string(),
            compression: BlockCompression::default(),
            target_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Registered schema, kept for re-emission in the summary section.
#[derive(Debug, Clone)]
struct SchemaRecord {
    id: u16,
    name: String,
    encoding: String,
    data: Vec<u8>,
}

/// Registered channel, kept for re-emission in the summary section.
#[derive(Debug, Clone)]
struct ChannelRecord {
    id: u16,
    schema_id: u16,
    topic: String,
    message_encoding: String,
    metadata: BTreeMap<String, String>,
}

/// Chunk metadata tracked for the summary section.
#[derive(Debug, Clone)]
struct ChunkIndexRecord {
    message_start_time: u64,
    message_end_time: u64,
    chunk_start_offset: u64,
    chunk_length: u64,
    compression: &'static str,
    compressed_size: u64,
    uncompressed_size: u64,
}

/// Chunked MCAP writer over any `Write` sink.
///
/// Creation writes the leading magic and header record; `finish()` must
/// be called to produce a readable file.
pub struct McapWriter<W: Write> {
    writer: W,
    options: WriterOptions,
    /// Current write position, tracked manually
    position: u64,

    next_schema_id: u16,
    next_channel_id: u16,

    schema_records: Vec<SchemaRecord>,
    channel_records: Vec<ChannelRecord>,
    channel_message_counts: BTreeMap<u16, u64>,
    chunk_indexes: Vec<ChunkIndexRecord>,

    /// Serialized message records waiting to be flushed as a chunk
    chunk_buffer: Vec<u8>,
    chunk_start_time: u64,
    chunk_end_time: u64,

    messages_written: u64,
    file_start_time: u64,
    file_end_time: u64,
}

impl McapWriter<BufWriter<File>> {
    /// Create a writer session backed by a new file at `path`.
    pub fn create<P: AsRef<Path>>(path: P, options: WriterOptions) -> Result<Self> {
        let file = File::create(&path).map_err(|e| {
            SliceError::write(
                "McapWriter",
                format!(
                    "Failed to create '{}': {e}",
                    path.as_ref().to_string_lossy()
                ),
            )
        })?;

        Self::new(BufWriter::new(file), options)
    }
}

impl<W: Write> McapWriter<W> {
    /// Create a writer session over an arbitrary sink.
    ///
    /// Writes the magic bytes and header record immediately.
    pub fn new(writer: W, options: WriterOptions) -> Result<Self> {
        let mut slf = Self {
            writer,
            options,
            position: 0,
            next_schema_id: 1,
            next_channel_id: 0,
            schema_records: Vec::new(),
            channel_records: Vec::new(),
            channel_message_counts: BTreeMap::new(),
            chunk_indexes: Vec::new(),
            chunk_buffer: Vec::new(),
            chunk_start_time: u64::MAX,
            chunk_end_time: 0,
            messages_written: 0,
            file_start_time: u64::MAX,
            file_end_time: 0,
        };

        slf.write_bytes(&MCAP_MAGIC)?;

        let mut body = Vec::new();
        put_str(&mut body, &slf.options.profile)?;
        put_str(&mut body, &slf.options.library)?;
        slf.write_record(OP_HEADER, &body)?;

        Ok(slf)
    }

    /// Register a schema, assigning the next output schema ID.
    pub fn add_schema(&mut self, name: &str, encoding: &str, data: &[u8]) -> Result<u16> {
        let id = self.next_schema_id;
        self.next_schema_id = self.next_schema_id.checked_add(1).ok_or_else(|| {
            SliceError::write("McapWriter", "Schema ID space exhausted".to_string())
        })?;

        let record = SchemaRecord {
            id,
            name: name.to_string(),
            encoding: encoding.to_string(),
            data: data.to_vec(),
        };

        let body = schema_body(&record)?;
        self.write_record(OP_SCHEMA, &body)?;
        self.schema_records.push(record);

        Ok(id)
    }

    /// Register a channel, assigning the next output channel ID.
    ///
    /// `schema_id` must be 0 (schema-less) or an ID previously returned
    /// by [`add_schema`](Self::add_schema) on this writer.
    pub fn add_channel(
        &mut self,
        schema_id: u16,
        topic: &str,
        message_encoding: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Result<u16> {
        if schema_id != 0 && schema_id >= self.next_schema_id {
            return Err(SliceError::write(
                "McapWriter",
                format!("Channel '{topic}' references unregistered schema {schema_id}"),
            ));
        }

        let id = self.next_channel_id;
        self.next_channel_id = self.next_channel_id.checked_add(1).ok_or_else(|| {
            SliceError::write("McapWriter", "Channel ID space exhausted".to_string())
        })?;

        let record = ChannelRecord {
            id,
            schema_id,
            topic: topic.to_string(),
            message_encoding: message_encoding.to_string(),
            metadata: metadata.clone(),
        };

        let body = channel_body(&record)?;
        self.write_record(OP_CHANNEL, &body)?;
        self.channel_records.push(record);
        self.channel_message_counts.insert(id, 0);

        Ok(id)
    }

    /// Append a message to the channel with the given output channel ID.
    ///
    /// The channel must have been registered on this writer; a message
    /// for an unregistered channel is an invariant breach upstream and
    /// is rejected.
    pub fn write_message(
        &mut self,
        channel_id: u16,
        sequence: u32,
        log_time: u64,
        publish_time: u64,
        data: &[u8],
    ) -> Result<()> {
        let count = self.channel_message_counts.get_mut(&channel_id).ok_or_else(|| {
            SliceError::write(
                "McapWriter",
                format!("Message for unregistered channel {channel_id}"),
            )
        })?;
        *count += 1;

        self.chunk_start_time = self.chunk_start_time.min(log_time);
        self.chunk_end_time = self.chunk_end_time.max(log_time);
        self.file_start_time = self.file_start_time.min(log_time);
        self.file_end_time = self.file_end_time.max(log_time);

        // Message record, serialized straight into the chunk buffer
        let record_len = 2 + 4 + 8 + 8 + data.len();
        self.chunk_buffer.push(OP_MESSAGE);
        self.chunk_buffer.write_u64::<LittleEndian>(record_len as u64)?;
        self.chunk_buffer.write_u16::<LittleEndian>(channel_id)?;
        self.chunk_buffer.write_u32::<LittleEndian>(sequence)?;
        self.chunk_buffer.write_u64::<LittleEndian>(log_time)?;
        self.chunk_buffer.write_u64::<LittleEndian>(publish_time)?;
        self.chunk_buffer.extend_from_slice(data);

        self.messages_written += 1;

        if self.chunk_buffer.len() >= self.options.target_chunk_size {
            self.flush_chunk()?;
        }

        Ok(())
    }

    /// Flush buffered message records as one compressed chunk.
    fn flush_chunk(&mut self) -> Result<()> {
        if self.chunk_buffer.is_empty() {
            return Ok(());
        }

        let records = std::mem::take(&mut self.chunk_buffer);
        let uncompressed_size = records.len() as u64;
        let uncompressed_crc = crc32fast::hash(&records);

        let (tag, compressed) = self.options.compression.compress(&records)?;

        let mut body = Vec::with_capacity(compressed.len() + 64);
        body.write_u64::<LittleEndian>(self.chunk_start_time)?;
        body.write_u64::<LittleEndian>(self.chunk_end_time)?;
        body.write_u64::<LittleEndian>(uncompressed_size)?;
        body.write_u32::<LittleEndian>(uncompressed_crc)?;
        put_str(&mut body, tag)?;
        body.write_u64::<LittleEndian>(compressed.len() as u64)?;
        body.extend_from_slice(&compressed);

        let chunk_start_offset = self.position;
        self.write_record(OP_CHUNK, &body)?;

        self.chunk_indexes.push(ChunkIndexRecord {
            message_start_time: self.chunk_start_time,
            message_end_time: self.chunk_end_time,
            chunk_start_offset,
            chunk_length: self.position - chunk_start_offset,
            compression: tag,
            compressed_size: compressed.len() as u64,
            uncompressed_size,
        });

        self.chunk_start_time = u64::MAX;
        self.chunk_end_time = 0;

        Ok(())
    }

    /// Finalize the file: final chunk, Data End, summary section
    /// (schemas, channels, statistics, chunk indexes), footer, magic.
    ///
    /// Must be called exactly once; a session that is dropped without
    /// finishing leaves a file unreadable by indexed readers.
    pub fn finish(&mut self) -> Result<()> {
        self.flush_chunk()?;

        let mut body = Vec::new();
        body.write_u32::<LittleEndian>(0)?; // data_section_crc not computed
        self.write_record(OP_DATA_END, &body)?;

        // Summary section: schemas, channels, statistics, chunk indexes.
        // Always referenced from the footer, so an output with channels
        // but no messages stays index-readable.
        let summary_start = self.position;

        let schema_records = std::mem::take(&mut self.schema_records);
        for schema in &schema_records {
            let body = schema_body(schema)?;
            self.write_record(OP_SCHEMA, &body)?;
        }
        self.schema_records = schema_records;

        let channel_records = std::mem::take(&mut self.channel_records);
        for channel in &channel_records {
            let body = channel_body(channel)?;
            self.write_record(OP_CHANNEL, &body)?;
        }
        self.channel_records = channel_records;

        let body = self.statistics_body()?;
        self.write_record(OP_STATISTICS, &body)?;

        let chunk_indexes = std::mem::take(&mut self.chunk_indexes);
        for index in &chunk_indexes {
            let body = chunk_index_body(index)?;
            self.write_record(OP_CHUNK_INDEX, &body)?;
        }
        self.chunk_indexes = chunk_indexes;

        let mut body = Vec::new();
        body.write_u64::<LittleEndian>(summary_start)?;
        body.write_u64::<LittleEndian>(0)?; // no summary offset section
        body.write_u32::<LittleEndian>(0)?; // summary_crc not computed
        self.write_record(OP_FOOTER, &body)?;

        self.write_bytes(&MCAP_MAGIC)?;

        self.writer
            .flush()
            .map_err(|e| SliceError::write("McapWriter", format!("Failed to flush: {e}")))?;

        tracing::debug!(
            context = "mcap_writer",
            schemas = self.schema_records.len(),
            channels = self.channel_records.len(),
            chunks = self.chunk_indexes.len(),
            messages = self.messages_written,
            "Summary section written"
        );

        Ok(())
    }

    /// Statistics record body.
    fn statistics_body(&self) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        body.write_u64::<LittleEndian>(self.messages_written)?;
        body.write_u16::<LittleEndian>(self.schema_records.len() as u16)?;
        body.write_u32::<LittleEndian>(self.channel_records.len() as u32)?;
        body.write_u32::<LittleEndian>(0)?; // attachments
        body.write_u32::<LittleEndian>(0)?; // metadata records
        body.write_u32::<LittleEndian>(self.chunk_indexes.len() as u32)?;

        let (start, end) = if self.messages_written > 0 {
            (self.file_start_time, self.file_end_time)
        } else {
            (0, 0)
        };
        body.write_u64::<LittleEndian>(start)?;
        body.write_u64::<LittleEndian>(end)?;

        let map_bytes = self.channel_message_counts.len() as u32 * (2 + 8);
        body.write_u32::<LittleEndian>(map_bytes)?;
        for (&channel_id, &count) in &self.channel_message_counts {
            body.write_u16::<LittleEndian>(channel_id)?;
            body.write_u64::<LittleEndian>(count)?;
        }

        Ok(body)
    }

    /// Write a record: opcode, body length, body.
    fn write_record(&mut self, opcode: u8, body: &[u8]) -> Result<()> {
        let mut header = [0u8; 9];
        header[0] = opcode;
        header[1..].copy_from_slice(&(body.len() as u64).to_le_bytes());
        self.write_bytes(&header)?;
        self.write_bytes(body)
    }

    /// Write bytes and track the file position.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer
            .write_all(bytes)
            .map_err(|e| SliceError::write("McapWriter", e.to_string()))?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    /// Number of messages written so far.
    pub fn message_count(&self) -> u64 {
        self.messages_written
    }

    /// Number of registered schemas.
    pub fn schema_count(&self) -> usize {
        self.schema_records.len()
    }

    /// Number of registered channels.
    pub fn channel_count(&self) -> usize {
        self.channel_records.len()
    }

    /// Number of chunks written so far.
    pub fn chunks_written(&self) -> usize {
        self.chunk_indexes.len()
    }

    /// Consume the writer and return the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Append a length-prefixed string.
fn put_str(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    buf.write_u32::<LittleEndian>(s.len() as u32)?;
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Append a byte-length-prefixed string map.
fn put_map(buf: &mut Vec<u8>, map: &BTreeMap<String, String>) -> Result<()> {
    let total: u32 = map
        .iter()
        .map(|(k, v)| 4 + k.len() as u32 + 4 + v.len() as u32)
        .sum();
    buf.write_u32::<LittleEndian>(total)?;
    for (key, value) in map {
        put_str(buf, key)?;
        put_str(buf, value)?;
    }
    Ok(())
}

/// Schema record body: id, name, encoding, length-prefixed data.
fn schema_body(schema: &SchemaRecord) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    body.write_u16::<LittleEndian>(schema.id)?;
    put_str(&mut body, &schema.name)?;
    put_str(&mut body, &schema.encoding)?;
    body.write_u32::<LittleEndian>(schema.data.len() as u32)?;
    body.extend_from_slice(&schema.data);
    Ok(body)
}

/// Channel record body: id, schema id, topic, encoding, metadata map.
fn channel_body(channel: &ChannelRecord) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    body.write_u16::<LittleEndian>(channel.id)?;
    body.write_u16::<LittleEndian>(channel.schema_id)?;
    put_str(&mut body, &channel.topic)?;
    put_str(&mut body, &channel.message_encoding)?;
    put_map(&mut body, &channel.metadata)?;
    Ok(body)
}

/// Chunk index record body, matching mcap::records::ChunkIndex.
fn chunk_index_body(index: &ChunkIndexRecord) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    body.write_u64::<LittleEndian>(index.message_start_time)?;
    body.write_u64::<LittleEndian>(index.message_end_time)?;
    body.write_u64::<LittleEndian>(index.chunk_start_offset)?;
    body.write_u64::<LittleEndian>(index.chunk_length)?;
    body.write_u32::<LittleEndian>(0)?; // no message index offsets
    body.write_u64::<LittleEndian>(0)?; // message index length
    put_str(&mut body, index.compression)?;
    body.write_u64::<LittleEndian>(index.compressed_size)?;
    body.write_u64::<LittleEndian>(index.uncompressed_size)?;
    Ok(body)
}
