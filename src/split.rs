// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Topic fan-out splitter.
//!
//! Consumes the source message stream once and routes each message to
//! the writer session owned by its topic. Sessions, output files, and
//! the output directory are created lazily on first sight of a matching
//! topic: a source with zero matching messages leaves nothing behind.
//!
//! Output layout: a directory named after the input's base name
//! (extension stripped), containing `<topic>.mcap` per matching topic,
//! where the topic string has `/` replaced by `_` and a leading `_`
//! stripped.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::{Result, SliceError};
use crate::io::compress::BlockCompression;
use crate::io::reader::IndexedMcapReader;
use crate::io::writer::{McapWriter, WriterOptions};
use crate::remap::RemapTable;

/// Topic selection for a split run.
///
/// An empty set matches every topic (full fan-out); otherwise a topic
/// matches iff it is in the set.
#[derive(Debug, Clone, Default)]
pub struct TopicFilter {
    topics: BTreeSet<String>,
}

impl TopicFilter {
    /// Match every topic.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match exactly the given topics.
    pub fn from_topics<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a topic passes the filter.
    pub fn matches(&self, topic: &str) -> bool {
        self.topics.is_empty() || self.topics.contains(topic)
    }
}

/// Options for a split run.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Chunk compression for the output files
    pub compression: BlockCompression,
    /// Uncompressed chunk size threshold in bytes
    pub target_chunk_size: usize,
}

impl Default for SplitOptions {
    fn default() -> Self {
        let writer_defaults = WriterOptions::default();
        Self {
            compression: writer_defaults.compression,
            target_chunk_size: writer_defaults.target_chunk_size,
        }
    }
}

/// Statistics for one split run.
#[derive(Debug, Clone, Default)]
pub struct SplitStats {
    /// Messages read from the source
    pub message_count: u64,
    /// Messages forwarded to an output
    pub written_count: u64,
    /// Messages skipped because their topic did not match
    pub unmatched_count: u64,
    /// Messages skipped because their channel was missing from the
    /// source channel table
    pub dangling_count: u64,
    /// Messages written per topic
    pub topic_counts: BTreeMap<String, u64>,
}

/// One open output file and its per-output state.
struct TopicSession {
    writer: McapWriter<BufWriter<File>>,
    remap: RemapTable,
}

/// Topic fan-out splitter.
///
/// One instance runs one or more inputs; each run owns its own session
/// registry and shares nothing with other runs.
pub struct TopicSplitter {
    filter: TopicFilter,
    options: SplitOptions,
}

impl TopicSplitter {
    /// Create a splitter with default options.
    pub fn new(filter: TopicFilter) -> Self {
        Self::with_options(filter, SplitOptions::default())
    }

    /// Create a splitter with custom options.
    pub fn with_options(filter: TopicFilter, options: SplitOptions) -> Self {
        Self { filter, options }
    }

    /// Split one input, placing the output directory in the current
    /// working directory.
    pub fn split<P: AsRef<Path>>(&self, input: P) -> Result<SplitStats> {
        let cwd = std::env::current_dir()?;
        self.split_to(input, &cwd)
    }

    /// Split one input, placing the output directory under `out_root`.
    pub fn split_to<P: AsRef<Path>>(&self, input: P, out_root: &Path) -> Result<SplitStats> {
        let input = input.as_ref();
        let reader = IndexedMcapReader::open(input)?;
        let out_dir = out_root.join(input_stem(input)?);

        let mut stats = SplitStats::default();
        let mut sessions: HashMap<String, TopicSession> = HashMap::new();
        let mut dangling_seen: HashSet<u16> = HashSet::new();
        let mut dir_created = false;

        for result in reader.messages()? {
            let message = result?;
            stats.message_count += 1;

            let channel = match reader.channel(message.channel_id) {
                Some(channel) => channel,
                None => {
                    // Dangling channel reference: tolerated, not fatal
                    if dangling_seen.insert(message.channel_id) {
                        warn!(
                            context = "split",
                            channel_id = message.channel_id,
                            "Message references channel missing from channel table"
                        );
                    }
                    stats.dangling_count += 1;
                    continue;
                }
            };

            if !self.filter.matches(&channel.topic) {
                stats.unmatched_count += 1;
                continue;
            }

            let session = match sessions.entry(channel.topic.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    if !dir_created {
                        fs::create_dir_all(&out_dir).map_err(|e| {
                            SliceError::write(
                                "split",
                                format!("Failed to create '{}': {e}", out_dir.display()),
                            )
                        })?;
                        dir_created = true;
                    }
                    let path = out_dir.join(topic_file_name(entry.key()));
                    debug!(
                        context = "split",
                        topic = %entry.key(),
                        path = %path.display(),
                        "Creating output file"
                    );
                    let writer = McapWriter::create(
                        &path,
                        WriterOptions {
                            compression: self.options.compression,
                            target_chunk_size: self.options.target_chunk_size,
                            ..WriterOptions::for_profile("split-by-topic")
                        },
                    )?;
                    entry.insert(TopicSession {
                        writer,
                        remap: RemapTable::new(),
                    })
                }
            };

            let output_schema_id = match reader.schema(channel.schema_id) {
                Some(schema) => session.remap.ensure_schema(&mut session.writer, schema)?,
                None => 0,
            };
            let output_channel_id =
                session
                    .remap
                    .ensure_channel(&mut session.writer, channel, output_schema_id)?;

            session.writer.write_message(
                output_channel_id,
                message.sequence,
                message.log_time,
                message.publish_time,
                &message.data,
            )?;
            stats.written_count += 1;
        }

        for (topic, mut session) in sessions {
            stats
                .topic_counts
                .insert(topic, session.writer.message_count());
            session.writer.finish()?;
        }

        Ok(stats)
    }
}

/// Convenience function to split an input with default options.
pub fn split_by_topic<P: AsRef<Path>>(input: P, filter: &TopicFilter) -> Result<SplitStats> {
    TopicSplitter::new(filter.clone()).split(input)
}

/// The output directory name for an input: its base name with the
/// extension stripped.
fn input_stem(input: &Path) -> Result<PathBuf> {
    input
        .file_stem()
        .map(PathBuf::from)
        .ok_or_else(|| SliceError::open(input.to_string_lossy(), "Input has no file name"))
}

/// The output file name for a topic: `/` becomes `_`, a leading `_` is
/// stripped, `.mcap` is appended.
fn topic_file_name(topic: &str) -> String {
    let flat = topic.replace('/', "_");
    let flat = flat.strip_prefix('_').unwrap_or(&flat);
    format!("{flat}.mcap")
}
