// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Channel-deduplicating reducer.
//!
//! Produces a copy of the source that keeps at most one message per
//! channel: the first in read order. Unlike the splitter, the reducer
//! copies the **entire** schema and channel namespace eagerly, before
//! any message is read, so the output's tables are in bijection with the
//! source's even for channels that never emit.
//!
//! Dedup policy: first message only, permanently closed. Once a channel
//! has emitted, later messages on it are dropped no matter how many
//! arrive. Membership in the emitted set is the sole source of truth.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::{Result, SliceError};
use crate::io::compress::BlockCompression;
use crate::io::reader::IndexedMcapReader;
use crate::io::writer::{McapWriter, WriterOptions};
use crate::remap::RemapTable;

/// Suffix appended to the input's base name for the output file.
const REDUCED_SUFFIX: &str = "_reduced.mcap";

/// Options for a reduce run.
#[derive(Debug, Clone)]
pub struct ReduceOptions {
    /// Chunk compression for the output file
    pub compression: BlockCompression,
    /// Uncompressed chunk size threshold in bytes
    pub target_chunk_size: usize,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        let writer_defaults = WriterOptions::default();
        Self {
            compression: writer_defaults.compression,
            target_chunk_size: writer_defaults.target_chunk_size,
        }
    }
}

/// Statistics for one reduce run.
#[derive(Debug, Clone, Default)]
pub struct ReduceStats {
    /// Schemas copied into the output
    pub schema_count: usize,
    /// Channels copied into the output
    pub channel_count: usize,
    /// Messages read from the source
    pub message_count: u64,
    /// Messages forwarded (at most one per channel)
    pub written_count: u64,
    /// Messages dropped because their channel had already emitted
    pub dropped_count: u64,
    /// Messages skipped because their channel was missing from the
    /// source channel table
    pub dangling_count: u64,
    /// Path of the output file
    pub output: PathBuf,
}

/// Channel-deduplicating reducer.
pub struct ChannelReducer {
    options: ReduceOptions,
}

impl ChannelReducer {
    /// Create a reducer with default options.
    pub fn new() -> Self {
        Self::with_options(ReduceOptions::default())
    }

    /// Create a reducer with custom options.
    pub fn with_options(options: ReduceOptions) -> Self {
        Self { options }
    }

    /// Reduce one input, writing `<basename>_reduced.mcap` into the
    /// current working directory.
    pub fn reduce<P: AsRef<Path>>(&self, input: P) -> Result<ReduceStats> {
        let input = input.as_ref();
        let output = std::env::current_dir()?.join(reduced_file_name(input)?);
        self.reduce_to(input, &output)
    }

    /// Reduce one input into the given output path.
    pub fn reduce_to<P: AsRef<Path>>(&self, input: P, output: &Path) -> Result<ReduceStats> {
        let reader = IndexedMcapReader::open(input.as_ref())?;

        let mut writer = McapWriter::create(
            output,
            WriterOptions {
                compression: self.options.compression,
                target_chunk_size: self.options.target_chunk_size,
                ..WriterOptions::for_profile("reduce-channels")
            },
        )?;

        let mut remap = RemapTable::new();

        // Copy the whole namespace eagerly, in ascending source-id order,
        // independent of whether any message references it.
        for schema in reader.schemas().values() {
            remap.ensure_schema(&mut writer, schema)?;
        }
        for channel in reader.channels().values() {
            let output_schema_id = remap.schema_id(channel.schema_id).unwrap_or(0);
            remap.ensure_channel(&mut writer, channel, output_schema_id)?;
        }

        let mut stats = ReduceStats {
            schema_count: remap.schema_count(),
            channel_count: remap.channel_count(),
            output: output.to_path_buf(),
            ..ReduceStats::default()
        };

        let mut emitted: HashSet<u16> = HashSet::new();

        for result in reader.messages()? {
            let message = result?;
            stats.message_count += 1;

            let output_channel_id = match remap.channel_id(message.channel_id) {
                Some(id) => id,
                None => {
                    stats.dangling_count += 1;
                    continue;
                }
            };

            if emitted.insert(output_channel_id) {
                writer.write_message(
                    output_channel_id,
                    message.sequence,
                    message.log_time,
                    message.publish_time,
                    &message.data,
                )?;
                stats.written_count += 1;
            } else {
                stats.dropped_count += 1;
            }
        }

        writer.finish()?;

        debug!(
            context = "reduce",
            channels = stats.channel_count,
            written = stats.written_count,
            dropped = stats.dropped_count,
            "Reduce complete"
        );

        Ok(stats)
    }
}

impl Default for ChannelReducer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to reduce an input with default options.
pub fn reduce_channels<P: AsRef<Path>>(input: P) -> Result<ReduceStats> {
    ChannelReducer::new().reduce(input)
}

/// The output file name for an input: its base name with the extension
/// replaced by `_reduced.mcap`.
fn reduced_file_name(input: &Path) -> Result<String> {
    let stem = input
        .file_stem()
        .ok_or_else(|| SliceError::open(input.to_string_lossy(), "Input has no file name"))?;
    Ok(format!("{}{}", stem.to_string_lossy(), REDUCED_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_file_name_replaces_extension() {
        assert_eq!(
            reduced_file_name(Path::new("log.mcap")).unwrap(),
            "log_reduced.mcap"
        );
    }

    #[test]
    fn test_reduced_file_name_drops_directories() {
        assert_eq!(
            reduced_file_name(Path::new("/data/runs/run_7.mcap")).unwrap(),
            "run_7_reduced.mcap"
        );
    }
}
