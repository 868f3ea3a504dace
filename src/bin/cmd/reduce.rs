// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Reduce command - at most one message per channel.

use std::path::PathBuf;

use clap::Args;

use crate::common::{CompressionArg, Progress, Result};
use roboslice::{ChannelReducer, ReduceOptions};

/// Copy one input keeping at most one message per channel.
///
/// The output keeps the source's full schema and channel tables and the
/// first message (in read order) of each channel. It is written as
/// `<basename>_reduced.mcap` in the current working directory.
#[derive(Args, Clone, Debug)]
pub struct ReduceCmd {
    /// Input file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Chunk compression algorithm
    #[arg(long, value_enum, default_value_t = CompressionArg::Zstd)]
    compression: CompressionArg,

    /// Uncompressed chunk size threshold in bytes
    #[arg(long, default_value_t = 4 * 1024 * 1024)]
    chunk_size: usize,
}

impl ReduceCmd {
    pub fn run(self) -> Result<()> {
        let reducer = ChannelReducer::with_options(ReduceOptions {
            compression: self.compression.into(),
            target_chunk_size: self.chunk_size,
        });

        let progress = Progress::spinner(format!("Reducing {}", self.input.display()));
        let stats = reducer.reduce(&self.input);
        progress.clear();

        let stats = stats?;

        println!("Reduced {}:", self.input.display());
        println!("  Output:   {}", stats.output.display());
        println!("  Schemas:  {}", stats.schema_count);
        println!("  Channels: {}", stats.channel_count);
        println!(
            "  Messages: {} kept, {} dropped",
            stats.written_count, stats.dropped_count
        );
        if stats.dangling_count > 0 {
            println!("  Skipped {} dangling messages", stats.dangling_count);
        }

        Ok(())
    }
}
