// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Split command - one output file per topic.

use std::path::PathBuf;

use clap::Args;

use crate::common::{CompressionArg, Progress, Result};
use roboslice::{SplitOptions, TopicFilter, TopicSplitter};

/// Split inputs into one output file per topic.
///
/// For each input, a directory named after the input's base name is
/// created in the current working directory, holding one `.mcap` per
/// matching topic. No directory is created for inputs without matching
/// messages.
#[derive(Args, Clone, Debug)]
pub struct SplitCmd {
    /// Input files
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Topic to split out (repeatable; default: every topic)
    #[arg(short, long = "topic", value_name = "TOPIC")]
    topics: Vec<String>,

    /// Chunk compression algorithm
    #[arg(long, value_enum, default_value_t = CompressionArg::Zstd)]
    compression: CompressionArg,

    /// Uncompressed chunk size threshold in bytes
    #[arg(long, default_value_t = 4 * 1024 * 1024)]
    chunk_size: usize,
}

impl SplitCmd {
    pub fn run(self) -> Result<()> {
        let filter = if self.topics.is_empty() {
            TopicFilter::all()
        } else {
            TopicFilter::from_topics(self.topics.clone())
        };

        let splitter = TopicSplitter::with_options(
            filter,
            SplitOptions {
                compression: self.compression.into(),
                target_chunk_size: self.chunk_size,
            },
        );

        let total = self.inputs.len();
        let mut failed = 0usize;

        for input in &self.inputs {
            let progress = Progress::spinner(format!("Splitting {}", input.display()));

            match splitter.split(input) {
                Ok(stats) => {
                    progress.clear();
                    println!("Split {}:", input.display());
                    for (topic, count) in &stats.topic_counts {
                        println!("  {topic}: {count} messages");
                    }
                    if stats.topic_counts.is_empty() {
                        println!("  No matching messages, nothing written");
                    }
                    if stats.dangling_count > 0 {
                        println!("  Skipped {} dangling messages", stats.dangling_count);
                    }
                }
                Err(e) => {
                    progress.clear();
                    eprintln!("Failed to split {}: {e}", input.display());
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            anyhow::bail!("{failed} of {total} inputs failed");
        }

        Ok(())
    }
}
