// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for CLI commands.

use std::io::IsTerminal as _;
use std::time::Duration;

use roboslice::BlockCompression;

pub use anyhow::Result as CliResult;
pub type Result<T = ()> = CliResult<T>;

/// Chunk compression choice on the command line.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum CompressionArg {
    /// Zstandard (default)
    Zstd,
    /// LZ4 frame
    Lz4,
    /// No compression
    None,
}

impl From<CompressionArg> for BlockCompression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Zstd => BlockCompression::zstd(),
            CompressionArg::Lz4 => BlockCompression::Lz4,
            CompressionArg::None => BlockCompression::None,
        }
    }
}

/// Spinner wrapper for consistent progress reporting.
///
/// Silent when stderr is not a terminal.
pub struct Progress {
    inner: Option<indicatif::ProgressBar>,
}

impl Progress {
    /// Start a spinner with the given message.
    pub fn spinner(message: impl Into<String>) -> Self {
        let inner = if std::io::stderr().is_terminal() {
            let pb = indicatif::ProgressBar::new_spinner();
            pb.set_style(
                indicatif::ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap(),
            );
            pb.set_message(message.into());
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };

        Self { inner }
    }

    /// Stop the spinner, leaving a final message.
    pub fn finish(self, message: impl Into<String>) {
        if let Some(pb) = self.inner {
            pb.finish_with_message(message.into());
        }
    }

    /// Stop the spinner and erase it.
    pub fn clear(self) {
        if let Some(pb) = self.inner {
            pb.finish_and_clear();
        }
    }
}
