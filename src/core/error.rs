// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for roboslice.
//!
//! Covers the failure classes of one input file's processing:
//! - Opening and indexing the source
//! - Reading messages mid-stream
//! - Writing and registering records in an output
//! - Block compression faults

use std::fmt;

/// Errors that can occur while transcoding an MCAP file.
#[derive(Debug, Clone)]
pub enum SliceError {
    /// The source file could not be opened or mapped
    Open {
        /// Path to the file
        path: String,
        /// Error message
        message: String,
    },

    /// The source file has no readable summary section
    MissingIndex {
        /// Path to the file
        path: String,
    },

    /// A message could not be read from the source
    Read {
        /// What was being read
        context: String,
        /// Error message
        message: String,
    },

    /// A record could not be written to an output
    Write {
        /// What was being written
        context: String,
        /// Error message
        message: String,
    },

    /// A chunk could not be compressed
    Compression {
        /// Algorithm tag (e.g., "zstd", "lz4")
        algorithm: String,
        /// Error message
        message: String,
    },
}

impl SliceError {
    /// Create a source-open error.
    pub fn open(path: impl Into<String>, message: impl Into<String>) -> Self {
        SliceError::Open {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a missing-index error.
    pub fn missing_index(path: impl Into<String>) -> Self {
        SliceError::MissingIndex { path: path.into() }
    }

    /// Create a read error.
    pub fn read(context: impl Into<String>, message: impl Into<String>) -> Self {
        SliceError::Read {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a write error.
    pub fn write(context: impl Into<String>, message: impl Into<String>) -> Self {
        SliceError::Write {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a compression error.
    pub fn compression(algorithm: impl Into<String>, message: impl Into<String>) -> Self {
        SliceError::Compression {
            algorithm: algorithm.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceError::Open { path, message } => {
                write!(f, "Failed to open '{path}': {message}")
            }
            SliceError::MissingIndex { path } => {
                write!(f, "'{path}' has no readable summary section")
            }
            SliceError::Read { context, message } => {
                write!(f, "Read error in {context}: {message}")
            }
            SliceError::Write { context, message } => {
                write!(f, "Write error in {context}: {message}")
            }
            SliceError::Compression { algorithm, message } => {
                write!(f, "{algorithm} compression error: {message}")
            }
        }
    }
}

impl std::error::Error for SliceError {}

impl From<std::io::Error> for SliceError {
    fn from(err: std::io::Error) -> Self {
        SliceError::Write {
            context: "IO".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for roboslice operations.
pub type Result<T> = std::result::Result<T, SliceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error() {
        let err = SliceError::open("/tmp/missing.mcap", "No such file");
        assert!(matches!(err, SliceError::Open { .. }));
        assert_eq!(
            err.to_string(),
            "Failed to open '/tmp/missing.mcap': No such file"
        );
    }

    #[test]
    fn test_missing_index_error() {
        let err = SliceError::missing_index("log.mcap");
        assert!(matches!(err, SliceError::MissingIndex { .. }));
        assert_eq!(err.to_string(), "'log.mcap' has no readable summary section");
    }

    #[test]
    fn test_read_error() {
        let err = SliceError::read("MessageStream", "truncated record");
        assert!(matches!(err, SliceError::Read { .. }));
        assert_eq!(
            err.to_string(),
            "Read error in MessageStream: truncated record"
        );
    }

    #[test]
    fn test_write_error() {
        let err = SliceError::write("McapWriter", "disk full");
        assert!(matches!(err, SliceError::Write { .. }));
        assert_eq!(err.to_string(), "Write error in McapWriter: disk full");
    }

    #[test]
    fn test_compression_error() {
        let err = SliceError::compression("zstd", "invalid input size");
        assert!(matches!(err, SliceError::Compression { .. }));
        assert_eq!(err.to_string(), "zstd compression error: invalid input size");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SliceError = io_err.into();
        assert!(matches!(err, SliceError::Write { .. }));
        assert_eq!(err.to_string(), "Write error in IO: file not found");
    }

    #[test]
    fn test_error_clone() {
        let err1 = SliceError::read("Context", "message");
        let err2 = err1.clone();
        assert_eq!(err1.to_string(), err2.to_string());
    }
}
