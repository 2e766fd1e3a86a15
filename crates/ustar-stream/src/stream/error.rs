//! Error types for USTAR stream decoding.

use thiserror::Error;

/// Errors that can occur while decoding a USTAR stream.
///
/// Running out of data is not an error: the parser reports it as a deficit
/// in its [`ParseOutcome`](super::ParseOutcome).
#[derive(Debug, Error)]
pub enum StreamError {
    /// I/O error from the underlying reader.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A one-shot parse was given data that does not start with a USTAR header.
    #[error("not a ustar archive: magic missing at offset 257")]
    NotUstar,

    /// The header checksum does not match the computed value.
    #[error("checksum mismatch: expected {expected}, computed {computed}")]
    ChecksumMismatch {
        /// The checksum value stored in the header.
        expected: u64,
        /// The checksum computed from the header bytes.
        computed: u64,
    },

    /// Entry size exceeds the configured maximum or cannot be addressed.
    #[error("entry too large: {size} bytes > {limit} bytes")]
    EntryTooLarge {
        /// Size from the header.
        size: u64,
        /// Largest size that is accepted.
        limit: u64,
    },

    /// The file sink failed.
    #[error(transparent)]
    Sink(#[from] anyhow::Error),
}

/// Result type for stream decoding operations.
pub type Result<T> = std::result::Result<T, StreamError>;
