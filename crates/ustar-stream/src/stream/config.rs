//! Decoder configuration.

/// Default buffer preallocation for [`StreamAccumulator`]: 1 MiB.
///
/// [`StreamAccumulator`]: super::StreamAccumulator
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024 * 1024;

/// Configuration for [`BoundedParser`] and [`StreamAccumulator`].
///
/// The defaults accept every well-framed entry without checking header
/// checksums, matching how most archives in the wild are consumed.
///
/// # Example
///
/// ```
/// use ustar_stream::ParserConfig;
///
/// let config = ParserConfig {
///     initial_capacity: 64 * 1024,
///     ..ParserConfig::strict()
/// };
/// assert!(config.verify_checksum);
/// ```
///
/// [`BoundedParser`]: super::BoundedParser
/// [`StreamAccumulator`]: super::StreamAccumulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Bytes reserved by the accumulator before the first chunk arrives.
    ///
    /// Default: 1 MiB.
    pub initial_capacity: usize,

    /// Largest entry content size that is accepted.
    ///
    /// Entries above this size fail with [`StreamError::EntryTooLarge`]
    /// before any buffer space is reserved for them.
    ///
    /// Default: `u64::MAX` (no limit).
    ///
    /// [`StreamError::EntryTooLarge`]: super::StreamError::EntryTooLarge
    pub max_entry_size: u64,

    /// Verify the checksum of every header before decoding it.
    ///
    /// Default: `false`.
    pub verify_checksum: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_entry_size: u64::MAX,
            verify_checksum: false,
        }
    }
}

impl ParserConfig {
    /// Create a new `ParserConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a strict configuration for untrusted archives.
    ///
    /// Checksums are verified and entries are limited to 64 MiB.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_entry_size: 64 * 1024 * 1024, // 64 MiB
            verify_checksum: true,
            ..Self::default()
        }
    }
}
