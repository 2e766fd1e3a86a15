//! Growable buffer that turns arbitrary chunks into complete entries.

use std::fmt;

use bytes::{Buf, BytesMut};
use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::config::ParserConfig;
use super::error::Result;
use super::parser::{BoundedParser, ParseOutcome};
use super::sink::{Discard, FileSink};

/// Incremental USTAR decoder fed by [`write`](Self::write) calls.
///
/// Chunks may have any length and need not line up with sectors or
/// entries. Bytes that do not complete an entry yet are kept and decoded
/// once the rest arrives; every byte written is either retired as part of a
/// decoded entry or retained, never dropped or decoded twice.
///
/// After each write the parser's deficit, the number of bytes the next
/// entry still needs, is known, and room for it has been reserved so that
/// the chunk completing the entry fits without another reallocation.
///
/// Retiring decoded entries only advances the start of the buffer; the
/// space in front is reclaimed by compaction when the buffer needs to grow,
/// so decoding is not quadratic in the number of entries.
pub struct StreamAccumulator<S = Discard> {
    parser: BoundedParser,
    buffer: BytesMut,
    deficit: Option<usize>,
    consumed: u64,
    files: usize,
    sink: S,
}

impl StreamAccumulator<Discard> {
    /// Create a decoder that discards every file.
    ///
    /// Mostly useful to validate the framing of an archive.
    pub fn new() -> Self {
        Self::with_sink(Discard)
    }
}

impl Default for StreamAccumulator<Discard> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FileSink> StreamAccumulator<S> {
    /// Create a decoder delivering files to `sink`, with default limits.
    pub fn with_sink(sink: S) -> Self {
        Self::with_config(ParserConfig::default(), sink)
    }

    /// Create a decoder with the given configuration.
    pub fn with_config(config: ParserConfig, sink: S) -> Self {
        Self {
            buffer: BytesMut::with_capacity(config.initial_capacity),
            parser: BoundedParser::new(config),
            deficit: None,
            consumed: 0,
            files: 0,
            sink,
        }
    }

    /// Append a chunk and decode every entry it completes.
    ///
    /// The sink is awaited once per regular file before anything else is
    /// decoded.
    ///
    /// # Errors
    ///
    /// Returns any error of [`BoundedParser::try_parse`]. Entries decoded
    /// before the error have been retired from the buffer; the failing entry
    /// is retained.
    pub async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        self.reserve(chunk.len());
        self.buffer.extend_from_slice(chunk);

        loop {
            let mut outcome = ParseOutcome::default();
            let parsed = self
                .parser
                .parse_into(&self.buffer, &mut self.sink, &mut outcome)
                .await;
            self.retire(&outcome);
            parsed?;

            self.deficit = outcome.deficit;
            if outcome.consumed == 0 || self.buffer.is_empty() {
                break;
            }
        }

        if let Some(deficit) = self.deficit {
            self.reserve(deficit);
        }
        Ok(())
    }

    /// Read `reader` to the end, writing it in chunks of `chunk_size` bytes.
    ///
    /// Returns the number of bytes read.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Io`] if reading fails, otherwise as
    /// [`write`](Self::write).
    ///
    /// [`StreamError::Io`]: super::StreamError::Io
    pub async fn feed_reader<R>(&mut self, mut reader: R, chunk_size: usize) -> Result<u64>
    where
        R: AsyncRead + Unpin,
    {
        let mut chunk = vec![0u8; chunk_size.max(1)];
        let mut total = 0u64;
        loop {
            let n = reader.read(&mut chunk).await?;
            if n == 0 {
                return Ok(total);
            }
            total += n as u64;
            self.write(&chunk[..n]).await?;
        }
    }

    /// Make sure `additional` more bytes fit without reallocating.
    fn reserve(&mut self, additional: usize) {
        let spare = self.buffer.capacity() - self.buffer.len();
        if additional > spare {
            self.buffer.reserve(additional);
            debug!(
                "buffer grown for {additional} bytes: {} pending, capacity {}",
                self.buffer.len(),
                self.buffer.capacity()
            );
        }
    }

    fn retire(&mut self, outcome: &ParseOutcome) {
        if outcome.consumed == 0 {
            return;
        }
        self.buffer.advance(outcome.consumed);
        self.consumed += outcome.consumed as u64;
        self.files += outcome.files;
        trace!(
            "retired {} bytes, {} pending",
            outcome.consumed,
            self.buffer.len()
        );
    }
}

impl<S> StreamAccumulator<S> {
    /// Number of bytes written but not yet consumed by a decoded entry.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// The bytes written but not yet consumed by a decoded entry.
    #[must_use]
    pub fn pending_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Bytes the buffer holds without reallocating, counted from the first
    /// pending byte.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Bytes the next entry still needs, as reported by the last write.
    ///
    /// `None` before the first write and once the end of the archive has
    /// been reached.
    #[must_use]
    pub fn deficit(&self) -> Option<usize> {
        self.deficit
    }

    /// Whether the pending bytes start with a sector that is not a header.
    ///
    /// Nothing more will be decoded from this stream.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.deficit.is_none() && !self.buffer.is_empty()
    }

    /// Total bytes consumed by decoded entries.
    #[must_use]
    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    /// Number of regular files delivered to the sink.
    #[must_use]
    pub fn files_emitted(&self) -> usize {
        self.files
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        self.parser.config()
    }

    /// Get a reference to the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Get a mutable reference to the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the decoder and return the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S> fmt::Debug for StreamAccumulator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamAccumulator")
            .field("config", self.parser.config())
            .field("pending", &self.buffer.len())
            .field("capacity", &self.buffer.capacity())
            .field("deficit", &self.deficit)
            .field("consumed", &self.consumed)
            .field("files", &self.files)
            .finish_non_exhaustive()
    }
}
