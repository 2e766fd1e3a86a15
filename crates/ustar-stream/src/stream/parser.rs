//! Bounded parser: decodes every complete entry at the front of a buffer.

use log::{debug, trace};

use crate::header::UstarHeader;
use crate::{assert_ustar, is_header_sector, SECTOR_SIZE};

use super::config::ParserConfig;
use super::entry::Entry;
use super::error::{Result, StreamError};
use super::sink::FileSink;

/// Result of one [`BoundedParser::try_parse`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Bytes taken by complete entries, always a multiple of 512.
    pub consumed: usize,

    /// Bytes missing before the next entry can be decoded.
    ///
    /// `None` when parsing stopped at a sector without the `ustar` magic,
    /// which marks the end of the archive.
    pub deficit: Option<usize>,

    /// Regular files delivered to the sink.
    pub files: usize,
}

/// What the parser finds at the front of a buffer.
#[derive(Debug, Clone, Copy)]
pub enum Step<'a> {
    /// A complete entry, padding included.
    Entry(Entry<'a>),
    /// The next entry needs this many more bytes.
    NeedMore(usize),
    /// The buffer starts with a sector that is not a USTAR header.
    End,
}

/// Decodes USTAR entries from a buffer it does not own.
///
/// The parser never consumes part of an entry: an entry's header is only
/// decoded once the header, the content and the padding up to the next
/// sector boundary are all present. Until then it reports the exact number
/// of missing bytes, so a caller can retry with a longer buffer without
/// anything having been interpreted from incomplete data.
///
/// # Example
///
/// ```
/// use ustar_stream::stream::{BoundedParser, Step};
///
/// let parser = BoundedParser::default();
/// assert!(matches!(parser.step(&[0u8; 100]).unwrap(), Step::NeedMore(412)));
/// assert!(matches!(parser.step(&[0u8; 512]).unwrap(), Step::End));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BoundedParser {
    config: ParserConfig,
}

impl BoundedParser {
    /// Create a parser with the given configuration.
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Look at the entry at the front of `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::EntryTooLarge`] if the header announces more
    /// content than the configuration allows, and
    /// [`StreamError::ChecksumMismatch`] in checksum-verifying mode.
    pub fn step<'a>(&self, buf: &'a [u8]) -> Result<Step<'a>> {
        let Some(header) = UstarHeader::from_prefix(buf) else {
            return Ok(Step::NeedMore(SECTOR_SIZE - buf.len()));
        };
        if !is_header_sector(buf, 0) {
            return Ok(Step::End);
        }

        let size = header.entry_size();
        if size > self.config.max_entry_size {
            return Err(StreamError::EntryTooLarge {
                size,
                limit: self.config.max_entry_size,
            });
        }
        let (content_len, span) = entry_span(size).ok_or(StreamError::EntryTooLarge {
            size,
            limit: usize::MAX as u64,
        })?;
        if buf.len() < span {
            return Ok(Step::NeedMore(span - buf.len()));
        }

        if self.config.verify_checksum {
            header.verify_checksum()?;
        }
        Ok(Step::Entry(Entry::extract(header, buf, content_len, span)))
    }

    /// Decode every complete entry at the front of `buf`.
    ///
    /// Regular files are handed to `sink` one at a time, each call awaited
    /// before the next entry is examined. Parsing stops at the first entry
    /// that is not complete (reported as a deficit) or at the first sector
    /// without the `ustar` magic.
    ///
    /// # Errors
    ///
    /// See [`step`](Self::step); sink failures are returned as
    /// [`StreamError::Sink`]. Entries delivered before the error are lost
    /// from the outcome; use a [`StreamAccumulator`] to keep track of them.
    ///
    /// [`StreamAccumulator`]: super::StreamAccumulator
    pub async fn try_parse<S: FileSink>(&self, buf: &[u8], sink: &mut S) -> Result<ParseOutcome> {
        let mut outcome = ParseOutcome::default();
        self.parse_into(buf, sink, &mut outcome).await?;
        Ok(outcome)
    }

    /// Like [`try_parse`](Self::try_parse), but records progress in
    /// `outcome` as it goes so that it survives an error.
    pub(crate) async fn parse_into<S: FileSink>(
        &self,
        buf: &[u8],
        sink: &mut S,
        outcome: &mut ParseOutcome,
    ) -> Result<()> {
        outcome.deficit = None;
        loop {
            match self.step(&buf[outcome.consumed..])? {
                Step::Entry(entry) => {
                    trace!(
                        "entry {:?} type {:?} at {}: {} bytes, span {}",
                        entry.header().name(),
                        entry.entry_type(),
                        outcome.consumed,
                        entry.content().len(),
                        entry.span()
                    );
                    if let Some(file) = entry.file_event() {
                        sink.on_file(file).await?;
                        outcome.files += 1;
                    }
                    outcome.consumed += entry.span();
                }
                Step::NeedMore(deficit) => {
                    outcome.deficit = Some(deficit);
                    return Ok(());
                }
                Step::End => {
                    debug!("no ustar header at offset {}", outcome.consumed);
                    return Ok(());
                }
            }
        }
    }

    /// Parse a complete archive held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::NotUstar`] if `data` does not start with a
    /// USTAR header, otherwise as [`try_parse`](Self::try_parse).
    pub async fn parse_archive<S: FileSink>(
        &self,
        data: &[u8],
        sink: &mut S,
    ) -> Result<ParseOutcome> {
        assert_ustar(data)?;
        self.try_parse(data, sink).await
    }

    /// Iterate over the complete entries of an in-memory buffer.
    pub fn entries<'a>(&'a self, buf: &'a [u8]) -> Entries<'a> {
        Entries {
            parser: self,
            buf,
            consumed: 0,
            deficit: None,
            done: false,
        }
    }
}

/// Parse a complete archive held in memory with the default configuration.
///
/// # Errors
///
/// See [`BoundedParser::parse_archive`].
pub async fn parse_archive<S: FileSink>(data: &[u8], sink: &mut S) -> Result<ParseOutcome> {
    BoundedParser::default().parse_archive(data, sink).await
}

/// Content length and padded span (header included) of an entry, if both
/// can be addressed in memory.
fn entry_span(size: u64) -> Option<(usize, usize)> {
    let content_len = usize::try_from(size).ok()?;
    let span = content_len
        .checked_add(SECTOR_SIZE)?
        .checked_next_multiple_of(SECTOR_SIZE)?;
    Some((content_len, span))
}

/// Iterator over the complete entries at the front of a buffer.
///
/// Yields every entry type, regular files or not. Iteration ends at the end
/// of the archive or at the first incomplete entry, see [`deficit`].
///
/// [`deficit`]: Entries::deficit
#[derive(Debug)]
pub struct Entries<'a> {
    parser: &'a BoundedParser,
    buf: &'a [u8],
    consumed: usize,
    deficit: Option<usize>,
    done: bool,
}

impl Entries<'_> {
    /// Bytes taken by the entries yielded so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Bytes missing for the next entry, once iteration stopped on it.
    #[must_use]
    pub fn deficit(&self) -> Option<usize> {
        self.deficit
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<Entry<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let buf = self.buf;
        match self.parser.step(&buf[self.consumed..]) {
            Ok(Step::Entry(entry)) => {
                self.consumed += entry.span();
                Some(Ok(entry))
            }
            Ok(Step::NeedMore(deficit)) => {
                self.deficit = Some(deficit);
                self.done = true;
                None
            }
            Ok(Step::End) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
