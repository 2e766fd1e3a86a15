//! Incremental decoding of USTAR tar archives.
//!
//! This crate decodes raw (uncompressed) USTAR archives and hands every
//! regular file it contains, name and content, to a consumer. The archive
//! does not need to be resident in memory: bytes can be fed in chunks of any
//! size, split at any offset, and the decoder reports exactly how many more
//! bytes it needs whenever the data at hand does not complete an entry.
//!
//! # Archive Layout
//!
//! A USTAR archive is a sequence of 512-byte sectors. Each entry starts with
//! a header sector, followed by the file content padded with arbitrary bytes
//! to the next sector boundary. The fields used by the decoder are:
//!
//! | Offset | Size | Field     | Description                              |
//! |--------|------|-----------|------------------------------------------|
//! | 0      | 100  | name      | File path (null-terminated if < 100)     |
//! | 124    | 12   | size      | Content size in octal ASCII              |
//! | 156    | 1    | typeflag  | Entry type, `\0` or `'0'` is a file      |
//! | 257    | 6    | magic     | `"ustar"` followed by NUL or space       |
//!
//! The full field table lives on [`UstarHeader`]. The archive ends at the
//! first sector that does not carry the `ustar` magic, which for well formed
//! archives is the first of two all-zero sectors.
//!
//! # Streaming
//!
//! [`StreamAccumulator`] owns a growable buffer. Every [`write`] appends a
//! chunk and decodes as many complete entries as possible, awaiting the
//! [`FileSink`] once per regular file, in archive order:
//!
//! ```
//! use ustar_stream::stream::{FileEvent, StreamAccumulator};
//!
//! # tokio_test::block_on(async {
//! let mut names = Vec::new();
//! let mut decoder = StreamAccumulator::with_sink(|file: FileEvent<'_>| {
//!     names.push(file.name.into_owned());
//! });
//!
//! // Not enough for a header sector yet
//! decoder.write(&[0u8; 100]).await.unwrap();
//! assert_eq!(decoder.deficit(), Some(412));
//! # });
//! ```
//!
//! For archives that are already in memory, see [`stream::parse_archive`]
//! and [`stream::Entries`].
//!
//! [`write`]: StreamAccumulator::write

pub mod header;
pub mod stream;

use std::borrow::Cow;

pub use header::{EntryType, UstarHeader};
pub use stream::{
    BoundedParser, FileEvent, FileSink, ParseOutcome, ParserConfig, Result, StreamAccumulator,
    StreamError,
};

/// Size of a tar sector (header block or content block) in bytes.
pub const SECTOR_SIZE: usize = 512;

/// Offset of the magic field within a header sector.
pub const MAGIC_OFFSET: usize = 257;

/// The bytes that identify a USTAR header sector.
///
/// Only these five bytes are compared; the byte that follows (NUL for POSIX
/// ustar, space for GNU) is not inspected.
pub const USTAR_MAGIC: &[u8; 5] = b"ustar";

// ============================================================================
// Sector classification
// ============================================================================

/// Check whether `buf` holds a USTAR header sector starting at `base`.
///
/// Returns `false` when the magic bytes are not (yet) present in `buf` or do
/// not match, which includes the all-zero sectors terminating an archive.
///
/// # Example
///
/// ```
/// use ustar_stream::is_header_sector;
///
/// let mut sector = [0u8; 512];
/// assert!(!is_header_sector(&sector, 0));
///
/// sector[257..262].copy_from_slice(b"ustar");
/// assert!(is_header_sector(&sector, 0));
/// assert!(!is_header_sector(&sector, 1));
/// ```
#[must_use]
pub fn is_header_sector(buf: &[u8], base: usize) -> bool {
    buf.get(base..)
        .and_then(|sector| sector.get(MAGIC_OFFSET..MAGIC_OFFSET + USTAR_MAGIC.len()))
        .is_some_and(|magic| magic == USTAR_MAGIC)
}

/// Require `buf` to start with a USTAR header sector.
///
/// # Errors
///
/// Returns [`StreamError::NotUstar`] if the magic is missing.
pub fn assert_ustar(buf: &[u8]) -> Result<()> {
    if is_header_sector(buf, 0) {
        Ok(())
    } else {
        Err(StreamError::NotUstar)
    }
}

/// Round `n` up to the next multiple of [`SECTOR_SIZE`].
///
/// `0` stays `0`; every other value maps to the smallest sector multiple
/// that is not below it.
#[must_use]
pub fn round_up_to_sector(n: usize) -> usize {
    n.next_multiple_of(SECTOR_SIZE)
}

// ============================================================================
// Field helpers
// ============================================================================

/// Parse an octal ASCII field leniently.
///
/// Leading spaces are skipped and the value ends at the first NUL or space.
/// Parsing stops at the first byte that is not an octal digit, so a field
/// such as `"12x"` yields `0o12` and a field without digits yields `0`.
///
/// # Example
///
/// ```
/// use ustar_stream::parse_octal;
///
/// assert_eq!(parse_octal(b"00000000052\0"), 42);
/// assert_eq!(parse_octal(b"   755 \0"), 0o755);
/// assert_eq!(parse_octal(b"garbage\0"), 0);
/// ```
#[must_use]
pub fn parse_octal(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .skip_while(|&&b| b == b' ')
        .take_while(|&&b| (b'0'..=b'7').contains(&b))
        .fold(0u64, |value, &b| {
            value.saturating_mul(8).saturating_add(u64::from(b - b'0'))
        })
}

/// Truncate a byte slice at the first null byte.
///
/// If no null byte is found, returns the entire slice.
#[must_use]
pub fn truncate_null(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(pos) => &bytes[..pos],
        None => bytes,
    }
}

/// Decode a NUL-terminated string field, one character per byte.
///
/// Bytes are mapped to the Unicode code point of the same value (Latin-1),
/// no multi-byte decoding takes place. Pure ASCII fields are borrowed.
#[must_use]
pub fn decode_str(field: &[u8]) -> Cow<'_, str> {
    let bytes = truncate_null(field);
    if bytes.is_ascii() {
        // ASCII is always valid UTF-8
        Cow::Borrowed(std::str::from_utf8(bytes).unwrap_or_default())
    } else {
        Cow::Owned(bytes.iter().copied().map(char::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn magic_at(offset: usize, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        buf[offset + MAGIC_OFFSET..offset + MAGIC_OFFSET + 5].copy_from_slice(USTAR_MAGIC);
        buf
    }

    #[test]
    fn test_round_up_to_sector() {
        assert_eq!(round_up_to_sector(0), 0);
        assert_eq!(round_up_to_sector(1), 512);
        assert_eq!(round_up_to_sector(511), 512);
        assert_eq!(round_up_to_sector(512), 512);
        assert_eq!(round_up_to_sector(513), 1024);
        assert_eq!(round_up_to_sector(512 + 42), 1024);
    }

    #[test]
    fn test_is_header_sector() {
        let buf = magic_at(0, 262);
        assert!(is_header_sector(&buf, 0));

        // Magic shifted by one sector
        let buf = magic_at(512, 1024);
        assert!(!is_header_sector(&buf, 0));
        assert!(is_header_sector(&buf, 512));
    }

    #[test]
    fn test_is_header_sector_rejects() {
        // All-zero terminator
        assert!(!is_header_sector(&[0u8; 512], 0));

        // Partial magic
        let mut buf = [0u8; 512];
        buf[260..262].copy_from_slice(b"ar");
        assert!(!is_header_sector(&buf, 0));

        // Magic cut off by the end of the buffer
        let buf = magic_at(0, 512);
        assert!(!is_header_sector(&buf[..261], 0));
        assert!(!is_header_sector(&buf, 300));
        assert!(!is_header_sector(&buf, usize::MAX));
    }

    #[test]
    fn test_assert_ustar() {
        assert!(assert_ustar(&magic_at(0, 512)).is_ok());
        assert!(matches!(assert_ustar(&[1, 2, 3]), Err(StreamError::NotUstar)));
    }

    #[test]
    fn test_parse_octal() {
        assert_eq!(parse_octal(b"00000000052\0"), 42);
        assert_eq!(parse_octal(b"0000644\0"), 0o644);
        assert_eq!(parse_octal(b"     123 "), 0o123);
        assert_eq!(parse_octal(b"77777777777\0"), 0o77777777777);
        assert_eq!(parse_octal(b"7"), 7);
    }

    #[test]
    fn test_parse_octal_lenient() {
        // No digits at all
        assert_eq!(parse_octal(b"\0\0\0\0"), 0);
        assert_eq!(parse_octal(b"        "), 0);
        assert_eq!(parse_octal(b"notnum\0"), 0);
        // Stops at the first non-octal byte
        assert_eq!(parse_octal(b"12x4\0"), 0o12);
        assert_eq!(parse_octal(b"178\0"), 0o17);
        // Terminated by NUL before more digits
        assert_eq!(parse_octal(b"1\0 7"), 1);
    }

    #[test]
    fn test_truncate_null() {
        assert_eq!(truncate_null(b"hello\0world"), b"hello");
        assert_eq!(truncate_null(b"no null here"), b"no null here");
        assert_eq!(truncate_null(b"\0empty"), b"");
    }

    #[test]
    fn test_decode_str() {
        assert_eq!(decode_str(b"abc"), "abc");
        assert_eq!(decode_str(b"abc\0\0\0"), "abc");
        assert!(matches!(decode_str(b"abc\0"), Cow::Borrowed(_)));

        // One character per byte, no UTF-8 decoding
        let decoded = decode_str(&[b'c', 0xE9, 0]);
        assert_eq!(decoded, "c\u{e9}");
        assert_eq!(decoded.chars().count(), 2);
    }
}
