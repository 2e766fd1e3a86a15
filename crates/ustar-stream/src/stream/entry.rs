//! Decoded entries and the file events handed to sinks.

use std::borrow::Cow;

use crate::header::{EntryType, UstarHeader};
use crate::SECTOR_SIZE;

/// A regular file found in the archive.
///
/// # Lifetime
///
/// The content borrows from the decoder's buffer and is only valid for the
/// duration of the [`FileSink::on_file`] call it is passed to. Use
/// [`FileEvent::to_owned_file`] to keep it.
///
/// [`FileSink::on_file`]: super::FileSink::on_file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent<'a> {
    /// File name from the header, one character per byte.
    pub name: Cow<'a, str>,

    /// File content, exactly `size` bytes with the sector padding removed.
    pub content: &'a [u8],
}

impl FileEvent<'_> {
    /// Copy the event out of the decoder's buffer.
    #[must_use]
    pub fn to_owned_file(&self) -> OwnedFile {
        OwnedFile {
            name: self.name.clone().into_owned(),
            content: self.content.to_vec(),
        }
    }
}

/// An owned copy of a [`FileEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedFile {
    /// File name.
    pub name: String,
    /// File content.
    pub content: Vec<u8>,
}

/// A complete entry: header, content and the padded span it occupies.
///
/// Entries are only produced once all of their bytes, padding included, are
/// present in the buffer being parsed.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    header: &'a UstarHeader,
    content: &'a [u8],
    span: usize,
}

impl<'a> Entry<'a> {
    /// Slice the entry out of `buf`.
    ///
    /// `buf` starts at the header sector and holds at least `span` bytes,
    /// where `span` is the header plus `size` rounded up to a sector.
    pub(crate) fn extract(header: &'a UstarHeader, buf: &'a [u8], size: usize, span: usize) -> Self {
        debug_assert!(buf.len() >= span && span >= SECTOR_SIZE + size);
        Entry {
            header,
            content: &buf[SECTOR_SIZE..SECTOR_SIZE + size],
            span,
        }
    }

    /// The header sector.
    #[must_use]
    pub fn header(&self) -> &'a UstarHeader {
        self.header
    }

    /// The entry content without padding.
    #[must_use]
    pub fn content(&self) -> &'a [u8] {
        self.content
    }

    /// Bytes occupied by the entry: header, content and padding.
    ///
    /// Always a multiple of 512.
    #[must_use]
    pub fn span(&self) -> usize {
        self.span
    }

    /// The entry type.
    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        self.header.entry_type()
    }

    /// The event to emit for this entry, if it is a regular file.
    ///
    /// Directories, links, devices and unknown types yield `None`.
    #[must_use]
    pub fn file_event(&self) -> Option<FileEvent<'a>> {
        if !self.header.is_regular_file() {
            return None;
        }
        Some(FileEvent {
            name: self.header.name(),
            content: self.content,
        })
    }
}
