//! Zerocopy view of a USTAR header sector.
//!
//! The header is decoded declaratively: [`UstarHeader`] is a `repr(C)` struct
//! whose fields cover the 512-byte sector exactly, so a sector can be viewed
//! as a header without copying and every field is addressed by name rather
//! than by offset arithmetic.
//!
//! | Offset | Size | Field     | Description                              |
//! |--------|------|-----------|------------------------------------------|
//! | 0      | 100  | name      | File path (null-terminated if < 100)     |
//! | 100    | 8    | mode      | File mode in octal ASCII                 |
//! | 108    | 8    | uid       | Owner user ID in octal ASCII             |
//! | 116    | 8    | gid       | Owner group ID in octal ASCII            |
//! | 124    | 12   | size      | File size in octal ASCII                 |
//! | 136    | 12   | mtime     | Modification time (Unix epoch, octal)    |
//! | 148    | 8    | checksum  | Header checksum in octal ASCII           |
//! | 156    | 1    | typeflag  | Entry type (see [`EntryType`])           |
//! | 157    | 100  | linkname  | Link target for hard/symbolic links      |
//! | 257    | 6    | magic     | "ustar\0" (or "ustar " for GNU)          |
//! | 263    | 2    | version   | "00"                                     |
//! | 265    | 32   | uname     | Owner user name                          |
//! | 297    | 32   | gname     | Owner group name                         |
//! | 329    | 8    | devmajor  | Device major number                      |
//! | 337    | 8    | devminor  | Device minor number                      |
//! | 345    | 155  | prefix    | Path prefix for long names               |
//! | 500    | 12   | pad       | Unused                                   |

use std::borrow::Cow;
use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::stream::{Result, StreamError};
use crate::{decode_str, parse_octal, truncate_null, SECTOR_SIZE};

/// Range of the checksum field, summed as spaces when computing the checksum.
const CHECKSUM_RANGE: std::ops::Range<usize> = 148..156;

/// USTAR (POSIX.1-1988) header sector with named fields.
///
/// All numeric fields are octal ASCII and are decoded leniently: a field
/// without digits reads as `0`. Only the name, size and typeflag influence
/// decoding; the remaining fields are exposed for completeness.
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct UstarHeader {
    /// File path name (null-terminated if shorter than 100 bytes).
    pub name: [u8; 100],
    /// File mode in octal ASCII.
    pub mode: [u8; 8],
    /// Owner user ID in octal ASCII.
    pub uid: [u8; 8],
    /// Owner group ID in octal ASCII.
    pub gid: [u8; 8],
    /// File size in octal ASCII.
    pub size: [u8; 12],
    /// Modification time as Unix timestamp in octal ASCII.
    pub mtime: [u8; 12],
    /// Header checksum in octal ASCII.
    pub checksum: [u8; 8],
    /// Entry type flag.
    pub typeflag: u8,
    /// Link target name for hard/symbolic links.
    pub linkname: [u8; 100],
    /// Magic string identifying the format.
    pub magic: [u8; 6],
    /// Format version.
    pub version: [u8; 2],
    /// Owner user name (null-terminated).
    pub uname: [u8; 32],
    /// Owner group name (null-terminated).
    pub gname: [u8; 32],
    /// Device major number in octal ASCII.
    pub devmajor: [u8; 8],
    /// Device minor number in octal ASCII.
    pub devminor: [u8; 8],
    /// Path prefix for names longer than 100 bytes.
    pub prefix: [u8; 155],
    /// Padding to fill the 512-byte sector.
    pub pad: [u8; 12],
}

impl UstarHeader {
    /// View a full sector as a header.
    #[must_use]
    pub fn from_sector(sector: &[u8; SECTOR_SIZE]) -> &UstarHeader {
        zerocopy::transmute_ref!(sector)
    }

    /// View the first sector of `buf` as a header.
    ///
    /// Returns `None` if `buf` is shorter than a sector.
    #[must_use]
    pub fn from_prefix(buf: &[u8]) -> Option<&UstarHeader> {
        UstarHeader::ref_from_prefix(buf)
            .ok()
            .map(|(header, _)| header)
    }

    /// Get the raw sector bytes.
    #[must_use]
    pub fn as_sector(&self) -> &[u8; SECTOR_SIZE] {
        zerocopy::transmute_ref!(self)
    }

    /// Get the file name, one character per byte.
    #[must_use]
    pub fn name(&self) -> Cow<'_, str> {
        decode_str(&self.name)
    }

    /// Get the raw name bytes up to the first NUL.
    #[must_use]
    pub fn name_bytes(&self) -> &[u8] {
        truncate_null(&self.name)
    }

    /// Get the content size in bytes.
    #[must_use]
    pub fn entry_size(&self) -> u64 {
        parse_octal(&self.size)
    }

    /// Get the raw typeflag byte.
    #[must_use]
    pub fn typeflag(&self) -> u8 {
        self.typeflag
    }

    /// Get the entry type.
    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        EntryType::from_byte(self.typeflag)
    }

    /// Whether this entry carries regular file content.
    #[must_use]
    pub fn is_regular_file(&self) -> bool {
        self.entry_type() == EntryType::Regular
    }

    /// Get the file mode (permissions).
    #[must_use]
    pub fn mode(&self) -> u32 {
        parse_octal(&self.mode) as u32
    }

    /// Get the owner user ID.
    #[must_use]
    pub fn uid(&self) -> u64 {
        parse_octal(&self.uid)
    }

    /// Get the owner group ID.
    #[must_use]
    pub fn gid(&self) -> u64 {
        parse_octal(&self.gid)
    }

    /// Get the modification time as a Unix timestamp.
    #[must_use]
    pub fn mtime(&self) -> u64 {
        parse_octal(&self.mtime)
    }

    /// Get the link target name.
    #[must_use]
    pub fn link_name(&self) -> Cow<'_, str> {
        decode_str(&self.linkname)
    }

    /// Get the owner user name.
    #[must_use]
    pub fn username(&self) -> Cow<'_, str> {
        decode_str(&self.uname)
    }

    /// Get the owner group name.
    #[must_use]
    pub fn groupname(&self) -> Cow<'_, str> {
        decode_str(&self.gname)
    }

    /// Get the device major number.
    #[must_use]
    pub fn device_major(&self) -> u32 {
        parse_octal(&self.devmajor) as u32
    }

    /// Get the device minor number.
    #[must_use]
    pub fn device_minor(&self) -> u32 {
        parse_octal(&self.devminor) as u32
    }

    /// Get the path prefix.
    #[must_use]
    pub fn prefix(&self) -> Cow<'_, str> {
        decode_str(&self.prefix)
    }

    /// Get the checksum stored in the header.
    #[must_use]
    pub fn stored_checksum(&self) -> u64 {
        parse_octal(&self.checksum)
    }

    /// Compute the header checksum.
    ///
    /// This is the unsigned sum of all header bytes, with the checksum
    /// field (bytes 148..156) counted as spaces.
    #[must_use]
    pub fn compute_checksum(&self) -> u64 {
        self.as_sector()
            .iter()
            .enumerate()
            .map(|(i, &byte)| {
                if CHECKSUM_RANGE.contains(&i) {
                    u64::from(b' ')
                } else {
                    u64::from(byte)
                }
            })
            .sum()
    }

    /// Verify the header checksum.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::ChecksumMismatch`] if the stored checksum does
    /// not match the computed one.
    pub fn verify_checksum(&self) -> Result<()> {
        let expected = self.stored_checksum();
        let computed = self.compute_checksum();
        if expected == computed {
            Ok(())
        } else {
            Err(StreamError::ChecksumMismatch { expected, computed })
        }
    }
}

impl fmt::Debug for UstarHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UstarHeader")
            .field("name", &self.name())
            .field("size", &self.entry_size())
            .field("entry_type", &self.entry_type())
            .field("mode", &format_args!("{:04o}", self.mode()))
            .field("magic", &String::from_utf8_lossy(truncate_null(&self.magic)))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Entry Type
// ============================================================================

/// Tar entry type, stored as a single byte at offset 156.
///
/// Only [`EntryType::Regular`] entries are reported by the decoder, every
/// other type is skipped together with its content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Regular file (type '0' or '\0' for old tar compatibility).
    Regular,
    /// Hard link to another file in the archive (type '1').
    Link,
    /// Symbolic link (type '2').
    Symlink,
    /// Character device (type '3').
    Char,
    /// Block device (type '4').
    Block,
    /// Directory (type '5').
    Directory,
    /// FIFO/named pipe (type '6').
    Fifo,
    /// Contiguous file (type '7').
    Contiguous,
    /// Any other type, including GNU and PAX extension headers.
    Other(u8),
}

impl EntryType {
    /// Parse an entry type from a raw byte value.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'0' | b'\0' => EntryType::Regular,
            b'1' => EntryType::Link,
            b'2' => EntryType::Symlink,
            b'3' => EntryType::Char,
            b'4' => EntryType::Block,
            b'5' => EntryType::Directory,
            b'6' => EntryType::Fifo,
            b'7' => EntryType::Contiguous,
            other => EntryType::Other(other),
        }
    }

    /// Convert an entry type to its raw byte representation.
    ///
    /// Note that `Regular` is encoded as '0', not '\0'.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        match self {
            EntryType::Regular => b'0',
            EntryType::Link => b'1',
            EntryType::Symlink => b'2',
            EntryType::Char => b'3',
            EntryType::Block => b'4',
            EntryType::Directory => b'5',
            EntryType::Fifo => b'6',
            EntryType::Contiguous => b'7',
            EntryType::Other(b) => b,
        }
    }
}

impl From<u8> for EntryType {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

impl From<EntryType> for u8 {
    fn from(entry_type: EntryType) -> Self {
        entry_type.to_byte()
    }
}
