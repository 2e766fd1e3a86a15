//! Incremental USTAR decoding with byte-deficit backpressure.
//!
//! Decoding is split in two layers:
//!
//! - [`BoundedParser`] works on a buffer it does not own. It decodes every
//!   complete entry at the front of the buffer and stops as soon as the next
//!   entry is not fully present, reporting how many bytes are missing. It
//!   never consumes part of an entry.
//! - [`StreamAccumulator`] owns a growable buffer fed by [`write`] calls,
//!   runs the parser over it, retires the bytes of completed entries and
//!   reserves room for the reported deficit ahead of the next chunk.
//!
//! Regular files are delivered to a [`FileSink`]. The sink is awaited before
//! any further byte is looked at, so files arrive strictly in archive order
//! and at most one is being handled at a time.
//!
//! # Example
//!
//! ```
//! use ustar_stream::stream::{FileEvent, FileSink, StreamAccumulator};
//!
//! struct Names(Vec<String>);
//!
//! impl FileSink for Names {
//!     async fn on_file(&mut self, file: FileEvent<'_>) -> anyhow::Result<()> {
//!         self.0.push(file.name.into_owned());
//!         Ok(())
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let mut decoder = StreamAccumulator::with_sink(Names(Vec::new()));
//! for chunk in [&[0u8; 300][..], &[0u8; 724][..]] {
//!     decoder.write(chunk).await.unwrap();
//! }
//! // Two zero sectors end the archive, they are never consumed.
//! assert_eq!(decoder.pending(), 1024);
//! assert!(decoder.sink().0.is_empty());
//! # });
//! ```
//!
//! [`write`]: StreamAccumulator::write

mod accumulator;
mod config;
mod entry;
mod error;
mod parser;
mod sink;

pub use accumulator::StreamAccumulator;
pub use config::ParserConfig;
pub use entry::{Entry, FileEvent, OwnedFile};
pub use error::{Result, StreamError};
pub use parser::{parse_archive, BoundedParser, Entries, ParseOutcome, Step};
pub use sink::{Discard, FileSink};
