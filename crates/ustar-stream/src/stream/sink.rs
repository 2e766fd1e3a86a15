//! Consumers of decoded files.

use super::entry::FileEvent;

/// Receives every regular file decoded from an archive, in archive order.
///
/// The returned future is awaited to completion before the decoder looks at
/// any further byte. A sink error aborts the current parse and is returned
/// from it as [`StreamError::Sink`]; the entry that was being delivered is
/// not consumed.
///
/// Synchronous closures taking a [`FileEvent`] implement this trait
/// directly:
///
/// ```
/// use ustar_stream::stream::{FileEvent, StreamAccumulator};
///
/// let mut count = 0;
/// let decoder = StreamAccumulator::with_sink(|_: FileEvent<'_>| count += 1);
/// # drop(decoder);
/// ```
///
/// [`StreamError::Sink`]: super::StreamError::Sink
#[allow(async_fn_in_trait)]
pub trait FileSink {
    /// Handle one regular file.
    async fn on_file(&mut self, file: FileEvent<'_>) -> anyhow::Result<()>;
}

impl<F> FileSink for F
where
    F: FnMut(FileEvent<'_>),
{
    async fn on_file(&mut self, file: FileEvent<'_>) -> anyhow::Result<()> {
        self(file);
        Ok(())
    }
}

/// A sink that ignores every file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl FileSink for Discard {
    async fn on_file(&mut self, _file: FileEvent<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}
