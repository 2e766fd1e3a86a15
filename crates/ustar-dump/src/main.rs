//! Print the regular files of a USTAR archive as it is read.
//!
//! `ustar-dump` feeds a file (or standard input) through the streaming
//! decoder in fixed-size chunks and prints each file's name and content as
//! soon as the entry is complete.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tokio::io::{AsyncRead, AsyncWriteExt, BufWriter, Stdout};

use ustar_stream::stream::{FileEvent, FileSink, ParserConfig, StreamAccumulator};

/// ustar-dump
#[derive(Debug, Parser)]
#[clap(name = "ustar-dump", version)]
struct App {
    /// Archive to read, `-` or nothing for standard input
    path: Option<PathBuf>,

    /// Number of bytes handed to the decoder per write
    #[clap(long, default_value_t = 4096)]
    chunk_size: usize,

    /// Verify header checksums and cap entry sizes at 64 MiB
    #[clap(long)]
    strict: bool,

    /// Largest accepted entry content size in bytes
    #[clap(long)]
    max_entry_size: Option<u64>,

    /// Print names and sizes only
    #[clap(long)]
    list: bool,
}

impl App {
    fn config(&self) -> ParserConfig {
        let mut config = if self.strict {
            ParserConfig::strict()
        } else {
            ParserConfig::default()
        };
        if let Some(limit) = self.max_entry_size {
            config.max_entry_size = limit;
        }
        config
    }
}

/// Writes every file to standard output.
struct Printer {
    out: BufWriter<Stdout>,
    list: bool,
}

impl FileSink for Printer {
    async fn on_file(&mut self, file: FileEvent<'_>) -> Result<()> {
        let text = if self.list {
            format!("{}\t{}\n", file.content.len(), file.name)
        } else {
            format!(
                "{:?}\n{:?}\n\n",
                file.name,
                String::from_utf8_lossy(file.content)
            )
        };
        self.out.write_all(text.as_bytes()).await?;
        Ok(())
    }
}

async fn dump<R: AsyncRead + Unpin>(reader: R, app: &App) -> Result<()> {
    let printer = Printer {
        out: BufWriter::new(tokio::io::stdout()),
        list: app.list,
    };
    let mut decoder = StreamAccumulator::with_config(app.config(), printer);

    let read = decoder
        .feed_reader(reader, app.chunk_size)
        .await
        .context("decoding archive")?;
    decoder.sink_mut().out.flush().await?;

    info!(
        "{} files, {} of {read} bytes consumed, {} pending",
        decoder.files_emitted(),
        decoder.bytes_consumed(),
        decoder.pending()
    );
    if let Some(deficit) = decoder.deficit() {
        warn!("archive truncated: next entry needs {deficit} more bytes");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let app = App::parse();

    match &app.path {
        Some(path) if path.as_os_str() != "-" => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            dump(file, &app).await
        }
        _ => dump(tokio::io::stdin(), &app).await,
    }
}
