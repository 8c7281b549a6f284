//! Machine-readable output for caption sets and batch results.
//!
//! `--format json` writes one document (a caption set, or an array of batch
//! records); `--format jsonl` streams one object per line as results arrive.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::CaptionSet;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON document
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Outcome for one image in a batch run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchRecord {
    Ok {
        image: String,
        #[serde(flatten)]
        captions: Box<CaptionSet>,
    },
    Failed {
        image: String,
        error: String,
    },
}

impl BatchRecord {
    pub fn image(&self) -> &str {
        match self {
            BatchRecord::Ok { image, .. } | BatchRecord::Failed { image, .. } => image,
        }
    }
}

/// Serializes caption results to JSON or JSONL.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// `pretty` only affects JSON; JSONL is always one object per line.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a single item.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty && self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write many items: a JSON array, or one line each for JSONL.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, items)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, items).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.items_written += items.len();
            }
            OutputFormat::JsonLines => {
                for item in items {
                    self.write(item)?;
                }
            }
        }
        Ok(())
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
