//! JSONL reading operations.
//!
//! [`JsonlReader`] wraps any async reader with buffering and 1-based line
//! tracking. The resilient entry points ([`JsonlReader::stream_resilient`],
//! [`read_jsonl_resilient`]) skip damaged lines and report them as
//! [`Warning`]s rather than aborting the load, which is what lets a store
//! survive a hand-edited or truncated data file.

use crate::error::Result;
use crate::warning::{Warning, WarningCollector};
use futures::stream::Stream;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::pin::pin;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Async reader for JSONL (JSON Lines) data.
///
/// Tracks the line number of the last line read (1-based; 0 before any read)
/// so warnings and errors can point at the exact offending line.
///
/// # Examples
///
/// ```no_run
/// use trellis_jsonl::JsonlReader;
/// use tokio::fs::File;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("data.jsonl").await?;
/// let reader = JsonlReader::new(file);
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    reader: BufReader<R>,
    /// 1-based line counter; 0 before the first line is read.
    line_number: usize,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
        }
    }

    /// Creates a new `JsonlReader` with a custom buffer capacity, for sources
    /// whose typical line length is known.
    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            line_number: 0,
        }
    }

    /// Returns the 1-based line number of the last line read, or 0 before any
    /// line has been read.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next record, failing on the first malformed line.
    ///
    /// Blank and whitespace-only lines are skipped silently. Returns
    /// `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reader fails or a non-empty line is
    /// not valid JSON for `T`.
    pub async fn next_record<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        loop {
            let mut line = String::new();
            let bytes = self.reader.read_line(&mut line).await?;
            if bytes == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Ok(Some(serde_json::from_str(trimmed)?));
        }
    }

    /// Consumes the reader and returns a stream of successfully parsed
    /// records plus a collector receiving a [`Warning`] per damaged line.
    ///
    /// Blank and whitespace-only lines are skipped without a warning.
    /// Malformed lines (including type mismatches for `T`) become
    /// [`Warning::MalformedJson`] with their 1-based line number. A read
    /// error on the underlying source ends the stream after recording a
    /// [`Warning::SkippedLine`] for the position where it occurred.
    ///
    /// The returned collector is a clone of the one captured by the stream,
    /// so it can be inspected while streaming or drained with
    /// [`WarningCollector::into_warnings`] afterwards.
    pub fn stream_resilient<T>(self) -> (impl Stream<Item = T>, WarningCollector)
    where
        T: DeserializeOwned,
    {
        let collector = WarningCollector::new();
        let sink = collector.clone();

        let stream = futures::stream::unfold((self, sink), |(mut reader, sink)| async move {
            loop {
                let mut line = String::new();
                match reader.reader.read_line(&mut line).await {
                    Ok(0) => return None,
                    Ok(_) => {
                        reader.line_number += 1;
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<T>(trimmed) {
                            Ok(record) => return Some((record, (reader, sink))),
                            Err(e) => {
                                sink.add(Warning::MalformedJson {
                                    line_number: reader.line_number,
                                    error: e.to_string(),
                                });
                            }
                        }
                    }
                    Err(e) => {
                        sink.add(Warning::SkippedLine {
                            line_number: reader.line_number + 1,
                            reason: format!("read error: {e}"),
                        });
                        return None;
                    }
                }
            }
        });

        (stream, collector)
    }
}

impl<R: AsyncRead + Unpin + Default> Default for JsonlReader<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}

/// Reads an entire JSONL file, skipping damaged lines.
///
/// Returns the successfully parsed records in file order together with one
/// [`Warning`] per line that could not be used. Only a failure to open or
/// read the file itself is an error; content damage never is.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
///
/// # Examples
///
/// ```no_run
/// use trellis_jsonl::read_jsonl_resilient;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Record {
///     id: u32,
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (records, warnings) = read_jsonl_resilient::<Record, _>("data.jsonl").await?;
/// for warning in &warnings {
///     eprintln!("{warning}");
/// }
/// println!("loaded {} records", records.len());
/// # Ok(())
/// # }
/// ```
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    use futures::StreamExt;

    let file = tokio::fs::File::open(path).await?;
    let reader = JsonlReader::new(file);
    let (stream, collector) = reader.stream_resilient::<T>();
    let records = pin!(stream).collect::<Vec<T>>().await;
    Ok((records, collector.into_warnings()))
}
