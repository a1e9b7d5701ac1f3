//! Line-delimited JSON episode loader.
//!
//! [`open_records`] returns a [`RecordReader`]: a lazy, single-pass iterator
//! over the episodes in a results file. Blank lines are skipped; every other
//! line must be a JSON object with an `agent` string and a `metrics` object
//! holding all five fixed metrics. The first bad line ends the iteration.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{LoadError, RecordParseError, Result};
use crate::metric::{Metric, MetricValues};

/// One recorded episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRecord {
    /// Experimental condition (the `agent` field).
    pub condition: String,
    pub metrics: MetricValues,
}

impl EpisodeRecord {
    pub fn new(condition: impl Into<String>, metrics: MetricValues) -> Self {
        Self {
            condition: condition.into(),
            metrics,
        }
    }
}

/// Iterator over the episodes of an open results file.
///
/// Owns the file handle; it is closed when the reader is dropped, whether
/// iteration finished or stopped at an error. Every byte consumed is fed into
/// a SHA-256 digest, so [`RecordReader::digest`] describes exactly the data
/// that was aggregated.
pub struct RecordReader {
    path: PathBuf,
    reader: BufReader<File>,
    hasher: Sha256,
    buf: Vec<u8>,
    line: usize,
    done: bool,
}

/// Open `path` for reading episode records.
///
/// Fails with [`LoadError::SourceNotFound`] if the file does not exist.
pub fn open_records(path: &Path) -> Result<RecordReader> {
    let file = File::open(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => LoadError::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    tracing::debug!(path = %path.display(), "opened results file");

    Ok(RecordReader {
        path: path.to_path_buf(),
        reader: BufReader::new(file),
        hasher: Sha256::new(),
        buf: Vec::new(),
        line: 0,
        done: false,
    })
}

impl RecordReader {
    /// Number of physical lines consumed so far, blank lines included.
    pub fn lines_read(&self) -> usize {
        self.line
    }

    /// SHA-256 hex digest of the bytes consumed so far. Once the iterator
    /// is exhausted without error this is the digest of the whole file.
    pub fn digest(&self) -> String {
        hex::encode(self.hasher.clone().finalize())
    }

    /// Read the next physical line into `buf`, returning the length without
    /// its terminator, or `None` at end of file.
    fn read_line(&mut self) -> Option<std::io::Result<usize>> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.hasher.update(&self.buf);
                self.line += 1;
                let mut end = self.buf.len();
                if self.buf[..end].ends_with(b"\n") {
                    end -= 1;
                }
                if self.buf[..end].ends_with(b"\r") {
                    end -= 1;
                }
                Some(Ok(end))
            }
            Err(source) => Some(Err(source)),
        }
    }
}

impl Iterator for RecordReader {
    type Item = Result<EpisodeRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let bytes = match self.read_line()? {
                Ok(end) => self.buf[..end].to_vec(),
                Err(source) => {
                    self.done = true;
                    return Some(Err(LoadError::Io {
                        path: self.path.clone(),
                        source,
                    }));
                }
            };

            let parsed = match String::from_utf8(bytes) {
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => parse_record(self.line, &text),
                Err(source) => Err(LoadError::MalformedRecord {
                    line: self.line,
                    content: String::from_utf8_lossy(source.as_bytes()).into_owned(),
                    source: source.into(),
                }),
            };
            if parsed.is_err() {
                self.done = true;
            }
            return Some(parsed);
        }
    }
}

impl std::iter::FusedIterator for RecordReader {}

/// Parse a single line into an [`EpisodeRecord`]. `line` is 1-based and only
/// used for diagnostics.
pub fn parse_record(line: usize, text: &str) -> Result<EpisodeRecord> {
    let value: Value = serde_json::from_str(text).map_err(|source| LoadError::MalformedRecord {
        line,
        content: text.to_string(),
        source: source.into(),
    })?;

    let obj = value
        .as_object()
        .ok_or_else(|| LoadError::schema(line, "record is not a JSON object"))?;

    let condition = match obj.get("agent") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(LoadError::schema(line, "field `agent` is not a string")),
        None => return Err(LoadError::schema(line, "missing field `agent`")),
    };

    let raw = match obj.get("metrics") {
        Some(Value::Object(m)) => m,
        Some(_) => return Err(LoadError::schema(line, "field `metrics` is not an object")),
        None => return Err(LoadError::schema(line, "missing field `metrics`")),
    };

    let mut metrics = MetricValues::zero();
    for metric in Metric::ALL {
        let v = raw
            .get(metric.as_str())
            .ok_or_else(|| LoadError::schema(line, format!("missing metric `{}`", metric)))?
            .as_f64()
            .ok_or_else(|| LoadError::schema(line, format!("metric `{}` is not a number", metric)))?;
        if !(0.0..=1.0).contains(&v) {
            return Err(LoadError::schema(
                line,
                format!("metric `{}` = {} is outside [0, 1]", metric, v),
            ));
        }
        metrics[metric] = v;
    }

    Ok(EpisodeRecord { condition, metrics })
}
