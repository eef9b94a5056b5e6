//! NERL WARC - Web-archive record iteration and parsing
//!
//! Splits a (possibly gzipped) WARC stream into raw record blocks and
//! parses each block's header into a document identifier plus payload.
//! Records without a `WARC-TREC-ID` header are unusable and skipped by
//! callers; nothing in this crate fails per record.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// Record-start marker delimiting raw record blocks
pub const RECORD_MARKER: &str = "WARC/1.0";

/// Header carrying the canonical document identifier
const TREC_ID_HEADER: &str = "WARC-TREC-ID";

// ============================================================================
// Record parsing
// ============================================================================

/// One parsed archive record: document id and textual payload.
///
/// Parsing never fails; a record missing the identifier header is simply
/// not usable and carries no payload.
#[derive(Debug, Clone)]
pub struct WarcRecord {
    trec_id: Option<String>,
    payload: String,
}

impl WarcRecord {
    /// Parse the raw text of one record block (marker line excluded).
    ///
    /// Header lines are scanned up to the first blank line. If the block
    /// then continues with an embedded `HTTP/` response header section,
    /// that section is skipped up to its own blank line. Everything left
    /// over is the payload.
    pub fn parse(raw: &str) -> Self {
        let mut cursor = LineCursor::new(raw.trim());
        let mut trec_id: Option<String> = None;

        // Primary WARC header block
        loop {
            let Some(line) = cursor.next_line() else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            if trec_id.is_none() && line.contains(TREC_ID_HEADER) {
                if let Some((_, value)) = line.split_once("WARC-TREC-ID:") {
                    trec_id = Some(value.trim().to_string());
                }
            }
        }

        if trec_id.is_none() {
            return Self {
                trec_id: None,
                payload: String::new(),
            };
        }

        // Embedded transport response headers, if present
        let mut leftover = cursor.next_line().unwrap_or("").trim().to_string();
        if leftover.starts_with("HTTP/") {
            leftover.clear();
            while let Some(line) = cursor.next_line() {
                if line.trim().is_empty() {
                    break;
                }
            }
        }

        let payload = format!("{}{}", leftover, cursor.rest().trim());

        Self {
            trec_id,
            payload,
        }
    }

    /// Whether the record carried the required identifier header
    pub fn is_usable(&self) -> bool {
        self.trec_id.is_some()
    }

    /// Document identifier, if the record is usable
    pub fn trec_id(&self) -> Option<&str> {
        self.trec_id.as_deref()
    }

    /// Record payload; empty for unusable records
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Line-oriented cursor over a borrowed string
struct LineCursor<'a> {
    rest: &'a str,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        match self.rest.find('\n') {
            Some(idx) => {
                let line = &self.rest[..idx];
                self.rest = &self.rest[idx + 1..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = "";
                Some(line)
            }
        }
    }

    fn rest(&self) -> &'a str {
        self.rest
    }
}

// ============================================================================
// Archive iteration
// ============================================================================

/// Iterator over raw record blocks in a WARC stream.
///
/// Blocks are delimited by lines starting with [`RECORD_MARKER`]; the
/// marker line itself is not part of the yielded block. Bytes are decoded
/// lossily, as noisy web content routinely contains invalid UTF-8.
pub struct RecordBlocks<R: BufRead> {
    reader: R,
    line_buf: Vec<u8>,
    block: String,
    started: bool,
    done: bool,
}

impl<R: BufRead> RecordBlocks<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_buf: Vec::new(),
            block: String::new(),
            started: false,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for RecordBlocks<R> {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.line_buf.clear();
            match self.reader.read_until(b'\n', &mut self.line_buf) {
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
                Ok(0) => {
                    self.done = true;
                    if self.started && !self.block.trim().is_empty() {
                        return Some(Ok(std::mem::take(&mut self.block)));
                    }
                    return None;
                }
                Ok(_) => {
                    let line = String::from_utf8_lossy(&self.line_buf);
                    if line.trim_start().starts_with(RECORD_MARKER) {
                        let previous = std::mem::take(&mut self.block);
                        self.started = true;
                        if !previous.trim().is_empty() {
                            return Some(Ok(previous));
                        }
                    } else if self.started {
                        self.block.push_str(&line);
                    }
                }
            }
        }
    }
}

/// Open an archive file for record iteration.
///
/// Files ending in `.gz` are transparently decompressed with a
/// multi-member gzip decoder, matching how WARC collections are shipped.
pub fn open_archive(
    path: impl AsRef<Path>,
) -> std::io::Result<RecordBlocks<BufReader<Box<dyn std::io::Read + Send>>>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader: Box<dyn std::io::Read + Send> =
        if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
    Ok(RecordBlocks::new(BufReader::new(reader)))
}

// ============================================================================
// Tests
// ============================================================================
