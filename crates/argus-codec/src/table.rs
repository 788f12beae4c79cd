//! Typed tables: the field codec bound to the record framing.
//!
//! A typed table is a CSV object whose first record is the literal
//! column-name list and whose remaining records are rows of
//! [`FieldValue`] cells encoded with [`encode_field`]. Tables are
//! appended to indefinitely; readers run in required-terminator mode so
//! a tail of a growing table never consumes a half-flushed row.

use std::io::{Read, Write};

use crate::error::CodecResult;
use crate::reader::{Reader, ReaderConfig};
use crate::value::{decode_field, encode_field, FieldValue};
use crate::writer::{Writer, WriterConfig};

/// Writes rows of typed values, with an optional leading header record.
pub struct TableWriter<W: Write> {
    csv: Writer<W>,
    columns: Vec<String>,
    wrote_header: bool,
}

impl<W: Write> TableWriter<W> {
    /// A table writer that emits `columns` as the first record before
    /// the first row.
    pub fn with_headers<I, S>(sink: W, columns: I) -> CodecResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            csv: Writer::with_config(sink, WriterConfig::default())?,
            columns: columns.into_iter().map(Into::into).collect(),
            wrote_header: false,
        })
    }

    /// A table writer appending rows to an object whose header record
    /// was written by an earlier session.
    pub fn resumed(sink: W) -> CodecResult<Self> {
        Ok(Self {
            csv: Writer::with_config(sink, WriterConfig::default())?,
            columns: Vec::new(),
            wrote_header: true,
        })
    }

    /// Encode and write one row.
    pub fn write_row(&mut self, row: &[FieldValue]) -> CodecResult<()> {
        if !self.wrote_header {
            self.csv.write_record(&self.columns)?;
            self.wrote_header = true;
        }
        let fields: Vec<String> = row.iter().map(encode_field).collect();
        self.csv.write_record(&fields)?;
        Ok(())
    }

    /// Flush the underlying sink. A row is never visible half-flushed to
    /// a required-terminator reader, but flushing makes completed rows
    /// visible to tailing readers.
    pub fn flush(&mut self) -> CodecResult<()> {
        self.csv.flush()
    }

    /// Unwrap the inner sink.
    pub fn into_inner(self) -> W {
        self.csv.into_inner()
    }
}

/// Reads rows of typed values, tracking the resume offset.
pub struct TableReader<R: Read> {
    csv: Reader<R>,
    columns: Option<Vec<String>>,
}

impl<R: Read> TableReader<R> {
    /// A reader starting at the beginning of a table with a header
    /// record. Runs in required-terminator mode.
    pub fn new(source: R) -> CodecResult<Self> {
        let config = ReaderConfig {
            require_line_terminator: true,
            ..ReaderConfig::default()
        };
        Ok(Self {
            csv: Reader::with_config(source, config)?,
            columns: None,
        })
    }

    /// Resume reading rows from `offset`, as previously reported by
    /// [`TableReader::byte_offset`]. The source must already be
    /// positioned at that offset; the header record was consumed by the
    /// earlier session, so `columns` carries it forward.
    pub fn resume_at<I, S>(source: R, columns: I, offset: u64) -> CodecResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = ReaderConfig {
            require_line_terminator: true,
            ..ReaderConfig::default()
        };
        Ok(Self {
            csv: Reader::with_base_offset(source, config, offset)?,
            columns: Some(columns.into_iter().map(Into::into).collect()),
        })
    }

    /// The column names, reading the header record if it has not been
    /// consumed yet.
    pub fn columns(&mut self) -> CodecResult<&[String]> {
        if self.columns.is_none() {
            let header = self.csv.read_record()?.unwrap_or_default();
            self.columns = Some(header);
        }
        Ok(self.columns.as_deref().unwrap_or(&[]))
    }

    /// Decode the next row, or `Ok(None)` at end of input.
    ///
    /// An [`CodecError::Incomplete`](crate::CodecError::Incomplete) row
    /// leaves the offset unchanged; retry after the writer flushes.
    pub fn read_row(&mut self) -> CodecResult<Option<Vec<FieldValue>>> {
        self.columns()?;
        match self.csv.read_record()? {
            Some(record) => Ok(Some(record.iter().map(|f| decode_field(f)).collect())),
            None => Ok(None),
        }
    }

    /// Absolute byte offset of the start of the next unread row.
    pub fn byte_offset(&self) -> u64 {
        self.csv.byte_offset()
    }
}
