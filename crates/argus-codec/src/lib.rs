//! The typed tabular codec ("typed CSV").
//!
//! Result tables and audit logs are stored as UTF-8 text derived from
//! RFC 4180, one record per row, with every field carrying a reversible
//! type encoding ([`FieldValue`]). The format is designed to be appended
//! to indefinitely and tailed while being concurrently written:
//!
//! - [`Reader`] tracks the absolute byte offset of the next unread
//!   record, so a later session can resume exactly where the previous
//!   one stopped without rescanning.
//! - In required-terminator mode a trailing record that is not followed
//!   by a line terminator is reported as [`CodecError::Incomplete`]
//!   rather than returned as a short record; the offset is left
//!   unchanged so the caller can poll and retry once the writer has
//!   flushed the rest.
//!
//! [`TableWriter`] and [`TableReader`] bind the field encoding to the
//! record framing for whole typed tables.

pub mod error;
pub mod reader;
pub mod table;
pub mod value;
pub mod writer;

pub use error::{CodecError, CodecResult, ParseError, ParseErrorKind};
pub use reader::{FieldCount, Reader, ReaderConfig};
pub use table::{TableReader, TableWriter};
pub use value::{decode_field, encode_field, FieldValue};
pub use writer::{Writer, WriterConfig};
