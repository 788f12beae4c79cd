//! RFC 4180 record reader with resumable byte-offset tracking.
//!
//! The reader consumes whole physical lines from the source and parses
//! records out of them, so a successful record always ends on a line
//! boundary. After every successful record [`Reader::byte_offset`]
//! reports the absolute offset of the start of the next unread record;
//! comment and blank lines consumed while looking for that record are
//! counted as part of the preceding read. On any error the offset is not
//! advanced.

use std::io::{BufRead, BufReader, Read};

use crate::error::{CodecError, CodecResult, ParseError, ParseErrorKind};

/// Field-count enforcement policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldCount {
    /// No check: records may have any width.
    Any,
    /// The first record establishes the width; later records must match.
    #[default]
    Auto,
    /// Every record, including the first, must have exactly this width.
    Exactly(usize),
}

/// Reader configuration.
#[derive(Clone, Debug)]
pub struct ReaderConfig {
    /// Field delimiter.
    pub comma: char,
    /// Lines starting with this character (without leading whitespace)
    /// are ignored.
    pub comment: Option<char>,
    /// Field-count enforcement, see [`FieldCount`].
    pub field_count: FieldCount,
    /// Tolerate bare quote characters in non-conforming input.
    pub lazy_quotes: bool,
    /// Strip leading white space from fields.
    pub trim_leading_space: bool,
    /// Reject a trailing record with no line terminator as
    /// [`CodecError::Incomplete`] instead of returning it. Required for
    /// safe tailing of a growing object.
    pub require_line_terminator: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            comma: ',',
            comment: None,
            field_count: FieldCount::Auto,
            lazy_quotes: false,
            trim_leading_space: false,
            require_line_terminator: false,
        }
    }
}

fn valid_delim(c: char) -> bool {
    c != '\0' && c != '"' && c != '\r' && c != '\n' && c != '\u{FFFD}'
}

/// Streaming record reader.
pub struct Reader<R: Read> {
    config: ReaderConfig,
    input: BufReader<R>,
    /// Physical lines consumed so far, for error positions.
    num_line: u64,
    /// Absolute offset of the start of the next unread record.
    offset: u64,
    /// Bytes consumed from the source so far (may run ahead of `offset`
    /// by skipped comment lines and partial records).
    scan_offset: u64,
    /// Column width locked in by the first record under `Auto`.
    locked_width: Option<usize>,
    /// Whether the most recently read line ended in a terminator.
    line_terminated: bool,
}

impl<R: Read> Reader<R> {
    /// Construct with the default configuration.
    pub fn new(input: R) -> CodecResult<Self> {
        Self::with_config(input, ReaderConfig::default())
    }

    /// Construct with an explicit configuration. Fails with
    /// [`CodecError::InvalidDelimiter`] if the delimiter or comment
    /// characters are unusable.
    pub fn with_config(input: R, config: ReaderConfig) -> CodecResult<Self> {
        if !valid_delim(config.comma) {
            return Err(CodecError::InvalidDelimiter);
        }
        if let Some(comment) = config.comment {
            if !valid_delim(comment) || comment == config.comma {
                return Err(CodecError::InvalidDelimiter);
            }
        }
        Ok(Self {
            config,
            input: BufReader::new(input),
            num_line: 0,
            offset: 0,
            scan_offset: 0,
            locked_width: None,
            line_terminated: false,
        })
    }

    /// Construct against a source already positioned at `offset`, as
    /// previously reported by [`Reader::byte_offset`] in an earlier
    /// session. Offsets reported by this reader remain absolute.
    pub fn with_base_offset(input: R, config: ReaderConfig, offset: u64) -> CodecResult<Self> {
        let mut reader = Self::with_config(input, config)?;
        reader.offset = offset;
        reader.scan_offset = offset;
        Ok(reader)
    }

    /// Absolute byte offset of the start of the next unread record.
    pub fn byte_offset(&self) -> u64 {
        self.offset
    }

    /// Read all remaining records.
    pub fn read_all(&mut self) -> CodecResult<Vec<Vec<String>>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Read the next record, or `Ok(None)` at end of input.
    pub fn read_record(&mut self) -> CodecResult<Option<Vec<String>>> {
        // Find the first line that is neither a comment nor blank.
        let line = loop {
            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            };
            if let Some(comment) = self.config.comment {
                if line.chars().next() == Some(comment) {
                    continue;
                }
            }
            if line.len() == length_nl(&line) {
                continue; // Blank line.
            }
            break line;
        };

        let record = self.parse_record(line)?;

        if self.config.require_line_terminator && !self.line_terminated {
            return Err(CodecError::Incomplete(ParseError {
                start_line: record.start_line,
                line: self.num_line,
                column: 0,
                kind: ParseErrorKind::NoLineTerminator,
            }));
        }

        let width = match self.config.field_count {
            FieldCount::Any => None,
            FieldCount::Exactly(n) => Some(n),
            FieldCount::Auto => match self.locked_width {
                Some(n) => Some(n),
                None => {
                    self.locked_width = Some(record.fields.len());
                    None
                }
            },
        };
        if let Some(expected) = width {
            if record.fields.len() != expected {
                return Err(CodecError::Malformed(ParseError {
                    start_line: record.start_line,
                    line: record.start_line,
                    column: 0,
                    kind: ParseErrorKind::FieldCount,
                }));
            }
        }

        self.offset = self.scan_offset;
        Ok(Some(record.fields))
    }

    /// Read one physical line, including its terminator handling:
    /// `\r\n` is normalized to `\n`, and a trailing bare `\r` at end of
    /// input is dropped. Returns `None` at end of input. The raw byte
    /// length (before normalization) is added to the scan offset.
    fn read_line(&mut self) -> CodecResult<Option<String>> {
        let mut raw = Vec::new();
        self.input.read_until(b'\n', &mut raw)?;
        self.num_line += 1;
        if raw.is_empty() {
            return Ok(None);
        }
        self.scan_offset += raw.len() as u64;
        self.line_terminated = raw.ends_with(b"\n");
        if !self.line_terminated && raw.ends_with(b"\r") {
            // Drop a trailing carriage return at end of input.
            raw.pop();
        }
        if raw.ends_with(b"\r\n") {
            let n = raw.len();
            raw[n - 2] = b'\n';
            raw.pop();
        }
        match String::from_utf8(raw) {
            Ok(line) => Ok(Some(line)),
            Err(_) => Err(CodecError::Malformed(ParseError {
                start_line: self.num_line,
                line: self.num_line,
                column: 0,
                kind: ParseErrorKind::InvalidUtf8,
            })),
        }
    }

    fn parse_record(&mut self, first_line: String) -> CodecResult<ParsedRecord> {
        let comma = self.config.comma;
        let comma_len = comma.len_utf8();
        let start_line = self.num_line;

        let mut line = first_line;
        let mut pos = 0usize;
        let mut fields: Vec<String> = Vec::new();
        let mut field = String::new();

        'parse_field: loop {
            if self.config.trim_leading_space {
                while let Some(c) = line[pos..].chars().next() {
                    if !c.is_whitespace() {
                        break;
                    }
                    pos += c.len_utf8();
                }
            }

            if line[pos..].chars().next() != Some('"') {
                // Non-quoted field.
                let rest = &line[pos..];
                let (raw_field, advance) = match rest.find(comma) {
                    Some(i) => (&rest[..i], Some(i + comma_len)),
                    None => (&rest[..rest.len() - length_nl(rest)], None),
                };
                if !self.config.lazy_quotes {
                    if let Some(j) = raw_field.find('"') {
                        return Err(self.malformed(
                            start_line,
                            char_count(&line[..pos + j]),
                            ParseErrorKind::BareQuote,
                        ));
                    }
                }
                fields.push(raw_field.to_string());
                match advance {
                    Some(n) => {
                        pos += n;
                        continue 'parse_field;
                    }
                    None => break 'parse_field,
                }
            }

            // Quoted field.
            pos += 1; // Consume the opening quote.
            loop {
                match line[pos..].find('"') {
                    Some(i) => {
                        field.push_str(&line[pos..pos + i]);
                        pos += i + 1; // Consume the closing quote.
                        let rest = &line[pos..];
                        if rest.starts_with('"') {
                            // "" sequence: literal quote.
                            field.push('"');
                            pos += 1;
                        } else if rest.starts_with(comma) {
                            // ", sequence: end of field.
                            pos += comma_len;
                            fields.push(std::mem::take(&mut field));
                            continue 'parse_field;
                        } else if rest.len() == length_nl(rest) {
                            // "\n sequence (or end of data): end of record.
                            fields.push(std::mem::take(&mut field));
                            break 'parse_field;
                        } else if self.config.lazy_quotes {
                            // Bare quote preserved as-is.
                            field.push('"');
                        } else {
                            return Err(self.malformed(
                                start_line,
                                char_count(&line[..pos - 1]),
                                ParseErrorKind::Quote,
                            ));
                        }
                    }
                    None if pos < line.len() => {
                        // The quoted field continues on the next line.
                        field.push_str(&line[pos..]);
                        match self.read_line()? {
                            Some(next) => {
                                line = next;
                                pos = 0;
                            }
                            None => {
                                // End of input while looking for the
                                // continuation line.
                                if !self.config.lazy_quotes {
                                    return Err(self.malformed(
                                        start_line,
                                        0,
                                        ParseErrorKind::Quote,
                                    ));
                                }
                                self.line_terminated = false;
                                fields.push(std::mem::take(&mut field));
                                break 'parse_field;
                            }
                        }
                    }
                    None => {
                        // The line was truncated at end of input with the
                        // quote still open.
                        if !self.config.lazy_quotes {
                            return Err(self.malformed(
                                start_line,
                                char_count(&line),
                                ParseErrorKind::Quote,
                            ));
                        }
                        fields.push(std::mem::take(&mut field));
                        break 'parse_field;
                    }
                }
            }
        }

        Ok(ParsedRecord { fields, start_line })
    }

    fn malformed(&self, start_line: u64, column: u64, kind: ParseErrorKind) -> CodecError {
        CodecError::Malformed(ParseError {
            start_line,
            line: self.num_line,
            column,
            kind,
        })
    }
}

struct ParsedRecord {
    fields: Vec<String>,
    start_line: u64,
}

/// Length of the trailing line terminator, after normalization: 1 if the
/// slice ends with `\n`, else 0.
fn length_nl(s: &str) -> usize {
    usize::from(s.ends_with('\n'))
}

fn char_count(s: &str) -> u64 {
    s.chars().count() as u64
}
