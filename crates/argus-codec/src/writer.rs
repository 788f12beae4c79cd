//! RFC 4180 record writer.
//!
//! Quoting is minimal: a field is quoted only when its content would
//! otherwise be misread. The one non-structural exception is the literal
//! two-character field `\.`, which some downstream consumers treat as an
//! end-of-data marker when unquoted, so it is always quoted.

use std::io::Write;

use crate::error::{CodecError, CodecResult};

/// Writer configuration.
#[derive(Clone, Debug)]
pub struct WriterConfig {
    /// Field delimiter.
    pub comma: char,
    /// Terminate records with `\r\n` instead of `\n`. Also controls how
    /// embedded line breaks are re-emitted inside quoted fields.
    pub use_crlf: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            comma: ',',
            use_crlf: false,
        }
    }
}

/// Streaming record writer.
pub struct Writer<W: Write> {
    config: WriterConfig,
    out: W,
}

impl<W: Write> Writer<W> {
    /// Construct with the default configuration.
    pub fn new(out: W) -> CodecResult<Self> {
        Self::with_config(out, WriterConfig::default())
    }

    /// Construct with an explicit configuration.
    pub fn with_config(out: W, config: WriterConfig) -> CodecResult<Self> {
        if config.comma == '\r' || config.comma == '\n' || config.comma == '"' {
            return Err(CodecError::InvalidDelimiter);
        }
        Ok(Self { config, out })
    }

    /// Write one record.
    pub fn write_record<I, S>(&mut self, fields: I) -> CodecResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut comma_buf = [0u8; 4];
        let comma = self.config.comma.encode_utf8(&mut comma_buf).as_bytes();

        for (n, field) in fields.into_iter().enumerate() {
            let field = field.as_ref();
            if n > 0 {
                self.out.write_all(comma)?;
            }
            if !self.field_needs_quotes(field) {
                self.out.write_all(field.as_bytes())?;
                continue;
            }

            self.out.write_all(b"\"")?;
            for c in field.chars() {
                match c {
                    '"' => self.out.write_all(b"\"\"")?,
                    '\r' => {
                        if !self.config.use_crlf {
                            self.out.write_all(b"\r")?;
                        }
                    }
                    '\n' => {
                        if self.config.use_crlf {
                            self.out.write_all(b"\r\n")?;
                        } else {
                            self.out.write_all(b"\n")?;
                        }
                    }
                    c => {
                        let mut buf = [0u8; 4];
                        self.out.write_all(c.encode_utf8(&mut buf).as_bytes())?;
                    }
                }
            }
            self.out.write_all(b"\"")?;
        }

        if self.config.use_crlf {
            self.out.write_all(b"\r\n")?;
        } else {
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> CodecResult<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Unwrap the inner sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn field_needs_quotes(&self, field: &str) -> bool {
        if field.is_empty() {
            return false;
        }
        if field == "\\." {
            // An unquoted \. is an end-of-data marker to some consumers.
            return true;
        }
        if field.contains(self.config.comma)
            || field.contains('"')
            || field.contains('\r')
            || field.contains('\n')
        {
            return true;
        }
        field.starts_with(' ') || field.starts_with('\t')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_one(fields: &[&str], config: WriterConfig) -> String {
        let mut writer = Writer::with_config(Vec::new(), config).unwrap();
        writer.write_record(fields).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    fn default_one(fields: &[&str]) -> String {
        write_one(fields, WriterConfig::default())
    }

    #[test]
    fn plain_fields_are_not_quoted() {
        assert_eq!(default_one(&["abc"]), "abc\n");
        assert_eq!(default_one(&["abc", "def"]), "abc,def\n");
        assert_eq!(default_one(&["", "", ""]), ",,\n");
    }

    #[test]
    fn crlf_mode() {
        assert_eq!(
            write_one(
                &["abc"],
                WriterConfig {
                    use_crlf: true,
                    ..WriterConfig::default()
                }
            ),
            "abc\r\n"
        );
        // Embedded newlines follow the terminator style.
        assert_eq!(
            write_one(
                &["a\nb"],
                WriterConfig {
                    use_crlf: true,
                    ..WriterConfig::default()
                }
            ),
            "\"a\r\nb\"\r\n"
        );
        // A bare carriage return is dropped in CRLF mode.
        assert_eq!(
            write_one(
                &["a\rb"],
                WriterConfig {
                    use_crlf: true,
                    ..WriterConfig::default()
                }
            ),
            "\"ab\"\r\n"
        );
    }

    #[test]
    fn quoting_rules() {
        assert_eq!(default_one(&["a\"b"]), "\"a\"\"b\"\n");
        assert_eq!(default_one(&["a,b"]), "\"a,b\"\n");
        assert_eq!(default_one(&["a\nb"]), "\"a\nb\"\n");
        assert_eq!(default_one(&["a\rb"]), "\"a\rb\"\n");
        assert_eq!(default_one(&[" abc"]), "\" abc\"\n");
        assert_eq!(default_one(&["\tabc"]), "\"\tabc\"\n");
        assert_eq!(default_one(&["\\."]), "\"\\.\"\n");
        // A backslash alone is structural to nothing: no quotes.
        assert_eq!(default_one(&["\\"]), "\\\n");
        assert_eq!(default_one(&["\\,"]), "\"\\,\"\n");
    }

    #[test]
    fn custom_delimiter() {
        assert_eq!(
            write_one(
                &["a", "b;c"],
                WriterConfig {
                    comma: ';',
                    ..WriterConfig::default()
                }
            ),
            "a;\"b;c\"\n"
        );
    }

    #[test]
    fn rejects_structural_delimiters() {
        for comma in ['\n', '\r', '"'] {
            assert!(Writer::with_config(
                Vec::new(),
                WriterConfig {
                    comma,
                    ..WriterConfig::default()
                }
            )
            .is_err());
        }
    }

    #[test]
    fn round_trips_through_reader() {
        use crate::reader::Reader;

        let records = vec![
            vec!["plain", "with,comma", "with\"quote", "multi\nline"],
            vec![" leading", "\\.", "", "trailing "],
        ];
        let mut writer = Writer::new(Vec::new()).unwrap();
        for record in &records {
            writer.write_record(record).unwrap();
        }
        let encoded = writer.into_inner();

        let mut reader = Reader::new(encoded.as_slice()).unwrap();
        let decoded = reader.read_all().unwrap();
        assert_eq!(decoded, records);
    }
}
