/// Where in the input a record failed to parse.
///
/// `line` counts every physical line read, `start_line` is the line on
/// which the failing record began (they differ for records with quoted
/// multi-line fields), and `column` is the zero-based character position
/// within the current line.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("record starting on line {start_line}: line {line}, column {column}: {kind}")]
pub struct ParseError {
    pub start_line: u64,
    pub line: u64,
    pub column: u64,
    pub kind: ParseErrorKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    /// A bare quote appeared inside a non-quoted field.
    #[error("bare \" in non-quoted field")]
    BareQuote,
    /// An unescaped or unterminated quote inside a quoted field.
    #[error("extraneous or missing \" in quoted field")]
    Quote,
    /// The record width does not match the established column count.
    #[error("wrong number of fields")]
    FieldCount,
    /// The record is not valid UTF-8 (the on-disk format is UTF-8 text).
    #[error("record is not valid UTF-8")]
    InvalidUtf8,
    /// Required-terminator mode: the record has no trailing terminator.
    #[error("record is missing its line terminator")]
    NoLineTerminator,
}

/// Errors from the tabular codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The delimiter/comment configuration is unusable: the two must be
    /// distinct single characters, none of LF, CR or the replacement
    /// character.
    #[error("invalid delimiter or comment configuration")]
    InvalidDelimiter,

    /// The record is malformed and a retry cannot help.
    #[error(transparent)]
    Malformed(#[from] ParseError),

    /// The trailing record is not yet terminated. Distinguished from
    /// [`CodecError::Malformed`] so tailing readers can retry once the
    /// writer flushes more bytes; the resume offset is left unchanged.
    #[error("incomplete record: {0}")]
    Incomplete(ParseError),

    /// I/O error from the underlying source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
