use std::io;

/// Everything that can go wrong while parsing or marshaling LDIF.
///
/// Parse errors carry the 1-based line number at which the offending logical
/// line starts.
#[derive(Debug, thiserror::Error)]
pub enum LdifError {
    #[error("line {line}: version line must be the first line of the document")]
    MisplacedVersion { line: usize },

    #[error("line {line}: unsupported LDIF version {version:?}")]
    UnsupportedVersion { line: usize, version: String },

    #[error("line {line}: entry does not start with a non-empty dn")]
    MissingDn { line: usize },

    #[error("line {line}: malformed line")]
    MalformedLine { line: usize },

    #[error("line {line}: attribute {attr:?} has an empty value")]
    EmptyAttributeValue { line: usize, attr: String },

    #[error("line {line}: malformed value: {reason}")]
    MalformedValue { line: usize, reason: String },

    #[error("line {line}: cannot read {url:?}: {source}")]
    ExternalValueUnavailable {
        line: usize,
        url: String,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: unexpected line in delete record")]
    UnexpectedLineInDelete { line: usize },

    #[error("line {line}: modify operation on {attr:?} is not terminated by '-'")]
    UnterminatedModifyOp { line: usize, attr: String },

    #[error("line {line}: invalid modify operation {op:?}")]
    InvalidModifyOp { line: usize, op: String },

    #[error("line {line}: value for {found:?} inside modify operation on {expected:?}")]
    ModifyAttributeMismatch {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("line {line}: unsupported changetype {changetype:?}")]
    UnsupportedChangeType { line: usize, changetype: String },

    #[error("line {line}: controls are not supported")]
    UnsupportedControl { line: usize },

    #[error("cannot mix change records and content records")]
    MixedRecordKinds,

    #[error("{dn}: attribute {attr:?} requires a non-empty value list")]
    EmptyValueList { dn: String, attr: String },

    #[error("unsupported record: {0}")]
    UnsupportedRecordShape(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, LdifError>;

impl LdifError {
    /// Line number the error refers to, if it came from the parser.
    pub fn line(&self) -> Option<usize> {
        match self {
            LdifError::MisplacedVersion { line }
            | LdifError::UnsupportedVersion { line, .. }
            | LdifError::MissingDn { line }
            | LdifError::MalformedLine { line }
            | LdifError::EmptyAttributeValue { line, .. }
            | LdifError::MalformedValue { line, .. }
            | LdifError::ExternalValueUnavailable { line, .. }
            | LdifError::UnexpectedLineInDelete { line }
            | LdifError::UnterminatedModifyOp { line, .. }
            | LdifError::InvalidModifyOp { line, .. }
            | LdifError::ModifyAttributeMismatch { line, .. }
            | LdifError::UnsupportedChangeType { line, .. }
            | LdifError::UnsupportedControl { line } => Some(*line),
            LdifError::MixedRecordKinds
            | LdifError::EmptyValueList { .. }
            | LdifError::UnsupportedRecordShape(_)
            | LdifError::Io(_) => None,
        }
    }
}
