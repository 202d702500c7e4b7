use thiserror::Error;

/// Why a single option (or the scan itself) failed while parsing argv.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("missing argument")]
    MissingArgument,

    #[error("invalid value '{token}': {reason}")]
    Conversion { token: String, reason: String },

    #[error("unrecognized option: {0}")]
    UnrecognizedOption(String),

    /// An argument that is not valid Unicode, shown lossily.
    #[error("argument is not valid unicode: {0}")]
    InvalidEncoding(String),

    /// Failure raised by a user-supplied processor.
    #[error("{0}")]
    Custom(String),
}

/// Parse-time failure, prefixed with the option token that was being
/// processed when it happened (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    option: Option<String>,
    kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind) -> Self {
        Self { option: None, kind }
    }

    pub fn in_option(option: impl Into<String>, kind: ParseErrorKind) -> Self {
        Self {
            option: Some(option.into()),
            kind,
        }
    }

    /// The option token (`--name` / `-n`) whose processor failed.
    pub fn option(&self) -> Option<&str> {
        self.option.as_deref()
    }

    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.option {
            Some(option) => write!(f, "{option}: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid option name: {0}")]
    InvalidName(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("no such key: {0}")]
    NoSuchKey(String),

    #[error("type mismatch for '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl From<ParseErrorKind> for Error {
    fn from(kind: ParseErrorKind) -> Self {
        Self::Parse(ParseError::new(kind))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
