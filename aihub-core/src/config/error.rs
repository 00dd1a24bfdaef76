//! Configuration errors
//!
//! File and environment problems are reported through [`ConfigError`];
//! semantic problems carry the dotted path of the offending field.

use super::schema::CONFIG_VERSION;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Why a configuration could not be produced
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid {format}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        format: &'static str,
        location: Option<Location>,
        message: String,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// A `${VAR}` reference that must resolve did not
    #[error("{field} references ${{{var}}}, which is not set")]
    MissingVariable { var: String, field: String },

    /// An environment-only setting could not be used
    #[error("{var}: {message}")]
    Environment { var: &'static str, message: String },
}

/// Position of a parse error in the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A semantic problem with one field, e.g. `routing.order[2]`
#[derive(Debug, Error)]
#[error("{field_path}: {kind}")]
pub struct ValidationError {
    pub field_path: String,
    pub kind: ValidationErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationErrorKind {
    #[error("value is required")]
    Missing,

    #[error("unsupported version '{found}', expected '{}'", CONFIG_VERSION)]
    UnsupportedVersion { found: String },

    #[error("'{value}' appears more than once")]
    Duplicate { value: String },

    #[error("no provider named '{name}' is configured")]
    UnknownProvider { name: String },

    #[error("must be greater than zero")]
    NotPositive,

    #[error("not a usable http(s) URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("no enabled provider is in the fallback order")]
    NoProviders,
}

impl ValidationError {
    pub fn new(field_path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field_path: field_path.into(),
            kind,
        }
    }

    pub fn missing(field_path: impl Into<String>) -> Self {
        Self::new(field_path, ValidationErrorKind::Missing)
    }

    pub fn not_positive(field_path: impl Into<String>) -> Self {
        Self::new(field_path, ValidationErrorKind::NotPositive)
    }
}
