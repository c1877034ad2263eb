//! Errors surfaced while loading dictionary files.

use std::io;
use thiserror::Error;

/// A single recoverable or fatal problem found on one line of an `.aff` or
/// `.dic` file. Warnings are reported separately (via `tracing`) and never
/// produce one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("problem reading a number or string token")]
    MissingToken,
    #[error("invalid identifier of encoding")]
    InvalidEncoding,
    #[error("encoding conversion error")]
    EncodingConversion,
    #[error("invalid identifier for the type of the flags")]
    InvalidFlagType,
    #[error("invalid language code")]
    InvalidLangCode,
    #[error("missing flags")]
    MissingFlags,
    #[error("the number of characters in a string of long flags is odd, should be even")]
    UnpairedLongFlag,
    #[error("invalid numerical flag")]
    InvalidNumericFlag,
    #[error("invalid UTF-8 in flags")]
    InvalidUtf8,
    #[error("flag is above 65535")]
    FlagAbove65535,
    #[error("flag alias is invalid")]
    InvalidNumericAlias,
    #[error("invalid cross-product character in affix entry, must be Y or N")]
    AffixCrossCharInvalid,
    #[error("affix condition is invalid")]
    AffixConditionInvalid,
    #[error("compound rule is in invalid format")]
    CompoundRuleInvalid,
    #[error("the first line of an array command has no count")]
    ArrayCommandNoCount,
}

/// Error returned from the dictionary loading entry points.
///
/// Per-line parse problems carry the one-based line number of the offending
/// line. The loader reports every bad line through `tracing` and returns the
/// first error once the whole stream has been consumed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dictionary stream: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
    #[error("{0}")]
    Other(String),
}

impl LoadError {
    pub fn parse(line: usize, kind: ParseErrorKind) -> Self {
        LoadError::Parse { line, kind }
    }

    /// Line number of the offending line, when the failure is tied to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }
}
