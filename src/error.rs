use std::io;

use thiserror::Error;

/// Returned when a configuration is added to a context that was never registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("context does not exist: {context:?}")]
pub struct ContextNotFound {
    pub context: String,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read data")]
    Read {
        #[from]
        source: io::Error,
    },
    #[error("malformed section header at line {line}: {text}")]
    MalformedSectionHeader { line: usize, text: String },
    #[error("missing '=' in configuration at line {line}: {text}")]
    MalformedConfigurationLine { line: usize, text: String },
}

impl ParseError {
    /// The 1-based line that caused the failure, if the failure is tied to one.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match *self {
            Self::Read { .. } => None,
            Self::MalformedSectionHeader { line, .. }
            | Self::MalformedConfigurationLine { line, .. } => Some(line),
        }
    }
}
