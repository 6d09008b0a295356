//! Error taxonomy shared by the device, script reader and engine.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport or file fault. Fatal for the current script.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The transport cannot perform this operation. Callers treat a failed
    /// read as "no output available".
    #[error("device operation not supported: {0}")]
    UnsupportedOperation(&'static str),

    /// The script source has no more lines.
    #[error("end of input")]
    EndOfInput,

    #[error("invalid argument {argument:?} for !{directive}: {reason}")]
    InvalidArgument {
        directive: String,
        argument: String,
        reason: String,
    },

    /// The line pump stopped. `received` holds the output collected by the
    /// read that observed the fault.
    #[error("device disconnected")]
    Disconnected {
        received: Vec<u8>,
        #[source]
        source: io::Error,
    },

    #[error("expected output {expected:?} did not appear")]
    AssertionFailed { expected: String },

    #[error("line {line}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn invalid_argument(
        directive: &str,
        argument: &str,
        reason: impl ToString,
    ) -> Self {
        Error::InvalidArgument {
            directive: directive.to_string(),
            argument: argument.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The underlying error, with any line-number wrapping removed.
    pub fn root(&self) -> &Error {
        match self {
            Error::AtLine { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether this is the expected "cannot read from this transport" gap.
    pub fn is_unsupported(&self) -> bool {
        matches!(self.root(), Error::UnsupportedOperation(_))
    }
}
