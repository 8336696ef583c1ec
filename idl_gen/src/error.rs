use crate::codegen::format::FormatError;
use thiserror::Error;

/// Result alias used across the generator.
pub type GenResult<T> = Result<T, GenError>;

/// Generation-time failures. Every variant aborts the run; there is no
/// partial output.
#[derive(Debug, Error)]
pub enum GenError {
    /// A parameter resolved to a representation no marshaling rule covers.
    #[error("{interface}::{method}: cannot marshal parameter '{param}' of type '{idl_type}' ({go_type}): {reason}")]
    UnsupportedConstruct {
        interface: String,
        method: String,
        param: String,
        idl_type: String,
        go_type: String,
        reason: &'static str,
    },

    /// A method needs more argument slots than the widest call tier provides.
    #[error("{interface}::{method} needs {required} call slots but the widest syscall tier has {max}")]
    TooManySlots {
        interface: String,
        method: String,
        required: usize,
        max: usize,
    },

    /// The formatter rejected the assembled buffer. `raw` holds the
    /// unformatted text for diagnosis.
    #[error("generated code did not pass {formatter}: {source}")]
    Format {
        formatter: String,
        #[source]
        source: FormatError,
        raw: String,
    },
}

impl GenError {
    /* Unformatted buffer attached to a formatting failure */
    pub fn raw_source(&self) -> Option<&str> {
        match self {
            GenError::Format { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
