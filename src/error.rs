//! Error types for the stow codec.

use num_bigint::BigInt;

/// Convenience alias used throughout the crate.
pub type Result<T, E = CodecError> = std::result::Result<T, E>;

/// Errors that can occur while encoding or decoding a value.
///
/// Every error aborts the enclosing top-level call; there is no partial or
/// best-effort mode.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unknown type tag: 0x{0:02X}")]
    UnknownTag(u8),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("cannot encode negative integer {0} as unsigned")]
    NegativeForUnsigned(BigInt),

    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("could not resolve {namespace}.{name}")]
    Resolution { namespace: String, name: String },

    #[error("registration error: {0}")]
    Registration(String),

    #[error("I/O error: {0}")]
    Io(std::io::Error),
}

impl CodecError {
    /// Wraps any displayable error as an encoding error.
    pub fn invalid(e: impl std::fmt::Display) -> Self {
        Self::InvalidEncoding(e.to_string())
    }

    /// Builds a resolution error for the given name pair.
    pub fn unresolved(namespace: &str, name: &str) -> Self {
        Self::Resolution {
            namespace: namespace.to_owned(),
            name: name.to_owned(),
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof
        } else {
            Self::Io(e)
        }
    }
}
