//! Typed error definitions for cdirectory.
//! Every failing operation returns a `DirectoryError`; callers can branch on
//! `domain()` for coarse handling or on the variant for detail.

use std::io;
use thiserror::Error;

use crate::system_string::ConversionError;

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDomain {
    /// An argument was rejected before any resource was touched.
    Arguments,
    /// A string could not be transcoded between narrow and wide form.
    Conversion,
    /// The platform enumeration call failed.
    Io,
    /// A state precondition or value range check failed.
    Runtime,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("invalid {0}")]
    InvalidArgument(&'static str),

    #[error("invalid directory: {0} already set")]
    ValueAlreadySet(&'static str),

    #[error("invalid directory: missing {0}")]
    ValueMissing(&'static str),

    #[error("unsupported {what}: {value:#x}")]
    UnsupportedValue { what: &'static str, value: u32 },

    #[error("unable to open directory '{path}'")]
    OpenFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to close directory")]
    CloseFailed {
        #[source]
        source: io::Error,
    },

    #[error("unable to read directory entry")]
    ReadFailed {
        #[source]
        source: io::Error,
    },

    #[error("unable to convert {what}")]
    Conversion {
        what: &'static str,
        #[source]
        source: ConversionError,
    },
}

impl DirectoryError {
    pub fn domain(&self) -> ErrorDomain {
        match self {
            Self::InvalidArgument(_) => ErrorDomain::Arguments,
            Self::ValueAlreadySet(_) | Self::ValueMissing(_) | Self::UnsupportedValue { .. } => {
                ErrorDomain::Runtime
            }
            Self::OpenFailed { .. } | Self::CloseFailed { .. } | Self::ReadFailed { .. } => {
                ErrorDomain::Io
            }
            Self::Conversion { .. } => ErrorDomain::Conversion,
        }
    }

    /// Stable identifier suitable for structured log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_value",
            Self::ValueAlreadySet(_) => "value_already_set",
            Self::ValueMissing(_) => "value_missing",
            Self::UnsupportedValue { .. } => "unsupported_value",
            Self::OpenFailed { .. } => "open_failed",
            Self::CloseFailed { .. } => "close_failed",
            Self::ReadFailed { .. } => "read_failed",
            Self::Conversion { .. } => "conversion_failed",
        }
    }

    /// Platform error code (errno or Win32 error) behind an IO failure.
    pub fn os_code(&self) -> Option<i32> {
        match self {
            Self::OpenFailed { source, .. }
            | Self::CloseFailed { source }
            | Self::ReadFailed { source } => source.raw_os_error(),
            _ => None,
        }
    }

    pub(crate) fn conversion(what: &'static str) -> impl FnOnce(ConversionError) -> Self {
        move |source| Self::Conversion { what, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_failures_expose_os_code() {
        let err = DirectoryError::ReadFailed {
            source: io::Error::from_raw_os_error(5),
        };
        assert_eq!(err.domain(), ErrorDomain::Io);
        assert_eq!(err.os_code(), Some(5));
        assert_eq!(err.code(), "read_failed");
    }

    #[test]
    fn os_error_is_left_to_the_source_chain() {
        let err = DirectoryError::OpenFailed {
            path: "/nowhere".into(),
            source: io::Error::from_raw_os_error(2),
        };
        assert_eq!(err.to_string(), "unable to open directory '/nowhere'");
        let source = std::error::Error::source(&err).expect("io source");
        assert!(source.to_string().contains("os error 2"));

        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain.matches("os error 2").count(), 1, "{chain}");
    }

    #[test]
    fn runtime_failures_have_no_os_code() {
        let err = DirectoryError::ValueAlreadySet("handle");
        assert_eq!(err.domain(), ErrorDomain::Runtime);
        assert_eq!(err.os_code(), None);
        assert!(err.to_string().contains("already set"));
    }

    #[test]
    fn unsupported_value_formats_hex() {
        let err = DirectoryError::UnsupportedValue {
            what: "compare flags",
            value: 0x82,
        };
        assert_eq!(err.to_string(), "unsupported compare flags: 0x82");
    }
}
