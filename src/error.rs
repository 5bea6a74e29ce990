//! Contains the error-related types for the crate.

use thiserror::Error;

/// The result type for all methods that can return an error in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while encoding or decoding BSON.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,

    /// An optional message describing the error.
    pub message: Option<String>,

    /// The document key associated with the error, if any.
    pub key: Option<String>,

    /// The array index associated with the error, if any.
    pub index: Option<usize>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BSON error")?;

        if let Some(key) = self.key.as_deref() {
            write!(f, " at key \"{key}\"")?;
        } else if let Some(index) = self.index {
            write!(f, " at array index {index}")?;
        }

        write!(f, ". Kind: {}", self.kind)?;
        if let Some(ref message) = self.message {
            write!(f, ". Message: {}", message)?;
        }

        write!(f, ".")
    }
}

/// The types of errors that can occur in this crate.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A `Binary`-related error occurred.
    #[error("A Binary-related error occurred")]
    #[non_exhaustive]
    Binary {},

    /// A `DateTime`-related error occurred.
    #[error("A DateTime-related error occurred")]
    #[non_exhaustive]
    DateTime {},

    /// The end of the BSON input was reached too soon.
    #[error("End of stream")]
    #[non_exhaustive]
    EndOfStream {},

    /// Malformed BSON bytes were encountered.
    #[error("Malformed BSON bytes at offset {offset}")]
    #[non_exhaustive]
    MalformedBytes {
        /// The byte offset at which the malformation was detected.
        offset: usize,
    },

    /// An `ObjectId`-related error occurred.
    #[error("An ObjectId-related error occurred")]
    #[non_exhaustive]
    ObjectId {},

    /// An integer was too wide for the BSON integer types.
    #[error("Integer {n} cannot fit into a BSON integer type")]
    #[non_exhaustive]
    IntegerOverflow {
        /// The out-of-range integer.
        n: i128,
    },

    /// A host value had no BSON mapping and could not be converted.
    #[error("Value has no BSON representation")]
    #[non_exhaustive]
    UnsupportedValue {},

    /// A reference cycle was detected while encoding a host value.
    #[error("Cannot encode a cyclic value")]
    #[non_exhaustive]
    CyclicValue {},

    /// Invalid UTF-8 bytes were encountered.
    #[error("Invalid UTF-8 at offset {offset}")]
    #[non_exhaustive]
    Utf8Encoding {
        /// The byte offset of the invalid data.
        offset: usize,
    },

    /// An error occurred when attempting to access a value in a document.
    #[error("An error occurred when attempting to access a document value: {kind}")]
    #[non_exhaustive]
    ValueAccess {
        /// The kind of error that occurred.
        kind: ValueAccessErrorKind,
    },
}

/// The types of errors that can occur when attempting to access a value in a
/// document.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ValueAccessErrorKind {
    /// No value for the specified key was present in the document.
    #[error("the key was not present in the document")]
    NotPresent,

    /// The type of the value in the document did not match the requested type.
    #[error("the value was not of the expected type")]
    UnexpectedType,
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            key: None,
            index: None,
            message: None,
        }
    }
}

impl Error {
    pub(crate) fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub(crate) fn with_message(mut self, message: impl ToString) -> Self {
        self.message = Some(message.to_string());
        self
    }

    /// Attach a key to the error unless a more precise location is already
    /// recorded.
    pub(crate) fn at_key(self, key: impl Into<String>) -> Self {
        if self.key.is_some() || self.index.is_some() {
            self
        } else {
            self.with_key(key)
        }
    }

    /// Attach an array index to the error unless a more precise location is
    /// already recorded.
    pub(crate) fn at_index(self, index: usize) -> Self {
        if self.key.is_some() || self.index.is_some() {
            self
        } else {
            self.with_index(index)
        }
    }

    pub(crate) fn binary(message: impl ToString) -> Self {
        Self::from(ErrorKind::Binary {}).with_message(message)
    }

    pub(crate) fn datetime(message: impl ToString) -> Self {
        Self::from(ErrorKind::DateTime {}).with_message(message)
    }

    pub(crate) fn oid(message: impl ToString) -> Self {
        Self::from(ErrorKind::ObjectId {}).with_message(message)
    }

    pub(crate) fn end_of_stream() -> Self {
        ErrorKind::EndOfStream {}.into()
    }

    pub(crate) fn malformed_bytes(offset: usize, message: impl ToString) -> Self {
        Self::from(ErrorKind::MalformedBytes { offset }).with_message(message)
    }

    pub(crate) fn utf8_encoding(offset: usize) -> Self {
        ErrorKind::Utf8Encoding { offset }.into()
    }

    pub(crate) fn integer_overflow(n: i128) -> Self {
        ErrorKind::IntegerOverflow { n }.into()
    }

    pub(crate) fn unsupported_value(message: impl ToString) -> Self {
        Self::from(ErrorKind::UnsupportedValue {}).with_message(message)
    }

    pub(crate) fn cyclic_value() -> Self {
        ErrorKind::CyclicValue {}.into()
    }

    pub(crate) fn value_access_not_present() -> Self {
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::NotPresent,
        }
        .into()
    }

    pub(crate) fn value_access_unexpected_type() -> Self {
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::UnexpectedType,
        }
        .into()
    }

    /// Whether this error indicates that the decoded input was not valid
    /// BSON, regardless of which structural rule it violated.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::MalformedBytes { .. }
                | ErrorKind::EndOfStream { .. }
                | ErrorKind::Utf8Encoding { .. }
        )
    }

    /// Whether this error was caused by a value with no BSON representation,
    /// including cyclic values.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::UnsupportedValue { .. } | ErrorKind::CyclicValue { .. }
        )
    }
}
