use crate::db::store::StoreError;
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without origin-specific detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a model-origin configuration error (fatal at startup).
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Configuration, ErrorOrigin::Model, message)
    }

    /// Construct a codec-origin encoding error (fatal, per operation).
    pub(crate) fn encoding(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Encoding, ErrorOrigin::Codec, message)
    }

    /// Construct a flush-origin state misuse error (programmer error).
    pub(crate) fn flush_misuse(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::StateMisuse, ErrorOrigin::Flush, message)
    }

    /// Construct a persist-origin state misuse error.
    pub(crate) fn persist_misuse(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::StateMisuse, ErrorOrigin::Persist, message)
    }

    /// Construct a codec-origin corruption error (decode boundary).
    pub(crate) fn codec_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Codec, message)
    }

    /// Construct a standardized unknown-mapping error.
    ///
    /// Raised when an operation names an entity or table that has no
    /// registered metadata; this is caller error, not store state.
    pub fn unknown_mapping(name: impl Into<String>) -> Self {
        let name = name.into();

        Self::new(
            ErrorClass::StateMisuse,
            ErrorOrigin::Model,
            format!("no prepared mapping for '{name}'"),
        )
    }

    /// Construct a standardized unmapped-property error.
    pub fn unmapped_property(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Self::configuration(format!(
            "entity '{}' has no mapped property '{}'",
            entity.into(),
            property.into(),
        ))
    }

    pub fn join_target_missing(entity: impl Into<String>, key: impl Into<String>) -> Self {
        let entity = entity.into();
        let key = key.into();

        Self {
            class: ErrorClass::NotFound,
            origin: ErrorOrigin::Persist,
            message: format!("join target does not exist: {entity} ({key})"),
            detail: None,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<StoreError> for InternalError {
    fn from(err: StoreError) -> Self {
        Self {
            class: ErrorClass::Store,
            origin: ErrorOrigin::Store,
            message: err.to_string(),
            detail: Some(ErrorDetail::Store(err)),
        }
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
/// This enum is intentionally extensible.
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Store(StoreError),
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Invalid metadata at startup; fatal for the whole mapping.
    Configuration,
    /// A value could not be encoded; the mutation never reached the store.
    Encoding,
    /// The store rejected or failed an operation; source attached.
    Store,
    /// A lifecycle or mapping contract was violated by the caller.
    StateMisuse,
    Corruption,
    NotFound,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Configuration => "configuration",
            Self::Encoding => "encoding",
            Self::Store => "store",
            Self::StateMisuse => "state_misuse",
            Self::Corruption => "corruption",
            Self::NotFound => "not_found",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Model,
    Codec,
    Flush,
    Persist,
    Load,
    Store,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Model => "model",
            Self::Codec => "codec",
            Self::Flush => "flush",
            Self::Persist => "persist",
            Self::Load => "load",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
