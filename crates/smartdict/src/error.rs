//! Error types for smartdict operations.

use crate::Location;
use thiserror::Error;

/// Result type alias for smartdict operations.
pub type SmartDictResult<T> = Result<T, SmartDictError>;

/// Errors that can occur while parsing or resolving a key path.
///
/// Variants fall into two families:
///
/// - **structural** errors describe a malformed key or a caller contract
///   violation. They are raised regardless of `raise_on_missing`.
/// - **miss** errors (`NotFound`, `TypeMismatch`) describe data that is not
///   where the key says it is. They are only raised when `raise_on_missing`
///   is enabled and no default was supplied.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SmartDictError {
    /// A fan-out delimiter appeared before the final step.
    #[error("fan-out delimiter `{delimiter}` found before the last step of `{path}`")]
    FanOutNotLast {
        /// The key as written by the caller.
        path: String,
        /// The fan-out delimiter in effect.
        delimiter: String,
    },

    /// A selector clause without a `field:value` separator.
    #[error("malformed selector clause `{clause}` in `{path}`: expected `field:value`")]
    MalformedSelector {
        /// The key as written by the caller.
        path: String,
        /// The offending clause.
        clause: String,
    },

    /// A `{n}` placeholder that refers to no extracted selector.
    #[error("selector reference {{{index}}} in `{path}` does not match any selector")]
    UnknownSelector {
        /// The key as written by the caller.
        path: String,
        /// The referenced selector index.
        index: usize,
    },

    /// A selector used as one of several fan-out subkeys.
    #[error("selectors cannot appear among the fan-out subkeys of `{path}`")]
    SelectorInFanOut {
        /// The key as written by the caller.
        path: String,
    },

    /// Fan-out write with a different number of keys and values.
    #[error("fan-out write has {keys} keys but {values} values")]
    ArityMismatch {
        /// Number of fan-out subkeys.
        keys: usize,
        /// Number of supplied values.
        values: usize,
    },

    /// Fan-out write with a value that is not a sequence.
    #[error("fan-out write requires an array value, found {found}")]
    FanOutValueNotSequence {
        /// The type of the supplied value.
        found: &'static str,
    },

    /// Fan-out keys address several slots and cannot be borrowed as one.
    #[error("fan-out key `{path}` cannot be borrowed mutably")]
    FanOutBorrow {
        /// The key as written by the caller.
        path: String,
    },

    /// Options that cannot be used to parse keys.
    #[error("invalid options: {message}")]
    InvalidOptions {
        /// Description of what went wrong.
        message: String,
    },

    /// A key, index or selector match is absent from the document.
    #[error("key `{key}` not found at {location}")]
    NotFound {
        /// Where the lookup was when it failed.
        location: Location,
        /// The step that could not be resolved.
        key: String,
    },

    /// The step does not apply to the kind of value found.
    #[error("type mismatch at {location}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Where the lookup was when it failed.
        location: Location,
        /// The expected container kind.
        expected: &'static str,
        /// The actual value kind.
        found: &'static str,
    },
}

impl SmartDictError {
    #[inline]
    pub fn fan_out_not_last(path: impl Into<String>, delimiter: impl Into<String>) -> Self {
        SmartDictError::FanOutNotLast {
            path: path.into(),
            delimiter: delimiter.into(),
        }
    }

    #[inline]
    pub fn malformed_selector(path: impl Into<String>, clause: impl Into<String>) -> Self {
        SmartDictError::MalformedSelector {
            path: path.into(),
            clause: clause.into(),
        }
    }

    #[inline]
    pub fn unknown_selector(path: impl Into<String>, index: usize) -> Self {
        SmartDictError::UnknownSelector {
            path: path.into(),
            index,
        }
    }

    #[inline]
    pub fn selector_in_fan_out(path: impl Into<String>) -> Self {
        SmartDictError::SelectorInFanOut { path: path.into() }
    }

    #[inline]
    pub fn arity_mismatch(keys: usize, values: usize) -> Self {
        SmartDictError::ArityMismatch { keys, values }
    }

    #[inline]
    pub fn invalid_options(message: impl Into<String>) -> Self {
        SmartDictError::InvalidOptions {
            message: message.into(),
        }
    }

    /// Create a not found error.
    #[inline]
    pub fn not_found(location: Location, key: impl Into<String>) -> Self {
        SmartDictError::NotFound {
            location,
            key: key.into(),
        }
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(location: Location, expected: &'static str, found: &'static str) -> Self {
        SmartDictError::TypeMismatch {
            location,
            expected,
            found,
        }
    }

    /// True for errors that the miss policy may turn into a default or an absence.
    #[inline]
    pub fn is_miss(&self) -> bool {
        matches!(
            self,
            SmartDictError::NotFound { .. } | SmartDictError::TypeMismatch { .. }
        )
    }

    /// True for errors that are always raised.
    #[inline]
    pub fn is_structural(&self) -> bool {
        !self.is_miss()
    }
}

/// Get the type name of a JSON value.
#[inline]
pub fn value_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
