//! Error types for the task index compiler.
//!
//! All errors are strongly typed using thiserror. Every kind aborts the
//! current compilation; none of them is resolved by retrying with the same
//! input, which is why [`TaskError::is_retryable`] is always `false`.

use thiserror::Error;

use crate::extension::ExtensionKind;

/// Validation errors: the input is malformed and must be fixed by the caller.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unknown symbol: '{name}'")]
    UnknownSymbol {
        name: String,
    },

    #[error("Unknown object '{name}' used as argument of '{symbol}'")]
    UnknownObject {
        symbol: String,
        name: String,
    },

    #[error("Object '{object}' declares unknown type '{type_name}'")]
    UnknownType {
        object: String,
        type_name: String,
    },

    #[error("Duplicate symbol declaration: '{name}'")]
    DuplicateSymbol {
        name: String,
    },

    #[error("Duplicate object declaration: '{name}'")]
    DuplicateObject {
        name: String,
    },

    #[error("Duplicate type declaration: '{name}'")]
    DuplicateType {
        name: String,
    },

    #[error("No negations allowed in the initial state: not {symbol}({arguments})")]
    InvalidNegation {
        symbol: String,
        arguments: String,
    },

    #[error("The extension of external symbol '{symbol}' cannot be specified in the initial state")]
    ExternalInitialization {
        symbol: String,
    },

    #[error("Wrong number of arguments for '{symbol}': expected {expected}, got {actual} in {}", render_element(.symbol, .tuple, .value.as_deref()))]
    ArityViolation {
        symbol: String,
        expected: usize,
        actual: usize,
        tuple: String,
        value: Option<String>,
    },

    #[error("Parse error in '{symbol}': value '{value}' does not resolve to a declared object (values must resolve to declared objects)")]
    UnresolvedValue {
        symbol: String,
        value: String,
    },

    #[error("Initial fact for '{symbol}' is a {found}, but the symbol is a {declared}")]
    FactKindMismatch {
        symbol: String,
        found: &'static str,
        declared: &'static str,
    },

    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },

    #[error("Field '{field}' exceeds maximum length of {max_length}")]
    FieldTooLong {
        field: String,
        max_length: usize,
    },

    #[error("Symbols '{first}' and '{second}' both map to native identifier '{identifier}'")]
    IdentifierCollision {
        first: String,
        second: String,
        identifier: String,
    },

    #[error("Malformed exchange record '{record}': {reason}")]
    MalformedRecord {
        record: String,
        reason: String,
    },
}

fn render_element(symbol: &str, tuple: &str, value: Option<&str>) -> String {
    match value {
        Some(v) => format!("{symbol}({tuple}) = {v}"),
        None => format!("{symbol}({tuple})"),
    }
}

/// Capability errors: the input is well formed but exceeds what the native
/// runtime supports.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("Unsupported arity {arity} for {kind} extension of '{symbol}' (supported: {supported})")]
    UnsupportedArity {
        symbol: String,
        kind: ExtensionKind,
        arity: usize,
        supported: &'static str,
    },
}

/// Ordering errors: a stage of the task index was used out of sequence.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    #[error("Field '{field}' accessed before initialization")]
    Uninitialized {
        field: &'static str,
    },

    #[error("Stage '{stage}' cannot run yet: '{required}' must complete first")]
    OutOfOrder {
        stage: &'static str,
        required: &'static str,
    },

    #[error("Stage '{stage}' has already run")]
    AlreadyCompleted {
        stage: &'static str,
    },

    #[error("Task index is incomplete: stage '{pending}' has not run")]
    Incomplete {
        pending: &'static str,
    },
}

/// Configuration loading errors.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid external symbol pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level error type of the compiler.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Ordering error: {0}")]
    Ordering(#[from] OrderingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failure reported by an external collaborator (action/formula compiler,
    /// state variable enumeration).
    #[error("Collaborator '{collaborator}' failed: {message}")]
    Collaborator {
        collaborator: &'static str,
        message: String,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl TaskError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a collaborator error.
    #[must_use]
    pub fn collaborator(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Collaborator {
            collaborator,
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a capability error.
    #[must_use]
    pub const fn is_capability(&self) -> bool {
        matches!(self, Self::Capability(_))
    }

    /// Returns true if this is an ordering error.
    #[must_use]
    pub const fn is_ordering(&self) -> bool {
        matches!(self, Self::Ordering(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if this error is retryable.
    ///
    /// Compilation is deterministic: re-running with the same input fails
    /// the same way.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

/// Result type alias for compiler operations.
pub type TaskResult<T> = Result<T, TaskError>;
