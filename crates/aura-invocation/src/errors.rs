//! Invocation failure taxonomy
//!
//! Every failure that crosses a link boundary is an [`InvocationError`]. The
//! variants are tags rather than a type hierarchy, so the re-classification a
//! cursor performs at each link boundary is a plain match over [`FailureClass`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure raised by interceptors, invocation contexts and chain construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum InvocationError {
    /// A chain was constructed without an interceptor sequence
    #[error("Invalid construction: parameter '{parameter}' must be provided")]
    InvalidConstruction {
        /// Name of the missing parameter
        parameter: String,
    },

    /// Standard invocation failure carrying the original cause across a chain boundary
    #[error("Invocation failed: {cause}")]
    Invocation {
        /// The failure that triggered this one
        #[source]
        cause: Box<InvocationError>,
    },

    /// An interceptor produced a cause its caller was not prepared to see
    #[error("Undeclared failure: {cause}")]
    Undeclared {
        /// The unanticipated cause, preserved as raised
        #[source]
        cause: Box<InvocationError>,
    },

    /// Application-level failure understood by the caller's failure model
    #[error("{kind}: {message}")]
    Application {
        /// Application-defined failure kind
        kind: String,
        /// Human readable description
        message: String,
        /// Optional structured payload carried unchanged through the chain
        data: Option<Value>,
    },

    /// Unrecoverable failure; never wrapped by any chain layer
    #[error("Fatal: {message}")]
    Fatal {
        /// Error message describing the fatal condition
        message: String,
    },

    /// Unchecked internal signal that is neither application-level nor fatal
    #[error("Signal {name}: {message}")]
    Signal {
        /// Signal name
        name: String,
        /// Error message describing the signal
        message: String,
    },
}

/// How a cause is treated when it crosses a link boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureClass {
    /// Re-raised as is
    Application,
    /// Re-raised unchanged at every layer
    Fatal,
    /// Wrapped in [`InvocationError::Undeclared`]
    Unrecognized,
}

impl InvocationError {
    /// Create an invalid construction error naming the offending parameter
    pub fn invalid_construction(parameter: impl Into<String>) -> Self {
        Self::InvalidConstruction {
            parameter: parameter.into(),
        }
    }

    /// Wrap a cause in the standard invocation failure
    pub fn invocation(cause: InvocationError) -> Self {
        Self::Invocation {
            cause: Box::new(cause),
        }
    }

    /// Wrap a cause in an undeclared failure
    pub fn undeclared(cause: InvocationError) -> Self {
        Self::Undeclared {
            cause: Box::new(cause),
        }
    }

    /// Create an application failure without payload
    pub fn application(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Application {
            kind: kind.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Create an application failure carrying a structured payload
    pub fn application_with_data(
        kind: impl Into<String>,
        message: impl Into<String>,
        data: Value,
    ) -> Self {
        Self::Application {
            kind: kind.into(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create a fatal error
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal {
            message: message.into(),
        }
    }

    /// Create an unchecked internal signal
    pub fn signal(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Signal {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Classify this failure for link-boundary re-raising.
    ///
    /// The framework's own wrappers and construction errors are application
    /// level; only [`InvocationError::Signal`] is unrecognized.
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Fatal { .. } => FailureClass::Fatal,
            Self::Signal { .. } => FailureClass::Unrecognized,
            Self::InvalidConstruction { .. }
            | Self::Invocation { .. }
            | Self::Undeclared { .. }
            | Self::Application { .. } => FailureClass::Application,
        }
    }

    /// Whether this is the standard invocation failure
    pub fn is_invocation_failure(&self) -> bool {
        matches!(self, Self::Invocation { .. })
    }

    /// Whether this is a fatal failure
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    /// The directly wrapped cause, if this is a wrapper variant
    pub fn cause(&self) -> Option<&InvocationError> {
        match self {
            Self::Invocation { cause } | Self::Undeclared { cause } => Some(&**cause),
            _ => None,
        }
    }

    /// Take the wrapped cause, or return `self` when nothing is wrapped
    pub fn into_cause(self) -> Result<InvocationError, InvocationError> {
        match self {
            Self::Invocation { cause } | Self::Undeclared { cause } => Ok(*cause),
            other => Err(other),
        }
    }

    /// Walk the cause chain starting with `self`
    pub fn causes(&self) -> Causes<'_> {
        Causes { next: Some(self) }
    }

    /// The innermost failure in the cause chain
    pub fn root_cause(&self) -> &InvocationError {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }

    /// Number of wrapper layers above the root cause
    pub fn wrap_depth(&self) -> usize {
        self.causes().count() - 1
    }
}

/// Iterator over an [`InvocationError`] and its wrapped causes, outermost first
#[derive(Debug, Clone)]
pub struct Causes<'a> {
    next: Option<&'a InvocationError>,
}

impl<'a> Iterator for Causes<'a> {
    type Item = &'a InvocationError;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.cause();
        Some(current)
    }
}

/// Result type for invocation operations
pub type InvocationResult<T> = std::result::Result<T, InvocationError>;
