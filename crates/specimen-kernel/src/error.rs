//! Error types for the specimen kernel
//!
//! Provides error handling for:
//! - Circular resolution chains
//! - Requests nothing in the graph could satisfy
//! - Failures raised by catalogued factories
//! - Graph configuration mistakes
//! - Invalid arguments to public entry points

use std::fmt::{self, Display, Formatter};

/// Main kernel error type
///
/// Soft unsatisfiability is not an error; see [`crate::Specimen::NoSpecimen`].
#[derive(Debug, thiserror::Error)]
pub enum SpecimenError {
    /// The traversed object graph contains a circular reference
    #[error(
        "unable to create a specimen for {request} because the traversed object graph \
         contains a circular reference; path: {}",
        render_path(.path)
    )]
    CircularReference {
        /// Request that closed the cycle
        request: String,
        /// Recorded requests from outermost to innermost, then the closing request
        path: Vec<String>,
    },

    /// No builder in the graph could satisfy the request
    #[error("unable to create a specimen for {request}: no builder in the graph could satisfy it")]
    Unresolvable {
        /// The unsatisfied request
        request: String,
    },

    /// A builder that must produce something returned no specimen
    #[error("builder {builder} returned no specimen for {request}, which it is required to handle")]
    UnexpectedNoSpecimen {
        /// Description of the guarded builder
        builder: String,
        /// The request
        request: String,
    },

    /// A catalogued factory or method failed
    #[error("invoking {method} failed: {source}")]
    Invocation {
        /// Method description
        method: String,
        /// Underlying failure
        #[source]
        source: InvocationError,
    },

    /// A graph transformation produced something that is not a builder node
    #[error("transformation {transformation} returned a builder that is not a node")]
    NotANode {
        /// Transformation description
        transformation: String,
    },

    /// Graph configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A public entry point received an invalid argument
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Argument name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

impl SpecimenError {
    /// Create invalid argument error
    #[inline]
    #[must_use]
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Create unresolvable error for a request
    #[inline]
    #[must_use]
    pub fn unresolvable(request: &impl Display) -> Self {
        Self::Unresolvable {
            request: request.to_string(),
        }
    }

    /// Check if the error reports a circular reference
    #[inline]
    #[must_use]
    pub fn is_circular_reference(&self) -> bool {
        matches!(self, Self::CircularReference { .. })
    }
}

fn render_path(path: &[String]) -> String {
    path.join(" --> ")
}

/// Failure kinds raised by catalogued constructors, methods and setters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
    /// A required argument was null
    #[error("argument '{parameter}' must not be null")]
    ArgumentNull {
        /// Parameter name
        parameter: String,
    },

    /// An argument was invalid
    #[error("argument '{parameter}' is invalid: {message}")]
    Argument {
        /// Parameter name
        parameter: String,
        /// Reason
        message: String,
    },

    /// An argument was outside its valid range
    #[error("argument '{parameter}' is out of range: {message}")]
    ArgumentOutOfRange {
        /// Parameter name
        parameter: String,
        /// Reason
        message: String,
    },

    /// The call is not valid for the current state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Any other failure
    #[error("{0}")]
    Failed(String),

    /// Invocation-mechanism wrapper around the real failure
    #[error("target of an invocation failed: {0}")]
    TargetInvocation(Box<InvocationError>),
}

impl InvocationError {
    /// Argument-null failure
    #[inline]
    #[must_use]
    pub fn argument_null(parameter: impl Into<String>) -> Self {
        Self::ArgumentNull {
            parameter: parameter.into(),
        }
    }

    /// Argument failure
    #[inline]
    #[must_use]
    pub fn argument(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Argument {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Wrap as an invocation-mechanism failure
    #[inline]
    #[must_use]
    pub fn wrapped(self) -> Self {
        Self::TargetInvocation(Box::new(self))
    }

    /// Strip every invocation-mechanism wrapper
    #[must_use]
    pub fn unwrap_target(self) -> Self {
        let mut current = self;
        while let Self::TargetInvocation(inner) = current {
            current = *inner;
        }
        current
    }

    /// Failure kind of this error (wrappers report their own kind)
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ArgumentNull { .. } => FailureKind::ArgumentNull,
            Self::Argument { .. } => FailureKind::Argument,
            Self::ArgumentOutOfRange { .. } => FailureKind::ArgumentOutOfRange,
            Self::InvalidOperation(_) => FailureKind::InvalidOperation,
            Self::Failed(_) => FailureKind::Failed,
            Self::TargetInvocation(_) => FailureKind::TargetInvocation,
        }
    }
}

/// Classification of an [`InvocationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// [`InvocationError::ArgumentNull`]
    ArgumentNull,
    /// [`InvocationError::Argument`]
    Argument,
    /// [`InvocationError::ArgumentOutOfRange`]
    ArgumentOutOfRange,
    /// [`InvocationError::InvalidOperation`]
    InvalidOperation,
    /// [`InvocationError::Failed`]
    Failed,
    /// [`InvocationError::TargetInvocation`]
    TargetInvocation,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ArgumentNull => "argument-null",
            Self::Argument => "argument",
            Self::ArgumentOutOfRange => "argument-out-of-range",
            Self::InvalidOperation => "invalid-operation",
            Self::Failed => "failed",
            Self::TargetInvocation => "target-invocation",
        };
        write!(f, "{s}")
    }
}
