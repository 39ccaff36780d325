use crate::ast::Span;
use crate::codegen::error::{BytecodeError, ClassGenerationError, ConstPoolError};
use thiserror::Error;

/// Result type for indylink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the method-reference lowering stage
///
/// User-facing variants carry the span of the offending node. `Internal`
/// marks a compiler defect and is never a user diagnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{span}: failed to find the expected method [{member}({parameters})] in the type [{target}]")]
    UnresolvedReference {
        member: String,
        parameters: String,
        target: String,
        span: Span,
    },

    #[error("{span}: {message}")]
    InvalidReferenceShape { message: String, span: Span },

    #[error("{span}: invalid receiver type: {receiver} is not compatible with {target}")]
    ReceiverTypeMismatch {
        receiver: String,
        target: String,
        span: Span,
    },

    #[error("{span}: the inferred type [{inferred}] is not compatible with the parameter type [{declared}]")]
    InferredTypeMismatch {
        inferred: String,
        declared: String,
        span: Span,
    },

    #[error("{span}: [{type_name}] is not a functional interface")]
    NotFunctionalInterface { type_name: String, span: Span },

    #[error("Code generation error: {0}")]
    CodeGen(#[from] ClassGenerationError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{}Internal compiler error: {message}", .span.map(|s| format!("{}: ", s)).unwrap_or_default())]
    Internal { message: String, span: Option<Span> },
}

impl Error {
    /// Create an internal compiler error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), span: None }
    }

    /// Internal error raised while lowering the node at `span`
    pub fn internal_at(message: impl Into<String>, span: Span) -> Self {
        Self::Internal { message: message.into(), span: Some(span) }
    }

    /// Create an invalid-shape error
    pub fn invalid_shape(message: impl Into<String>, span: Span) -> Self {
        Self::InvalidReferenceShape { message: message.into(), span }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Source position of user-facing errors
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnresolvedReference { span, .. }
            | Self::InvalidReferenceShape { span, .. }
            | Self::ReceiverTypeMismatch { span, .. }
            | Self::InferredTypeMismatch { span, .. }
            | Self::NotFunctionalInterface { span, .. } => Some(*span),
            Self::Internal { span, .. } => *span,
            _ => None,
        }
    }
}

impl From<ConstPoolError> for Error {
    fn from(err: ConstPoolError) -> Self {
        Self::CodeGen(ClassGenerationError::ConstPool(err))
    }
}

impl From<BytecodeError> for Error {
    fn from(err: BytecodeError) -> Self {
        Self::CodeGen(ClassGenerationError::Bytecode(err))
    }
}
