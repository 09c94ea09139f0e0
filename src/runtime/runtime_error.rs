use thiserror::Error;

use crate::frontend::reader_error::ReaderError;

/// Result type shared by both machines and the reader.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Every way a run can fail. None of these are retried; the first one
/// aborts the remaining evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("stack underflow")]
    StackUnderflow,

    #[error("unbound symbol: {0}")]
    UnboundSymbol(String),

    /// A built-in without a staged behavior appeared in a definition body.
    #[error("cannot lift '{0}' into a definition body")]
    CannotLift(String),

    #[error("malformed source: {0}")]
    MalformedSource(#[from] ReaderError),

    /// Internal fault: something tried to bake an Unknown into a residual
    /// program as a constant. Points at a lifting or depth-tracking bug.
    #[error("internal error: refusing to record a constant push of an unknown value")]
    RecordUnknown,

    #[error("type mismatch in '{op}': expected {expected}, got {found}")]
    TypeMismatch {
        op: String,
        expected: &'static str,
        found: String,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in '{0}'")]
    Overflow(&'static str),

    #[error("stack size limit exceeded ({0})")]
    StackLimit(usize),

    #[error("execution step limit exceeded ({0})")]
    StepLimit(usize),

    #[error("call depth limit exceeded ({0})")]
    CallDepthLimit(usize),
}

impl RuntimeError {
    pub fn type_mismatch(op: &str, expected: &'static str, found: &crate::lang::value::Value) -> Self {
        RuntimeError::TypeMismatch {
            op: op.to_string(),
            expected,
            found: found.type_name().to_string(),
        }
    }

    /// Stable kind name, printed ahead of the message by the CLI.
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::StackUnderflow => "StackUnderflow",
            RuntimeError::UnboundSymbol(_) => "UnboundSymbol",
            RuntimeError::CannotLift(_) => "CannotLift",
            RuntimeError::MalformedSource(_) => "MalformedSource",
            RuntimeError::RecordUnknown => "RecordUnknown",
            RuntimeError::TypeMismatch { .. } => "TypeMismatch",
            RuntimeError::DivisionByZero => "DivisionByZero",
            RuntimeError::Overflow(_) => "Overflow",
            RuntimeError::StackLimit(_) => "StackLimit",
            RuntimeError::StepLimit(_) => "StepLimit",
            RuntimeError::CallDepthLimit(_) => "CallDepthLimit",
        }
    }
}
