use super::thunk::Thunk;
use serde::{Deserialize, Serialize};

/// Runtime value in the Stagelisp language.
///
/// Values are the only data that can exist on either machine's stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer.
    Number(i64),

    /// Symbol name, pushed by `let` and parameter binding.
    Symbol(String),

    /// Residual program produced by staging a definition.
    ///
    /// Invoking a quote replays its thunks, in order, on the invoking machine.
    Quote(Vec<Thunk>),

    /// Will exist on the real stack at run time, identity not known while
    /// staging. Only the compiler ever produces this.
    Unknown,

    /// Result of operations with no meaningful value (`def`, `print`).
    Unit,
}

impl Value {
    /// Kind name used in type-mismatch diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Symbol(_) => "symbol",
            Value::Quote(_) => "quote",
            Value::Unknown => "unknown",
            Value::Unit => "nil",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }
}

impl std::fmt::Display for Value {
    /// Format a value the way the top-level loop prints it.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::Quote(ops) => write!(f, "[<quote: {} ops>]", ops.len()),
            Value::Unknown => write!(f, "?"),
            Value::Unit => write!(f, "nil"),
        }
    }
}
