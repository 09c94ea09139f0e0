use super::builtin::Builtin;
use super::value::Value;
use serde::{Deserialize, Serialize};

/// A replayable unit of behavior over a machine.
///
/// Thunks are pure data: the same thunk can be invoked on the interpreter,
/// on a compiler while staging, or recorded into a residual program and
/// replayed later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Thunk {
    // ───────────────────────────── Literals ─────────────────────────────
    /// Push a constant.
    ///
    /// Stack effect: `( -- x )`
    Push(Value),

    // ───────────────────────────── Symbols ──────────────────────────────
    /// Push the value bound to a symbol.
    ///
    /// Stack effect: `( -- x )`
    Lookup(String),

    // ───────────────────────────── Built-ins ────────────────────────────
    /// Run a named built-in. Stack effect depends on the built-in.
    Builtin(Builtin),

    // ───────────────────────────── Sequences ────────────────────────────
    /// Run each thunk in order on the same machine.
    ///
    /// No isolation: a failure partway aborts the rest of the sequence.
    Quote(Vec<Thunk>),
}

impl Thunk {
    /// Short human-readable name, used in traces and diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Thunk::Push(value) => format!("push {}", value),
            Thunk::Lookup(name) => format!("lookup {}", name),
            Thunk::Builtin(builtin) => builtin.name().to_string(),
            Thunk::Quote(ops) => format!("quote ({} ops)", ops.len()),
        }
    }
}
