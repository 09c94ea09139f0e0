//! # Machines
//!
//! Both the concrete [`interpreter::Interpreter`] and the symbolic
//! [`compiler::Compiler`] implement [`Machine`]. The reader and the
//! built-ins only ever talk to this capability set, so the same source text
//! and the same thunks drive either one.

pub mod compiler;
pub mod interpreter;
pub mod lift;
pub mod runtime_error;

use crate::lang::thunk::Thunk;
use crate::lang::value::Value;
use runtime_error::Result;

pub trait Machine {
    /// Push a value. Fallible: the interpreter enforces a stack limit and the
    /// compiler refuses to record an Unknown constant.
    fn push(&mut self, value: Value) -> Result<()>;

    fn pop(&mut self) -> Result<Value>;

    /// Associate `name` with `value` in this machine's own table.
    fn bind(&mut self, name: &str, value: Value);

    /// Resolve `name`, failing with `UnboundSymbol` when no reachable table
    /// has it.
    fn lookup(&self, name: &str) -> Result<Value>;

    /// Execute a thunk's effect on this machine.
    fn invoke(&mut self, thunk: &Thunk) -> Result<()>;

    /// Write one line of program output.
    fn emit(&mut self, line: String) -> Result<()>;
}
