//! The symbolic machine.
//!
//! A `Compiler` runs the same thunks as the interpreter, but against a
//! *partial* stack: a strict prefix of what the real stack will hold when the
//! residual program runs. Popping past that prefix yields `Value::Unknown`,
//! a value supplied by the caller whose identity cannot be known yet.
//!
//! Every thunk invoked at nesting depth zero is appended to the residual
//! program. Thunks triggered while simulating another thunk run at depth one
//! or more and are not recorded separately; the outer thunk already accounts
//! for them. Literal pushes that reach the compiler directly through `push`
//! obey the same gate.

use std::collections::HashMap;

use tracing::trace;

use crate::lang::builtin::Builtin;
use crate::lang::thunk::Thunk;
use crate::lang::value::Value;
use crate::runtime::Machine;
use crate::runtime::lift::{self, Staged};
use crate::runtime::runtime_error::{Result, RuntimeError};

pub struct Compiler<'a> {
    /// Enclosing scope, read-only.
    parent: &'a dyn Machine,
    /// Local bindings, shadowing the parent.
    symbols: HashMap<String, Value>,
    stack: Vec<Value>,
    /// Residual program, append-only.
    quote: Vec<Thunk>,
    depth: usize,
}

impl<'a> Compiler<'a> {
    pub fn new(parent: &'a dyn Machine) -> Self {
        Compiler {
            parent,
            symbols: HashMap::new(),
            stack: Vec::new(),
            quote: Vec::new(),
            depth: 0,
        }
    }

    /// Bind the next caller-supplied argument to `name`.
    ///
    /// Records `push name` then `bind`: at run time that pops the real
    /// argument into `name`; while staging the pop runs past the tracked
    /// prefix, so `name` is bound to Unknown.
    pub fn bind_param(&mut self, name: &str) -> Result<()> {
        self.push(Value::Symbol(name.to_string()))?;
        self.invoke(&Thunk::Builtin(Builtin::Bind))
    }

    #[cfg(test)]
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub fn quote(&self) -> &[Thunk] {
        &self.quote
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Extract the residual program, discarding the compiler.
    pub fn into_quote(self) -> Vec<Thunk> {
        self.quote
    }

    fn record(&mut self, thunk: &Thunk) -> Result<()> {
        if matches!(thunk, Thunk::Push(v) if v.is_unknown()) {
            return Err(RuntimeError::RecordUnknown);
        }
        self.quote.push(thunk.clone());
        Ok(())
    }

    fn simulate(&mut self, thunk: &Thunk) -> Result<()> {
        match thunk {
            Thunk::Push(value) => self.push(value.clone()),
            Thunk::Lookup(name) => {
                let value = self.lookup(name)?;
                self.push(value)
            }
            Thunk::Builtin(builtin) => match lift::staged(*builtin) {
                Some(Staged::Direct) => builtin.apply(self),
                Some(Staged::Opaque { pops, pushes }) => {
                    for _ in 0..pops {
                        self.pop()?;
                    }
                    for _ in 0..pushes {
                        self.push(Value::Unknown)?;
                    }
                    Ok(())
                }
                None => Err(RuntimeError::CannotLift(builtin.name().to_string())),
            },
            Thunk::Quote(ops) => {
                // Bindings made by an inlined callee end with it, as they do
                // when the residual program runs.
                let saved = self.symbols.clone();
                let result = ops.iter().try_for_each(|op| self.invoke(op));
                self.symbols = saved;
                result
            }
        }
    }
}

impl Machine for Compiler<'_> {
    fn push(&mut self, value: Value) -> Result<()> {
        if self.depth == 0 {
            self.record(&Thunk::Push(value.clone()))?;
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<Value> {
        Ok(self.stack.pop().unwrap_or(Value::Unknown))
    }

    fn bind(&mut self, name: &str, value: Value) {
        self.symbols.insert(name.to_string(), value);
    }

    fn lookup(&self, name: &str) -> Result<Value> {
        match self.symbols.get(name) {
            Some(value) => Ok(value.clone()),
            None => self.parent.lookup(name),
        }
    }

    fn invoke(&mut self, thunk: &Thunk) -> Result<()> {
        let recorded = self.depth == 0;
        trace!(op = %thunk.describe(), depth = self.depth, recorded, "stage");
        if recorded {
            self.record(thunk)?;
        }

        self.depth += 1;
        let result = self.simulate(thunk);
        self.depth -= 1;
        result
    }

    fn emit(&mut self, _line: String) -> Result<()> {
        Err(RuntimeError::CannotLift(Builtin::Print.name().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::interpreter::Interpreter;

    fn num(n: i64) -> Value {
        Value::Number(n)
    }

    fn sym(s: &str) -> Value {
        Value::Symbol(s.to_string())
    }

    #[test]
    fn test_underflow_yields_unknown() {
        let parent = Interpreter::new();
        let mut c = Compiler::new(&parent);
        assert_eq!(c.pop().unwrap(), Value::Unknown);
        assert_eq!(c.pop().unwrap(), Value::Unknown);
        assert!(c.quote().is_empty());
    }

    // The residual reads the parameter back with `Lookup x` rather than
    // leaving the argument on the stack, so a parameter can be used any
    // number of times.
    #[test]
    fn test_stages_increment_without_adding_and_reads_parameter() {
        let parent = Interpreter::new();
        let mut c = Compiler::new(&parent);
        c.bind_param("x").unwrap();
        c.invoke(&Thunk::Lookup("x".to_string())).unwrap();
        c.push(num(1)).unwrap();
        c.invoke(&Thunk::Builtin(Builtin::Add)).unwrap();

        assert_eq!(c.stack(), &[Value::Unknown]);
        assert_eq!(
            c.into_quote(),
            vec![
                Thunk::Push(sym("x")),
                Thunk::Builtin(Builtin::Bind),
                Thunk::Lookup("x".to_string()),
                Thunk::Push(num(1)),
                Thunk::Builtin(Builtin::Add),
            ]
        );
    }

    #[test]
    fn test_known_operands_are_not_folded() {
        let parent = Interpreter::new();
        let mut c = Compiler::new(&parent);
        c.push(num(2)).unwrap();
        c.push(num(3)).unwrap();
        c.invoke(&Thunk::Builtin(Builtin::Add)).unwrap();
        assert_eq!(c.stack(), &[Value::Unknown]);
        assert_eq!(c.quote().len(), 3);
    }

    #[test]
    fn test_nested_invocations_are_not_recorded() {
        let parent = Interpreter::new();
        let mut c = Compiler::new(&parent);
        let body = Thunk::Quote(vec![
            Thunk::Push(num(1)),
            Thunk::Push(num(2)),
            Thunk::Builtin(Builtin::Swap),
        ]);
        c.invoke(&body).unwrap();
        assert_eq!(c.quote(), &[body]);
        assert_eq!(c.stack(), &[num(2), num(1)]);
        assert_eq!(c.depth(), 0);
    }

    #[test]
    fn test_data_movement_runs_on_unknowns() {
        let parent = Interpreter::new();
        let mut c = Compiler::new(&parent);
        c.push(num(5)).unwrap();
        // ( ? 5 -- 5 ? ): the Unknown comes from below the tracked prefix
        c.invoke(&Thunk::Builtin(Builtin::Swap)).unwrap();
        assert_eq!(c.stack(), &[num(5), Value::Unknown]);
    }

    #[test]
    fn test_refuses_to_record_unknown_constant() {
        let parent = Interpreter::new();
        let mut c = Compiler::new(&parent);
        assert_eq!(c.push(Value::Unknown), Err(RuntimeError::RecordUnknown));
        assert_eq!(
            c.invoke(&Thunk::Push(Value::Unknown)),
            Err(RuntimeError::RecordUnknown)
        );
        assert!(c.quote().is_empty());
    }

    #[test]
    fn test_cannot_lift_print_and_depth_recovers() {
        let parent = Interpreter::new();
        let mut c = Compiler::new(&parent);
        c.push(num(1)).unwrap();
        assert_eq!(
            c.invoke(&Thunk::Builtin(Builtin::Print)),
            Err(RuntimeError::CannotLift("print".to_string()))
        );
        assert_eq!(c.depth(), 0);
        c.push(num(2)).unwrap();
        assert_eq!(c.quote().last(), Some(&Thunk::Push(num(2))));
    }

    #[test]
    fn test_lookup_shadows_parent_without_mutating_it() {
        let mut parent = Interpreter::new();
        parent.bind("y", num(1));
        let mut c = Compiler::new(&parent);
        assert_eq!(c.lookup("y").unwrap(), num(1));
        c.bind("y", num(2));
        assert_eq!(c.lookup("y").unwrap(), num(2));
        drop(c);
        assert_eq!(parent.lookup("y").unwrap(), num(1));
    }

    #[test]
    fn test_unbound_at_staging_time() {
        let parent = Interpreter::new();
        let mut c = Compiler::new(&parent);
        assert_eq!(
            c.invoke(&Thunk::Lookup("z".to_string())),
            Err(RuntimeError::UnboundSymbol("z".to_string()))
        );
    }

    #[test]
    fn test_nested_compiler_sees_outer_locals() {
        let parent = Interpreter::new();
        let mut outer = Compiler::new(&parent);
        outer.bind_param("a").unwrap();
        let mut inner = Compiler::new(&outer);
        assert_eq!(inner.lookup("a").unwrap(), Value::Unknown);
        inner.bind_param("b").unwrap();
        drop(inner);
        assert!(outer.lookup("b").is_err());
    }

    #[test]
    fn test_inlined_callee_does_not_rebind_caller_parameter() {
        let parent = Interpreter::new();
        let mut c = Compiler::new(&parent);
        c.bind_param("x").unwrap();
        let callee = Thunk::Quote(vec![
            Thunk::Push(sym("x")),
            Thunk::Builtin(Builtin::Bind),
        ]);
        c.push(num(10)).unwrap();
        c.invoke(&callee).unwrap();
        assert_eq!(c.lookup("x").unwrap(), Value::Unknown);
        assert_eq!(c.depth(), 0);
    }

    #[test]
    fn test_residual_replays_on_interpreter() {
        let parent = Interpreter::new();
        let mut c = Compiler::new(&parent);
        c.bind_param("b").unwrap();
        c.bind_param("a").unwrap();
        c.invoke(&Thunk::Lookup("a".to_string())).unwrap();
        c.invoke(&Thunk::Lookup("b".to_string())).unwrap();
        c.invoke(&Thunk::Builtin(Builtin::Sub)).unwrap();
        let quote = c.into_quote();

        let mut m = Interpreter::new();
        m.push(num(10)).unwrap();
        m.push(num(4)).unwrap();
        m.invoke(&Thunk::Quote(quote)).unwrap();
        assert_eq!(m.stack(), &[num(6)]);
    }
}
