use serde::{Deserialize, Serialize};

use crate::lang::value::Value;
use crate::runtime::Machine;
use crate::runtime::runtime_error::{Result, RuntimeError};

// =============================================================================
// BUILTIN - Named operations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Builtin {
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Neg,

    // stack ops
    Dup,
    Drop,
    Swap,
    Over,

    // binding
    Let,  // ( name v -- v )
    Bind, // ( v name -- )

    // I/O
    Print,
}

pub const ALL_BUILTINS: &[Builtin] = &[
    Builtin::Add,
    Builtin::Sub,
    Builtin::Mul,
    Builtin::Div,
    Builtin::Neg,
    Builtin::Dup,
    Builtin::Drop,
    Builtin::Swap,
    Builtin::Over,
    Builtin::Let,
    Builtin::Bind,
    Builtin::Print,
];

impl Builtin {
    /// Surface name, also used for lifting-table lookups and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Add => "add",
            Builtin::Sub => "sub",
            Builtin::Mul => "mul",
            Builtin::Div => "div",
            Builtin::Neg => "neg",
            Builtin::Dup => "dup",
            Builtin::Drop => "drop",
            Builtin::Swap => "swap",
            Builtin::Over => "over",
            Builtin::Let => "let",
            Builtin::Bind => "bind",
            Builtin::Print => "print",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        ALL_BUILTINS.iter().copied().find(|b| b.name() == name)
    }

    /// Returns (pops, pushes) of the concrete behavior.
    pub fn effect(self) -> (usize, usize) {
        use Builtin::*;
        match self {
            Add | Sub | Mul | Div => (2, 1),
            Neg => (1, 1),

            Dup => (1, 2),
            Drop => (1, 0),
            Swap => (2, 2),
            Over => (2, 3),

            Let => (2, 1),
            Bind => (2, 0),

            Print => (1, 1),
        }
    }

    /// Run the concrete behavior against whichever machine invokes it.
    pub fn apply<M: Machine + ?Sized>(self, m: &mut M) -> Result<()> {
        match self {
            // Arithmetic
            Builtin::Add => binary(m, self, i64::checked_add),
            Builtin::Sub => binary(m, self, i64::checked_sub),
            Builtin::Mul => binary(m, self, i64::checked_mul),
            Builtin::Div => {
                let b = pop_number(m, self)?;
                let a = pop_number(m, self)?;
                if b == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                let n = a
                    .checked_div(b)
                    .ok_or(RuntimeError::Overflow(self.name()))?;
                m.push(Value::Number(n))
            }
            Builtin::Neg => {
                let a = pop_number(m, self)?;
                let n = a.checked_neg().ok_or(RuntimeError::Overflow(self.name()))?;
                m.push(Value::Number(n))
            }

            // Stack operations
            Builtin::Dup => {
                let a = m.pop()?;
                m.push(a.clone())?;
                m.push(a)
            }
            Builtin::Drop => m.pop().map(|_| ()),
            Builtin::Swap => {
                let b = m.pop()?;
                let a = m.pop()?;
                m.push(b)?;
                m.push(a)
            }
            Builtin::Over => {
                let b = m.pop()?;
                let a = m.pop()?;
                m.push(a.clone())?;
                m.push(b)?;
                m.push(a)
            }

            // Binding
            Builtin::Let => {
                let value = m.pop()?;
                let name = pop_symbol(m, self)?;
                m.bind(&name, value.clone());
                m.push(value)
            }
            Builtin::Bind => {
                let name = pop_symbol(m, self)?;
                let value = m.pop()?;
                m.bind(&name, value);
                Ok(())
            }

            // I/O
            Builtin::Print => {
                let value = m.pop()?;
                m.emit(value.to_string())?;
                m.push(Value::Unit)
            }
        }
    }
}

impl std::fmt::Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn pop_number<M: Machine + ?Sized>(m: &mut M, op: Builtin) -> Result<i64> {
    match m.pop()? {
        Value::Number(n) => Ok(n),
        other => Err(RuntimeError::type_mismatch(op.name(), "number", &other)),
    }
}

fn pop_symbol<M: Machine + ?Sized>(m: &mut M, op: Builtin) -> Result<String> {
    match m.pop()? {
        Value::Symbol(s) => Ok(s),
        other => Err(RuntimeError::type_mismatch(op.name(), "symbol", &other)),
    }
}

/// Apply a checked binary operation `( a b -- a op b )`.
fn binary<M, F>(m: &mut M, op: Builtin, f: F) -> Result<()>
where
    M: Machine + ?Sized,
    F: Fn(i64, i64) -> Option<i64>,
{
    let b = pop_number(m, op)?;
    let a = pop_number(m, op)?;
    let n = f(a, b).ok_or(RuntimeError::Overflow(op.name()))?;
    m.push(Value::Number(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::interpreter::Interpreter;

    fn run(values: &[i64], builtin: Builtin) -> Result<Vec<Value>> {
        let mut interp = Interpreter::new();
        for &n in values {
            interp.push(Value::Number(n))?;
        }
        builtin.apply(&mut interp)?;
        Ok(interp.stack().to_vec())
    }

    #[test]
    fn test_names_round_trip() {
        for &b in ALL_BUILTINS {
            assert_eq!(Builtin::from_name(b.name()), Some(b));
        }
        assert_eq!(Builtin::from_name("def"), None);
    }

    #[test]
    fn test_arithmetic_operand_order() {
        assert_eq!(run(&[10, 3], Builtin::Sub).unwrap(), vec![Value::Number(7)]);
        assert_eq!(run(&[10, 3], Builtin::Div).unwrap(), vec![Value::Number(3)]);
        assert_eq!(run(&[4, 5], Builtin::Mul).unwrap(), vec![Value::Number(20)]);
        assert_eq!(run(&[4], Builtin::Neg).unwrap(), vec![Value::Number(-4)]);
    }

    #[test]
    fn test_arithmetic_errors() {
        assert_eq!(run(&[1, 0], Builtin::Div), Err(RuntimeError::DivisionByZero));
        assert_eq!(
            run(&[i64::MAX, 1], Builtin::Add),
            Err(RuntimeError::Overflow("add"))
        );
        assert_eq!(
            run(&[i64::MIN, -1], Builtin::Div),
            Err(RuntimeError::Overflow("div"))
        );
        assert_eq!(run(&[1], Builtin::Add), Err(RuntimeError::StackUnderflow));
    }

    #[test]
    fn test_stack_shuffles() {
        let n = Value::Number;
        assert_eq!(run(&[1, 2], Builtin::Swap).unwrap(), vec![n(2), n(1)]);
        assert_eq!(run(&[1, 2], Builtin::Over).unwrap(), vec![n(1), n(2), n(1)]);
        assert_eq!(run(&[7], Builtin::Dup).unwrap(), vec![n(7), n(7)]);
        assert_eq!(run(&[7], Builtin::Drop).unwrap(), vec![]);
    }

    #[test]
    fn test_effects_match_concrete_behavior() {
        for &b in ALL_BUILTINS {
            let (pops, pushes) = b.effect();
            let mut interp = Interpreter::new();
            let sym = Value::Symbol("x".to_string());
            let inputs = match b {
                Builtin::Let => vec![sym, Value::Number(6)],
                Builtin::Bind => vec![Value::Number(6), sym],
                _ => [6, 3][..pops].iter().map(|&n| Value::Number(n)).collect(),
            };
            assert_eq!(inputs.len(), pops, "{}", b);
            for v in inputs {
                interp.push(v).unwrap();
            }
            b.apply(&mut interp).unwrap();
            assert_eq!(interp.stack().len(), pushes, "{}", b);
        }
    }

    #[test]
    fn test_let_requires_symbol() {
        let err = run(&[1, 2], Builtin::Let).unwrap_err();
        assert!(matches!(err, RuntimeError::TypeMismatch { ref op, .. } if op == "let"));
    }
}
