//! Tooling over residual programs: disassembly, static stack checking and a
//! stable binary encoding.

pub mod disasm;
pub mod stack_check;

use crate::lang::thunk::Thunk;

/// Encode a residual program with postcard.
///
/// Equal programs encode to equal bytes, which makes the encoding usable as
/// a fingerprint when comparing staging runs.
pub fn encode(ops: &[Thunk]) -> Result<Vec<u8>, postcard::Error> {
    postcard::to_allocvec(ops)
}

#[cfg(test)]
pub fn decode(bytes: &[u8]) -> Result<Vec<Thunk>, postcard::Error> {
    postcard::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::builtin::Builtin;
    use crate::lang::value::Value;

    #[test]
    fn test_decode_restores_nested_quote() {
        let ops = vec![
            Thunk::Push(Value::Symbol("x".to_string())),
            Thunk::Builtin(Builtin::Bind),
            Thunk::Quote(vec![Thunk::Lookup("x".to_string())]),
        ];
        let bytes = encode(&ops).unwrap();
        assert_eq!(decode(&bytes).unwrap(), ops);
    }

    #[test]
    fn test_different_programs_encode_differently() {
        let a = encode(&[Thunk::Push(Value::Number(1))]).unwrap();
        let b = encode(&[Thunk::Push(Value::Number(2))]).unwrap();
        assert_ne!(a, b);
    }
}
