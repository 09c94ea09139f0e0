use std::collections::HashMap;
use std::fmt::Write;

use crate::lang::thunk::Thunk;
use crate::lang::value::Value;
use crate::residual::encode;

/// Print disassembly of every quote bound in a symbol table
pub fn print_quotes(symbols: &HashMap<String, Value>) {
    print!("{}", list_quotes(symbols));
}

/// Disassemble every quote bound in `symbols`, sorted by name.
pub fn list_quotes(symbols: &HashMap<String, Value>) -> String {
    let mut quotes: Vec<_> = symbols
        .iter()
        .filter_map(|(name, value)| match value {
            Value::Quote(ops) => Some((name, ops)),
            _ => None,
        })
        .collect();
    quotes.sort_by_key(|(name, _)| *name);

    let mut out = String::new();
    for (name, ops) in quotes {
        out.push_str(&disassemble(name, ops));
        out.push('\n');
    }
    out
}

/// Disassemble a single residual program under a header.
pub fn disassemble(name: &str, ops: &[Thunk]) -> String {
    let mut out = String::new();
    let size = encode(ops).map(|bytes| bytes.len()).unwrap_or(0);

    let _ = writeln!(out, "════════════════════════════════════════");
    let _ = writeln!(out, " {}", name);
    let _ = writeln!(out, " {} instructions, {} bytes", ops.len(), size);
    let _ = writeln!(out, "════════════════════════════════════════");
    disassemble_ops(&mut out, ops, 0);
    out
}

/// Disassemble a slice of thunks with indentation support
fn disassemble_ops(out: &mut String, ops: &[Thunk], indent: usize) {
    let prefix = "  ".repeat(indent);

    for (ip, op) in ops.iter().enumerate() {
        let _ = write!(out, "{}{:04}   ", prefix, ip);
        match op {
            Thunk::Push(v) => {
                let _ = writeln!(out, "PUSH        {}", format_value(v));
            }
            Thunk::Lookup(name) => {
                let _ = writeln!(out, "LOOKUP      {}", name);
            }
            Thunk::Builtin(builtin) => {
                let _ = writeln!(out, "{}", builtin.name().to_uppercase());
            }
            Thunk::Quote(inner) => {
                let _ = writeln!(out, "QUOTE       [");
                disassemble_ops(out, inner, indent + 1);
                let _ = writeln!(out, "{}            ]", prefix);
            }
        }
    }
}

fn format_value(v: &Value) -> String {
    match v {
        Value::Symbol(s) => format!("'{}", s),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::builtin::Builtin;

    #[test]
    fn test_disassemble_lists_each_op() {
        let ops = vec![
            Thunk::Push(Value::Symbol("x".to_string())),
            Thunk::Builtin(Builtin::Bind),
            Thunk::Lookup("x".to_string()),
            Thunk::Push(Value::Number(1)),
            Thunk::Builtin(Builtin::Add),
        ];
        let text = disassemble("inc", &ops);
        assert!(text.contains(" inc\n"));
        assert!(text.contains("5 instructions"));
        assert!(text.contains("0000   PUSH        'x"));
        assert!(text.contains("0001   BIND"));
        assert!(text.contains("0002   LOOKUP      x"));
        assert!(text.contains("0004   ADD"));
    }

    #[test]
    fn test_nested_quotes_are_indented() {
        let ops = vec![Thunk::Quote(vec![Thunk::Push(Value::Number(1))])];
        let text = disassemble("outer", &ops);
        assert!(text.contains("0000   QUOTE       ["));
        assert!(text.contains("  0000   PUSH        1"));
    }

    #[test]
    fn test_list_skips_non_quotes_and_sorts() {
        let mut symbols = HashMap::new();
        symbols.insert("x".to_string(), Value::Number(2));
        symbols.insert("b".to_string(), Value::Quote(vec![]));
        symbols.insert("a".to_string(), Value::Quote(vec![]));
        let text = list_quotes(&symbols);
        let a = text.find(" a\n").unwrap();
        let b = text.find(" b\n").unwrap();
        assert!(a < b);
        assert!(!text.contains(" x\n"));
    }
}
