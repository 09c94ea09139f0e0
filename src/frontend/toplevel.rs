use crate::frontend::reader::Reader;
use crate::lang::value::Value;
use crate::runtime::interpreter::Interpreter;
use crate::runtime::runtime_error::Result;

/// Evaluate each top-level expression of `source` on `interp`, in order.
///
/// Lines written by `print` are passed to `on_line` as they appear, followed
/// by one line per value the expression left on the stack, bottom first
/// (`nil` is skipped). An expression that leaves nothing prints nothing. The
/// first failure stops evaluation; lines already delivered stay delivered.
pub fn run_top_level<F>(source: &str, interp: &mut Interpreter, mut on_line: F) -> Result<()>
where
    F: FnMut(&str),
{
    let mut reader = Reader::new(source);

    loop {
        let height = interp.stack().len();
        let more = reader.accept_expr(interp);
        for line in interp.take_output() {
            on_line(&line);
        }
        if !more? {
            break;
        }

        for value in interp.take_above(height) {
            if value != Value::Unit {
                on_line(&value.to_string());
            }
        }
    }

    reader.expect_end()
}

/// Run `source` on a fresh interpreter and collect every output line.
#[cfg(test)]
pub fn eval_source(source: &str) -> Result<Vec<String>> {
    let mut interp = Interpreter::new();
    let mut lines = Vec::new();
    run_top_level(source, &mut interp, |line| lines.push(line.to_string()))?;
    Ok(lines)
}
