use crate::lang::thunk::Thunk;

#[derive(Debug)]
pub struct StackCheckError {
    pub message: String,
}

impl std::fmt::Display for StackCheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stack-check error: {}", self.message)
    }
}

impl StackCheckError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Returns (pops, pushes) for a thunk, or None if the effect is only known
/// by running it.
fn effect(thunk: &Thunk) -> Option<(i64, i64)> {
    match thunk {
        Thunk::Push(_) | Thunk::Lookup(_) => Some((0, 1)),
        Thunk::Builtin(builtin) => {
            let (pops, pushes) = builtin.effect();
            Some((pops as i64, pushes as i64))
        }
        // Nested quotes are inlined calls; their net effect is not declared.
        Thunk::Quote(_) => None,
    }
}

/// Check stack effects with a given initial stack height.
///
/// For a residual program, `initial_height` is the number of parameters the
/// caller leaves on the real stack. Returns the final height, or `None` if
/// the scan stopped at a thunk with unknown effect.
pub fn check_ops_with_initial(
    ops: &[Thunk],
    initial_height: usize,
) -> Result<Option<usize>, StackCheckError> {
    let mut h = initial_height as i64;

    for (ip, op) in ops.iter().enumerate() {
        match effect(op) {
            Some((pops, pushes)) => {
                h -= pops;
                if h < 0 {
                    return Err(StackCheckError::new(format!(
                        "stack underflow at ip={}, op={}, needed {} items",
                        ip,
                        op.describe(),
                        pops
                    )));
                }
                h += pushes;
            }
            None => return Ok(None),
        }
    }

    Ok(Some(h as usize))
}

/// Check stack effects starting from empty stack.
#[cfg(test)]
pub fn check_ops(ops: &[Thunk]) -> Result<Option<usize>, StackCheckError> {
    check_ops_with_initial(ops, 0)
}
