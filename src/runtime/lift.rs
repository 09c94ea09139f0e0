//! Lifting table: how each built-in behaves when the compiler drives it.
//!
//! Data-movement built-ins rearrange or associate values without looking at
//! them, so they run unchanged on a mix of known and Unknown values.
//! Computing built-ins cannot run on Unknown operands; while staging they
//! consume their operands and leave Unknown results of the same arity. The
//! concrete built-in is what gets recorded, to run later on real values.

use crate::lang::builtin::Builtin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staged {
    /// Run the concrete behavior against the compiler.
    Direct,
    /// Pop `pops` values and push `pushes` Unknowns.
    Opaque { pops: usize, pushes: usize },
}

const LIFT_TABLE: &[(Builtin, Staged)] = &[
    (Builtin::Dup, Staged::Direct),
    (Builtin::Drop, Staged::Direct),
    (Builtin::Swap, Staged::Direct),
    (Builtin::Over, Staged::Direct),
    (Builtin::Let, Staged::Direct),
    (Builtin::Bind, Staged::Direct),
    (Builtin::Add, Staged::Opaque { pops: 2, pushes: 1 }),
    (Builtin::Sub, Staged::Opaque { pops: 2, pushes: 1 }),
    (Builtin::Mul, Staged::Opaque { pops: 2, pushes: 1 }),
    (Builtin::Div, Staged::Opaque { pops: 2, pushes: 1 }),
    (Builtin::Neg, Staged::Opaque { pops: 1, pushes: 1 }),
];

/// Staged counterpart of `builtin`, or `None` if it cannot be lifted.
pub fn staged(builtin: Builtin) -> Option<Staged> {
    LIFT_TABLE
        .iter()
        .find(|(b, _)| *b == builtin)
        .map(|(_, staged)| *staged)
}
