//! Front-end: turns source text into machine operations.
//!
//! There is no separate token or AST stage. The reader walks the characters
//! with recursive descent and drives whichever machine it is handed, so the
//! same grammar feeds the interpreter at top level and a compiler inside a
//! definition body.

pub mod reader;
pub mod reader_error;
pub mod source;
pub mod toplevel;
