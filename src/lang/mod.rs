//! # Stagelisp value and operation model
//!
//! This module defines the data shared by both machines: runtime values,
//! the replayable operations (`Thunk`) and the closed set of built-ins.
//!
//! ## Documentation conventions
//!
//! - Stack effects are written as `( before -- after )`.
//! - `?` in a stack effect denotes a value that is Unknown during staging.

pub mod builtin;
pub mod thunk;
pub mod value;
