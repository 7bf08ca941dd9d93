//! refold-core — imperative-to-functional block conversion.
//!
//! The pipeline takes a C-like statement sequence (as produced by an
//! external parser) and rewrites it as a chain of let-bindings, recursive
//! functions for loops, and explicit joins for conditionals, then applies
//! dataflow-based simplifications before rendering source text:
//!
//! 1. [`analysis`] — one fold over the block produces the ordered event
//!    record and the read/written variable sets.
//! 2. [`classify`] — pure passes over the record mark dead stores and
//!    inlinable constants.
//! 3. [`translate`] — each imperative node maps to one functional term;
//!    unsupported constructs degrade to diagnostics, not errors.
//! 4. [`render`] — the functional tree is serialized, applying elision and
//!    inlining decisions at each `let` site in record order.
//!
//! [`convert::BlockConverter`] wires the stages together for one block.

pub mod analysis;
pub mod ast;
pub mod classify;
pub mod config;
pub mod convert;
pub mod error;
pub mod func;
pub mod render;
pub mod translate;

pub use ast::{Literal, Node};
pub use config::PassConfig;
pub use convert::{convert_program, BlockConverter, Conversion};
pub use error::CoreError;
pub use translate::Diagnostic;
