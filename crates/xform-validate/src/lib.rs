//! XLSForm validation engine.
//!
//! Takes an already-loaded [`FormSchema`] and a materialized [`SheetGrid`]
//! and produces an ordered, per-cell error report. The engine holds no state
//! across calls; [`validate`] is the sole entry point.

pub mod checks;
mod engine;
mod error;
pub mod expr;
mod header;

pub use engine::validate;
pub use error::EngineError;
pub use expr::{CellState, EvalContext, EvalError};

pub use xform_model::{
    ErrorKind, FormSchema, Question, QuestionType, SheetGrid, ValidationError, ValidationResult,
};
