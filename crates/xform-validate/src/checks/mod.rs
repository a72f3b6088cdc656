//! Per-cell validation checks.
//!
//! Each check is a pure function over one question and one raw cell; the
//! engine decides ordering and short-circuiting.

pub mod datatype;
pub mod required;

pub use datatype::{Normalized, TypeMismatch, validate_type};
pub use required::{RequiredError, check_required, is_absent};
