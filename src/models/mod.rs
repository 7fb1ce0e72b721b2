//! Data models
//!
//! In-memory state of a calculator form session.

mod form;

pub use form::{CalculationResult, EditOutcome, FieldInput, FormSession};
