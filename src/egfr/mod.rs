//! Kidney function calculation module
//!
//! Handles input sanitization, unit conversion and the eGFR formulas.

pub mod converter;
pub mod formulas;
pub mod gender;
pub mod sanitize;
pub mod units;

pub use converter::{convert_to_canonical, format_derived, propagate, MirroredValues};
pub use formulas::{
    bedside_schwartz, ckid_schwartz, compute_bedside, compute_ckid, format_egfr,
    CanonicalValues, DisplayMode,
};
pub use gender::GenderSelection;
pub use sanitize::{parse_number, sanitize};
pub use units::{convert, get_units, Field, FieldId, Unit, FIELDS};
