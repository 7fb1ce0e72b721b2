//! Boundary error types
//!
//! The numeric core never fails. These errors cover arguments arriving from
//! MCP clients or the command line that do not name a real field, unit or
//! gender.

use thiserror::Error;

use crate::egfr::FieldId;

#[derive(Debug, Error, PartialEq)]
pub enum KidcalError {
    #[error("Unknown field: {0} (expected crea, urea, cysc or height)")]
    UnknownField(String),

    #[error("Unknown unit '{unit}' for field {field}")]
    UnknownUnit { field: FieldId, unit: String },

    #[error("Unit index {index} out of range for field {field} ({count} units)")]
    UnitIndexOutOfRange {
        field: FieldId,
        index: usize,
        count: usize,
    },

    #[error("Unknown gender: {0} (expected female, male or unset)")]
    UnknownGender(String),

    #[error("Mirrored edits need the mirrored input layout")]
    MirroredLayoutRequired,
}

/// Result type for boundary operations
pub type KidcalResult<T> = Result<T, KidcalError>;

/// Resolve a field id or alias
pub fn parse_field(field: &str) -> KidcalResult<FieldId> {
    FieldId::from_str(field).ok_or_else(|| KidcalError::UnknownField(field.to_string()))
}

/// Check a unit index against the registry
pub fn check_unit_index(field: FieldId, index: usize) -> KidcalResult<usize> {
    let count = field.field().units.len();
    if index < count {
        Ok(index)
    } else {
        Err(KidcalError::UnitIndexOutOfRange {
            field,
            index,
            count,
        })
    }
}

/// Resolve a unit given by id, label, or index. `None` selects the canonical unit.
pub fn resolve_unit(field: FieldId, unit: Option<&str>) -> KidcalResult<usize> {
    let entry = field.field();
    match unit.map(str::trim) {
        None | Some("") => Ok(entry.canonical_index()),
        Some(name) => {
            if let Some(index) = entry.find_unit(name) {
                return Ok(index);
            }
            match name.parse::<usize>() {
                Ok(index) => check_unit_index(field, index),
                Err(_) => Err(KidcalError::UnknownUnit {
                    field,
                    unit: name.to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field("crea"), Ok(FieldId::Creatinine));
        assert_eq!(
            parse_field("sodium"),
            Err(KidcalError::UnknownField("sodium".to_string()))
        );
    }

    #[test]
    fn test_resolve_unit() {
        assert_eq!(resolve_unit(FieldId::Creatinine, None), Ok(1));
        assert_eq!(resolve_unit(FieldId::Creatinine, Some("umol")), Ok(0));
        assert_eq!(resolve_unit(FieldId::Height, Some("1")), Ok(1));
        assert_eq!(
            resolve_unit(FieldId::CystatinC, Some("1")),
            Err(KidcalError::UnitIndexOutOfRange {
                field: FieldId::CystatinC,
                index: 1,
                count: 1
            })
        );
        assert!(matches!(
            resolve_unit(FieldId::Height, Some("ft")),
            Err(KidcalError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_error_messages() {
        let err = KidcalError::UnitIndexOutOfRange {
            field: FieldId::Urea,
            index: 5,
            count: 2,
        };
        assert_eq!(err.to_string(), "Unit index 5 out of range for field urea (2 units)");
    }
}
