//! Canonicalization and mirrored unit display
//!
//! Turns raw field text into canonical numbers for the formulas, and keeps the
//! per-unit text boxes of a mirrored field numerically in sync.

use serde::Serialize;

use super::sanitize::{parse_number, sanitize};
use super::units::FieldId;

/// Canonical-unit value of a field's raw text.
///
/// Empty, partial (`"."`) or rejected text yields 0, as does any conversion
/// that does not produce a finite number.
pub fn convert_to_canonical(field: FieldId, unit_index: usize, raw_text: &str) -> f64 {
    let Some(text) = sanitize(raw_text) else {
        return 0.0;
    };
    let value = field.field().to_canonical(unit_index, parse_number(&text));
    zero_if_not_finite(value)
}

/// Collapse NaN, infinities and negative zero to 0
pub fn zero_if_not_finite(value: f64) -> f64 {
    if value.is_finite() && value != 0.0 {
        value
    } else {
        0.0
    }
}

/// Render a derived value for display. NaN renders as an empty box.
pub fn format_derived(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Display text for every unit of a field after one of them was edited
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MirroredValues {
    pub field: FieldId,
    /// Index of the unit the user typed into
    pub edited_unit: usize,
    /// One display string per unit, in registry order
    pub texts: Vec<String>,
}

impl MirroredValues {
    /// Display text for unit `index`
    pub fn text(&self, index: usize) -> &str {
        self.texts.get(index).map(String::as_str).unwrap_or_default()
    }
}

/// Propagate an edit in one unit box to every other unit box of the field.
///
/// Returns `None` when the edit is rejected; nothing should change then. The
/// edited box echoes the sanitized text as typed, so a trailing dot or leading
/// zeros survive while the user is still typing. The other boxes are computed
/// through the canonical unit and are empty while the edited text has no
/// numeric value.
pub fn propagate(field: FieldId, edited_unit: usize, edited_text: &str) -> Option<MirroredValues> {
    let text = sanitize(edited_text)?;
    let entry = field.field();
    let canonical = entry.to_canonical(edited_unit, parse_number(&text));

    let texts = (0..entry.units.len())
        .map(|index| {
            if index == edited_unit {
                text.clone()
            } else {
                format_derived(entry.from_canonical(index, canonical))
            }
        })
        .collect();

    Some(MirroredValues {
        field,
        edited_unit,
        texts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_convert_to_canonical_empty_is_zero() {
        assert_eq!(convert_to_canonical(FieldId::Creatinine, 0, ""), 0.0);
        assert_eq!(convert_to_canonical(FieldId::Creatinine, 0, "."), 0.0);
        assert_eq!(convert_to_canonical(FieldId::Height, 1, "abc"), 0.0);
    }

    #[test]
    fn test_convert_to_canonical_creatinine() {
        let mg = convert_to_canonical(FieldId::Creatinine, 0, "88,4");
        assert_eq!(format!("{:.2}", mg), "1.00");
        let mg = convert_to_canonical(FieldId::Creatinine, 1, "1.5");
        assert_eq!(mg, 1.5);
    }

    #[test]
    fn test_convert_to_canonical_height() {
        let cm = convert_to_canonical(FieldId::Height, 1, "1");
        assert_eq!(format!("{:.2}", cm), "2.54");
    }

    #[test]
    fn test_convert_to_canonical_overflow_is_zero() {
        let huge = "9".repeat(400);
        assert_eq!(convert_to_canonical(FieldId::Height, 0, &huge), 0.0);
    }

    #[test]
    fn test_propagate_creatinine_from_umol() {
        let mirrored = propagate(FieldId::Creatinine, 0, "88.4").unwrap();
        assert_eq!(mirrored.text(0), "88.4");
        assert_eq!(mirrored.text(1), "1");
    }

    #[test]
    fn test_propagate_creatinine_from_mg() {
        let mirrored = propagate(FieldId::Creatinine, 1, "2").unwrap();
        assert_eq!(mirrored.text(0), "176.8");
        assert_eq!(mirrored.text(1), "2");
    }

    #[test]
    fn test_propagate_height_from_cm() {
        let mirrored = propagate(FieldId::Height, 0, "2.54").unwrap();
        let inches: f64 = mirrored.text(1).parse().unwrap();
        assert_eq!(format!("{:.2}", inches), "1.00");
    }

    #[test]
    fn test_propagate_keeps_trailing_dot() {
        let mirrored = propagate(FieldId::Height, 1, "12,").unwrap();
        assert_eq!(mirrored.text(1), "12.");
        assert_eq!(mirrored.text(0), "30.48");
    }

    #[test]
    fn test_propagate_blank_clears_other_side() {
        let mirrored = propagate(FieldId::Urea, 0, ".").unwrap();
        assert_eq!(mirrored.texts, vec![".".to_string(), String::new()]);

        let mirrored = propagate(FieldId::Urea, 1, "").unwrap();
        assert_eq!(mirrored.texts, vec![String::new(), String::new()]);
    }

    #[test]
    fn test_propagate_single_unit_field() {
        let mirrored = propagate(FieldId::CystatinC, 0, "0.9").unwrap();
        assert_eq!(mirrored.texts, vec!["0.9".to_string()]);
    }

    #[test]
    fn test_propagate_rejects_invalid_text() {
        assert_eq!(propagate(FieldId::Creatinine, 0, "1.2.3"), None);
        assert_eq!(propagate(FieldId::Creatinine, 0, "-1"), None);
    }

    #[test]
    fn test_format_derived() {
        assert_eq!(format_derived(f64::NAN), "");
        assert_eq!(format_derived(1.5), "1.5");
        assert_eq!(format_derived(2.0), "2");
    }

    proptest! {
        #[test]
        fn conversion_round_trips(value in 0.0f64..10_000.0) {
            for id in FieldId::ALL {
                let field = id.field();
                for a in 0..field.units.len() {
                    for b in 0..field.units.len() {
                        let in_b = field.from_canonical(b, field.to_canonical(a, value));
                        let back = field.from_canonical(a, field.to_canonical(b, in_b));
                        prop_assert!((back - value).abs() <= 1e-9 * value.max(1.0));
                    }
                }
            }
        }
    }
}
