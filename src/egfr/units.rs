//! Unit registry for the clinical input fields
//!
//! Every field lists its measurement units in display order, each with the
//! multiplicative factor that converts a value in that unit to the field's
//! canonical unit (mg/dl for creatinine and urea, mg/l for cystatin C, cm for
//! height).

use serde::{Deserialize, Serialize};

// ============================================================================
// Conversion Constants
// ============================================================================

/// µmol/l of creatinine per mg/dl
pub const UMOL_PER_MG_CREATININE: f64 = 88.4;
/// mmol/l of urea per mg/dl (BUN)
pub const MMOL_PER_MG_UREA: f64 = 0.3571;
/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;

/// Factor that identifies a field's canonical unit
pub const CANONICAL_FACTOR: f64 = 1.0;

/// Clinical quantity collected by the calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldId {
    #[serde(rename = "crea")]
    Creatinine,
    #[serde(rename = "urea")]
    Urea,
    #[serde(rename = "cysc")]
    CystatinC,
    #[serde(rename = "height")]
    Height,
}

impl FieldId {
    /// All fields, in form order
    pub const ALL: [FieldId; 4] = [
        FieldId::Creatinine,
        FieldId::Urea,
        FieldId::CystatinC,
        FieldId::Height,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::Creatinine => "crea",
            FieldId::Urea => "urea",
            FieldId::CystatinC => "cysc",
            FieldId::Height => "height",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "crea" | "creatinine" => Some(FieldId::Creatinine),
            "urea" | "bun" => Some(FieldId::Urea),
            "cysc" | "cystatin_c" | "cystatin" => Some(FieldId::CystatinC),
            "height" => Some(FieldId::Height),
            _ => None,
        }
    }

    /// Position of this field in [`FIELDS`] and [`FieldId::ALL`]
    pub fn index(&self) -> usize {
        match self {
            FieldId::Creatinine => 0,
            FieldId::Urea => 1,
            FieldId::CystatinC => 2,
            FieldId::Height => 3,
        }
    }

    /// Registry entry for this field
    pub fn field(&self) -> &'static Field {
        &FIELDS[self.index()]
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One measurement unit of a field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Unit {
    pub id: &'static str,
    pub label: &'static str,
    /// Multiply a value in this unit by `factor` to get the canonical unit
    pub factor: f64,
}

impl Unit {
    pub fn is_canonical(&self) -> bool {
        self.factor == CANONICAL_FACTOR
    }
}

/// A clinical field and its ordered units
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Field {
    pub id: FieldId,
    pub label: &'static str,
    pub units: &'static [Unit],
}

const CREATININE_UNITS: [Unit; 2] = [
    Unit {
        id: "µmol",
        label: "µmol/l",
        factor: 1.0 / UMOL_PER_MG_CREATININE,
    },
    Unit {
        id: "mg",
        label: "mg/dl",
        factor: CANONICAL_FACTOR,
    },
];

const UREA_UNITS: [Unit; 2] = [
    Unit {
        id: "mmol",
        label: "mmol/l",
        factor: 1.0 / MMOL_PER_MG_UREA,
    },
    Unit {
        id: "mg",
        label: "mg/dl",
        factor: CANONICAL_FACTOR,
    },
];

const CYSTATIN_C_UNITS: [Unit; 1] = [Unit {
    id: "mg",
    label: "mg/l",
    factor: CANONICAL_FACTOR,
}];

const HEIGHT_UNITS: [Unit; 2] = [
    Unit {
        id: "cm",
        label: "cm",
        factor: CANONICAL_FACTOR,
    },
    Unit {
        id: "in",
        label: "in",
        factor: CM_PER_INCH,
    },
];

/// The static field table, indexed by [`FieldId::index`]
pub static FIELDS: [Field; 4] = [
    Field {
        id: FieldId::Creatinine,
        label: "Creatinine",
        units: &CREATININE_UNITS,
    },
    Field {
        id: FieldId::Urea,
        label: "BUN",
        units: &UREA_UNITS,
    },
    Field {
        id: FieldId::CystatinC,
        label: "Cystatin C",
        units: &CYSTATIN_C_UNITS,
    },
    Field {
        id: FieldId::Height,
        label: "Height",
        units: &HEIGHT_UNITS,
    },
];

impl Field {
    /// Index of the unit whose factor is 1
    pub fn canonical_index(&self) -> usize {
        self.units
            .iter()
            .position(Unit::is_canonical)
            .unwrap_or_default()
    }

    /// Unit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid unit index for this field. Indices come
    /// from bounded form state, so an out-of-range index is a caller bug.
    pub fn unit(&self, index: usize) -> &'static Unit {
        assert!(
            index < self.units.len(),
            "unit index {} out of range for field {} ({} units)",
            index,
            self.id,
            self.units.len()
        );
        let units: &'static [Unit] = self.units;
        &units[index]
    }

    /// Find a unit by id or label, ignoring case and the µ/u spelling
    pub fn find_unit(&self, unit: &str) -> Option<usize> {
        let wanted = normalize_unit_name(unit);
        self.units.iter().position(|u| {
            normalize_unit_name(u.id) == wanted || normalize_unit_name(u.label) == wanted
        })
    }

    /// Convert `value` in unit `index` to the canonical unit. NaN propagates.
    pub fn to_canonical(&self, index: usize, value: f64) -> f64 {
        value * self.unit(index).factor
    }

    /// Convert a canonical `value` back to unit `index`
    pub fn from_canonical(&self, index: usize, value: f64) -> f64 {
        value / self.unit(index).factor
    }
}

fn normalize_unit_name(name: &str) -> String {
    name.trim().to_lowercase().replace(['µ', 'μ'], "u")
}

/// Units available for a field, in display order
pub fn get_units(field: FieldId) -> &'static [Unit] {
    field.field().units
}

/// Convert `value` from the field's unit at `unit_index` to its canonical unit
pub fn convert(field: FieldId, unit_index: usize, value: f64) -> f64 {
    field.field().to_canonical(unit_index, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_has_one_canonical_unit() {
        for field in &FIELDS {
            let canonical = field.units.iter().filter(|u| u.is_canonical()).count();
            assert_eq!(canonical, 1, "field {}", field.id);
            assert!(field.units.iter().all(|u| u.factor > 0.0));
        }
    }

    #[test]
    fn test_field_table_matches_index() {
        for id in FieldId::ALL {
            assert_eq!(id.field().id, id);
        }
    }

    #[test]
    fn test_canonical_indices() {
        assert_eq!(FieldId::Creatinine.field().canonical_index(), 1);
        assert_eq!(FieldId::Urea.field().canonical_index(), 1);
        assert_eq!(FieldId::CystatinC.field().canonical_index(), 0);
        assert_eq!(FieldId::Height.field().canonical_index(), 0);
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!(FieldId::from_str("crea"), Some(FieldId::Creatinine));
        assert_eq!(FieldId::from_str("BUN"), Some(FieldId::Urea));
        assert_eq!(FieldId::from_str("cystatin-c"), Some(FieldId::CystatinC));
        assert_eq!(FieldId::from_str("height"), Some(FieldId::Height));
        assert_eq!(FieldId::from_str("weight"), None);
    }

    #[test]
    fn test_find_unit() {
        let crea = FieldId::Creatinine.field();
        assert_eq!(crea.find_unit("µmol"), Some(0));
        assert_eq!(crea.find_unit("umol/l"), Some(0));
        assert_eq!(crea.find_unit("mg/dL"), Some(1));
        assert_eq!(crea.find_unit("mmol"), None);
        assert_eq!(FieldId::Height.field().find_unit("in"), Some(1));
    }

    #[test]
    fn test_creatinine_umol_to_mg() {
        let mg = convert(FieldId::Creatinine, 0, 88.4);
        assert!((mg - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_urea_mmol_to_mg() {
        let mg = convert(FieldId::Urea, 0, 10.713);
        assert!((mg - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_height_inches_to_cm() {
        assert!((convert(FieldId::Height, 1, 1.0) - 2.54).abs() < 1e-12);
        let inches = FieldId::Height.field().from_canonical(1, 2.54);
        assert!((inches - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_convert_propagates_nan() {
        assert!(convert(FieldId::Height, 1, f64::NAN).is_nan());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_invalid_unit_index_panics() {
        convert(FieldId::CystatinC, 1, 1.0);
    }

    #[test]
    fn test_get_units_order() {
        let labels: Vec<&str> = get_units(FieldId::Creatinine).iter().map(|u| u.label).collect();
        assert_eq!(labels, vec!["µmol/l", "mg/dl"]);
    }
}
