//! eGFR formulas
//!
//! CKiD Schwartz (Schwartz et al., J Am Soc Nephrol 2009;20(3):629-37) and
//! Bedside Schwartz (Staples et al., Pediatr Nephrol 2010;25(11):2321-6).
//! Both take canonical-unit inputs and are total: any arithmetic failure
//! collapses the result to 0.

use serde::{Deserialize, Serialize};

use super::converter::zero_if_not_finite;
use super::gender::GenderSelection;

pub const CKID_COEFFICIENT: f64 = 39.1;
pub const CKID_HEIGHT_CREATININE_EXPONENT: f64 = 0.516;
pub const CKID_CYSTATIN_C_REFERENCE: f64 = 1.8;
pub const CKID_CYSTATIN_C_EXPONENT: f64 = 0.294;
pub const CKID_UREA_REFERENCE: f64 = 30.0;
pub const CKID_UREA_EXPONENT: f64 = 0.169;
pub const CKID_HEIGHT_REFERENCE_M: f64 = 1.4;
pub const CKID_HEIGHT_EXPONENT: f64 = 0.188;
pub const CKID_MALE_FACTOR: f64 = 1.099;

pub const BEDSIDE_COEFFICIENT: f64 = 0.413;

/// Results at or above this are shown as "> 75" in capped mode
pub const CAP_THRESHOLD: f64 = 75.0;
pub const CAPPED_DISPLAY: &str = "> 75";

const CM_PER_M: f64 = 100.0;

/// How a CKiD result is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Always two decimals
    #[default]
    Raw,
    /// Two decimals below the threshold, "> 75" at or above it
    Capped,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Raw => "raw",
            DisplayMode::Capped => "capped",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Some(DisplayMode::Raw),
            "capped" | "cap" => Some(DisplayMode::Capped),
            _ => None,
        }
    }

    pub fn from_cap(cap_at_75: bool) -> Self {
        if cap_at_75 {
            DisplayMode::Capped
        } else {
            DisplayMode::Raw
        }
    }
}

/// Formula inputs in canonical units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalValues {
    /// mg/dl
    pub creatinine: f64,
    /// BUN, mg/dl
    pub urea: f64,
    /// mg/l
    pub cystatin_c: f64,
    /// cm
    pub height: f64,
}

/// CKiD Schwartz eGFR in ml/min/1.73 m²
pub fn ckid_schwartz(values: &CanonicalValues, gender: GenderSelection) -> f64 {
    let height_m = values.height / CM_PER_M;

    let result = CKID_COEFFICIENT
        * (height_m / values.creatinine).powf(CKID_HEIGHT_CREATININE_EXPONENT)
        * (CKID_CYSTATIN_C_REFERENCE / values.cystatin_c).powf(CKID_CYSTATIN_C_EXPONENT)
        * (CKID_UREA_REFERENCE / values.urea).powf(CKID_UREA_EXPONENT)
        * (height_m / CKID_HEIGHT_REFERENCE_M).powf(CKID_HEIGHT_EXPONENT)
        * CKID_MALE_FACTOR.powf(gender.ckid_term());

    zero_if_not_finite(result)
}

/// Bedside Schwartz eGFR in ml/min/1.73 m²
pub fn bedside_schwartz(creatinine: f64, height_cm: f64) -> f64 {
    zero_if_not_finite(BEDSIDE_COEFFICIENT * height_cm / creatinine)
}

/// Two-decimal rendering, or the capped label when the mode asks for it
pub fn format_egfr(value: f64, mode: DisplayMode) -> String {
    let value = zero_if_not_finite(value);
    match mode {
        DisplayMode::Capped if value >= CAP_THRESHOLD => CAPPED_DISPLAY.to_string(),
        _ => format!("{:.2}", value),
    }
}

/// CKiD display string from canonical inputs
pub fn compute_ckid(
    creatinine: f64,
    urea: f64,
    cystatin_c: f64,
    height: f64,
    gender: GenderSelection,
    mode: DisplayMode,
) -> String {
    let values = CanonicalValues {
        creatinine,
        urea,
        cystatin_c,
        height,
    };
    format_egfr(ckid_schwartz(&values, gender), mode)
}

/// Bedside display string from canonical inputs
pub fn compute_bedside(creatinine: f64, height: f64) -> String {
    format_egfr(bedside_schwartz(creatinine, height), DisplayMode::Raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reference_values() -> CanonicalValues {
        CanonicalValues {
            creatinine: 1.4,
            urea: 30.0,
            cystatin_c: 1.8,
            height: 140.0,
        }
    }

    #[test]
    fn test_ckid_reference_point_male() {
        // every ratio is 1, leaving 39.1 * 1.099
        let result = ckid_schwartz(&reference_values(), GenderSelection::Male);
        assert!((result - 42.9709).abs() < 1e-9);
        assert_eq!(format_egfr(result, DisplayMode::Raw), "42.97");
    }

    #[test]
    fn test_ckid_reference_point_female_and_unset() {
        let female = ckid_schwartz(&reference_values(), GenderSelection::Female);
        let unset = ckid_schwartz(&reference_values(), GenderSelection::Unset);
        assert!((female - 39.1).abs() < 1e-9);
        assert_eq!(female, unset);
    }

    #[test]
    fn test_ckid_unit_creatinine() {
        let values = CanonicalValues {
            creatinine: 1.0,
            ..reference_values()
        };
        assert_eq!(
            compute_ckid(
                values.creatinine,
                values.urea,
                values.cystatin_c,
                values.height,
                GenderSelection::Male,
                DisplayMode::Raw
            ),
            "51.12"
        );
    }

    #[test]
    fn test_ckid_missing_creatinine_is_zero() {
        let values = CanonicalValues {
            creatinine: 0.0,
            ..reference_values()
        };
        assert_eq!(ckid_schwartz(&values, GenderSelection::Male), 0.0);
        assert_eq!(
            compute_ckid(0.0, 30.0, 1.8, 140.0, GenderSelection::Male, DisplayMode::Raw),
            "0.00"
        );
    }

    #[test]
    fn test_ckid_all_empty_is_zero() {
        let result = ckid_schwartz(&CanonicalValues::default(), GenderSelection::Unset);
        assert_eq!(result, 0.0);
    }

    #[test]
    fn test_ckid_missing_height_is_zero() {
        let values = CanonicalValues {
            height: 0.0,
            ..reference_values()
        };
        assert_eq!(ckid_schwartz(&values, GenderSelection::Female), 0.0);
    }

    #[test]
    fn test_ckid_negative_base_is_zero() {
        let values = CanonicalValues {
            creatinine: -1.0,
            ..reference_values()
        };
        assert_eq!(ckid_schwartz(&values, GenderSelection::Male), 0.0);
    }

    #[test]
    fn test_ckid_capped_display() {
        let high = compute_ckid(0.5, 15.0, 0.9, 150.0, GenderSelection::Male, DisplayMode::Capped);
        assert_eq!(high, "> 75");
        let raw = compute_ckid(0.5, 15.0, 0.9, 150.0, GenderSelection::Male, DisplayMode::Raw);
        assert_eq!(raw, "105.77");
        let low = compute_ckid(1.4, 30.0, 1.8, 140.0, GenderSelection::Male, DisplayMode::Capped);
        assert_eq!(low, "42.97");
    }

    #[test]
    fn test_capped_threshold_is_inclusive() {
        assert_eq!(format_egfr(75.0, DisplayMode::Capped), "> 75");
        assert_eq!(format_egfr(74.999, DisplayMode::Capped), "75.00");
        assert_eq!(format_egfr(75.0, DisplayMode::Raw), "75.00");
    }

    #[test]
    fn test_bedside() {
        assert_eq!(compute_bedside(1.0, 100.0), "41.30");
        assert!((bedside_schwartz(1.4, 140.0) - 41.3).abs() < 1e-9);
    }

    #[test]
    fn test_bedside_division_by_zero() {
        assert_eq!(bedside_schwartz(0.0, 100.0), 0.0);
        assert_eq!(bedside_schwartz(0.0, 0.0), 0.0);
        assert_eq!(compute_bedside(0.0, 120.0), "0.00");
    }

    #[test]
    fn test_display_mode_parsing() {
        assert_eq!(DisplayMode::from_str("Capped"), Some(DisplayMode::Capped));
        assert_eq!(DisplayMode::from_str("raw"), Some(DisplayMode::Raw));
        assert_eq!(DisplayMode::from_str("fancy"), None);
        assert_eq!(DisplayMode::from_cap(true), DisplayMode::Capped);
    }

    proptest! {
        #[test]
        fn formulas_never_display_nan(
            crea in -10.0f64..10.0,
            urea in -50.0f64..100.0,
            cysc in -5.0f64..5.0,
            height in -10.0f64..200.0,
            male in any::<bool>(),
        ) {
            let gender = if male { GenderSelection::Male } else { GenderSelection::Female };
            let ckid = compute_ckid(crea, urea, cysc, height, gender, DisplayMode::Raw);
            let bedside = compute_bedside(crea, height);
            for shown in [ckid, bedside] {
                prop_assert!(!shown.contains("NaN") && !shown.contains("inf"), "{}", shown);
            }
        }
    }
}
