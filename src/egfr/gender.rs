//! Gender selection for the CKiD formula

use serde::{Deserialize, Serialize};

/// Tri-state gender selection. `Unset` is the initial form state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderSelection {
    #[default]
    Unset,
    Female,
    Male,
}

impl GenderSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenderSelection::Unset => "unset",
            GenderSelection::Female => "female",
            GenderSelection::Male => "male",
        }
    }

    /// Parse a selection. Accepts the 0/1 codes the form's select box used.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "unset" | "none" => Some(GenderSelection::Unset),
            "female" | "f" | "0" => Some(GenderSelection::Female),
            "male" | "m" | "1" => Some(GenderSelection::Male),
            _ => None,
        }
    }

    /// Exponent of the 1.099 factor in the CKiD equation.
    ///
    /// Unset yields the same term as Female, so the formula still produces a
    /// number before a selection is made.
    pub fn ckid_term(&self) -> f64 {
        match self {
            GenderSelection::Male => 1.0,
            GenderSelection::Female | GenderSelection::Unset => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unset() {
        assert_eq!(GenderSelection::default(), GenderSelection::Unset);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(GenderSelection::from_str("Male"), Some(GenderSelection::Male));
        assert_eq!(GenderSelection::from_str("0"), Some(GenderSelection::Female));
        assert_eq!(GenderSelection::from_str(""), Some(GenderSelection::Unset));
        assert_eq!(GenderSelection::from_str("other"), None);
    }

    #[test]
    fn test_ckid_term() {
        assert_eq!(GenderSelection::Male.ckid_term(), 1.0);
        assert_eq!(GenderSelection::Female.ckid_term(), 0.0);
        assert_eq!(GenderSelection::Unset.ckid_term(), 0.0);
    }
}
