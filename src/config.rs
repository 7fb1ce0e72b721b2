//! Calculator configuration
//!
//! Read once at startup from the environment.

use serde::{Deserialize, Serialize};

use crate::egfr::DisplayMode;

pub const DISPLAY_MODE_VAR: &str = "KIDCAL_DISPLAY_MODE";
pub const INPUT_LAYOUT_VAR: &str = "KIDCAL_INPUT_LAYOUT";

/// How the form presents each field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputLayout {
    /// One text box plus a unit selector per field
    #[default]
    Single,
    /// One synchronized text box per unit
    Mirrored,
}

impl InputLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputLayout::Single => "single",
            InputLayout::Mirrored => "mirrored",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "single" => Some(InputLayout::Single),
            "mirrored" | "dual" => Some(InputLayout::Mirrored),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalculatorConfig {
    pub display_mode: DisplayMode,
    pub input_layout: InputLayout,
}

impl CalculatorConfig {
    /// Load from `KIDCAL_DISPLAY_MODE` and `KIDCAL_INPUT_LAYOUT`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup. Unrecognised values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(DISPLAY_MODE_VAR) {
            match DisplayMode::from_str(&value) {
                Some(mode) => config.display_mode = mode,
                None => tracing::warn!(
                    "Ignoring {}={:?}; expected raw or capped",
                    DISPLAY_MODE_VAR,
                    value
                ),
            }
        }

        if let Some(value) = lookup(INPUT_LAYOUT_VAR) {
            match InputLayout::from_str(&value) {
                Some(layout) => config.input_layout = layout,
                None => tracing::warn!(
                    "Ignoring {}={:?}; expected single or mirrored",
                    INPUT_LAYOUT_VAR,
                    value
                ),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CalculatorConfig::from_lookup(|_| None);
        assert_eq!(config.display_mode, DisplayMode::Raw);
        assert_eq!(config.input_layout, InputLayout::Single);
    }

    #[test]
    fn test_from_lookup() {
        let config = CalculatorConfig::from_lookup(lookup_from(&[
            (DISPLAY_MODE_VAR, "capped"),
            (INPUT_LAYOUT_VAR, "Mirrored"),
        ]));
        assert_eq!(config.display_mode, DisplayMode::Capped);
        assert_eq!(config.input_layout, InputLayout::Mirrored);
    }

    #[test]
    fn test_unrecognised_values_fall_back() {
        let config = CalculatorConfig::from_lookup(lookup_from(&[
            (DISPLAY_MODE_VAR, "sometimes"),
            (INPUT_LAYOUT_VAR, "grid"),
        ]));
        assert_eq!(config, CalculatorConfig::default());
    }
}
