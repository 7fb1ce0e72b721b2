//! Form session model
//!
//! Holds the user's current entries for one calculator session and recomputes
//! the eGFR results after every change.

use serde::Serialize;

use crate::config::{CalculatorConfig, InputLayout};
use crate::egfr::{
    bedside_schwartz, ckid_schwartz, convert_to_canonical, format_egfr, propagate, sanitize,
    CanonicalValues, DisplayMode, FieldId, GenderSelection,
};
use crate::error::{check_unit_index, KidcalError, KidcalResult};

/// One user-editable field slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInput {
    pub field: FieldId,
    /// Last accepted text, interpreted in `unit_index`
    pub raw_text: String,
    pub unit_index: usize,
    /// Per-unit display text in the mirrored layout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirrored: Option<Vec<String>>,
}

impl FieldInput {
    /// Empty input with the canonical unit selected
    pub fn new(field: FieldId, layout: InputLayout) -> Self {
        let entry = field.field();
        let mirrored = match layout {
            InputLayout::Single => None,
            InputLayout::Mirrored => Some(vec![String::new(); entry.units.len()]),
        };
        Self {
            field,
            raw_text: String::new(),
            unit_index: entry.canonical_index(),
            mirrored,
        }
    }

    pub fn unit_label(&self) -> &'static str {
        self.field.field().unit(self.unit_index).label
    }

    /// Value in the field's canonical unit, 0 when blank
    pub fn canonical_value(&self) -> f64 {
        convert_to_canonical(self.field, self.unit_index, &self.raw_text)
    }
}

/// Whether a text edit was taken
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditOutcome {
    Accepted { text: String },
    /// The stored text was kept as it was
    Rejected { retained: String },
}

impl EditOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, EditOutcome::Accepted { .. })
    }
}

/// Display strings for both formulas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub ckid: String,
    pub bedside: String,
    pub ckid_value: f64,
    pub bedside_value: f64,
}

impl CalculationResult {
    /// Evaluate both formulas for the given inputs
    pub fn compute(values: &CanonicalValues, gender: GenderSelection, mode: DisplayMode) -> Self {
        let ckid_value = ckid_schwartz(values, gender);
        let bedside_value = bedside_schwartz(values.creatinine, values.height);
        Self {
            ckid: format_egfr(ckid_value, mode),
            bedside: format_egfr(bedside_value, DisplayMode::Raw),
            ckid_value,
            bedside_value,
        }
    }
}

/// The state of one calculator form
#[derive(Debug, Clone, Serialize)]
pub struct FormSession {
    config: CalculatorConfig,
    inputs: Vec<FieldInput>,
    gender: GenderSelection,
    result: CalculationResult,
}

impl FormSession {
    pub fn new(config: CalculatorConfig) -> Self {
        let inputs = Self::initial_inputs(config.input_layout);
        let gender = GenderSelection::Unset;
        let result = CalculationResult::compute(
            &CanonicalValues::default(),
            gender,
            config.display_mode,
        );
        Self {
            config,
            inputs,
            gender,
            result,
        }
    }

    fn initial_inputs(layout: InputLayout) -> Vec<FieldInput> {
        FieldId::ALL
            .iter()
            .map(|&field| FieldInput::new(field, layout))
            .collect()
    }

    pub fn config(&self) -> CalculatorConfig {
        self.config
    }

    pub fn input(&self, field: FieldId) -> &FieldInput {
        &self.inputs[field.index()]
    }

    pub fn inputs(&self) -> &[FieldInput] {
        &self.inputs
    }

    pub fn gender(&self) -> GenderSelection {
        self.gender
    }

    /// Results for the current inputs
    pub fn result(&self) -> &CalculationResult {
        &self.result
    }

    /// The four numbers currently feeding the formulas
    pub fn canonical_values(&self) -> CanonicalValues {
        CanonicalValues {
            creatinine: self.input(FieldId::Creatinine).canonical_value(),
            urea: self.input(FieldId::Urea).canonical_value(),
            cystatin_c: self.input(FieldId::CystatinC).canonical_value(),
            height: self.input(FieldId::Height).canonical_value(),
        }
    }

    /// Type into a field's box in its selected unit.
    ///
    /// In the mirrored layout this updates every unit box of the field.
    pub fn edit_field(&mut self, field: FieldId, raw_text: &str) -> EditOutcome {
        let unit_index = self.input(field).unit_index;
        match self.config.input_layout {
            InputLayout::Single => self.apply_single_edit(field, raw_text),
            InputLayout::Mirrored => self.apply_mirrored_edit(field, unit_index, raw_text),
        }
    }

    /// Type into one unit box of a mirrored field
    pub fn edit_mirrored(
        &mut self,
        field: FieldId,
        unit_index: usize,
        raw_text: &str,
    ) -> KidcalResult<EditOutcome> {
        if self.config.input_layout != InputLayout::Mirrored {
            return Err(KidcalError::MirroredLayoutRequired);
        }
        let unit_index = check_unit_index(field, unit_index)?;
        Ok(self.apply_mirrored_edit(field, unit_index, raw_text))
    }

    /// Select the unit a field's text is read in.
    ///
    /// The single layout reinterprets the existing text in the new unit. The
    /// mirrored layout switches to the text already shown for that unit.
    pub fn select_unit(&mut self, field: FieldId, unit_index: usize) -> KidcalResult<()> {
        let unit_index = check_unit_index(field, unit_index)?;
        let input = &mut self.inputs[field.index()];
        input.unit_index = unit_index;
        if let Some(texts) = &input.mirrored {
            input.raw_text = texts[unit_index].clone();
        }
        tracing::debug!("Selected unit {} for {}", input.unit_label(), field);
        self.recompute();
        Ok(())
    }

    pub fn set_gender(&mut self, gender: GenderSelection) {
        self.gender = gender;
        self.recompute();
    }

    /// Reset every field, unit and the gender to the initial state
    pub fn clear_all(&mut self) {
        self.inputs = Self::initial_inputs(self.config.input_layout);
        self.gender = GenderSelection::Unset;
        tracing::info!("Cleared all calculator inputs");
        self.recompute();
    }

    fn apply_single_edit(&mut self, field: FieldId, raw_text: &str) -> EditOutcome {
        let input = &mut self.inputs[field.index()];
        match sanitize(raw_text) {
            Some(text) => {
                input.raw_text = text.clone();
                self.recompute();
                EditOutcome::Accepted { text }
            }
            None => {
                tracing::debug!("Rejected edit {:?} for {}", raw_text, field);
                EditOutcome::Rejected {
                    retained: input.raw_text.clone(),
                }
            }
        }
    }

    fn apply_mirrored_edit(&mut self, field: FieldId, unit_index: usize, raw_text: &str) -> EditOutcome {
        let input = &mut self.inputs[field.index()];
        match propagate(field, unit_index, raw_text) {
            Some(values) => {
                let text = values.text(unit_index).to_string();
                input.raw_text = text.clone();
                input.unit_index = unit_index;
                input.mirrored = Some(values.texts);
                self.recompute();
                EditOutcome::Accepted { text }
            }
            None => {
                tracing::debug!("Rejected edit {:?} for {}", raw_text, field);
                EditOutcome::Rejected {
                    retained: input.raw_text.clone(),
                }
            }
        }
    }

    fn recompute(&mut self) {
        let values = self.canonical_values();
        self.result = CalculationResult::compute(&values, self.gender, self.config.display_mode);
        tracing::debug!(
            "Recomputed eGFR: ckid={} bedside={}",
            self.result.ckid,
            self.result.bedside
        );
    }
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new(CalculatorConfig::default())
    }
}
