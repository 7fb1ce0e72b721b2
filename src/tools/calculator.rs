//! Calculator MCP Tools
//!
//! Stateless conversion and formula tools, plus the form session tools that
//! mirror what a user does in the calculator form.

use serde::Serialize;

use crate::egfr::{self, DisplayMode, Field, FieldId, GenderSelection, Unit, FIELDS};
use crate::error::{parse_field, resolve_unit, KidcalError};
use crate::models::{CalculationResult, EditOutcome, FieldInput, FormSession};

/// Unit entry with its position in the field's unit list
#[derive(Debug, Serialize)]
pub struct UnitSummary {
    pub index: usize,
    pub id: &'static str,
    pub label: &'static str,
    pub factor: f64,
    pub canonical: bool,
}

impl UnitSummary {
    fn from_unit(index: usize, unit: &Unit) -> Self {
        Self {
            index,
            id: unit.id,
            label: unit.label,
            factor: unit.factor,
            canonical: unit.is_canonical(),
        }
    }
}

/// Response for get_units
#[derive(Debug, Serialize)]
pub struct FieldUnitsResponse {
    pub field: FieldId,
    pub label: &'static str,
    pub canonical_unit: &'static str,
    pub units: Vec<UnitSummary>,
}

impl From<&Field> for FieldUnitsResponse {
    fn from(field: &Field) -> Self {
        Self {
            field: field.id,
            label: field.label,
            canonical_unit: field.unit(field.canonical_index()).label,
            units: field
                .units
                .iter()
                .enumerate()
                .map(|(index, unit)| UnitSummary::from_unit(index, unit))
                .collect(),
        }
    }
}

/// Response for list_fields
#[derive(Debug, Serialize)]
pub struct ListFieldsResponse {
    pub fields: Vec<FieldUnitsResponse>,
    pub total: usize,
}

/// Response for sanitize_edit
#[derive(Debug, Serialize)]
pub struct SanitizeResponse {
    pub input: String,
    pub accepted: bool,
    pub text: Option<String>,
}

/// Response for convert_to_canonical
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub field: FieldId,
    pub raw_text: String,
    pub unit: &'static str,
    pub canonical_value: f64,
    pub canonical_unit: &'static str,
}

/// Response for mirror_edit
#[derive(Debug, Serialize)]
pub struct MirrorResponse {
    pub field: FieldId,
    pub accepted: bool,
    pub edited_unit: &'static str,
    /// Unit label and display text for every unit, when accepted
    pub values: Vec<MirroredText>,
}

#[derive(Debug, Serialize)]
pub struct MirroredText {
    pub unit: &'static str,
    pub text: String,
}

/// Response for compute_ckid and compute_bedside
#[derive(Debug, Serialize)]
pub struct FormulaResponse {
    pub formula: &'static str,
    pub display: String,
    pub value: f64,
    pub unit: &'static str,
}

/// One field of the form as reported to clients
#[derive(Debug, Serialize)]
pub struct FieldState {
    pub field: FieldId,
    pub label: &'static str,
    pub raw_text: String,
    pub unit_index: usize,
    pub unit: &'static str,
    pub canonical_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirrored: Option<Vec<MirroredText>>,
}

impl From<&FieldInput> for FieldState {
    fn from(input: &FieldInput) -> Self {
        let field = input.field.field();
        Self {
            field: input.field,
            label: field.label,
            raw_text: input.raw_text.clone(),
            unit_index: input.unit_index,
            unit: input.unit_label(),
            canonical_value: input.canonical_value(),
            mirrored: input.mirrored.as_ref().map(|texts| mirrored_texts(field, texts)),
        }
    }
}

/// Full form state after an operation
#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub fields: Vec<FieldState>,
    pub gender: GenderSelection,
    pub display_mode: DisplayMode,
    pub result: CalculationResult,
}

impl From<&FormSession> for FormResponse {
    fn from(form: &FormSession) -> Self {
        Self {
            fields: form.inputs().iter().map(FieldState::from).collect(),
            gender: form.gender(),
            display_mode: form.config().display_mode,
            result: form.result().clone(),
        }
    }
}

/// Response for session edits
#[derive(Debug, Serialize)]
pub struct EditResponse {
    pub edit: EditOutcome,
    pub form: FormResponse,
}

pub const EGFR_UNIT: &str = "ml/min/1.73 m²";

fn mirrored_texts(field: &Field, texts: &[String]) -> Vec<MirroredText> {
    field
        .units
        .iter()
        .zip(texts)
        .map(|(unit, text)| MirroredText {
            unit: unit.label,
            text: text.clone(),
        })
        .collect()
}

fn lookup_field(field: &str) -> Result<FieldId, String> {
    parse_field(field).map_err(|e| e.to_string())
}

fn lookup_unit(field: FieldId, unit: Option<&str>) -> Result<usize, String> {
    resolve_unit(field, unit).map_err(|e| e.to_string())
}

fn lookup_gender(gender: Option<&str>) -> Result<GenderSelection, String> {
    let gender = gender.unwrap_or_default();
    GenderSelection::from_str(gender)
        .ok_or_else(|| KidcalError::UnknownGender(gender.to_string()).to_string())
}

// ============================================================================
// Stateless Tool Functions
// ============================================================================

/// List every field with its units
pub fn list_fields() -> ListFieldsResponse {
    let fields: Vec<FieldUnitsResponse> = FIELDS.iter().map(FieldUnitsResponse::from).collect();
    let total = fields.len();
    ListFieldsResponse { fields, total }
}

/// Units of one field
pub fn get_units(field: &str) -> Result<FieldUnitsResponse, String> {
    let id = lookup_field(field)?;
    Ok(FieldUnitsResponse::from(id.field()))
}

/// Check one keystroke's worth of text
pub fn sanitize_edit(raw_text: &str) -> SanitizeResponse {
    let text = egfr::sanitize(raw_text);
    SanitizeResponse {
        input: raw_text.to_string(),
        accepted: text.is_some(),
        text,
    }
}

/// Canonical value of raw text in the given unit (canonical unit when omitted)
pub fn convert_to_canonical(
    field: &str,
    unit: Option<&str>,
    raw_text: &str,
) -> Result<ConvertResponse, String> {
    let id = lookup_field(field)?;
    let unit_index = lookup_unit(id, unit)?;
    let entry = id.field();
    Ok(ConvertResponse {
        field: id,
        raw_text: raw_text.to_string(),
        unit: entry.unit(unit_index).label,
        canonical_value: egfr::convert_to_canonical(id, unit_index, raw_text),
        canonical_unit: entry.unit(entry.canonical_index()).label,
    })
}

/// Values for every unit box after typing into one of them
pub fn mirror_edit(field: &str, unit: Option<&str>, raw_text: &str) -> Result<MirrorResponse, String> {
    let id = lookup_field(field)?;
    let unit_index = lookup_unit(id, unit)?;
    let entry = id.field();
    let mirrored = egfr::propagate(id, unit_index, raw_text);
    Ok(MirrorResponse {
        field: id,
        accepted: mirrored.is_some(),
        edited_unit: entry.unit(unit_index).label,
        values: mirrored
            .map(|m| mirrored_texts(entry, &m.texts))
            .unwrap_or_default(),
    })
}

/// CKiD Schwartz from canonical values
pub fn compute_ckid(
    creatinine: f64,
    urea: f64,
    cystatin_c: f64,
    height: f64,
    gender: Option<&str>,
    capped: bool,
) -> Result<FormulaResponse, String> {
    let gender = lookup_gender(gender)?;
    let values = egfr::CanonicalValues {
        creatinine,
        urea,
        cystatin_c,
        height,
    };
    let value = egfr::ckid_schwartz(&values, gender);
    Ok(FormulaResponse {
        formula: "ckid_schwartz",
        display: egfr::format_egfr(value, DisplayMode::from_cap(capped)),
        value,
        unit: EGFR_UNIT,
    })
}

/// Bedside Schwartz from canonical values
pub fn compute_bedside(creatinine: f64, height: f64) -> FormulaResponse {
    let value = egfr::bedside_schwartz(creatinine, height);
    FormulaResponse {
        formula: "bedside_schwartz",
        display: egfr::compute_bedside(creatinine, height),
        value,
        unit: EGFR_UNIT,
    }
}

// ============================================================================
// Session Tool Functions
// ============================================================================

/// Current form state
pub fn get_form(form: &FormSession) -> FormResponse {
    FormResponse::from(form)
}

/// Type into a field in its selected unit
pub fn set_field_value(form: &mut FormSession, field: &str, raw_text: &str) -> Result<EditResponse, String> {
    let id = lookup_field(field)?;
    let edit = form.edit_field(id, raw_text);
    Ok(EditResponse {
        edit,
        form: FormResponse::from(&*form),
    })
}

/// Type into one unit box of a mirrored field
pub fn edit_mirrored_field(
    form: &mut FormSession,
    field: &str,
    unit: Option<&str>,
    raw_text: &str,
) -> Result<EditResponse, String> {
    let id = lookup_field(field)?;
    let unit_index = lookup_unit(id, unit)?;
    let edit = form
        .edit_mirrored(id, unit_index, raw_text)
        .map_err(|e| e.to_string())?;
    Ok(EditResponse {
        edit,
        form: FormResponse::from(&*form),
    })
}

/// Change the unit a field is read in
pub fn select_unit(form: &mut FormSession, field: &str, unit: &str) -> Result<FormResponse, String> {
    let id = lookup_field(field)?;
    let unit_index = lookup_unit(id, Some(unit))?;
    form.select_unit(id, unit_index).map_err(|e| e.to_string())?;
    Ok(FormResponse::from(&*form))
}

pub fn set_gender(form: &mut FormSession, gender: &str) -> Result<FormResponse, String> {
    let gender = lookup_gender(Some(gender))?;
    form.set_gender(gender);
    Ok(FormResponse::from(&*form))
}

pub fn clear_all(form: &mut FormSession) -> FormResponse {
    form.clear_all();
    FormResponse::from(&*form)
}
