//! KidCal MCP Server Implementation
//!
//! Implements the MCP server with all calculator tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::CalculatorConfig;
use crate::models::FormSession;
use crate::tools::calculator;
use crate::tools::status::StatusTracker;

/// KidCal MCP Service
#[derive(Clone)]
pub struct KidcalService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    tool_router: ToolRouter<KidcalService>,
    /// Form state of the connected client
    form: Arc<std::sync::Mutex<FormSession>>,
}

impl KidcalService {
    pub fn new(config: CalculatorConfig) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(config))),
            tool_router: Self::tool_router(),
            form: Arc::new(std::sync::Mutex::new(FormSession::new(config))),
        }
    }

    /// Run `f` against the form session
    fn with_form<F, T>(&self, f: F) -> Result<T, McpError>
    where
        F: FnOnce(&mut FormSession) -> Result<T, String>,
    {
        let mut form = self
            .form
            .lock()
            .map_err(|e| McpError::internal_error(format!("Form session lock poisoned: {}", e), None))?;
        f(&mut *form).map_err(|e| McpError::invalid_params(e, None))
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Stateless Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetUnitsParams {
    /// Field id: crea, urea, cysc or height
    pub field: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SanitizeEditParams {
    /// Raw text as typed
    pub raw_text: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertToCanonicalParams {
    /// Field id: crea, urea, cysc or height
    pub field: String,
    /// Unit id, label or index (default: the canonical unit)
    pub unit: Option<String>,
    /// Raw text as typed, e.g. "88,4"
    pub raw_text: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MirrorEditParams {
    /// Field id: crea, urea, cysc or height
    pub field: String,
    /// Unit id, label or index of the edited box (default: the canonical unit)
    pub unit: Option<String>,
    /// Raw text typed into that box
    pub raw_text: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ComputeCkidParams {
    /// Creatinine in mg/dl
    #[serde(default)]
    pub creatinine: f64,
    /// BUN in mg/dl
    #[serde(default)]
    pub urea: f64,
    /// Cystatin C in mg/l
    #[serde(default)]
    pub cystatin_c: f64,
    /// Height in cm
    #[serde(default)]
    pub height: f64,
    /// female, male or unset (default unset)
    pub gender: Option<String>,
    /// Show results of 75 or more as "> 75" (default false)
    #[serde(default)]
    pub capped: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ComputeBedsideParams {
    /// Creatinine in mg/dl
    #[serde(default)]
    pub creatinine: f64,
    /// Height in cm
    #[serde(default)]
    pub height: f64,
}

// ============================================================================
// Session Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetFieldValueParams {
    /// Field id: crea, urea, cysc or height
    pub field: String,
    /// Raw text as typed. Read in the field's selected unit.
    pub raw_text: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EditMirroredFieldParams {
    /// Field id: crea, urea, cysc or height
    pub field: String,
    /// Unit id, label or index of the box typed into (default: the canonical unit)
    pub unit: Option<String>,
    /// Raw text as typed
    pub raw_text: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SelectUnitParams {
    /// Field id: crea, urea, cysc or height
    pub field: String,
    /// Unit id, label or index
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetGenderParams {
    /// female, male or unset
    pub gender: String,
}

#[tool_router]
impl KidcalService {
    // --- Status ---

    #[tool(description = "Get the current status of the KidCal service including build info, configuration, and process information")]
    async fn kidcal_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        json_result(&status)
    }

    #[tool(description = "Get instructions for using the kidney function calculator, including units, formulas, and sources. Call this before the first calculation.")]
    fn calculator_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::CALCULATOR_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(CALCULATOR_INSTRUCTIONS)]))
    }

    // --- Units and Conversion ---

    #[tool(description = "List all input fields with their units and conversion factors")]
    fn list_fields(&self) -> Result<CallToolResult, McpError> {
        json_result(&calculator::list_fields())
    }

    #[tool(description = "Get the units of one field (crea, urea, cysc, height) in display order with factors to the canonical unit")]
    fn get_units(&self, Parameters(p): Parameters<GetUnitsParams>) -> Result<CallToolResult, McpError> {
        let result = calculator::get_units(&p.field).map_err(|e| McpError::invalid_params(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Check typed text against the number pattern. Commas become dots; anything other than digits and one dot is rejected.")]
    fn sanitize_edit(&self, Parameters(p): Parameters<SanitizeEditParams>) -> Result<CallToolResult, McpError> {
        json_result(&calculator::sanitize_edit(&p.raw_text))
    }

    #[tool(description = "Convert raw text in a unit to the field's canonical unit (mg/dl, mg/l or cm). Empty or unparseable text gives 0.")]
    fn convert_to_canonical(&self, Parameters(p): Parameters<ConvertToCanonicalParams>) -> Result<CallToolResult, McpError> {
        let result = calculator::convert_to_canonical(&p.field, p.unit.as_deref(), &p.raw_text)
            .map_err(|e| McpError::invalid_params(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Show the text of every unit box of a field after typing into one of them (dual-unit display)")]
    fn mirror_edit(&self, Parameters(p): Parameters<MirrorEditParams>) -> Result<CallToolResult, McpError> {
        let result = calculator::mirror_edit(&p.field, p.unit.as_deref(), &p.raw_text)
            .map_err(|e| McpError::invalid_params(e, None))?;
        json_result(&result)
    }

    // --- Formulas ---

    #[tool(description = "Compute the CKiD Schwartz eGFR from canonical values (creatinine mg/dl, BUN mg/dl, cystatin C mg/l, height cm)")]
    fn compute_ckid(&self, Parameters(p): Parameters<ComputeCkidParams>) -> Result<CallToolResult, McpError> {
        let result = calculator::compute_ckid(
            p.creatinine,
            p.urea,
            p.cystatin_c,
            p.height,
            p.gender.as_deref(),
            p.capped,
        )
        .map_err(|e| McpError::invalid_params(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Compute the Bedside Schwartz eGFR from creatinine (mg/dl) and height (cm)")]
    fn compute_bedside(&self, Parameters(p): Parameters<ComputeBedsideParams>) -> Result<CallToolResult, McpError> {
        json_result(&calculator::compute_bedside(p.creatinine, p.height))
    }

    // --- Form Session ---

    #[tool(description = "Get the current form: field texts, selected units, canonical values, gender, and both eGFR results")]
    fn get_form(&self) -> Result<CallToolResult, McpError> {
        let result = self.with_form(|form| Ok(calculator::get_form(form)))?;
        json_result(&result)
    }

    #[tool(description = "Type a value into a form field in its selected unit. Rejected text keeps the previous value. Returns the recomputed results.")]
    fn set_field_value(&self, Parameters(p): Parameters<SetFieldValueParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_form(|form| calculator::set_field_value(form, &p.field, &p.raw_text))?;
        json_result(&result)
    }

    #[tool(description = "Type into one unit box of a field when the server runs with KIDCAL_INPUT_LAYOUT=mirrored. Every other box of the field follows.")]
    fn edit_mirrored_field(&self, Parameters(p): Parameters<EditMirroredFieldParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_form(|form| {
            calculator::edit_mirrored_field(form, &p.field, p.unit.as_deref(), &p.raw_text)
        })?;
        json_result(&result)
    }

    #[tool(description = "Select the unit a form field is read in (e.g. crea -> umol)")]
    fn select_unit(&self, Parameters(p): Parameters<SelectUnitParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_form(|form| calculator::select_unit(form, &p.field, &p.unit))?;
        json_result(&result)
    }

    #[tool(description = "Set the gender: female, male or unset")]
    fn set_gender(&self, Parameters(p): Parameters<SetGenderParams>) -> Result<CallToolResult, McpError> {
        let result = self.with_form(|form| calculator::set_gender(form, &p.gender))?;
        json_result(&result)
    }

    #[tool(description = "Clear all fields, units and the gender back to their initial state")]
    fn clear_all(&self) -> Result<CallToolResult, McpError> {
        let result = self.with_form(|form| Ok(calculator::clear_all(form)))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for KidcalService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "kidcal".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("KidCal - Kidney Function Calculator".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "KidCal - pediatric eGFR calculator (CKiD Schwartz and Bedside Schwartz). \
                 IMPORTANT: Call calculator_instructions before the first calculation. \
                 Units: list_fields, get_units, sanitize_edit, convert_to_canonical, mirror_edit. \
                 Formulas (canonical values): compute_ckid, compute_bedside. \
                 Form: set_field_value, select_unit, set_gender, edit_mirrored_field, get_form, clear_all. \
                 Empty fields count as 0 and give a 0.00 result; fill every field before reporting."
                    .into(),
            ),
        }
    }
}
