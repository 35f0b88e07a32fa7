//! Dietcare MCP server
//!
//! Exposes the energy engine and its storage collaborators as MCP tools.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::energy::{
    ActivityLevel, Attribution, EnergyEngine, EnergyError, Gender, Method, Role, StressLevel,
};
use crate::models::{PatientCreate, VisitationCreate};
use crate::tools::energy::{self, EnergyRequest};
use crate::tools::patients;
use crate::tools::statistics;
use crate::tools::status::StatusTracker;
use crate::tools::ToolError;

/// Dietcare MCP Service
#[derive(Clone)]
pub struct DietcareService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    engine: EnergyEngine,
    tool_router: ToolRouter<DietcareService>,
}

impl DietcareService {
    pub fn new(database_path: PathBuf, database: Database, engine: EnergyEngine) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path, *engine.config()))),
            database,
            engine,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Error and Response Helpers
// ============================================================================

fn to_mcp_error(e: ToolError) -> McpError {
    match e {
        ToolError::Invalid(_) | ToolError::NotFound(_) => McpError::invalid_params(e.to_string(), None),
        ToolError::Storage(_) => McpError::internal_error(e.to_string(), None),
    }
}

fn invalid(e: EnergyError) -> McpError {
    McpError::invalid_params(e.to_string(), None)
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, McpError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        invalid(EnergyError::InvalidInput {
            field,
            value: value.to_string(),
            reason: format!("expected YYYY-MM-DD ({})", e),
        })
    })
}

// ============================================================================
// Energy Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EnergyParams {
    /// Height in centimeters
    pub height_cm: f64,
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Age in whole years (optional if birth_date or patient_id is given)
    pub age: Option<u32>,
    /// Birth date YYYY-MM-DD (optional)
    pub birth_date: Option<String>,
    /// male or female (optional if patient_id is given)
    pub gender: Option<String>,
    /// Patient ID to take age/gender from
    pub patient_id: Option<i64>,
    /// bedrest, light, moderate, heavy (required)
    pub activity_level: Option<String>,
    /// none, mild, moderate, severe, very_severe (required)
    pub stress_level: Option<String>,
    /// stepped (default) or quick_estimate
    #[serde(default = "default_method")]
    pub method: String,
    /// Role requesting the calculation (required): admin, doctor, nurse, nutritionist, pharmacist
    pub role: Option<String>,
    /// Where the request came from (optional)
    pub context: Option<String>,
}

fn default_method() -> String { "stepped".to_string() }

/// Clinical selections are never filled in on the caller's behalf
fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, McpError> {
    value.as_deref().ok_or_else(|| {
        invalid(EnergyError::InvalidInput {
            field,
            value: String::new(),
            reason: "required".to_string(),
        })
    })
}

impl EnergyParams {
    fn to_request(&self) -> Result<EnergyRequest, McpError> {
        let activity = ActivityLevel::from_str(required("activity_level", &self.activity_level)?).map_err(invalid)?;
        let stress = StressLevel::from_str(required("stress_level", &self.stress_level)?).map_err(invalid)?;
        let role_key = required("role", &self.role)?;
        let role = Role::from_str(role_key).ok_or_else(|| {
            invalid(EnergyError::InvalidInput {
                field: "role",
                value: role_key.to_string(),
                reason: "unknown role".to_string(),
            })
        })?;

        Ok(EnergyRequest {
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            age: self.age,
            birth_date: self
                .birth_date
                .as_deref()
                .map(|d| parse_date("birth_date", d))
                .transpose()?,
            gender: self.gender.as_deref().map(Gender::from_str).transpose().map_err(invalid)?,
            patient_id: self.patient_id,
            activity,
            stress,
            method: Method::from_str(&self.method).map_err(invalid)?,
            attribution: Attribution {
                role,
                context: self.context.clone(),
            },
        })
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveEnergyParams {
    /// Visitation to store the result against
    pub visitation_id: i64,
    #[serde(flatten)]
    pub energy: EnergyParams,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListEnergyCalculationsParams {
    /// Visitation ID
    pub visitation_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ClassifyBmiParams {
    /// Height in centimeters
    pub height_cm: f64,
    /// Weight in kilograms
    pub weight_kg: f64,
}

// ============================================================================
// Patient Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddPatientParams {
    /// Hospital medical record number (unique)
    pub medical_record_number: String,
    pub name: String,
    /// Birth date YYYY-MM-DD
    pub birth_date: String,
    /// male or female
    pub gender: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetPatientParams {
    /// Patient ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListPatientsParams {
    /// Match against name or record number (optional)
    pub query: Option<String>,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
}

fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddVisitationParams {
    /// Patient ID
    pub patient_id: i64,
    /// Visit date YYYY-MM-DD
    pub visit_date: String,
    /// Ward name (optional)
    pub ward: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListVisitationsParams {
    /// Patient ID
    pub patient_id: i64,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl DietcareService {
    // --- Status ---

    #[tool(description = "Get the current status of the dietcare service including build info, database status, and process information")]
    async fn dietcare_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        json_result(&status)
    }

    #[tool(description = "Get step-by-step instructions for energy requirement calculations. Call this before the first calculation in a session.")]
    fn energy_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::ENERGY_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(ENERGY_INSTRUCTIONS)]))
    }

    // --- Energy ---

    #[tool(description = "Calculate a patient's daily energy requirement (kcal) with ideal body weight, BMR, nutritional status and the step-by-step breakdown. Does not store anything.")]
    fn calculate_energy_requirement(&self, Parameters(p): Parameters<EnergyParams>) -> Result<CallToolResult, McpError> {
        let request = p.to_request()?;
        let result = energy::calculate_energy(&self.database, &self.engine, &request).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Calculate an energy requirement and save it to a visitation. Age and gender default to the visitation's patient.")]
    fn save_energy_calculation(&self, Parameters(p): Parameters<SaveEnergyParams>) -> Result<CallToolResult, McpError> {
        let request = p.energy.to_request()?;
        let result = energy::save_energy_calculation(&self.database, &self.engine, p.visitation_id, &request)
            .map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "List saved energy calculations for a visitation, newest first")]
    fn list_energy_calculations(&self, Parameters(p): Parameters<ListEnergyCalculationsParams>) -> Result<CallToolResult, McpError> {
        let result = energy::list_energy_calculations(&self.database, p.visitation_id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Classify BMI into underweight / normal / overweight / obese from height (cm) and weight (kg)")]
    fn classify_bmi(&self, Parameters(p): Parameters<ClassifyBmiParams>) -> Result<CallToolResult, McpError> {
        let result = energy::classify_bmi(p.height_cm, p.weight_kg).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Count patients per nutritional status using each patient's most recent saved calculation")]
    fn nutritional_status_summary(&self) -> Result<CallToolResult, McpError> {
        let result = statistics::nutritional_status_summary(&self.database).map_err(to_mcp_error)?;
        json_result(&result)
    }

    // --- Patients ---

    #[tool(description = "Register a new patient")]
    fn add_patient(&self, Parameters(p): Parameters<AddPatientParams>) -> Result<CallToolResult, McpError> {
        let data = PatientCreate {
            medical_record_number: p.medical_record_number,
            name: p.name,
            birth_date: parse_date("birth_date", &p.birth_date)?,
            gender: Gender::from_str(&p.gender).map_err(invalid)?,
        };
        let result = patients::add_patient(&self.database, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a patient with their visitations")]
    fn get_patient(&self, Parameters(p): Parameters<GetPatientParams>) -> Result<CallToolResult, McpError> {
        let result = patients::get_patient(&self.database, p.id).map_err(to_mcp_error)?;
        match result {
            Some(detail) => json_result(&detail),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Patient not found", "id": {}}}"#,
                p.id
            ))])),
        }
    }

    #[tool(description = "List patients, optionally filtered by name or medical record number")]
    fn list_patients(&self, Parameters(p): Parameters<ListPatientsParams>) -> Result<CallToolResult, McpError> {
        let result = patients::list_patients(&self.database, p.query.as_deref(), p.limit).map_err(to_mcp_error)?;
        json_result(&result)
    }

    // --- Visitations ---

    #[tool(description = "Open a visitation (inpatient visit) for a patient")]
    fn add_visitation(&self, Parameters(p): Parameters<AddVisitationParams>) -> Result<CallToolResult, McpError> {
        let data = VisitationCreate {
            patient_id: p.patient_id,
            visit_date: parse_date("visit_date", &p.visit_date)?,
            ward: p.ward,
            notes: p.notes,
        };
        let result = patients::add_visitation(&self.database, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "List a patient's visitations, newest first")]
    fn list_visitations(&self, Parameters(p): Parameters<ListVisitationsParams>) -> Result<CallToolResult, McpError> {
        let result = patients::list_visitations(&self.database, p.patient_id).map_err(to_mcp_error)?;
        json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for DietcareService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "dietcare".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Dietcare".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Dietcare - energy requirements for diabetic inpatients. \
                 IMPORTANT: Call energy_instructions before the first calculation. \
                 Energy: calculate_energy_requirement (preview), save_energy_calculation, list_energy_calculations, classify_bmi. \
                 Patients: add/get/list_patients. Visitations: add_visitation, list_visitations. \
                 Statistics: nutritional_status_summary. Status: dietcare_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(json: &str) -> EnergyParams {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_missing_clinical_selections_are_rejected() {
        let p = params(r#"{"height_cm":170,"weight_kg":70,"age":45,"gender":"male"}"#);
        let err = p.to_request().unwrap_err();
        assert!(err.message.contains("activity_level"));

        let p = params(
            r#"{"height_cm":170,"weight_kg":70,"age":45,"gender":"male","activity_level":"light"}"#,
        );
        let err = p.to_request().unwrap_err();
        assert!(err.message.contains("stress_level"));

        let p = params(
            r#"{"height_cm":170,"weight_kg":70,"age":45,"gender":"male",
                "activity_level":"light","stress_level":"none"}"#,
        );
        let err = p.to_request().unwrap_err();
        assert!(err.message.contains("role"));
    }

    #[test]
    fn test_full_params_build_request() {
        let p = params(
            r#"{"height_cm":170,"weight_kg":70,"age":45,"gender":"male",
                "activity_level":"light","stress_level":"none","role":"doctor"}"#,
        );
        let req = p.to_request().unwrap();
        assert_eq!(req.activity, ActivityLevel::Light);
        assert_eq!(req.stress, StressLevel::None);
        assert_eq!(req.method, Method::Stepped);
        assert_eq!(req.attribution.role, Role::Doctor);
    }

    #[test]
    fn test_unknown_activity_key_is_rejected() {
        let p = params(
            r#"{"height_cm":170,"weight_kg":70,"age":45,"gender":"male",
                "activity_level":"sprinting","stress_level":"none","role":"doctor"}"#,
        );
        assert!(p.to_request().is_err());
    }
}
