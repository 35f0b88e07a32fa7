//! Energy calculation tools
//!
//! Builds a snapshot from request fields (filling age and gender from the
//! patient record when asked), runs the engine, and optionally stores the
//! result against a visitation.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::{ToolError, ToolResult};
use crate::db::Database;
use crate::energy::{
    bmi, classify, ActivityLevel, AnthropometricSnapshot, Attribution, EnergyCalculationResult,
    EnergyEngine, EnergyError, Gender, Method, NutritionalStatus, StressLevel,
};
use crate::models::{EnergyRecord, Patient, Visitation};

/// Fields needed to build a snapshot.
///
/// Age resolves from `age`, then `birth_date`, then the patient record.
/// Gender resolves from `gender`, then the patient record.
#[derive(Debug, Clone)]
pub struct EnergyRequest {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: Option<u32>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub patient_id: Option<i64>,
    pub activity: ActivityLevel,
    pub stress: StressLevel,
    pub method: Method,
    pub attribution: Attribution,
}

/// Response for save_energy_calculation
#[derive(Debug, Serialize)]
pub struct SaveEnergyCalculationResponse {
    pub id: i64,
    pub visitation_id: i64,
    pub total_energy_kcal: i64,
    pub nutritional_status: String,
    pub result: EnergyCalculationResult,
}

/// Stored calculation summary for listing
#[derive(Debug, Serialize)]
pub struct EnergyRecordSummary {
    pub id: i64,
    pub method: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub total_energy_kcal: i64,
    pub nutritional_status: String,
    pub calculated_at: String,
    pub calculated_by: String,
}

impl From<&EnergyRecord> for EnergyRecordSummary {
    fn from(record: &EnergyRecord) -> Self {
        Self {
            id: record.id,
            method: record.result.method().as_str().to_string(),
            height_cm: record.height_cm,
            weight_kg: record.weight_kg,
            total_energy_kcal: record.total_energy_kcal,
            nutritional_status: record.result.nutritional_status().display_name().to_string(),
            calculated_at: record.calculated_at.clone(),
            calculated_by: record.result.attribution().role.as_str().to_string(),
        }
    }
}

/// Response for list_energy_calculations
#[derive(Debug, Serialize)]
pub struct ListEnergyCalculationsResponse {
    pub visitation_id: i64,
    pub calculations: Vec<EnergyRecordSummary>,
    pub total: usize,
}

/// Response for classify_bmi
#[derive(Debug, Serialize)]
pub struct ClassifyBmiResponse {
    pub bmi: f64,
    pub status: NutritionalStatus,
    pub label: String,
}

/// Resolve a request into a snapshot, deriving age on `today`
pub fn build_snapshot(
    db: &Database,
    request: &EnergyRequest,
    today: NaiveDate,
) -> ToolResult<AnthropometricSnapshot> {
    let needs_patient =
        (request.age.is_none() && request.birth_date.is_none()) || request.gender.is_none();

    let patient = match request.patient_id {
        Some(id) if needs_patient => {
            let patient = db
                .with_conn(|conn| Patient::get_by_id(conn, id))?
                .ok_or_else(|| ToolError::NotFound(format!("Patient {} not found", id)))?;
            Some(patient)
        }
        _ => None,
    };

    let age = match (request.age, request.birth_date, &patient) {
        (Some(age), _, _) => age,
        (None, Some(birth_date), _) => crate::energy::age_on(birth_date, today)?,
        (None, None, Some(p)) => p.age_on(today)?,
        (None, None, None) => {
            return Err(EnergyError::InvalidInput {
                field: "age",
                value: "missing".to_string(),
                reason: "provide age, birth_date or patient_id".to_string(),
            }
            .into())
        }
    };

    let gender = match (request.gender, &patient) {
        (Some(gender), _) => gender,
        (None, Some(p)) => p.gender,
        (None, None) => {
            return Err(EnergyError::InvalidInput {
                field: "gender",
                value: "missing".to_string(),
                reason: "provide gender or patient_id".to_string(),
            }
            .into())
        }
    };

    Ok(AnthropometricSnapshot::new(
        request.height_cm,
        request.weight_kg,
        age,
        gender,
        request.activity,
        request.stress,
        request.method,
    ))
}

/// Compute without storing
pub fn calculate_energy(
    db: &Database,
    engine: &EnergyEngine,
    request: &EnergyRequest,
) -> ToolResult<EnergyCalculationResult> {
    let snapshot = build_snapshot(db, request, Utc::now().date_naive())?;
    Ok(engine.compute(&snapshot, request.attribution.clone())?)
}

/// Compute and store against a visitation.
///
/// The visitation's patient fills in age and gender when the request
/// leaves them out. A `patient_id` naming anyone else is rejected.
pub fn save_energy_calculation(
    db: &Database,
    engine: &EnergyEngine,
    visitation_id: i64,
    request: &EnergyRequest,
) -> ToolResult<SaveEnergyCalculationResponse> {
    let visitation = db
        .with_conn(|conn| Visitation::get_by_id(conn, visitation_id))?
        .ok_or_else(|| ToolError::NotFound(format!("Visitation {} not found", visitation_id)))?;

    let mut request = request.clone();
    match request.patient_id {
        Some(patient_id) if patient_id != visitation.patient_id => {
            return Err(EnergyError::InvalidInput {
                field: "patient_id",
                value: patient_id.to_string(),
                reason: format!(
                    "visitation {} belongs to patient {}",
                    visitation_id, visitation.patient_id
                ),
            }
            .into());
        }
        Some(_) => {}
        None => request.patient_id = Some(visitation.patient_id),
    }

    let result = calculate_energy(db, engine, &request)?;
    let record = db.with_conn(|conn| EnergyRecord::store(conn, &result, visitation_id))?;

    Ok(SaveEnergyCalculationResponse {
        id: record.id,
        visitation_id,
        total_energy_kcal: record.total_energy_kcal,
        nutritional_status: record.result.nutritional_status().display_name().to_string(),
        result: record.result,
    })
}

/// List stored calculations for a visitation
pub fn list_energy_calculations(
    db: &Database,
    visitation_id: i64,
) -> ToolResult<ListEnergyCalculationsResponse> {
    let records = db.with_conn(|conn| EnergyRecord::list_for_visitation(conn, visitation_id))?;
    let calculations: Vec<EnergyRecordSummary> = records.iter().map(EnergyRecordSummary::from).collect();
    let total = calculations.len();

    Ok(ListEnergyCalculationsResponse {
        visitation_id,
        calculations,
        total,
    })
}

/// Classify height/weight with the shared BMI thresholds
pub fn classify_bmi(height_cm: f64, weight_kg: f64) -> ToolResult<ClassifyBmiResponse> {
    if !(height_cm > 0.0 && height_cm.is_finite()) {
        return Err(EnergyError::InvalidInput {
            field: "height_cm",
            value: height_cm.to_string(),
            reason: "must be positive".to_string(),
        }
        .into());
    }
    if !(weight_kg > 0.0 && weight_kg.is_finite()) {
        return Err(EnergyError::InvalidInput {
            field: "weight_kg",
            value: weight_kg.to_string(),
            reason: "must be positive".to_string(),
        }
        .into());
    }

    let value = bmi(height_cm, weight_kg);
    let status = classify(value);

    Ok(ClassifyBmiResponse {
        bmi: (value * 100.0).round() / 100.0,
        status,
        label: status.display_name().to_string(),
    })
}
