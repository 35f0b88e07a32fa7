//! Patient and visitation tools

use serde::Serialize;

use super::{ToolError, ToolResult};
use crate::db::Database;
use crate::models::{Patient, PatientCreate, Visitation, VisitationCreate};

/// Patient detail with visitations
#[derive(Debug, Serialize)]
pub struct PatientDetail {
    #[serde(flatten)]
    pub patient: Patient,
    pub visitations: Vec<Visitation>,
}

/// Response for list_patients
#[derive(Debug, Serialize)]
pub struct ListPatientsResponse {
    pub patients: Vec<Patient>,
    pub total: usize,
}

/// Response for list_visitations
#[derive(Debug, Serialize)]
pub struct ListVisitationsResponse {
    pub patient_id: i64,
    pub visitations: Vec<Visitation>,
    pub total: usize,
}

pub fn add_patient(db: &Database, data: PatientCreate) -> ToolResult<Patient> {
    let patient = db.with_conn(|conn| Patient::create(conn, &data))?;
    tracing::info!(id = patient.id, "Registered patient");
    Ok(patient)
}

pub fn get_patient(db: &Database, id: i64) -> ToolResult<Option<PatientDetail>> {
    db.with_conn(|conn| {
        let Some(patient) = Patient::get_by_id(conn, id)? else {
            return Ok(None);
        };
        let visitations = Visitation::list_for_patient(conn, id)?;
        Ok(Some(PatientDetail {
            patient,
            visitations,
        }))
    })
    .map_err(ToolError::from)
}

pub fn list_patients(db: &Database, query: Option<&str>, limit: i64) -> ToolResult<ListPatientsResponse> {
    let patients = db.with_conn(|conn| Patient::list(conn, query, limit))?;
    let total = patients.len();
    Ok(ListPatientsResponse { patients, total })
}

/// Open a visitation; the patient must exist
pub fn add_visitation(db: &Database, data: VisitationCreate) -> ToolResult<Visitation> {
    db.with_conn(|conn| {
        if Patient::get_by_id(conn, data.patient_id)?.is_none() {
            return Ok(None);
        }
        Visitation::create(conn, &data).map(Some)
    })?
    .ok_or_else(|| ToolError::NotFound(format!("Patient {} not found", data.patient_id)))
}

pub fn list_visitations(db: &Database, patient_id: i64) -> ToolResult<ListVisitationsResponse> {
    let visitations = db.with_conn(|conn| Visitation::list_for_patient(conn, patient_id))?;
    let total = visitations.len();
    Ok(ListVisitationsResponse {
        patient_id,
        visitations,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::db::migrations::run_migrations;
    use crate::energy::Gender;

    fn db() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(run_migrations).unwrap();
        db
    }

    #[test]
    fn test_patient_with_visitations() {
        let db = db();
        let patient = add_patient(
            &db,
            PatientCreate {
                medical_record_number: "RM-55".to_string(),
                name: "Rina".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1985, 7, 1).unwrap(),
                gender: Gender::Female,
            },
        )
        .unwrap();

        add_visitation(
            &db,
            VisitationCreate {
                patient_id: patient.id,
                visit_date: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
                ward: None,
                notes: Some("HbA1c 9.1".to_string()),
            },
        )
        .unwrap();

        let detail = get_patient(&db, patient.id).unwrap().unwrap();
        assert_eq!(detail.visitations.len(), 1);
        assert_eq!(list_visitations(&db, patient.id).unwrap().total, 1);
        assert_eq!(list_patients(&db, None, 10).unwrap().total, 1);
        assert!(get_patient(&db, 77).unwrap().is_none());
    }

    #[test]
    fn test_visitation_requires_patient() {
        let db = db();
        let err = add_visitation(
            &db,
            VisitationCreate {
                patient_id: 3,
                visit_date: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
                ward: None,
                notes: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }
}
