//! Saved energy calculations
//!
//! The persistence side of the engine: a computed
//! [`EnergyCalculationResult`] stored against a visitation. Records are
//! append-only; saving again adds a new row.

use chrono::SecondsFormat;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::Serialize;

use crate::db::{DbError, DbResult};
use crate::energy::EnergyCalculationResult;

/// A stored calculation
#[derive(Debug, Clone, Serialize)]
pub struct EnergyRecord {
    pub id: i64,
    pub visitation_id: i64,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub total_energy_kcal: i64,
    pub calculated_at: String,
    pub result: EnergyCalculationResult,
    pub created_at: String,
}

impl EnergyRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let json: String = row.get("result_json")?;
        let result: EnergyCalculationResult = serde_json::from_str(&json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

        Ok(Self {
            id: row.get("id")?,
            visitation_id: row.get("visitation_id")?,
            height_cm: row.get("height_cm")?,
            weight_kg: row.get("weight_kg")?,
            total_energy_kcal: row.get("total_energy_kcal")?,
            calculated_at: row.get("calculated_at")?,
            result,
            created_at: row.get("created_at")?,
        })
    }

    /// Store a result against a visitation
    pub fn store(
        conn: &Connection,
        result: &EnergyCalculationResult,
        visitation_id: i64,
    ) -> DbResult<Self> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM visitations WHERE id = ?1)",
            [visitation_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::NotFound {
                entity: "Visitation",
                id: visitation_id,
            });
        }

        let inputs = result.inputs();
        conn.execute(
            r#"
            INSERT INTO energy_calculations (
                visitation_id, method, height_cm, weight_kg, bmi, nutritional_status,
                total_energy_kcal, calculated_at, attributed_role, result_json
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                visitation_id,
                result.method().as_str(),
                inputs.height_cm(),
                inputs.weight_kg(),
                result.bmi(),
                result.nutritional_status().as_str(),
                result.total_energy_kcal(),
                result
                    .calculated_at()
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
                result.attribution().role.as_str(),
                serde_json::to_string(result)?,
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::info!(id, visitation_id, "Saved energy calculation");
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound {
            entity: "Energy calculation",
            id,
        })
    }

    /// Get a stored calculation by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM energy_calculations WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All calculations for a visitation, newest first
    pub fn list_for_visitation(conn: &Connection, visitation_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM energy_calculations
            WHERE visitation_id = ?1
            ORDER BY calculated_at DESC, id DESC
            "#,
        )?;
        let records = stmt
            .query_map([visitation_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Most recent calculation for a visitation
    pub fn latest_for_visitation(conn: &Connection, visitation_id: i64) -> DbResult<Option<Self>> {
        Ok(Self::list_for_visitation(conn, visitation_id)?.into_iter().next())
    }

    /// Most recent calculation per patient, across all their visitations
    pub fn latest_per_patient(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT e.* FROM energy_calculations e
            JOIN visitations v ON e.visitation_id = v.id
            WHERE e.id = (
                SELECT e2.id FROM energy_calculations e2
                JOIN visitations v2 ON e2.visitation_id = v2.id
                WHERE v2.patient_id = v.patient_id
                ORDER BY e2.calculated_at DESC, e2.id DESC
                LIMIT 1
            )
            ORDER BY v.patient_id
            "#,
        )?;
        let records = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::db::migrations::run_migrations;
    use crate::energy::{
        ActivityLevel, AnthropometricSnapshot, Attribution, EnergyEngine, Gender, Method, Role,
        StressLevel,
    };
    use crate::models::{Patient, PatientCreate, Visitation, VisitationCreate};

    fn setup() -> (Connection, i64) {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let patient = Patient::create(
            &conn,
            &PatientCreate {
                medical_record_number: "RM-7".to_string(),
                name: "Ahmad".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
                gender: Gender::Male,
            },
        )
        .unwrap();
        let visit = Visitation::create(
            &conn,
            &VisitationCreate {
                patient_id: patient.id,
                visit_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                ward: None,
                notes: None,
            },
        )
        .unwrap();
        (conn, visit.id)
    }

    fn result(weight: f64, hour: u32) -> EnergyCalculationResult {
        let snapshot = AnthropometricSnapshot::new(
            170.0,
            weight,
            45,
            Gender::Male,
            ActivityLevel::Light,
            StressLevel::None,
            Method::Stepped,
        );
        EnergyEngine::default()
            .compute_at(
                &snapshot,
                Attribution::new(Role::Nutritionist),
                Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn test_store_round_trips_result() {
        let (conn, visitation_id) = setup();
        let original = result(70.0, 8);
        let record = EnergyRecord::store(&conn, &original, visitation_id).unwrap();

        assert_eq!(record.total_energy_kcal, 2826);
        assert_eq!(record.calculated_at, "2025-03-01T08:00:00.000Z");
        assert_eq!(record.result, original);
    }

    #[test]
    fn test_store_unknown_visitation() {
        let (conn, _) = setup();
        let err = EnergyRecord::store(&conn, &result(70.0, 8), 999).unwrap_err();
        assert!(matches!(err, DbError::NotFound { id: 999, .. }));
    }

    #[test]
    fn test_store_is_append_only() {
        let (conn, visitation_id) = setup();
        EnergyRecord::store(&conn, &result(70.0, 8), visitation_id).unwrap();
        EnergyRecord::store(&conn, &result(85.0, 10), visitation_id).unwrap();

        let records = EnergyRecord::list_for_visitation(&conn, visitation_id).unwrap();
        assert_eq!(records.len(), 2);

        let latest = EnergyRecord::latest_for_visitation(&conn, visitation_id)
            .unwrap()
            .unwrap();
        assert_eq!(latest.weight_kg, 85.0);

        let per_patient = EnergyRecord::latest_per_patient(&conn).unwrap();
        assert_eq!(per_patient.len(), 1);
        assert_eq!(per_patient[0].weight_kg, 85.0);
    }
}
