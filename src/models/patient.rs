//! Patient model
//!
//! Registered inpatients. Birth date and gender feed the energy engine.

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::energy::{age_on, EnergyResult, Gender};

/// A registered patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub medical_record_number: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for registering a patient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientCreate {
    pub medical_record_number: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

impl Patient {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let gender_str: String = row.get("gender")?;
        let gender = Gender::from_str(&gender_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

        Ok(Self {
            id: row.get("id")?,
            medical_record_number: row.get("medical_record_number")?,
            name: row.get("name")?,
            birth_date: row.get("birth_date")?,
            gender,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Register a new patient
    pub fn create(conn: &Connection, data: &PatientCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO patients (medical_record_number, name, birth_date, gender)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                data.medical_record_number,
                data.name,
                data.birth_date,
                data.gender.as_str(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Patient", id })
    }

    /// Get a patient by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM patients WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(patient) => Ok(Some(patient)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List patients, optionally filtered by name or record number
    pub fn list(conn: &Connection, query: Option<&str>, limit: i64) -> DbResult<Vec<Self>> {
        let patients = match query {
            Some(q) => {
                let pattern = format!("%{}%", q);
                let mut stmt = conn.prepare(
                    r#"
                    SELECT * FROM patients
                    WHERE name LIKE ?1 OR medical_record_number LIKE ?1
                    ORDER BY name LIMIT ?2
                    "#,
                )?;
                let rows = stmt.query_map(params![pattern, limit], Self::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare("SELECT * FROM patients ORDER BY name LIMIT ?1")?;
                let rows = stmt.query_map([limit], Self::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(patients)
    }

    /// Age in whole years on `on_date`
    pub fn age_on(&self, on_date: NaiveDate) -> EnergyResult<u32> {
        age_on(self.birth_date, on_date)
    }
}
