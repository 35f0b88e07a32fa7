//! Visitation model
//!
//! A patient's inpatient visit. Saved energy calculations hang off a
//! visitation.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// An inpatient visit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visitation {
    pub id: i64,
    pub patient_id: i64,
    pub visit_date: NaiveDate,
    pub ward: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Data for opening a visitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitationCreate {
    pub patient_id: i64,
    pub visit_date: NaiveDate,
    pub ward: Option<String>,
    pub notes: Option<String>,
}

impl Visitation {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            patient_id: row.get("patient_id")?,
            visit_date: row.get("visit_date")?,
            ward: row.get("ward")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Open a visitation for an existing patient
    pub fn create(conn: &Connection, data: &VisitationCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO visitations (patient_id, visit_date, ward, notes)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![data.patient_id, data.visit_date, data.ward, data.notes],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Visitation", id })
    }

    /// Get a visitation by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM visitations WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(visitation) => Ok(Some(visitation)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Visitations for a patient, newest first
    pub fn list_for_patient(conn: &Connection, patient_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM visitations WHERE patient_id = ?1 ORDER BY visit_date DESC, id DESC",
        )?;
        let visitations = stmt
            .query_map([patient_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(visitations)
    }
}
