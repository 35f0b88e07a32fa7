//! Database migrations

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Bring the database up to [`SCHEMA_VERSION`]
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        tracing::info!("Applying schema migration v1");
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: patients, visitations, saved calculations
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- PATIENTS
        -- ============================================
        CREATE TABLE patients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            medical_record_number TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            birth_date TEXT NOT NULL,            -- ISO date: "1961-10-22"
            gender TEXT NOT NULL CHECK(gender IN ('male', 'female')),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_patients_name ON patients(name);

        -- ============================================
        -- VISITATIONS
        -- One inpatient stay or ward visit
        -- ============================================
        CREATE TABLE visitations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id INTEGER NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
            visit_date TEXT NOT NULL,            -- ISO date
            ward TEXT,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_visitations_patient ON visitations(patient_id);

        -- ============================================
        -- ENERGY CALCULATIONS
        -- Append-only; the full result is kept as JSON, the columns
        -- below are copies for querying.
        -- ============================================
        CREATE TABLE energy_calculations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            visitation_id INTEGER NOT NULL REFERENCES visitations(id) ON DELETE CASCADE,
            method TEXT NOT NULL CHECK(method IN ('stepped', 'quick_estimate')),
            height_cm REAL NOT NULL,
            weight_kg REAL NOT NULL,
            bmi REAL NOT NULL,
            nutritional_status TEXT NOT NULL,
            total_energy_kcal INTEGER NOT NULL,
            calculated_at TEXT NOT NULL,
            attributed_role TEXT NOT NULL,
            result_json TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_energy_visitation ON energy_calculations(visitation_id);
        CREATE INDEX idx_energy_calculated_at ON energy_calculations(calculated_at);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}
