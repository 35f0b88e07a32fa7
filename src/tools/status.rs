//! Status tool
//!
//! Runtime status of the service plus the usage guide handed to MCP clients.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info;
use crate::db::{migrations, Database};
use crate::energy::EngineConfig;

/// Energy calculation instructions for AI assistants
pub const ENERGY_INSTRUCTIONS: &str = r#"
# Energy Requirement Instructions

## Workflow

1. Find or register the patient: `list_patients` / `add_patient`
   (medical_record_number, name, birth_date YYYY-MM-DD, gender male|female).
2. Open a visitation for the stay: `add_visitation`.
3. Preview with `calculate_energy_requirement`, then persist with
   `save_energy_calculation` (same fields plus `visitation_id`).

Age and gender are taken from the patient record when you pass
`patient_id` (or `visitation_id` when saving) and leave them out.

## Methods

| method | use | inputs used |
|--------|-----|-------------|
| `stepped` | clinical record (PERKENI) | height, weight, age, gender, activity, stress |
| `quick_estimate` | first-pass diet planning | height, weight, age, gender |

Stepped requires height >= 100 cm and weight >= 20 kg.

## Levels

- activity: `bedrest` (+10%), `light` (+20%), `moderate` (+30%), `heavy` (+45%)
- stress: `none` (x1.3), `mild` (x1.4), `moderate` (x1.5), `severe` (x1.6), `very_severe` (x1.7)

`activity_level`, `stress_level` and `role` are required. Missing or unknown
values are rejected; ask the clinician rather than guessing.

## Stepped breakdown

base (30 kcal/kg BBI male, 25 female) -> + activity -> - age
(40-59: 5%, 60-69: 10%, 70+: 15%) -> +/- nutrition (underweight +20%,
overweight -10%, obese -20%) -> x stress. Each step is shown rounded;
the total is computed from unrounded values.
"#;

/// Runtime status of the service
#[derive(Debug, Clone, Serialize)]
pub struct DietcareStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub schema_version: Option<i32>,

    pub quick_activity_multiplier: f64,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Collects runtime information for the status tool
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    engine_config: EngineConfig,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, engine_config: EngineConfig) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            engine_config,
        }
    }

    pub fn get_status(&self, database: &Database) -> DietcareStatus {

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let schema_version = match database.with_conn(migrations::get_schema_version) {
            Ok(version) => Some(version),
            Err(e) => {
                tracing::warn!("Could not read schema version: {}", e);
                None
            }
        };

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));
        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        DietcareStatus {
            build_number: build_info::build_number(),
            build_timestamp: build_info::BUILD_TIMESTAMP,
            version: build_info::VERSION,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            schema_version,
            quick_activity_multiplier: self.engine_config.quick_activity_multiplier,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
