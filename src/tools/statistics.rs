//! Population nutritional-status statistics
//!
//! Buckets patients by BMI using the same [`classify`] the correction
//! pipeline uses, so the dashboard and the engine can never disagree on
//! thresholds.

use serde::Serialize;

use super::ToolResult;
use crate::db::Database;
use crate::energy::{bmi, classify, NutritionalStatus};
use crate::models::EnergyRecord;

/// Count for one status bucket
#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: NutritionalStatus,
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

/// Population summary
#[derive(Debug, Clone, Serialize)]
pub struct NutritionalStatusSummary {
    pub total: usize,
    /// Samples with non-positive or non-finite measurements
    pub skipped: usize,
    pub mean_bmi: Option<f64>,
    pub buckets: Vec<StatusCount>,
}

/// Bucket `(height_cm, weight_kg)` samples by nutritional status
pub fn bucket_population(samples: &[(f64, f64)]) -> NutritionalStatusSummary {
    let mut counts = [0usize; 4];
    let mut bmi_sum = 0.0;
    let mut total = 0usize;
    let mut skipped = 0usize;

    for &(height_cm, weight_kg) in samples {
        let usable = height_cm.is_finite() && weight_kg.is_finite() && height_cm > 0.0 && weight_kg > 0.0;
        if !usable {
            skipped += 1;
            continue;
        }

        let value = bmi(height_cm, weight_kg);
        counts[classify(value) as usize] += 1;
        bmi_sum += value;
        total += 1;
    }

    let buckets = NutritionalStatus::ALL
        .iter()
        .zip(counts)
        .map(|(status, count)| StatusCount {
            status: *status,
            label: status.display_name().to_string(),
            count,
            percent: if total > 0 {
                (count as f64 / total as f64 * 1000.0).round() / 10.0
            } else {
                0.0
            },
        })
        .collect();

    let mean_bmi = (total > 0).then(|| (bmi_sum / total as f64 * 100.0).round() / 100.0);

    NutritionalStatusSummary {
        total,
        skipped,
        mean_bmi,
        buckets,
    }
}

/// Summary over each patient's most recent saved calculation
pub fn nutritional_status_summary(db: &Database) -> ToolResult<NutritionalStatusSummary> {
    let records = db.with_conn(EnergyRecord::latest_per_patient)?;
    let samples: Vec<(f64, f64)> = records.iter().map(|r| (r.height_cm, r.weight_kg)).collect();

    tracing::debug!(patients = samples.len(), "Building nutritional status summary");
    Ok(bucket_population(&samples))
}
