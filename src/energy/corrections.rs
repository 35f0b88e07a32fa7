//! Stepped-method correction pipeline
//!
//! Activity, age, nutritional status and stress are applied in that order
//! to an unrounded running total. Rounded snapshots of each step are taken
//! by the assembler for display; they never feed back into the arithmetic.

use super::classifier::{bmi, classify, NutritionalStatus};
use super::snapshot::AnthropometricSnapshot;

/// Fraction of BMR removed for age
pub fn age_factor(age: u32) -> f64 {
    match age {
        0..=39 => 0.0,
        40..=59 => 0.05,
        60..=69 => 0.10,
        _ => 0.15,
    }
}

/// Signed fraction of BMR added for nutritional status
pub fn nutrition_factor(status: NutritionalStatus) -> f64 {
    match status {
        NutritionalStatus::Underweight => 0.20,
        NutritionalStatus::Normal => 0.0,
        NutritionalStatus::Overweight => -0.10,
        NutritionalStatus::Obese => -0.20,
    }
}

/// Unrounded running total after each correction step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionSteps {
    pub bmi: f64,
    pub status: NutritionalStatus,
    pub after_activity: f64,
    pub after_age: f64,
    pub after_nutrition: f64,
    pub after_stress: f64,
}

/// Run the pipeline on an unrounded stepped BMR.
///
/// Every adjustment is a fraction of the original `bmr`, not of the running
/// total; only the stress factor multiplies the running total.
pub fn apply(bmr: f64, snapshot: &AnthropometricSnapshot) -> CorrectionSteps {
    let after_activity = bmr + bmr * snapshot.activity().factor();
    let after_age = after_activity - bmr * age_factor(snapshot.age());

    let bmi = bmi(snapshot.height_cm(), snapshot.weight_kg());
    let status = classify(bmi);
    let after_nutrition = after_age + bmr * nutrition_factor(status);

    let after_stress = after_nutrition * snapshot.stress().factor();

    CorrectionSteps {
        bmi,
        status,
        after_activity,
        after_age,
        after_nutrition,
        after_stress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::snapshot::{ActivityLevel, Gender, Method, StressLevel};

    fn snapshot(weight: f64, age: u32, activity: ActivityLevel, stress: StressLevel) -> AnthropometricSnapshot {
        AnthropometricSnapshot::new(170.0, weight, age, Gender::Male, activity, stress, Method::Stepped)
    }

    #[test]
    fn test_age_factor_bands() {
        assert_eq!(age_factor(0), 0.0);
        assert_eq!(age_factor(39), 0.0);
        assert_eq!(age_factor(40), 0.05);
        assert_eq!(age_factor(59), 0.05);
        assert_eq!(age_factor(60), 0.10);
        assert_eq!(age_factor(69), 0.10);
        assert_eq!(age_factor(70), 0.15);
        assert_eq!(age_factor(101), 0.15);
    }

    #[test]
    fn test_scenario_a_steps() {
        let steps = apply(1890.0, &snapshot(70.0, 45, ActivityLevel::Light, StressLevel::None));
        assert!((steps.after_activity - 2268.0).abs() < 1e-9);
        assert!((steps.after_age - 2173.5).abs() < 1e-9);
        assert_eq!(steps.status, NutritionalStatus::Normal);
        assert!((steps.after_nutrition - 2173.5).abs() < 1e-9);
        assert!((steps.after_stress - 2825.55).abs() < 1e-6);
    }

    #[test]
    fn test_age_reduction_uses_original_bmr() {
        // 1000 + 450 activity, then 15% of 1000 (not of 1450)
        let steps = apply(1000.0, &snapshot(70.0, 75, ActivityLevel::Heavy, StressLevel::None));
        assert!((steps.after_age - 1300.0).abs() < 1e-9);
    }

    #[test]
    fn test_nutrition_correction_by_status() {
        // BMI ~17.3 at 170 cm / 50 kg
        let under = apply(1000.0, &snapshot(50.0, 30, ActivityLevel::Bedrest, StressLevel::None));
        assert_eq!(under.status, NutritionalStatus::Underweight);
        assert!((under.after_nutrition - 1300.0).abs() < 1e-9);

        // BMI ~27.7
        let over = apply(1000.0, &snapshot(80.0, 30, ActivityLevel::Bedrest, StressLevel::None));
        assert_eq!(over.status, NutritionalStatus::Overweight);
        assert!((over.after_nutrition - 1000.0).abs() < 1e-9);

        // BMI ~34.6
        let obese = apply(1000.0, &snapshot(100.0, 30, ActivityLevel::Bedrest, StressLevel::None));
        assert_eq!(obese.status, NutritionalStatus::Obese);
        assert!((obese.after_nutrition - 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_stress_multiplies_running_total() {
        let steps = apply(1000.0, &snapshot(70.0, 30, ActivityLevel::Bedrest, StressLevel::VerySevere));
        assert!((steps.after_stress - 1100.0 * 1.7).abs() < 1e-9);
    }
}
