//! Basal metabolic rate estimators
//!
//! Two strategies share the snapshot input:
//! - Stepped: kcal per kg of ideal body weight, feeding the correction pipeline
//! - QuickEstimate: Mifflin-style formula times a flat activity multiplier

use super::snapshot::Gender;

/// Default activity multiplier for the quick estimate
pub const DEFAULT_QUICK_ACTIVITY_MULTIPLIER: f64 = 1.3;

/// Stepped BMR from unrounded ideal body weight
pub fn stepped_bmr(bbi_kg: f64, gender: Gender) -> f64 {
    let kcal_per_kg = match gender {
        Gender::Male => 30.0,
        Gender::Female => 25.0,
    };
    kcal_per_kg * bbi_kg
}

/// Mifflin-style resting estimate before the activity multiplier
pub fn quick_estimate_bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let age = f64::from(age);
    match gender {
        Gender::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age,
        Gender::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age,
    }
}
