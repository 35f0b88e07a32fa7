//! Input validation
//!
//! Checks a snapshot is usable for its requested method before any
//! arithmetic runs.

use super::error::{EnergyError, EnergyResult};
use super::snapshot::{AnthropometricSnapshot, Method};

/// Minimum height (cm) accepted by the Stepped method
pub const STEPPED_MIN_HEIGHT_CM: f64 = 100.0;
/// Minimum weight (kg) accepted by the Stepped method
pub const STEPPED_MIN_WEIGHT_KG: f64 = 20.0;

/// Validate a snapshot against its method's preconditions
pub fn validate(snapshot: &AnthropometricSnapshot) -> EnergyResult<&AnthropometricSnapshot> {
    let height = snapshot.height_cm();
    let weight = snapshot.weight_kg();

    if !height.is_finite() {
        return Err(EnergyError::invalid("height_cm", height, "must be a finite number"));
    }
    if !weight.is_finite() {
        return Err(EnergyError::invalid("weight_kg", weight, "must be a finite number"));
    }

    match snapshot.method() {
        Method::Stepped => {
            if height < STEPPED_MIN_HEIGHT_CM {
                return Err(EnergyError::invalid(
                    "height_cm",
                    height,
                    format!("stepped method requires at least {} cm", STEPPED_MIN_HEIGHT_CM),
                ));
            }
            if weight < STEPPED_MIN_WEIGHT_KG {
                return Err(EnergyError::invalid(
                    "weight_kg",
                    weight,
                    format!("stepped method requires at least {} kg", STEPPED_MIN_WEIGHT_KG),
                ));
            }
        }
        Method::QuickEstimate => {
            if height <= 0.0 {
                return Err(EnergyError::invalid("height_cm", height, "must be positive"));
            }
            if weight <= 0.0 {
                return Err(EnergyError::invalid("weight_kg", weight, "must be positive"));
            }
            if snapshot.age() == 0 {
                return Err(EnergyError::invalid("age", snapshot.age(), "must be positive"));
            }
        }
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::snapshot::{ActivityLevel, Gender, StressLevel};

    fn snapshot(height: f64, weight: f64, age: u32, method: Method) -> AnthropometricSnapshot {
        AnthropometricSnapshot::new(
            height,
            weight,
            age,
            Gender::Male,
            ActivityLevel::Light,
            StressLevel::None,
            method,
        )
    }

    #[test]
    fn test_stepped_boundaries_are_inclusive() {
        assert!(validate(&snapshot(100.0, 20.0, 30, Method::Stepped)).is_ok());
    }

    #[test]
    fn test_stepped_rejects_below_floor() {
        let err = validate(&snapshot(99.999, 70.0, 30, Method::Stepped)).unwrap_err();
        assert!(matches!(err, EnergyError::InvalidInput { field: "height_cm", .. }));

        let err = validate(&snapshot(170.0, 19.99, 30, Method::Stepped)).unwrap_err();
        assert!(matches!(err, EnergyError::InvalidInput { field: "weight_kg", .. }));
    }

    #[test]
    fn test_stepped_allows_newborn_age() {
        assert!(validate(&snapshot(170.0, 70.0, 0, Method::Stepped)).is_ok());
    }

    #[test]
    fn test_quick_estimate_only_requires_positive() {
        assert!(validate(&snapshot(95.0, 15.0, 30, Method::QuickEstimate)).is_ok());
        assert!(validate(&snapshot(0.0, 70.0, 30, Method::QuickEstimate)).is_err());
        assert!(validate(&snapshot(170.0, -1.0, 30, Method::QuickEstimate)).is_err());
        assert!(validate(&snapshot(170.0, 70.0, 0, Method::QuickEstimate)).is_err());
    }

    #[test]
    fn test_rejects_nan() {
        assert!(validate(&snapshot(f64::NAN, 70.0, 30, Method::Stepped)).is_err());
        assert!(validate(&snapshot(170.0, f64::INFINITY, 30, Method::QuickEstimate)).is_err());
    }
}
