//! Nutritional energy requirement engine
//!
//! Converts an [`AnthropometricSnapshot`] into a daily energy target with an
//! auditable derivation. Flow: validate, ideal body weight, BMR, (stepped
//! only) corrections, classification, assembly.
//!
//! The engine is pure: no I/O and no shared state. Persisting a result is
//! the caller's business (see [`crate::models::EnergyRecord`]).

pub mod bmr;
pub mod classifier;
pub mod corrections;
pub mod error;
pub mod ideal_weight;
pub mod result;
pub mod snapshot;
pub mod validator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use bmr::DEFAULT_QUICK_ACTIVITY_MULTIPLIER;
pub use classifier::{bmi, classify, NutritionalStatus};
pub use error::{EnergyError, EnergyResult};
pub use result::{AppliedFactors, Attribution, Breakdown, Derivation, EnergyCalculationResult, Role};
pub use snapshot::{age_on, ActivityLevel, AnthropometricSnapshot, Gender, Method, StressLevel};
pub use validator::validate;

use corrections::{age_factor, nutrition_factor};
use result::{assemble, Computation};

/// Round to the nearest kcal, halves away from zero
pub fn round_kcal(value: f64) -> i64 {
    value.round() as i64
}

/// Round to one decimal place, halves away from zero
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Engine tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Flat multiplier applied to the quick estimate
    pub quick_activity_multiplier: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quick_activity_multiplier: DEFAULT_QUICK_ACTIVITY_MULTIPLIER,
        }
    }
}

impl EngineConfig {
    /// Read overrides from the environment.
    ///
    /// `DIETCARE_QUICK_MULTIPLIER` must be a finite number above zero;
    /// anything else keeps the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("DIETCARE_QUICK_MULTIPLIER") {
            match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value > 0.0 => {
                    config.quick_activity_multiplier = value;
                }
                _ => tracing::warn!(
                    "Ignoring DIETCARE_QUICK_MULTIPLIER='{}', using {}",
                    raw,
                    config.quick_activity_multiplier
                ),
            }
        }

        config
    }
}

/// Energy requirement calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyEngine {
    config: EngineConfig,
}

impl EnergyEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute a result stamped with the current time
    pub fn compute(
        &self,
        snapshot: &AnthropometricSnapshot,
        attribution: Attribution,
    ) -> EnergyResult<EnergyCalculationResult> {
        self.compute_at(snapshot, attribution, Utc::now())
    }

    /// Compute a result stamped with `calculated_at`.
    ///
    /// Identical arguments always produce an identical result.
    pub fn compute_at(
        &self,
        snapshot: &AnthropometricSnapshot,
        attribution: Attribution,
        calculated_at: DateTime<Utc>,
    ) -> EnergyResult<EnergyCalculationResult> {
        let snapshot = *validate(snapshot)?;

        let computation = match snapshot.method() {
            Method::Stepped => stepped(snapshot),
            Method::QuickEstimate => quick_estimate(snapshot, self.config.quick_activity_multiplier),
        };

        tracing::debug!(
            method = snapshot.method().as_str(),
            total = computation.total,
            "Computed energy requirement"
        );

        Ok(assemble(computation, attribution, calculated_at))
    }
}

fn stepped(snapshot: AnthropometricSnapshot) -> Computation {
    let bbi = ideal_weight::bbi(snapshot.height_cm(), snapshot.gender());
    let bmr = bmr::stepped_bmr(bbi, snapshot.gender());
    let steps = corrections::apply(bmr, &snapshot);

    let breakdown = Breakdown {
        base_energy: round_kcal(bmr),
        after_activity: round_kcal(steps.after_activity),
        after_age: round_kcal(steps.after_age),
        after_nutrition: round_kcal(steps.after_nutrition),
        after_stress: round_kcal(steps.after_stress),
        total: round_kcal(steps.after_stress),
    };
    let factors = AppliedFactors {
        activity: snapshot.activity().factor(),
        age: age_factor(snapshot.age()),
        nutrition: nutrition_factor(steps.status),
        stress: snapshot.stress().factor(),
    };

    Computation {
        snapshot,
        bbi: Some(bbi),
        bmr,
        total: steps.after_stress,
        bmi: steps.bmi,
        status: steps.status,
        derivation: Derivation::Stepped { breakdown, factors },
    }
}

fn quick_estimate(snapshot: AnthropometricSnapshot, activity_multiplier: f64) -> Computation {
    let bmr = bmr::quick_estimate_bmr(
        snapshot.weight_kg(),
        snapshot.height_cm(),
        snapshot.age(),
        snapshot.gender(),
    );
    let bmi = bmi(snapshot.height_cm(), snapshot.weight_kg());

    Computation {
        snapshot,
        bbi: None,
        bmr,
        total: bmr * activity_multiplier,
        bmi,
        status: classify(bmi),
        derivation: Derivation::QuickEstimate { activity_multiplier },
    }
}

/// Compute with the default configuration
pub fn compute(
    snapshot: &AnthropometricSnapshot,
    attribution: Attribution,
) -> EnergyResult<EnergyCalculationResult> {
    EnergyEngine::default().compute(snapshot, attribution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scenario_a(method: Method) -> AnthropometricSnapshot {
        AnthropometricSnapshot::new(
            170.0,
            70.0,
            45,
            Gender::Male,
            ActivityLevel::Light,
            StressLevel::None,
            method,
        )
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
    }

    fn nutritionist() -> Attribution {
        Attribution::with_context(Role::Nutritionist, "visitation form")
    }

    #[test]
    fn test_scenario_a_stepped() {
        let engine = EnergyEngine::default();
        let result = engine
            .compute_at(&scenario_a(Method::Stepped), nutritionist(), at())
            .unwrap();

        assert_eq!(result.ideal_body_weight_kg(), Some(63.0));
        assert_eq!(result.bmr_kcal(), 1890);
        assert_eq!(result.nutritional_status(), NutritionalStatus::Normal);
        assert_eq!(result.total_energy_kcal(), 2826);

        let breakdown = result.breakdown().unwrap();
        assert_eq!(breakdown.base_energy, 1890);
        assert_eq!(breakdown.after_activity, 2268);
        assert_eq!(breakdown.after_age, 2174);
        assert_eq!(breakdown.after_nutrition, 2174);
        assert_eq!(breakdown.after_stress, 2826);
        assert_eq!(breakdown.total, 2826);
    }

    #[test]
    fn test_rounded_steps_do_not_propagate() {
        // 2173.5 x 1.7 = 3694.95, whereas the displayed 2174 x 1.7 would give 3696
        let snapshot = AnthropometricSnapshot::new(
            170.0,
            70.0,
            45,
            Gender::Male,
            ActivityLevel::Light,
            StressLevel::VerySevere,
            Method::Stepped,
        );
        let result = compute(&snapshot, nutritionist()).unwrap();
        assert_eq!(result.breakdown().unwrap().after_nutrition, 2174);
        assert_eq!(result.total_energy_kcal(), 3695);
    }

    #[test]
    fn test_scenario_b_quick_estimate() {
        let engine = EnergyEngine::default();
        let result = engine
            .compute_at(&scenario_a(Method::QuickEstimate), nutritionist(), at())
            .unwrap();

        assert_eq!(result.method(), Method::QuickEstimate);
        assert_eq!(result.bmr_kcal(), 1587);
        assert_eq!(result.total_energy_kcal(), 2062);
        assert!(result.breakdown().is_none());
        assert_eq!(
            result.derivation(),
            &Derivation::QuickEstimate {
                activity_multiplier: 1.3
            }
        );
    }

    #[test]
    fn test_quick_estimate_uses_configured_multiplier() {
        let engine = EnergyEngine::new(EngineConfig {
            quick_activity_multiplier: 1.5,
        });
        let result = engine
            .compute_at(&scenario_a(Method::QuickEstimate), nutritionist(), at())
            .unwrap();
        // 1586.517 * 1.5 = 2379.7755
        assert_eq!(result.total_energy_kcal(), 2380);
    }

    #[test]
    fn test_scenario_c_petite_female() {
        let snapshot = AnthropometricSnapshot::new(
            155.0,
            50.0,
            30,
            Gender::Female,
            ActivityLevel::Bedrest,
            StressLevel::None,
            Method::Stepped,
        );
        let result = compute(&snapshot, Attribution::new(Role::Doctor)).unwrap();
        assert_eq!(result.ideal_body_weight_kg(), Some(55.0));
        assert_eq!(result.bmr_kcal(), 1375);
    }

    #[test]
    fn test_scenario_d_stepped_floor() {
        let stepped = AnthropometricSnapshot::new(
            95.0,
            70.0,
            45,
            Gender::Male,
            ActivityLevel::Light,
            StressLevel::None,
            Method::Stepped,
        );
        let err = compute(&stepped, nutritionist()).unwrap_err();
        assert!(matches!(err, EnergyError::InvalidInput { field: "height_cm", .. }));

        let quick = stepped.with_method(Method::QuickEstimate);
        assert!(compute(&quick, nutritionist()).is_ok());
    }

    #[test]
    fn test_quick_estimate_reports_no_ideal_weight() {
        let short = AnthropometricSnapshot::new(
            95.0,
            70.0,
            45,
            Gender::Male,
            ActivityLevel::Light,
            StressLevel::None,
            Method::QuickEstimate,
        );
        let result = compute(&short, nutritionist()).unwrap();
        assert_eq!(result.ideal_body_weight_kg(), None);

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["ideal_body_weight_kg"].is_null());
    }

    #[test]
    fn test_compute_is_deterministic() {
        let engine = EnergyEngine::default();
        let snapshot = scenario_a(Method::Stepped);
        let first = engine.compute_at(&snapshot, nutritionist(), at()).unwrap();
        let second = engine.compute_at(&snapshot, nutritionist(), at()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_recompute_leaves_previous_result_untouched() {
        let engine = EnergyEngine::default();
        let first = engine
            .compute_at(&scenario_a(Method::Stepped), nutritionist(), at())
            .unwrap();
        let kept = first.clone();

        let heavier = AnthropometricSnapshot::new(
            170.0,
            95.0,
            45,
            Gender::Male,
            ActivityLevel::Light,
            StressLevel::Severe,
            Method::Stepped,
        );
        let second = engine.compute_at(&heavier, nutritionist(), at()).unwrap();

        assert_ne!(first, second);
        assert_eq!(first, kept);
    }

    #[test]
    fn test_result_carries_labels_and_attribution() {
        let result = compute(
            &scenario_a(Method::Stepped),
            Attribution::with_context(Role::Doctor, "ward 3"),
        )
        .unwrap();
        assert_eq!(result.activity_level(), ActivityLevel::Light);
        assert_eq!(result.activity_label(), "Light");
        assert_eq!(result.stress_level(), StressLevel::None);
        assert_eq!(result.stress_description(), StressLevel::None.description());
        assert_eq!(result.attribution().role, Role::Doctor);
        assert_eq!(result.attribution().context.as_deref(), Some("ward 3"));
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_kcal(2173.5), 2174);
        assert_eq!(round_kcal(2174.5), 2175);
        assert_eq!(round_kcal(-0.5), -1);
        assert_eq!(round_to_tenth(62.25), 62.3);
    }

    #[test]
    fn test_result_serializes() {
        let result = EnergyEngine::default()
            .compute_at(&scenario_a(Method::Stepped), nutritionist(), at())
            .unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let back: EnergyCalculationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
