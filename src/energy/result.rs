//! Result assembly
//!
//! Packages a finished computation into an immutable, auditable record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classifier::NutritionalStatus;
use super::snapshot::{ActivityLevel, AnthropometricSnapshot, Method, StressLevel};
use super::{round_kcal, round_to_tenth};

/// Staff role that triggered a calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Doctor,
    Nurse,
    Nutritionist,
    Pharmacist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::Nutritionist => "nutritionist",
            Role::Pharmacist => "pharmacist",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "administrator" => Some(Role::Admin),
            "doctor" | "dokter" => Some(Role::Doctor),
            "nurse" | "perawat" => Some(Role::Nurse),
            "nutritionist" | "ahli_gizi" | "dietitian" => Some(Role::Nutritionist),
            "pharmacist" | "apoteker" => Some(Role::Pharmacist),
            _ => None,
        }
    }
}

/// Who asked for a calculation, and from where
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub role: Role,
    /// Free-form origin, e.g. the screen or workflow step
    pub context: Option<String>,
}

impl Attribution {
    pub fn new(role: Role) -> Self {
        Self { role, context: None }
    }

    pub fn with_context(role: Role, context: impl Into<String>) -> Self {
        Self {
            role,
            context: Some(context.into()),
        }
    }
}

/// Rounded snapshot of every stepped-pipeline stage, in kcal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub base_energy: i64,
    pub after_activity: i64,
    pub after_age: i64,
    pub after_nutrition: i64,
    pub after_stress: i64,
    pub total: i64,
}

/// Factors applied by the stepped pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedFactors {
    pub activity: f64,
    pub age: f64,
    pub nutrition: f64,
    pub stress: f64,
}

/// How the total was derived
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Derivation {
    Stepped {
        breakdown: Breakdown,
        factors: AppliedFactors,
    },
    QuickEstimate {
        activity_multiplier: f64,
    },
}

impl Derivation {
    pub fn method(&self) -> Method {
        match self {
            Derivation::Stepped { .. } => Method::Stepped,
            Derivation::QuickEstimate { .. } => Method::QuickEstimate,
        }
    }

    pub fn breakdown(&self) -> Option<&Breakdown> {
        match self {
            Derivation::Stepped { breakdown, .. } => Some(breakdown),
            Derivation::QuickEstimate { .. } => None,
        }
    }
}

/// Unrounded values handed to the assembler by the engine
#[derive(Debug, Clone, Copy)]
pub(crate) struct Computation {
    pub snapshot: AnthropometricSnapshot,
    pub bbi: Option<f64>,
    pub bmr: f64,
    pub total: f64,
    pub bmi: f64,
    pub status: NutritionalStatus,
    pub derivation: Derivation,
}

/// The immutable outcome of one calculation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyCalculationResult {
    inputs: AnthropometricSnapshot,
    ideal_body_weight_kg: Option<f64>,
    bmr_kcal: i64,
    total_energy_kcal: i64,
    bmi: f64,
    nutritional_status: NutritionalStatus,
    activity_level: ActivityLevel,
    activity_label: String,
    stress_level: StressLevel,
    stress_description: String,
    derivation: Derivation,
    calculated_at: DateTime<Utc>,
    attribution: Attribution,
}

impl EnergyCalculationResult {
    pub fn inputs(&self) -> &AnthropometricSnapshot {
        &self.inputs
    }

    /// Ideal body weight, one decimal; `None` for quick estimates
    pub fn ideal_body_weight_kg(&self) -> Option<f64> {
        self.ideal_body_weight_kg
    }

    pub fn bmr_kcal(&self) -> i64 {
        self.bmr_kcal
    }

    pub fn total_energy_kcal(&self) -> i64 {
        self.total_energy_kcal
    }

    /// BMI, two decimals
    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn nutritional_status(&self) -> NutritionalStatus {
        self.nutritional_status
    }

    pub fn activity_level(&self) -> ActivityLevel {
        self.activity_level
    }

    pub fn activity_label(&self) -> &str {
        &self.activity_label
    }

    pub fn stress_level(&self) -> StressLevel {
        self.stress_level
    }

    pub fn stress_description(&self) -> &str {
        &self.stress_description
    }

    pub fn method(&self) -> Method {
        self.derivation.method()
    }

    pub fn derivation(&self) -> &Derivation {
        &self.derivation
    }

    /// Stepped breakdown; `None` for quick estimates
    pub fn breakdown(&self) -> Option<&Breakdown> {
        self.derivation.breakdown()
    }

    pub fn calculated_at(&self) -> DateTime<Utc> {
        self.calculated_at
    }

    pub fn attribution(&self) -> &Attribution {
        &self.attribution
    }
}

/// Build the result record. Inputs are already validated and computed.
pub(crate) fn assemble(
    computation: Computation,
    attribution: Attribution,
    calculated_at: DateTime<Utc>,
) -> EnergyCalculationResult {
    let snapshot = computation.snapshot;

    EnergyCalculationResult {
        inputs: snapshot,
        ideal_body_weight_kg: computation.bbi.map(round_to_tenth),
        bmr_kcal: round_kcal(computation.bmr),
        total_energy_kcal: round_kcal(computation.total),
        bmi: (computation.bmi * 100.0).round() / 100.0,
        nutritional_status: computation.status,
        activity_level: snapshot.activity(),
        activity_label: snapshot.activity().display_name().to_string(),
        stress_level: snapshot.stress(),
        stress_description: snapshot.stress().description().to_string(),
        derivation: computation.derivation,
        calculated_at,
        attribution,
    }
}
