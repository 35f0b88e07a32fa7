//! Nutritional status classification
//!
//! The single BMI classifier shared by the correction pipeline and by
//! population statistics. Both call sites must go through [`classify`].

use serde::{Deserialize, Serialize};

/// BMI below which a patient is underweight
pub const BMI_UNDERWEIGHT_BELOW: f64 = 18.5;
/// BMI at or above which a patient is overweight
pub const BMI_OVERWEIGHT_FROM: f64 = 25.0;
/// BMI at or above which a patient is obese
pub const BMI_OBESE_FROM: f64 = 30.0;

/// Body-composition class derived from BMI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NutritionalStatus {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl NutritionalStatus {
    pub const ALL: [NutritionalStatus; 4] = [
        NutritionalStatus::Underweight,
        NutritionalStatus::Normal,
        NutritionalStatus::Overweight,
        NutritionalStatus::Obese,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NutritionalStatus::Underweight => "underweight",
            NutritionalStatus::Normal => "normal",
            NutritionalStatus::Overweight => "overweight",
            NutritionalStatus::Obese => "obese",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "underweight" => Some(NutritionalStatus::Underweight),
            "normal" => Some(NutritionalStatus::Normal),
            "overweight" => Some(NutritionalStatus::Overweight),
            "obese" => Some(NutritionalStatus::Obese),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NutritionalStatus::Underweight => "Underweight",
            NutritionalStatus::Normal => "Normal",
            NutritionalStatus::Overweight => "Overweight",
            NutritionalStatus::Obese => "Obese",
        }
    }
}

/// Body mass index from centimeters and kilograms
pub fn bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Classify a BMI value
pub fn classify(bmi: f64) -> NutritionalStatus {
    if bmi < BMI_UNDERWEIGHT_BELOW {
        NutritionalStatus::Underweight
    } else if bmi < BMI_OVERWEIGHT_FROM {
        NutritionalStatus::Normal
    } else if bmi < BMI_OBESE_FROM {
        NutritionalStatus::Overweight
    } else {
        NutritionalStatus::Obese
    }
}
