//! Anthropometric input snapshot
//!
//! The value object handed to the engine on every calculation request,
//! together with the closed level enums that select correction factors.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::{EnergyError, EnergyResult};

/// Patient gender as used by the BBI and BMR formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> EnergyResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "l" | "laki-laki" => Ok(Gender::Male),
            "female" | "f" | "p" | "perempuan" => Ok(Gender::Female),
            _ => Err(EnergyError::invalid("gender", s, "expected male or female")),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

/// Physical activity level (Stepped method only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityLevel {
    Bedrest,
    Light,
    Moderate,
    Heavy,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 4] = [
        ActivityLevel::Bedrest,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Heavy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Bedrest => "bedrest",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Heavy => "heavy",
        }
    }

    pub fn from_str(s: &str) -> EnergyResult<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "bedrest" | "bed_rest" | "istirahat" => Ok(ActivityLevel::Bedrest),
            "light" | "ringan" => Ok(ActivityLevel::Light),
            "moderate" | "sedang" => Ok(ActivityLevel::Moderate),
            "heavy" | "berat" => Ok(ActivityLevel::Heavy),
            _ => Err(EnergyError::unknown_level("activity", s)),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityLevel::Bedrest => "Bed rest",
            ActivityLevel::Light => "Light",
            ActivityLevel::Moderate => "Moderate",
            ActivityLevel::Heavy => "Heavy",
        }
    }

    /// Fraction of BMR added for activity
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Bedrest => 0.10,
            ActivityLevel::Light => 0.20,
            ActivityLevel::Moderate => 0.30,
            ActivityLevel::Heavy => 0.45,
        }
    }
}

/// Physiological stress level from illness, trauma or surgery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StressLevel {
    None,
    Mild,
    Moderate,
    Severe,
    VerySevere,
}

impl StressLevel {
    pub const ALL: [StressLevel; 5] = [
        StressLevel::None,
        StressLevel::Mild,
        StressLevel::Moderate,
        StressLevel::Severe,
        StressLevel::VerySevere,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::None => "none",
            StressLevel::Mild => "mild",
            StressLevel::Moderate => "moderate",
            StressLevel::Severe => "severe",
            StressLevel::VerySevere => "very_severe",
        }
    }

    pub fn from_str(s: &str) -> EnergyResult<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "none" | "normal" | "tidak_ada" => Ok(StressLevel::None),
            "mild" | "ringan" => Ok(StressLevel::Mild),
            "moderate" | "sedang" => Ok(StressLevel::Moderate),
            "severe" | "berat" => Ok(StressLevel::Severe),
            "very_severe" | "sangat_berat" => Ok(StressLevel::VerySevere),
            _ => Err(EnergyError::unknown_level("stress", s)),
        }
    }

    /// Multiplier applied to the corrected total
    pub fn factor(&self) -> f64 {
        match self {
            StressLevel::None => 1.3,
            StressLevel::Mild => 1.4,
            StressLevel::Moderate => 1.5,
            StressLevel::Severe => 1.6,
            StressLevel::VerySevere => 1.7,
        }
    }

    /// Fixed clinical description shown next to the chosen level
    pub fn description(&self) -> &'static str {
        match self {
            StressLevel::None => "Tidak ada stress, gizi baik",
            StressLevel::Mild => {
                "Stress ringan: peradangan saluran cerna, kanker, bedah elektif, trauma kerangka moderat"
            }
            StressLevel::Moderate => {
                "Stress sedang: sepsis, bedah tulang, luka bakar, trauma kerangka mayor"
            }
            StressLevel::Severe => "Stress berat: trauma multipel, sepsis, dan bedah multisistem",
            StressLevel::VerySevere => {
                "Stress sangat berat: luka kepala berat, sindroma penyakit pernapasan akut, luka bakar dan sepsis"
            }
        }
    }
}

/// Which BMR strategy to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Method {
    /// PERKENI stepped protocol with the full correction pipeline
    Stepped,
    /// One-shot Mifflin-style screening estimate
    QuickEstimate,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Stepped => "stepped",
            Method::QuickEstimate => "quick_estimate",
        }
    }

    pub fn from_str(s: &str) -> EnergyResult<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "stepped" | "perkeni" => Ok(Method::Stepped),
            "quick_estimate" | "quick" | "mifflin" => Ok(Method::QuickEstimate),
            _ => Err(EnergyError::invalid("method", s, "expected stepped or quick_estimate")),
        }
    }
}

/// Immutable input for one calculation request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnthropometricSnapshot {
    height_cm: f64,
    weight_kg: f64,
    age: u32,
    gender: Gender,
    activity: ActivityLevel,
    stress: StressLevel,
    method: Method,
}

impl AnthropometricSnapshot {
    pub fn new(
        height_cm: f64,
        weight_kg: f64,
        age: u32,
        gender: Gender,
        activity: ActivityLevel,
        stress: StressLevel,
        method: Method,
    ) -> Self {
        Self {
            height_cm,
            weight_kg,
            age,
            gender,
            activity,
            stress,
            method,
        }
    }

    /// Build a snapshot with the age derived from a birth date
    pub fn from_birth_date(
        height_cm: f64,
        weight_kg: f64,
        birth_date: NaiveDate,
        on_date: NaiveDate,
        gender: Gender,
        activity: ActivityLevel,
        stress: StressLevel,
        method: Method,
    ) -> EnergyResult<Self> {
        let age = age_on(birth_date, on_date)?;
        Ok(Self::new(height_cm, weight_kg, age, gender, activity, stress, method))
    }

    pub fn height_cm(&self) -> f64 {
        self.height_cm
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn activity(&self) -> ActivityLevel {
        self.activity
    }

    pub fn stress(&self) -> StressLevel {
        self.stress
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Same inputs under a different strategy
    pub fn with_method(&self, method: Method) -> Self {
        Self { method, ..*self }
    }
}

/// Whole years between `birth_date` and `on_date`
pub fn age_on(birth_date: NaiveDate, on_date: NaiveDate) -> EnergyResult<u32> {
    if birth_date > on_date {
        return Err(EnergyError::invalid(
            "birth_date",
            birth_date,
            format!("after {}", on_date),
        ));
    }

    let mut years = on_date.year() - birth_date.year();
    if (on_date.month(), on_date.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }

    Ok(years as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_activity_factors() {
        assert_eq!(ActivityLevel::Bedrest.factor(), 0.10);
        assert_eq!(ActivityLevel::Light.factor(), 0.20);
        assert_eq!(ActivityLevel::Moderate.factor(), 0.30);
        assert_eq!(ActivityLevel::Heavy.factor(), 0.45);
    }

    #[test]
    fn test_stress_factors_and_descriptions() {
        let factors: Vec<f64> = StressLevel::ALL.iter().map(|s| s.factor()).collect();
        assert_eq!(factors, vec![1.3, 1.4, 1.5, 1.6, 1.7]);
        for level in StressLevel::ALL {
            assert!(!level.description().is_empty());
        }
    }

    #[test]
    fn test_parse_levels() {
        assert_eq!(ActivityLevel::from_str("Bed-Rest").unwrap(), ActivityLevel::Bedrest);
        assert_eq!(ActivityLevel::from_str("HEAVY").unwrap(), ActivityLevel::Heavy);
        assert_eq!(StressLevel::from_str("very severe").unwrap(), StressLevel::VerySevere);
        assert_eq!(Gender::from_str("Perempuan").unwrap(), Gender::Female);
        assert_eq!(Method::from_str("quick").unwrap(), Method::QuickEstimate);
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        assert!(matches!(
            ActivityLevel::from_str("extreme"),
            Err(EnergyError::UnknownLevel { kind: "activity", .. })
        ));
        assert!(matches!(
            StressLevel::from_str("critical"),
            Err(EnergyError::UnknownLevel { kind: "stress", .. })
        ));
        assert!(matches!(Gender::from_str("x"), Err(EnergyError::InvalidInput { .. })));
    }

    #[test]
    fn test_age_on() {
        let birth = date(1980, 6, 15);
        assert_eq!(age_on(birth, date(2025, 6, 14)).unwrap(), 44);
        assert_eq!(age_on(birth, date(2025, 6, 15)).unwrap(), 45);
        assert_eq!(age_on(birth, birth).unwrap(), 0);
        assert!(age_on(date(2030, 1, 1), date(2025, 1, 1)).is_err());
    }

    #[test]
    fn test_with_method_keeps_inputs() {
        let s = AnthropometricSnapshot::new(
            170.0,
            70.0,
            45,
            Gender::Male,
            ActivityLevel::Light,
            StressLevel::None,
            Method::Stepped,
        );
        let q = s.with_method(Method::QuickEstimate);
        assert_eq!(q.method(), Method::QuickEstimate);
        assert_eq!(q.height_cm(), 170.0);
        assert_eq!(s.method(), Method::Stepped);
    }

    #[test]
    fn test_serialized_labels() {
        let json = serde_json::to_string(&StressLevel::VerySevere).unwrap();
        assert_eq!(json, "\"VERY_SEVERE\"");
        let json = serde_json::to_string(&Method::QuickEstimate).unwrap();
        assert_eq!(json, "\"QUICK_ESTIMATE\"");
    }
}
