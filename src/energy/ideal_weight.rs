//! Ideal body weight (BBI, Berat Badan Ideal)

use super::snapshot::Gender;

/// Height (cm) below which men use unmodified height minus 100
pub const MALE_PETITE_HEIGHT_CM: f64 = 150.0;
/// Height (cm) below which women use unmodified height minus 100
pub const FEMALE_PETITE_HEIGHT_CM: f64 = 160.0;

/// Ideal body weight in kg, unrounded.
///
/// Petite patients get `height - 100`; everyone else gets a further 10%
/// reduction of that difference.
pub fn bbi(height_cm: f64, gender: Gender) -> f64 {
    let d = height_cm - 100.0;

    let petite = match gender {
        Gender::Male => height_cm < MALE_PETITE_HEIGHT_CM,
        Gender::Female => height_cm < FEMALE_PETITE_HEIGHT_CM,
    };

    if petite {
        d
    } else {
        d - 0.1 * d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::round_to_tenth;

    #[test]
    fn test_male_standard_height() {
        assert!((bbi(170.0, Gender::Male) - 63.0).abs() < 1e-9);
    }

    #[test]
    fn test_female_petite_branch() {
        assert_eq!(bbi(155.0, Gender::Female), 55.0);
    }

    #[test]
    fn test_thresholds_differ_by_gender() {
        // 155 cm is petite for women but not for men
        assert_eq!(bbi(155.0, Gender::Female), 55.0);
        assert!((bbi(155.0, Gender::Male) - 49.5).abs() < 1e-9);

        // threshold values themselves take the 10% reduction
        assert!((bbi(150.0, Gender::Male) - 45.0).abs() < 1e-9);
        assert!((bbi(160.0, Gender::Female) - 54.0).abs() < 1e-9);
        assert_eq!(bbi(149.0, Gender::Male), 49.0);
    }

    #[test]
    fn test_display_rounding() {
        assert_eq!(round_to_tenth(bbi(173.0, Gender::Male)), 65.7);
    }
}
