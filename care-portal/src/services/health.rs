//! Basic health check: BMI and generalized advice.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BasicHealthInput {
    #[validate(range(min = 2, max = 120, message = "Age must be between 2 and 120"))]
    pub age: u32,

    #[validate(range(min = 2.0, max = 500.0, message = "Weight must be between 2 and 500 kg"))]
    pub weight_kg: f64,

    #[validate(range(min = 40.0, max = 272.0, message = "Height must be between 40 and 272 cm"))]
    pub height_cm: f64,
}

/// WHO adult BMI bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }

    fn advice(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => {
                "Your BMI is below the healthy range. Focus on nutrient-dense meals and consider talking to a doctor or dietitian."
            }
            BmiCategory::Normal => {
                "Your BMI is in the healthy range. Keep up a balanced diet and regular physical activity."
            }
            BmiCategory::Overweight => {
                "Your BMI is above the healthy range. Regular exercise and smaller, balanced portions can help."
            }
            BmiCategory::Obese => {
                "Your BMI is well above the healthy range, which raises the risk of several conditions. Please consult a doctor for personalized guidance."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BmiReport {
    /// Rounded to one decimal place.
    pub bmi: f64,
    pub category: BmiCategory,
    pub advice: Vec<&'static str>,
}

/// Compute BMI from validated input.
pub fn assess(input: &BasicHealthInput) -> BmiReport {
    let height_m = input.height_cm / 100.0;
    let raw = input.weight_kg / (height_m * height_m);
    let bmi = (raw * 10.0).round() / 10.0;
    let category = BmiCategory::from_bmi(bmi);

    let mut advice = vec![category.advice()];
    if input.age < 18 {
        advice.push(
            "For children and teenagers BMI is read against age and sex percentiles; ask a pediatrician to interpret it.",
        );
    } else if input.age >= 65 {
        advice.push(
            "For adults over 65 a slightly higher BMI can be acceptable; discuss your target with your doctor.",
        );
    }
    advice.push("This is general information, not a medical diagnosis.");

    BmiReport {
        bmi,
        category,
        advice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(age: u32, weight_kg: f64, height_cm: f64) -> BasicHealthInput {
        BasicHealthInput {
            age,
            weight_kg,
            height_cm,
        }
    }

    #[test]
    fn category_boundaries() {
        assert_eq!(BmiCategory::from_bmi(18.4), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(24.9), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obese);
    }

    #[test]
    fn computes_rounded_bmi() {
        let report = assess(&input(30, 70.0, 175.0));
        assert_eq!(report.bmi, 22.9);
        assert_eq!(report.category, BmiCategory::Normal);
        assert_eq!(report.advice.len(), 2);
    }

    #[test]
    fn age_specific_advice_is_added() {
        assert_eq!(assess(&input(12, 40.0, 150.0)).advice.len(), 3);
        assert_eq!(assess(&input(70, 80.0, 170.0)).advice.len(), 3);
    }

    #[test]
    fn out_of_range_input_fails_validation() {
        assert!(input(30, 70.0, 175.0).validate().is_ok());
        assert!(input(0, 70.0, 175.0).validate().is_err());
        assert!(input(30, 1.0, 175.0).validate().is_err());
        assert!(input(30, 70.0, 300.0).validate().is_err());
    }
}
