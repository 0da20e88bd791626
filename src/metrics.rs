//! Derived display values: age, BMI, assessment progress and pt-BR formatting.

use chrono::{Datelike, NaiveDate};

use crate::models::Assessment;

/// Whole years between `birth` and `today`, one less when the birthday has
/// not yet come round this year
pub fn age(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

/// weight / height(m)², rounded to one decimal. `None` for a non-positive height.
pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if height_cm <= 0.0 || !height_cm.is_finite() || !weight_kg.is_finite() {
        return None;
    }

    let height_m = height_cm / 100.0;
    let raw = weight_kg / (height_m * height_m);
    Some((raw * 10.0).round() / 10.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Change between the two most recent assessments, sign preserved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressDelta {
    pub weight: f64,
    pub body_fat: f64,
    pub muscle_mass: f64,
}

/// Latest minus previous, for a list in gateway order (newest first).
/// `None` with fewer than two assessments.
pub fn progress(assessments: &[Assessment]) -> Option<ProgressDelta> {
    let [latest, previous, ..] = assessments else {
        return None;
    };

    Some(ProgressDelta {
        weight: latest.weight - previous.weight,
        body_fat: latest.body_fat - previous.body_fat,
        muscle_mass: latest.muscle_mass - previous.muscle_mass,
    })
}

/// Brazilian real, e.g. `R$ 1.234,56`
pub fn format_brl(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let units = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, fraction)
}

/// `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// A signed delta with an explicit `+` for gains and for no change
pub fn format_delta(value: f64, unit: &str) -> String {
    if value >= 0.0 {
        // abs() keeps a negative zero from printing as "+-0.0"
        format!("+{:.1}{}", value.abs(), unit)
    } else {
        format!("{:.1}{}", value, unit)
    }
}
