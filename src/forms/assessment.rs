use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;

use super::{number_text, parse_date, parse_number, FormErrors, FormField, FormModel};
use crate::models::{Assessment, AssessmentPatch, Measurements, NewAssessment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeasurementField {
    Chest,
    Waist,
    Hip,
    Arm,
    Thigh,
}

impl MeasurementField {
    pub const ALL: [MeasurementField; 5] = [
        MeasurementField::Chest,
        MeasurementField::Waist,
        MeasurementField::Hip,
        MeasurementField::Arm,
        MeasurementField::Thigh,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MeasurementField::Chest => "chest",
            MeasurementField::Waist => "waist",
            MeasurementField::Hip => "hip",
            MeasurementField::Arm => "arm",
            MeasurementField::Thigh => "thigh",
        }
    }

    fn value(&self, measurements: &Measurements) -> f64 {
        match self {
            MeasurementField::Chest => measurements.chest,
            MeasurementField::Waist => measurements.waist,
            MeasurementField::Hip => measurements.hip,
            MeasurementField::Arm => measurements.arm,
            MeasurementField::Thigh => measurements.thigh,
        }
    }

    fn slot<'a>(&self, measurements: &'a mut Measurements) -> &'a mut f64 {
        match self {
            MeasurementField::Chest => &mut measurements.chest,
            MeasurementField::Waist => &mut measurements.waist,
            MeasurementField::Hip => &mut measurements.hip,
            MeasurementField::Arm => &mut measurements.arm,
            MeasurementField::Thigh => &mut measurements.thigh,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssessmentField {
    Date,
    Weight,
    BodyFat,
    MuscleMass,
    Measurement(MeasurementField),
    Notes,
}

impl FormField for AssessmentField {
    const ALL: &'static [Self] = &[
        AssessmentField::Date,
        AssessmentField::Weight,
        AssessmentField::BodyFat,
        AssessmentField::MuscleMass,
        AssessmentField::Measurement(MeasurementField::Chest),
        AssessmentField::Measurement(MeasurementField::Waist),
        AssessmentField::Measurement(MeasurementField::Hip),
        AssessmentField::Measurement(MeasurementField::Arm),
        AssessmentField::Measurement(MeasurementField::Thigh),
        AssessmentField::Notes,
    ];

    fn key(&self) -> &'static str {
        match self {
            AssessmentField::Date => "date",
            AssessmentField::Weight => "weight",
            AssessmentField::BodyFat => "body_fat",
            AssessmentField::MuscleMass => "muscle_mass",
            AssessmentField::Measurement(m) => m.key(),
            AssessmentField::Notes => "notes",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            AssessmentField::Date => "Date",
            AssessmentField::Weight => "Weight (kg)",
            AssessmentField::BodyFat => "Body fat (%)",
            AssessmentField::MuscleMass => "Muscle mass (kg)",
            AssessmentField::Measurement(MeasurementField::Chest) => "Chest (cm)",
            AssessmentField::Measurement(MeasurementField::Waist) => "Waist (cm)",
            AssessmentField::Measurement(MeasurementField::Hip) => "Hip (cm)",
            AssessmentField::Measurement(MeasurementField::Arm) => "Arm (cm)",
            AssessmentField::Measurement(MeasurementField::Thigh) => "Thigh (cm)",
            AssessmentField::Notes => "Notes",
        }
    }
}

/// Assessment errors: top-level fields plus a nested map for measurements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssessmentErrors {
    pub fields: BTreeMap<AssessmentField, String>,
    pub measurements: BTreeMap<MeasurementField, String>,
}

impl FormErrors<AssessmentField> for AssessmentErrors {
    fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.measurements.is_empty()
    }

    fn message(&self, field: AssessmentField) -> Option<&str> {
        match field {
            AssessmentField::Measurement(m) => self.measurements.get(&m),
            other => self.fields.get(&other),
        }
        .map(String::as_str)
    }

    fn clear(&mut self, field: AssessmentField) {
        match field {
            AssessmentField::Measurement(m) => {
                self.measurements.remove(&m);
            }
            other => {
                self.fields.remove(&other);
            }
        }
    }

    fn entries(&self) -> Vec<(String, String)> {
        let top = self
            .fields
            .iter()
            .map(|(field, message)| (field.key().to_string(), message.clone()));
        let nested = self
            .measurements
            .iter()
            .map(|(m, message)| (format!("measurements.{}", m.key()), message.clone()));
        top.chain(nested).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssessmentInput {
    pub student_id: String,
    pub date: String,
    pub weight: f64,
    pub body_fat: f64,
    pub muscle_mass: f64,
    pub measurements: Measurements,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AssessmentForm;

impl AssessmentForm {
    /// New-assessment draft for one student, dated today
    pub fn for_student(student_id: &str) -> AssessmentInput {
        AssessmentInput {
            student_id: student_id.to_string(),
            ..Self::defaults()
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl FormModel for AssessmentForm {
    type Field = AssessmentField;
    type Record = Assessment;
    type Input = AssessmentInput;
    type Draft = NewAssessment;
    type Patch = AssessmentPatch;
    type Errors = AssessmentErrors;

    fn defaults() -> AssessmentInput {
        AssessmentInput {
            date: today().format("%Y-%m-%d").to_string(),
            ..Default::default()
        }
    }

    fn from_record(assessment: &Assessment) -> AssessmentInput {
        AssessmentInput {
            student_id: assessment.student_id.clone(),
            date: assessment.date.format("%Y-%m-%d").to_string(),
            weight: assessment.weight,
            body_fat: assessment.body_fat,
            muscle_mass: assessment.muscle_mass,
            measurements: assessment.measurements,
            notes: assessment.notes.clone(),
        }
    }

    fn set_field(input: &mut AssessmentInput, field: AssessmentField, raw: &str) {
        match field {
            AssessmentField::Date => input.date = raw.to_string(),
            AssessmentField::Weight => input.weight = parse_number(raw),
            AssessmentField::BodyFat => input.body_fat = parse_number(raw),
            AssessmentField::MuscleMass => input.muscle_mass = parse_number(raw),
            AssessmentField::Measurement(m) => *m.slot(&mut input.measurements) = parse_number(raw),
            AssessmentField::Notes => input.notes = raw.to_string(),
        }
    }

    fn field_text(input: &AssessmentInput, field: AssessmentField) -> String {
        match field {
            AssessmentField::Date => input.date.clone(),
            AssessmentField::Weight => number_text(input.weight),
            AssessmentField::BodyFat => number_text(input.body_fat),
            AssessmentField::MuscleMass => number_text(input.muscle_mass),
            AssessmentField::Measurement(m) => number_text(m.value(&input.measurements)),
            AssessmentField::Notes => input.notes.clone(),
        }
    }

    fn validate(input: &AssessmentInput) -> Result<NewAssessment, AssessmentErrors> {
        let mut errors = AssessmentErrors::default();

        let date = if input.date.trim().is_empty() {
            errors.fields.insert(AssessmentField::Date, "Date is required".to_string());
            None
        } else {
            let parsed = parse_date(&input.date);
            if parsed.is_none() {
                errors.fields.insert(AssessmentField::Date, "Invalid date".to_string());
            }
            parsed
        };

        if input.weight <= 0.0 {
            errors
                .fields
                .insert(AssessmentField::Weight, "Weight must be greater than 0".to_string());
        }

        if !(0.0..=100.0).contains(&input.body_fat) {
            errors.fields.insert(
                AssessmentField::BodyFat,
                "Body fat must be between 0 and 100".to_string(),
            );
        }

        if input.muscle_mass < 0.0 {
            errors.fields.insert(
                AssessmentField::MuscleMass,
                "Muscle mass must be 0 or more".to_string(),
            );
        }

        for m in MeasurementField::ALL {
            if m.value(&input.measurements) < 0.0 {
                errors
                    .measurements
                    .insert(m, "Measurement must be 0 or more".to_string());
            }
        }

        let date = match date {
            Some(date) if errors.is_empty() => date,
            _ => return Err(errors),
        };

        Ok(NewAssessment {
            student_id: input.student_id.clone(),
            date,
            weight: input.weight,
            body_fat: input.body_fat,
            muscle_mass: input.muscle_mass,
            measurements: input.measurements,
            notes: input.notes.trim().to_string(),
        })
    }

    fn patch(draft: &NewAssessment) -> AssessmentPatch {
        AssessmentPatch::from(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AssessmentInput {
        AssessmentInput {
            student_id: "s1".to_string(),
            date: "2024-03-15".to_string(),
            weight: 65.8,
            body_fat: 24.0,
            muscle_mass: 28.5,
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_to_today() {
        let input = AssessmentForm::for_student("s1");
        assert_eq!(parse_date(&input.date), Some(today()));
        assert_eq!(input.weight, 0.0);
    }

    #[test]
    fn test_measurement_errors_are_nested() {
        let mut input = valid();
        input.measurements.waist = -1.0;

        let errors = AssessmentForm::validate(&input).unwrap_err();
        assert!(errors.fields.is_empty());
        assert!(errors.measurements.contains_key(&MeasurementField::Waist));
        assert_eq!(
            errors.entries(),
            vec![(
                "measurements.waist".to_string(),
                "Measurement must be 0 or more".to_string()
            )]
        );
    }

    #[test]
    fn test_body_fat_bounds_are_inclusive() {
        let mut input = valid();
        input.body_fat = 0.0;
        assert!(AssessmentForm::validate(&input).is_ok());
        input.body_fat = 100.0;
        assert!(AssessmentForm::validate(&input).is_ok());
        input.body_fat = 100.1;
        assert!(AssessmentForm::validate(&input).is_err());
    }

    #[test]
    fn test_clear_targets_nested_field() {
        let mut errors = AssessmentErrors::default();
        errors.fields.insert(AssessmentField::Weight, "x".to_string());
        errors.measurements.insert(MeasurementField::Arm, "y".to_string());

        errors.clear(AssessmentField::Measurement(MeasurementField::Arm));
        assert!(errors.measurements.is_empty());
        assert_eq!(errors.message(AssessmentField::Weight), Some("x"));
    }
}
