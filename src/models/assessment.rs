use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::Entity;

/// Physical assessment of one student
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assessment {
    pub id: String,
    pub student_id: String,
    pub date: NaiveDate,
    pub weight: f64,
    /// Percentage, 0-100
    pub body_fat: f64,
    pub muscle_mass: f64,
    #[serde(default)]
    pub measurements: Measurements,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Circumferences in centimetres
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Measurements {
    #[serde(default)]
    pub chest: f64,
    #[serde(default)]
    pub waist: f64,
    #[serde(default)]
    pub hip: f64,
    #[serde(default)]
    pub arm: f64,
    #[serde(default)]
    pub thigh: f64,
}

impl Entity for Assessment {
    fn id(&self) -> &str {
        &self.id
    }

    /// Most recent assessment date first
    fn list_order(&self, other: &Self) -> Ordering {
        other.date.cmp(&self.date)
    }
}

/// Fields supplied when creating an assessment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAssessment {
    pub student_id: String,
    pub date: NaiveDate,
    pub weight: f64,
    pub body_fat: f64,
    pub muscle_mass: f64,
    pub measurements: Measurements,
    pub notes: String,
}

/// Partial update; absent fields are left untouched server-side
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AssessmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle_mass: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Measurements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&NewAssessment> for AssessmentPatch {
    fn from(fields: &NewAssessment) -> Self {
        Self {
            date: Some(fields.date),
            weight: Some(fields.weight),
            body_fat: Some(fields.body_fat),
            muscle_mass: Some(fields.muscle_mass),
            measurements: Some(fields.measurements),
            notes: Some(fields.notes.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurements_default_when_missing() {
        let row = r#"{
            "id": "a1",
            "student_id": "s1",
            "date": "2024-03-15",
            "weight": 65.8,
            "body_fat": 24.5,
            "muscle_mass": 28.1,
            "created_at": "2024-03-15T09:00:00Z"
        }"#;
        let assessment: Assessment = serde_json::from_str(row).unwrap();

        assert_eq!(assessment.measurements, Measurements::default());
        assert!(assessment.notes.is_empty());
    }

    #[test]
    fn test_newer_dates_list_first() {
        let row = |id: &str, date: &str| Assessment {
            id: id.to_string(),
            student_id: "s1".to_string(),
            date: date.parse().unwrap(),
            weight: 60.0,
            body_fat: 20.0,
            muscle_mass: 25.0,
            measurements: Measurements::default(),
            notes: String::new(),
            created_at: Utc::now(),
        };

        let march = row("a1", "2024-03-15");
        let february = row("a2", "2024-02-15");
        assert_eq!(march.list_order(&february), Ordering::Less);
    }
}
