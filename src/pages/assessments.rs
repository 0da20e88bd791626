use chrono::NaiveDate;

use crate::metrics::{self, ProgressDelta};
use crate::models::Assessment;

/// One point of the weight/body-fat chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub weight: f64,
    pub body_fat: f64,
    pub muscle_mass: f64,
}

/// Derived values over one student's assessments, newest first
#[derive(Debug, Clone, Copy)]
pub struct AssessmentsView<'a> {
    assessments: &'a [Assessment],
}

impl<'a> AssessmentsView<'a> {
    pub fn new(assessments: &'a [Assessment]) -> Self {
        Self { assessments }
    }

    pub fn latest(&self) -> Option<&'a Assessment> {
        self.assessments.first()
    }

    pub fn progress(&self) -> Option<ProgressDelta> {
        metrics::progress(self.assessments)
    }

    /// Chart series, oldest first
    pub fn chart_series(&self) -> Vec<ChartPoint> {
        self.assessments
            .iter()
            .rev()
            .map(|a| ChartPoint {
                date: a.date,
                weight: a.weight,
                body_fat: a.body_fat,
                muscle_mass: a.muscle_mass,
            })
            .collect()
    }
}
