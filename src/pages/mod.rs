//! View state for each page: search text, filters, selection and the
//! derived values shown next to a list. Nothing here talks to the backend.

pub mod assessments;
pub mod exercises;
pub mod students;

pub use assessments::{AssessmentsView, ChartPoint};
pub use exercises::{DifficultyFilter, ExercisesPage};
pub use students::{PlanCounts, StudentsPage, Tab};

/// Case-insensitive substring match; an empty needle matches everything
pub(crate) fn matches(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
