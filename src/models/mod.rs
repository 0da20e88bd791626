use std::cmp::Ordering;

pub mod assessment;
pub mod exercise;
pub mod progress_photo;
pub mod student;
pub mod workout_plan;

pub use assessment::{Assessment, AssessmentPatch, Measurements, NewAssessment};
pub use exercise::{Difficulty, Exercise, ExercisePatch, NewExercise};
pub use progress_photo::{PhotoOrientation, PhotoPatch, PhotoUpload, ProgressPhoto};
pub use student::{NewStudent, Plan, Student, StudentPatch};
pub use workout_plan::{NewWorkoutExercise, NewWorkoutPlan, WorkoutExercise, WorkoutPlan, WorkoutPlanPatch};

/// A backend-owned record the client holds a disposable copy of
pub trait Entity: Clone {
    /// Server-assigned identity
    fn id(&self) -> &str;

    /// The order the gateway lists records in. `Less` means `self` is
    /// listed before `other`.
    fn list_order(&self, other: &Self) -> Ordering;
}
