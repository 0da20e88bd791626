use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::{Entity, Exercise};

/// Training plan assigned to a student
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutPlan {
    pub id: String,
    pub student_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Join rows embedded by the list query
    #[serde(rename = "workout_exercises", default)]
    pub exercises: Vec<WorkoutExercise>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One exercise slot inside a plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutExercise {
    pub id: String,
    pub workout_plan_id: String,
    pub exercise_id: String,
    pub sets: u32,
    /// Free text such as "8-12"
    pub reps: String,
    #[serde(default)]
    pub weight: f64,
    /// Seconds
    #[serde(default)]
    pub rest_time: u32,
    #[serde(default)]
    pub notes: String,
    pub order_index: u32,
    #[serde(rename = "exercises", default, skip_serializing_if = "Option::is_none")]
    pub exercise: Option<Exercise>,
}

impl WorkoutPlan {
    /// Put the join rows in their stored order
    pub fn sort_exercises(&mut self) {
        self.exercises.sort_by_key(|slot| slot.order_index);
    }
}

impl Entity for WorkoutPlan {
    fn id(&self) -> &str {
        &self.id
    }

    /// Newest first
    fn list_order(&self, other: &Self) -> Ordering {
        other.created_at.cmp(&self.created_at)
    }
}

/// Fields supplied when creating a plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewWorkoutPlan {
    pub student_id: String,
    pub name: String,
    pub description: String,
    #[serde(skip)]
    pub exercises: Vec<NewWorkoutExercise>,
}

/// One exercise slot supplied when creating or replacing a plan's exercises
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewWorkoutExercise {
    pub exercise_id: String,
    pub sets: u32,
    pub reps: String,
    pub weight: f64,
    pub rest_time: u32,
    pub notes: String,
    pub order_index: u32,
}

/// Partial update. `exercises`, when present, replaces every slot of the plan.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct WorkoutPlanPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip)]
    pub exercises: Option<Vec<NewWorkoutExercise>>,
}
