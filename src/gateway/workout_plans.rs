use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use super::{eq, Repository, Stamped, StudentId};
use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::{NewWorkoutExercise, NewWorkoutPlan, WorkoutPlan, WorkoutPlanPatch};

const TABLE: &str = "workout_plans";
const SLOTS_TABLE: &str = "workout_exercises";
const SELECT_WITH_EXERCISES: &str = "*,workout_exercises(*,exercises(*))";

/// Join row linking a plan to one exercise
#[derive(Serialize)]
struct Slot<'a> {
    workout_plan_id: &'a str,
    #[serde(flatten)]
    fields: &'a NewWorkoutExercise,
}

/// Workout plans of one student with their exercises embedded
#[derive(Clone)]
pub struct WorkoutPlanGateway {
    api: Arc<ApiClient>,
}

impl WorkoutPlanGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    async fn insert_slots(&self, plan_id: &str, slots: &[NewWorkoutExercise]) -> ApiResult<()> {
        if slots.is_empty() {
            return Ok(());
        }

        let rows: Vec<Slot> = slots
            .iter()
            .map(|fields| Slot {
                workout_plan_id: plan_id,
                fields,
            })
            .collect();

        let _: Vec<serde_json::Value> = self.api.insert_rows(SLOTS_TABLE, &rows).await?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> ApiResult<WorkoutPlan> {
        self.get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("{} {}", TABLE, id)))
    }
}

impl Repository for WorkoutPlanGateway {
    type Record = WorkoutPlan;
    type Draft = NewWorkoutPlan;
    type Patch = WorkoutPlanPatch;
    type Scope = StudentId;

    async fn list(&self, student_id: &StudentId) -> ApiResult<Vec<WorkoutPlan>> {
        let mut plans: Vec<WorkoutPlan> = self
            .api
            .select(
                TABLE,
                &[
                    ("select", SELECT_WITH_EXERCISES.to_string()),
                    ("student_id", eq(student_id)),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await?;

        plans.iter_mut().for_each(WorkoutPlan::sort_exercises);
        Ok(plans)
    }

    async fn get(&self, id: &str) -> ApiResult<Option<WorkoutPlan>> {
        let plan: Option<WorkoutPlan> = self
            .api
            .select_one(
                TABLE,
                &[
                    ("select", SELECT_WITH_EXERCISES.to_string()),
                    ("id", eq(id)),
                ],
            )
            .await?;

        Ok(plan.map(|mut plan| {
            plan.sort_exercises();
            plan
        }))
    }

    async fn create(&self, draft: &NewWorkoutPlan) -> ApiResult<WorkoutPlan> {
        let plan: WorkoutPlan = self.api.insert(TABLE, draft).await?;
        self.insert_slots(&plan.id, &draft.exercises).await?;

        tracing::info!(
            "Created workout plan {} with {} exercises",
            plan.id,
            draft.exercises.len()
        );

        // Re-read so the embedded exercises come back joined
        self.fetch(&plan.id).await
    }

    async fn update(&self, id: &str, patch: &WorkoutPlanPatch) -> ApiResult<WorkoutPlan> {
        let _: WorkoutPlan = self
            .api
            .update(
                TABLE,
                id,
                &Stamped {
                    patch,
                    updated_at: Utc::now(),
                },
            )
            .await?;

        if let Some(slots) = &patch.exercises {
            self.api.delete_where(SLOTS_TABLE, "workout_plan_id", id).await?;
            self.insert_slots(id, slots).await?;
        }

        tracing::info!("Updated workout plan {}", id);
        self.fetch(id).await
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.api.delete(TABLE, id).await?;
        tracing::info!("Deleted workout plan {}", id);
        Ok(())
    }

    fn in_scope(student_id: &StudentId, record: &WorkoutPlan) -> bool {
        &record.student_id == student_id
    }
}
