use std::sync::Arc;

use super::{eq, Owned, Repository};
use crate::api::{ApiClient, ApiResult};
use crate::models::{Entity, Exercise, ExercisePatch, NewExercise};

const TABLE: &str = "exercises";

/// Exercise library, alphabetical
#[derive(Clone)]
pub struct ExerciseGateway {
    api: Arc<ApiClient>,
}

impl ExerciseGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Exercises for one muscle group, alphabetical
    pub async fn list_by_muscle_group(&self, muscle_group: &str) -> ApiResult<Vec<Exercise>> {
        self.api
            .select(
                TABLE,
                &[
                    ("select", "*".to_string()),
                    ("muscle_group", eq(muscle_group)),
                    ("order", "name.asc".to_string()),
                ],
            )
            .await
            .map(alphabetical)
    }
}

/// Re-sort with [`Entity::list_order`] so the cache inserts against the
/// same order the list came back in, whatever the server collation.
fn alphabetical(mut exercises: Vec<Exercise>) -> Vec<Exercise> {
    exercises.sort_by(|a, b| a.list_order(b));
    exercises
}

impl Repository for ExerciseGateway {
    type Record = Exercise;
    type Draft = NewExercise;
    type Patch = ExercisePatch;
    type Scope = ();

    async fn list(&self, _scope: &()) -> ApiResult<Vec<Exercise>> {
        self.api
            .select(
                TABLE,
                &[
                    ("select", "*".to_string()),
                    ("order", "name.asc".to_string()),
                ],
            )
            .await
            .map(alphabetical)
    }

    async fn get(&self, id: &str) -> ApiResult<Option<Exercise>> {
        self.api
            .select_one(TABLE, &[("select", "*".to_string()), ("id", eq(id))])
            .await
    }

    async fn create(&self, draft: &NewExercise) -> ApiResult<Exercise> {
        let user = self.api.current_user().await?;

        let exercise: Exercise = self
            .api
            .insert(
                TABLE,
                &Owned {
                    fields: draft,
                    user_id: &user.id,
                },
            )
            .await?;

        tracing::info!("Created exercise {} ({})", exercise.name, exercise.id);
        Ok(exercise)
    }

    async fn update(&self, id: &str, patch: &ExercisePatch) -> ApiResult<Exercise> {
        let exercise: Exercise = self.api.update(TABLE, id, patch).await?;
        tracing::info!("Updated exercise {}", id);
        Ok(exercise)
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.api.delete(TABLE, id).await?;
        tracing::info!("Deleted exercise {}", id);
        Ok(())
    }
}
