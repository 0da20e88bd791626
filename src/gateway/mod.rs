//! Per-entity gateways: each operation becomes exactly one backend
//! round trip (two for the photo upload/delete protocol) and returns the
//! decoded record(s). Gateways own no state beyond the shared client.

use serde::Serialize;

use crate::api::ApiResult;
use crate::models::Entity;

mod assessments;
mod exercises;
mod photos;
mod students;
mod workout_plans;

pub use assessments::AssessmentGateway;
pub use exercises::ExerciseGateway;
pub use photos::{PhotoGateway, PHOTO_BUCKET};
pub use students::StudentGateway;
pub use workout_plans::WorkoutPlanGateway;

/// Student-scoped collections are keyed by the student's id
pub type StudentId = String;

/// CRUD contract shared by every entity gateway.
///
/// `list` returns records in the entity's natural order (see
/// [`Entity::list_order`]); the cache relies on that to insert new records
/// without re-sorting.
#[allow(async_fn_in_trait)]
pub trait Repository {
    type Record: Entity;
    /// Fields for `create`
    type Draft;
    /// Partial fields for `update`
    type Patch;
    /// Subset key; `()` for collections that are not scoped
    type Scope: Clone + PartialEq + std::fmt::Debug;

    async fn list(&self, scope: &Self::Scope) -> ApiResult<Vec<Self::Record>>;

    async fn get(&self, id: &str) -> ApiResult<Option<Self::Record>>;

    async fn create(&self, draft: &Self::Draft) -> ApiResult<Self::Record>;

    async fn update(&self, id: &str, patch: &Self::Patch) -> ApiResult<Self::Record>;

    async fn delete(&self, id: &str) -> ApiResult<()>;

    /// Whether `record` belongs to the collection identified by `scope`
    fn in_scope(_scope: &Self::Scope, _record: &Self::Record) -> bool {
        true
    }
}

/// A row attributed to the signed-in trainer
#[derive(Serialize)]
struct Owned<'a, T: Serialize> {
    #[serde(flatten)]
    fields: &'a T,
    user_id: &'a str,
}

/// A patch stamped with the modification time
#[derive(Serialize)]
struct Stamped<'a, T: Serialize> {
    #[serde(flatten)]
    patch: &'a T,
    updated_at: chrono::DateTime<chrono::Utc>,
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}
