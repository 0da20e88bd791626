use chrono::Utc;
use std::sync::Arc;

use super::{eq, Owned, Repository, Stamped};
use crate::api::{ApiClient, ApiResult};
use crate::models::{NewStudent, Student, StudentPatch};

const TABLE: &str = "students";

/// Students of the signed-in trainer, newest first
#[derive(Clone)]
pub struct StudentGateway {
    api: Arc<ApiClient>,
}

impl StudentGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

impl Repository for StudentGateway {
    type Record = Student;
    type Draft = NewStudent;
    type Patch = StudentPatch;
    type Scope = ();

    async fn list(&self, _scope: &()) -> ApiResult<Vec<Student>> {
        self.api
            .select(
                TABLE,
                &[
                    ("select", "*".to_string()),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await
    }

    async fn get(&self, id: &str) -> ApiResult<Option<Student>> {
        self.api
            .select_one(TABLE, &[("select", "*".to_string()), ("id", eq(id))])
            .await
    }

    async fn create(&self, draft: &NewStudent) -> ApiResult<Student> {
        let user = self.api.current_user().await?;

        let student: Student = self
            .api
            .insert(
                TABLE,
                &Owned {
                    fields: draft,
                    user_id: &user.id,
                },
            )
            .await?;

        tracing::info!("Created student {}", student.id);
        Ok(student)
    }

    async fn update(&self, id: &str, patch: &StudentPatch) -> ApiResult<Student> {
        let student: Student = self
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

        tracing::info!("Updated student {}", id);
        Ok(student)
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.api.delete(TABLE, id).await?;
        tracing::info!("Deleted student {}", id);
        Ok(())
    }
}
