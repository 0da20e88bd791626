use std::sync::Arc;

use super::{eq, Repository, StudentId};
use crate::api::{ApiClient, ApiResult};
use crate::models::{Assessment, AssessmentPatch, NewAssessment};

const TABLE: &str = "assessments";

/// Assessments of one student, most recent date first
#[derive(Clone)]
pub struct AssessmentGateway {
    api: Arc<ApiClient>,
}

impl AssessmentGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

impl Repository for AssessmentGateway {
    type Record = Assessment;
    type Draft = NewAssessment;
    type Patch = AssessmentPatch;
    type Scope = StudentId;

    async fn list(&self, student_id: &StudentId) -> ApiResult<Vec<Assessment>> {
        self.api
            .select(
                TABLE,
                &[
                    ("select", "*".to_string()),
                    ("student_id", eq(student_id)),
                    ("order", "date.desc".to_string()),
                ],
            )
            .await
    }

    async fn get(&self, id: &str) -> ApiResult<Option<Assessment>> {
        self.api
            .select_one(TABLE, &[("select", "*".to_string()), ("id", eq(id))])
            .await
    }

    async fn create(&self, draft: &NewAssessment) -> ApiResult<Assessment> {
        let assessment: Assessment = self.api.insert(TABLE, draft).await?;
        tracing::info!(
            "Created assessment {} for student {}",
            assessment.id,
            assessment.student_id
        );
        Ok(assessment)
    }

    async fn update(&self, id: &str, patch: &AssessmentPatch) -> ApiResult<Assessment> {
        let assessment: Assessment = self.api.update(TABLE, id, patch).await?;
        tracing::info!("Updated assessment {}", id);
        Ok(assessment)
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.api.delete(TABLE, id).await?;
        tracing::info!("Deleted assessment {}", id);
        Ok(())
    }

    fn in_scope(student_id: &StudentId, record: &Assessment) -> bool {
        &record.student_id == student_id
    }
}
