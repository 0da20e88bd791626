use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use super::{eq, Repository, StudentId};
use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::{PhotoOrientation, PhotoPatch, PhotoUpload, ProgressPhoto};

const TABLE: &str = "progress_photos";

/// Storage bucket holding the photo binaries
pub const PHOTO_BUCKET: &str = "progress-photos";

#[derive(Serialize)]
struct PhotoRow<'a> {
    student_id: &'a str,
    url: &'a str,
    date: chrono::NaiveDate,
    #[serde(rename = "type")]
    photo_type: PhotoOrientation,
}

/// Progress photos of one student: a blob in storage plus a metadata row
#[derive(Clone)]
pub struct PhotoGateway {
    api: Arc<ApiClient>,
}

impl PhotoGateway {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Object path for a new upload: `{studentId}/{millis}.{ext}`
    fn object_path(upload: &PhotoUpload) -> String {
        format!(
            "{}/{}.{}",
            upload.student_id,
            Utc::now().timestamp_millis(),
            upload.extension()
        )
    }
}

impl Repository for PhotoGateway {
    type Record = ProgressPhoto;
    type Draft = PhotoUpload;
    type Patch = PhotoPatch;
    type Scope = StudentId;

    async fn list(&self, student_id: &StudentId) -> ApiResult<Vec<ProgressPhoto>> {
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

    async fn get(&self, id: &str) -> ApiResult<Option<ProgressPhoto>> {
        self.api
            .select_one(TABLE, &[("select", "*".to_string()), ("id", eq(id))])
            .await
    }

    /// Upload the binary, then record its public URL
    async fn create(&self, upload: &PhotoUpload) -> ApiResult<ProgressPhoto> {
        self.api.current_user().await?;

        let path = Self::object_path(upload);
        self.api
            .upload(
                PHOTO_BUCKET,
                &path,
                upload.bytes.clone(),
                upload.content_type().as_ref(),
            )
            .await?;

        let url = self.api.public_url(PHOTO_BUCKET, &path);
        let photo: ProgressPhoto = self
            .api
            .insert(
                TABLE,
                &PhotoRow {
                    student_id: &upload.student_id,
                    url: &url,
                    date: upload.date,
                    photo_type: upload.photo_type,
                },
            )
            .await?;

        tracing::info!("Stored photo {} at {}", photo.id, path);
        Ok(photo)
    }

    async fn update(&self, id: &str, patch: &PhotoPatch) -> ApiResult<ProgressPhoto> {
        self.api.update(TABLE, id, patch).await
    }

    /// Remove the blob, then the row. A blob that cannot be removed does not
    /// block the row deletion.
    async fn delete(&self, id: &str) -> ApiResult<()> {
        let photo = self
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("{} {}", TABLE, id)))?;

        match photo.storage_path() {
            Some(path) => {
                if let Err(e) = self.api.remove(PHOTO_BUCKET, &[path.clone()]).await {
                    tracing::warn!("Failed to remove {} from storage: {}", path, e);
                }
            }
            None => tracing::warn!("Photo {} has no storage path in {}", id, photo.url),
        }

        self.api.delete(TABLE, id).await?;
        tracing::info!("Deleted photo {}", id);
        Ok(())
    }

    fn in_scope(student_id: &StudentId, record: &ProgressPhoto) -> bool {
        &record.student_id == student_id
    }
}
