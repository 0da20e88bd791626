use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::Entity;

/// Progress photo row; the binary lives in blob storage at `url`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressPhoto {
    pub id: String,
    pub student_id: String,
    pub url: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub photo_type: PhotoOrientation,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PhotoOrientation {
    Front,
    Back,
    Side,
}

impl std::fmt::Display for PhotoOrientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhotoOrientation::Front => write!(f, "front"),
            PhotoOrientation::Back => write!(f, "back"),
            PhotoOrientation::Side => write!(f, "side"),
        }
    }
}

impl std::str::FromStr for PhotoOrientation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "front" => Ok(PhotoOrientation::Front),
            "back" => Ok(PhotoOrientation::Back),
            "side" => Ok(PhotoOrientation::Side),
            _ => Err(anyhow::anyhow!("Invalid photo type: {}", s)),
        }
    }
}

impl ProgressPhoto {
    /// Recover the storage path (`{studentId}/{file}`) from the public URL
    pub fn storage_path(&self) -> Option<String> {
        let mut segments = self.url.trim_end_matches('/').rsplit('/');
        let file = segments.next().filter(|s| !s.is_empty())?;
        let student = segments.next().filter(|s| !s.is_empty())?;

        let file = urlencoding::decode(file).ok()?;
        let student = urlencoding::decode(student).ok()?;
        Some(format!("{}/{}", student, file))
    }
}

impl Entity for ProgressPhoto {
    fn id(&self) -> &str {
        &self.id
    }

    /// Most recent capture date first
    fn list_order(&self, other: &Self) -> Ordering {
        other.date.cmp(&self.date)
    }
}

/// A photo to upload: the binary plus the row metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoUpload {
    pub student_id: String,
    /// Original file name; its extension names the stored object
    pub file_name: String,
    pub bytes: Bytes,
    pub photo_type: PhotoOrientation,
    pub date: NaiveDate,
}

impl PhotoUpload {
    /// Photo captured today
    pub fn new(
        student_id: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Bytes>,
        photo_type: PhotoOrientation,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            file_name: file_name.into(),
            bytes: bytes.into(),
            photo_type,
            date: Utc::now().date_naive(),
        }
    }

    /// Lower-cased file extension, `bin` when there is none or it holds
    /// anything but ASCII letters and digits
    pub fn extension(&self) -> String {
        match self.file_name.rsplit_once('.') {
            Some((stem, ext))
                if !stem.is_empty()
                    && !ext.is_empty()
                    && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                ext.to_ascii_lowercase()
            }
            _ => "bin".to_string(),
        }
    }

    /// Content type derived from the extension
    pub fn content_type(&self) -> mime::Mime {
        match self.extension().as_str() {
            "jpg" | "jpeg" => mime::IMAGE_JPEG,
            "png" => mime::IMAGE_PNG,
            "gif" => mime::IMAGE_GIF,
            "bmp" => mime::IMAGE_BMP,
            _ => mime::APPLICATION_OCTET_STREAM,
        }
    }
}

/// Partial update of a photo's metadata
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PhotoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub photo_type: Option<PhotoOrientation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(url: &str) -> ProgressPhoto {
        ProgressPhoto {
            id: "ph1".to_string(),
            student_id: "s1".to_string(),
            url: url.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            photo_type: PhotoOrientation::Front,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_storage_path_from_public_url() {
        let photo = photo(
            "https://x.supabase.co/storage/v1/object/public/progress-photos/s%201/1709251200000.jpg",
        );
        assert_eq!(photo.storage_path().as_deref(), Some("s 1/1709251200000.jpg"));
        assert_eq!(self::photo("no-slashes").storage_path(), None);
    }

    #[test]
    fn test_upload_extension_and_type() {
        let upload = PhotoUpload::new("s1", "Front.JPG", vec![1u8, 2, 3], PhotoOrientation::Front);
        assert_eq!(upload.extension(), "jpg");
        assert_eq!(upload.content_type(), mime::IMAGE_JPEG);

        let upload = PhotoUpload::new("s1", "noext", Vec::<u8>::new(), PhotoOrientation::Side);
        assert_eq!(upload.extension(), "bin");
        assert_eq!(upload.content_type(), mime::APPLICATION_OCTET_STREAM);
    }

    #[test]
    fn test_unsafe_extension_falls_back_to_bin() {
        for name in ["a.b/c", "shot.jp g", "x.png?", "evil.%2e"] {
            let upload = PhotoUpload::new("s1", name, Vec::<u8>::new(), PhotoOrientation::Back);
            assert_eq!(upload.extension(), "bin", "{}", name);
        }

        let upload = PhotoUpload::new("s1", "dir.v2/photo.PNG", Vec::<u8>::new(), PhotoOrientation::Back);
        assert_eq!(upload.extension(), "png");
    }

    #[test]
    fn test_type_field_wire_name() {
        let json = serde_json::to_value(PhotoPatch {
            photo_type: Some(PhotoOrientation::Back),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "type": "back" }));
    }
}
