use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeImage {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// URL path under which the blob is served back, e.g. `/uploads/....png`.
    pub image_url: String,
    pub uploaded_by: i64,
    pub created_at: DateTime<Utc>,
}

/// A parsed theme upload: the metadata fields plus the image bytes exactly
/// as they arrived in the multipart request.
#[derive(Debug)]
pub struct ThemeUpload {
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct ThemeImageResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub uploaded_by: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ThemeImage> for ThemeImageResponse {
    fn from(theme: ThemeImage) -> Self {
        Self {
            id: theme.id,
            title: theme.title,
            description: theme.description,
            image_url: theme.image_url,
            uploaded_by: theme.uploaded_by,
            created_at: theme.created_at,
        }
    }
}
