use crate::data::theme_repository::ThemeRepository;
use crate::domain::theme::{ThemeImageResponse, ThemeUpload};
use crate::domain::DomainError;
use crate::infrastructure::jwt::Claims;
use crate::infrastructure::storage::{unique_filename, BlobStore};
use std::path::Path;
use std::sync::Arc;

/// Upper bound on an uploaded image, 5 MiB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted image formats, matched against both the file extension and the
/// MIME subtype. A file passing only one of the two checks is rejected.
const ALLOWED_IMAGE_TYPES: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

pub struct ThemeService {
    theme_repo: Arc<dyn ThemeRepository + Send + Sync>,
    blob_store: Arc<dyn BlobStore + Send + Sync>,
}

impl ThemeService {
    pub fn new(
        theme_repo: Arc<dyn ThemeRepository + Send + Sync>,
        blob_store: Arc<dyn BlobStore + Send + Sync>,
    ) -> Self {
        Self {
            theme_repo,
            blob_store,
        }
    }

    pub async fn create_theme(
        &self,
        claims: &Claims,
        upload: ThemeUpload,
    ) -> Result<ThemeImageResponse, DomainError> {
        if upload.title.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }
        if upload.data.is_empty() {
            return Err(DomainError::ValidationError(
                "No image uploaded".to_string(),
            ));
        }

        // All validation happens before the blob is written
        validate_image(&upload.file_name, &upload.content_type)?;
        if upload.data.len() > MAX_IMAGE_BYTES {
            return Err(DomainError::PayloadTooLarge(MAX_IMAGE_BYTES));
        }

        let filename = unique_filename(&upload.file_name);
        self.blob_store.save(&filename, &upload.data).await?;

        let image_url = format!("/uploads/{}", filename);

        let theme = match self
            .theme_repo
            .create(
                claims.user_id,
                &upload.title,
                upload.description.as_deref(),
                &image_url,
            )
            .await
        {
            Ok(theme) => theme,
            Err(e) => {
                // Metadata save failed, remove the orphaned blob. The
                // original error stays primary even if cleanup fails too.
                if let Err(cleanup_err) = self.blob_store.delete(&filename).await {
                    tracing::error!(
                        "Failed to delete orphaned upload {}: {:?}",
                        filename,
                        cleanup_err
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(
            "Theme image created: id={}, uploaded_by={}, url={}",
            theme.id,
            claims.user_id,
            theme.image_url
        );

        Ok(ThemeImageResponse::from(theme))
    }

    pub async fn list_themes(&self) -> Result<Vec<ThemeImageResponse>, DomainError> {
        let themes = self.theme_repo.list().await?;
        Ok(themes.into_iter().map(ThemeImageResponse::from).collect())
    }
}

/// Two-sided type check: the extension and the declared MIME subtype must
/// each name an allowed format. Checking only the MIME type would let a
/// renamed file through.
fn validate_image(file_name: &str, content_type: &str) -> Result<(), DomainError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let subtype = content_type
        .strip_prefix("image/")
        .unwrap_or("")
        .to_lowercase();

    let extension_ok = ALLOWED_IMAGE_TYPES.contains(&extension.as_str());
    let mime_ok = ALLOWED_IMAGE_TYPES.contains(&subtype.as_str());

    if extension_ok && mime_ok {
        Ok(())
    } else {
        Err(DomainError::UnsupportedMediaType(format!(
            "Only image files are allowed (jpeg, jpg, png, gif, webp), got {:?} with type {:?}",
            file_name, content_type
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_extension_and_mime() {
        assert!(validate_image("photo.png", "image/png").is_ok());
        assert!(validate_image("PHOTO.JPG", "image/jpeg").is_ok());
        assert!(validate_image("anim.webp", "image/webp").is_ok());
    }

    #[test]
    fn rejects_text_file_even_with_image_mime() {
        assert!(matches!(
            validate_image("notes.txt", "image/png"),
            Err(DomainError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn rejects_image_extension_with_foreign_mime() {
        assert!(matches!(
            validate_image("payload.png", "application/octet-stream"),
            Err(DomainError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn rejects_missing_extension() {
        assert!(validate_image("noext", "image/png").is_err());
    }
}
