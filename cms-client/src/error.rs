use thiserror::Error;

#[derive(Debug, Error)]
pub enum CmsClientError {
    // HTTP ошибки
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    // Бизнес-логика ошибки
    #[error("Resource not found")]
    NotFound,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Ошибки загрузки файлов
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    // Транспортные ошибки
    #[error("Transport error: {0}")]
    TransportError(String),
}

impl CmsClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CmsClientError::NotFound)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CmsClientError::Unauthorized(_))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, CmsClientError::Forbidden(_))
    }
}
