use crate::error::CmsClientError;
use crate::models::{
    AuthResponse, CreatePostRequest, CreateTicketRequest, ErrorResponse, MessageResponse, Post,
    PostCreated, SigninRequest, SignupRequest, SupportTicket, ThemeImage, ThemeImageCreated,
    TicketCreated,
};
use reqwest::{multipart, Client, RequestBuilder, StatusCode};
use std::time::Duration;

/// HTTP client for the CMS API. Holds the session token once `signup` or
/// `signin` has succeeded; protected calls fail with 401 until then.
#[derive(Debug, Clone)]
pub struct CmsClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl CmsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn get_token(&self) -> Option<&String> {
        self.token.as_ref()
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn add_auth_header(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Turns a non-success response into the matching client error, pulling
    /// the message out of the server's `{"error": ...}` body when present.
    async fn error_from(response: reqwest::Response) -> CmsClientError {
        let status = response.status();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => format!("HTTP {}", status),
        };

        match status {
            StatusCode::BAD_REQUEST => CmsClientError::InvalidRequest(message),
            StatusCode::UNAUTHORIZED => CmsClientError::Unauthorized(message),
            StatusCode::FORBIDDEN => CmsClientError::Forbidden(message),
            StatusCode::NOT_FOUND => CmsClientError::NotFound,
            StatusCode::PAYLOAD_TOO_LARGE => CmsClientError::PayloadTooLarge(message),
            StatusCode::UNSUPPORTED_MEDIA_TYPE => CmsClientError::UnsupportedMediaType(message),
            _ => CmsClientError::TransportError(format!("HTTP {}: {}", status, message)),
        }
    }

    // ==================== Аутентификация ====================

    pub async fn signup(
        &mut self,
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<AuthResponse, CmsClientError> {
        let req = SignupRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        };

        tracing::debug!("Signing up user {}", req.username);

        let url = self.url("/api/auth/signup");
        let response = self.client.post(&url).json(&req).send().await?;

        match response.status() {
            StatusCode::CREATED => {
                let auth = response.json::<AuthResponse>().await?;
                self.set_token(auth.token.clone());
                Ok(auth)
            }
            _ => Err(Self::error_from(response).await),
        }
    }

    pub async fn signin(
        &mut self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<AuthResponse, CmsClientError> {
        let req = SigninRequest {
            email: email.into(),
            password: password.into(),
        };

        tracing::debug!("Signing in {}", req.email);

        let url = self.url("/api/auth/signin");
        let response = self.client.post(&url).json(&req).send().await?;

        match response.status() {
            StatusCode::OK => {
                let auth = response.json::<AuthResponse>().await?;
                self.set_token(auth.token.clone());
                Ok(auth)
            }
            _ => Err(Self::error_from(response).await),
        }
    }

    // ==================== Посты ====================

    pub async fn list_posts(&self) -> Result<Vec<Post>, CmsClientError> {
        let url = self.url("/api/posts");
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<Vec<Post>>().await?),
            _ => Err(Self::error_from(response).await),
        }
    }

    pub async fn get_post(&self, id: i64) -> Result<Post, CmsClientError> {
        let url = self.url(&format!("/api/posts/{}", id));
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<Post>().await?),
            _ => Err(Self::error_from(response).await),
        }
    }

    pub async fn search_posts(&self, query: &str) -> Result<Vec<Post>, CmsClientError> {
        let url = self.url(&format!("/api/posts/search/{}", query));
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<Vec<Post>>().await?),
            _ => Err(Self::error_from(response).await),
        }
    }

    pub async fn create_post(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Post, CmsClientError> {
        let req = CreatePostRequest {
            title: title.into(),
            content: content.into(),
        };

        let url = self.url("/api/posts");
        let response = self
            .add_auth_header(self.client.post(&url))
            .json(&req)
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => Ok(response.json::<PostCreated>().await?.post),
            _ => Err(Self::error_from(response).await),
        }
    }

    pub async fn delete_post(&self, id: i64) -> Result<String, CmsClientError> {
        let url = self.url(&format!("/api/posts/{}", id));
        let response = self.add_auth_header(self.client.delete(&url)).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<MessageResponse>().await?.message),
            _ => Err(Self::error_from(response).await),
        }
    }

    // ==================== Темы оформления ====================

    pub async fn list_themes(&self) -> Result<Vec<ThemeImage>, CmsClientError> {
        let url = self.url("/api/themes");
        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<Vec<ThemeImage>>().await?),
            _ => Err(Self::error_from(response).await),
        }
    }

    /// Uploads a theme image as multipart form data. `file_name` must carry
    /// an allowed image extension and `mime_type` the matching image MIME,
    /// or the server rejects the upload with 415.
    pub async fn upload_theme(
        &self,
        title: impl Into<String>,
        description: Option<String>,
        file_name: impl Into<String>,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Result<ThemeImage, CmsClientError> {
        let part = multipart::Part::bytes(data)
            .file_name(file_name.into())
            .mime_str(mime_type)?;

        let mut form = multipart::Form::new()
            .text("title", title.into())
            .part("image", part);
        if let Some(description) = description {
            form = form.text("description", description);
        }

        let url = self.url("/api/themes");
        let response = self
            .add_auth_header(self.client.post(&url))
            .multipart(form)
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => Ok(response.json::<ThemeImageCreated>().await?.theme_image),
            _ => Err(Self::error_from(response).await),
        }
    }

    // ==================== Поддержка ====================

    pub async fn submit_ticket(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<TicketCreated, CmsClientError> {
        let req = CreateTicketRequest {
            name: name.into(),
            email: email.into(),
            subject: subject.into(),
            message: message.into(),
        };

        let url = self.url("/api/support");
        let response = self.client.post(&url).json(&req).send().await?;

        match response.status() {
            StatusCode::CREATED => Ok(response.json::<TicketCreated>().await?),
            _ => Err(Self::error_from(response).await),
        }
    }

    pub async fn list_tickets(&self) -> Result<Vec<SupportTicket>, CmsClientError> {
        let url = self.url("/api/support");
        let response = self.add_auth_header(self.client.get(&url)).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<Vec<SupportTicket>>().await?),
            _ => Err(Self::error_from(response).await),
        }
    }
}
