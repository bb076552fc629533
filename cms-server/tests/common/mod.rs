use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::web::{self, ServiceConfig};
use async_trait::async_trait;
use chrono::Utc;

use cms_server::application::auth_service::AuthService;
use cms_server::application::post_service::PostService;
use cms_server::application::support_service::SupportService;
use cms_server::application::theme_service::ThemeService;
use cms_server::data::post_repository::PostRepository;
use cms_server::data::theme_repository::ThemeRepository;
use cms_server::data::ticket_repository::TicketRepository;
use cms_server::data::user_repository::UserRepository;
use cms_server::domain::post::CreatePostRequest;
use cms_server::domain::ticket::{CreateTicketRequest, TicketStatus};
use cms_server::domain::user::SignupRequest;
use cms_server::domain::{DomainError, Post, SupportTicket, ThemeImage, User};
use cms_server::infrastructure::jwt::JwtService;
use cms_server::infrastructure::mailer::Notifier;
use cms_server::infrastructure::storage::BlobStore;
use cms_server::presentation::middleware::AuthState;
use cms_server::presentation::routes;

const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

// ============== In-memory repositories ==============

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(
        &self,
        req: SignupRequest,
        password_hash: String,
    ) -> Result<User, DomainError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.username == req.username || u.email == req.email)
        {
            return Err(DomainError::UserAlreadyExists);
        }
        let user = User {
            id: self.next_id(),
            username: req.username,
            email: req.email,
            password_hash,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(DomainError::UserNotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, DomainError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(DomainError::UserNotFound)
    }

    async fn find_by_id(&self, id: i64) -> Result<User, DomainError> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(DomainError::UserNotFound)
    }
}

#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: Mutex<Vec<Post>>,
    next_id: AtomicI64,
}

impl InMemoryPostRepository {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn sorted_desc(posts: &[Post]) -> Vec<Post> {
        let mut posts = posts.to_vec();
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        posts
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(
        &self,
        author_id: i64,
        author_name: &str,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let now = Utc::now();
        let post = Post {
            id: self.next_id(),
            title: req.title,
            content: req.content,
            author_id,
            author_name: author_name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(DomainError::PostNotFound)
    }

    async fn delete_owned(&self, id: i64, author_id: i64) -> Result<bool, DomainError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| !(p.id == id && p.author_id == author_id));
        Ok(posts.len() < before)
    }

    async fn list(&self) -> Result<Vec<Post>, DomainError> {
        Ok(Self::sorted_desc(&self.posts.lock().unwrap()))
    }

    async fn search(&self, query: &str) -> Result<Vec<Post>, DomainError> {
        let needle = query.to_lowercase();
        let posts = self.posts.lock().unwrap();
        let matched: Vec<Post> = posts
            .iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.content.to_lowercase().contains(&needle)
                    || p.author_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        Ok(Self::sorted_desc(&matched))
    }
}

#[derive(Default)]
pub struct InMemoryThemeRepository {
    themes: Mutex<Vec<ThemeImage>>,
    next_id: AtomicI64,
    /// When set, `create` fails like a broken database connection would.
    pub fail_create: AtomicBool,
}

#[async_trait]
impl ThemeRepository for InMemoryThemeRepository {
    async fn create(
        &self,
        uploaded_by: i64,
        title: &str,
        description: Option<&str>,
        image_url: &str,
    ) -> Result<ThemeImage, DomainError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError(
                "simulated insert failure".to_string(),
            ));
        }
        let theme = ThemeImage {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            title: title.to_string(),
            description: description.map(|s| s.to_string()),
            image_url: image_url.to_string(),
            uploaded_by,
            created_at: Utc::now(),
        };
        self.themes.lock().unwrap().push(theme.clone());
        Ok(theme)
    }

    async fn list(&self) -> Result<Vec<ThemeImage>, DomainError> {
        let mut themes = self.themes.lock().unwrap().clone();
        themes.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(themes)
    }
}

#[derive(Default)]
pub struct InMemoryTicketRepository {
    tickets: Mutex<Vec<SupportTicket>>,
    next_id: AtomicI64,
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn create(&self, req: CreateTicketRequest) -> Result<SupportTicket, DomainError> {
        let ticket = SupportTicket {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: req.name,
            email: req.email,
            subject: req.subject,
            message: req.message,
            status: TicketStatus::Open,
            created_at: Utc::now(),
        };
        self.tickets.lock().unwrap().push(ticket.clone());
        Ok(ticket)
    }

    async fn list(&self) -> Result<Vec<SupportTicket>, DomainError> {
        let mut tickets = self.tickets.lock().unwrap().clone();
        tickets.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(tickets)
    }
}

// ============== Recording doubles ==============

/// Blob store that records calls instead of touching the filesystem.
#[derive(Default)]
pub struct RecordingBlobStore {
    pub saves: Mutex<Vec<(String, usize)>>,
    pub deletes: Mutex<Vec<String>>,
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn save(&self, filename: &str, data: &[u8]) -> Result<(), DomainError> {
        self.saves
            .lock()
            .unwrap()
            .push((filename.to_string(), data.len()));
        Ok(())
    }

    async fn delete(&self, filename: &str) -> Result<(), DomainError> {
        self.deletes.lock().unwrap().push(filename.to_string());
        Ok(())
    }
}

/// Notifier that counts deliveries and can be told to fail.
#[derive(Default)]
pub struct RecordingNotifier {
    pub fail: AtomicBool,
    pub opened: AtomicUsize,
    pub confirmations: AtomicUsize,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn ticket_opened(&self, _ticket: &SupportTicket) -> Result<(), DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::NotificationFailure(
                "simulated smtp outage".to_string(),
            ));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn ticket_confirmation(&self, _ticket: &SupportTicket) -> Result<(), DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::NotificationFailure(
                "simulated smtp outage".to_string(),
            ));
        }
        self.confirmations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============== App wiring ==============

pub struct TestDeps {
    pub users: Arc<InMemoryUserRepository>,
    pub posts: Arc<InMemoryPostRepository>,
    pub themes: Arc<InMemoryThemeRepository>,
    pub tickets: Arc<InMemoryTicketRepository>,
    pub blobs: Arc<RecordingBlobStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub jwt: Arc<JwtService>,
}

impl TestDeps {
    pub fn new() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::default()),
            posts: Arc::new(InMemoryPostRepository::default()),
            themes: Arc::new(InMemoryThemeRepository::default()),
            tickets: Arc::new(InMemoryTicketRepository::default()),
            blobs: Arc::new(RecordingBlobStore::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            jwt: Arc::new(JwtService::new(TEST_JWT_SECRET).unwrap()),
        }
    }

    /// Issues a token directly, bypassing the signup route.
    pub fn token_for(&self, user_id: i64, username: &str) -> String {
        self.jwt
            .generate_token(user_id, username.to_string())
            .unwrap()
    }
}

/// Builds an `App::configure` closure wiring the real services and routes
/// onto the in-memory doubles.
pub fn configure_app(deps: &TestDeps) -> impl FnOnce(&mut ServiceConfig) {
    let auth_service = Arc::new(AuthService::new(deps.users.clone(), deps.jwt.clone()));
    let post_service = Arc::new(PostService::new(deps.posts.clone()));
    let theme_service = Arc::new(ThemeService::new(deps.themes.clone(), deps.blobs.clone()));
    let support_service = Arc::new(SupportService::new(
        deps.tickets.clone(),
        deps.notifier.clone(),
    ));
    let auth_state = AuthState::new(deps.jwt.clone(), deps.users.clone(), false);

    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(auth_service))
            .app_data(web::Data::new(post_service))
            .app_data(web::Data::new(theme_service))
            .app_data(web::Data::new(support_service))
            .app_data(web::Data::new(auth_state));
        routes::configure(cfg);
    }
}

// ============== Request helpers ==============

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub const MULTIPART_BOUNDARY: &str = "----CmsTestBoundary7MA4YWxk";

pub fn multipart_content_type() -> (&'static str, String) {
    (
        "Content-Type",
        format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
    )
}

/// Hand-built multipart body with a title field, an optional description
/// field and an optional file part.
pub fn multipart_body(
    title: &str,
    description: Option<&str>,
    file: Option<(&str, &str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();

    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"title\"\r\n\r\n");
    body.extend_from_slice(title.as_bytes());
    body.extend_from_slice(b"\r\n");

    if let Some(description) = description {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"description\"\r\n\r\n");
        body.extend_from_slice(description.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((file_name, content_type, data)) = file {
        body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}
