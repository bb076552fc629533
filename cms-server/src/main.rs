use dotenvy::dotenv;
use std::sync::Arc;

use cms_server::application::auth_service::AuthService;
use cms_server::application::post_service::PostService;
use cms_server::application::support_service::SupportService;
use cms_server::application::theme_service::ThemeService;
use cms_server::data::post_repository::PostgresPostRepository;
use cms_server::data::theme_repository::PostgresThemeRepository;
use cms_server::data::ticket_repository::PostgresTicketRepository;
use cms_server::data::user_repository::PostgresUserRepository;
use cms_server::infrastructure::config::Config;
use cms_server::infrastructure::database::{create_pool, run_migrations};
use cms_server::infrastructure::jwt::JwtService;
use cms_server::infrastructure::logging::init_logging;
use cms_server::infrastructure::mailer::{DisabledNotifier, Notifier, SmtpNotifier};
use cms_server::infrastructure::storage::{BlobStore, DiskStore};
use cms_server::presentation::middleware::AuthState;
use cms_server::presentation::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    init_logging();

    let config = Config::from_env()?;

    let http_addr = format!("0.0.0.0:{}", config.http_port);

    tracing::info!("Starting CMS server...");
    tracing::info!("HTTP server will listen on {}", http_addr);
    tracing::info!("CORS allowed origins: {}", config.cors_allowed_origins);

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    run_migrations(&pool).await?;
    tracing::info!("Migrations completed successfully");

    // Initialize services
    tracing::info!("Initializing services...");

    // JWT service
    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret)?);

    // Upload directory is created on startup so the first upload never races
    let blob_store: Arc<dyn BlobStore + Send + Sync> =
        Arc::new(DiskStore::new(&config.upload_dir).await?);

    // Repositories
    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let post_repo = Arc::new(PostgresPostRepository::new(pool.clone()));
    let theme_repo = Arc::new(PostgresThemeRepository::new(pool.clone()));
    let ticket_repo = Arc::new(PostgresTicketRepository::new(pool.clone()));

    // Ticket notifications go over SMTP when configured
    let notifier: Arc<dyn Notifier + Send + Sync> = match &config.mail {
        Some(mail_config) => {
            tracing::info!("SMTP notifier configured for {}", mail_config.smtp_host);
            Arc::new(SmtpNotifier::new(mail_config)?)
        }
        None => {
            tracing::warn!("SMTP not configured; support ticket emails are disabled");
            Arc::new(DisabledNotifier)
        }
    };

    // Application services
    let auth_service = Arc::new(AuthService::new(user_repo.clone(), jwt_service.clone()));
    let post_service = Arc::new(PostService::new(post_repo.clone()));
    let theme_service = Arc::new(ThemeService::new(theme_repo.clone(), blob_store.clone()));
    let support_service = Arc::new(SupportService::new(ticket_repo.clone(), notifier.clone()));

    let auth_state = AuthState::new(
        jwt_service.clone(),
        user_repo.clone(),
        config.auth_refresh_claims,
    );

    tracing::info!("Services initialized successfully");

    tracing::info!("Starting HTTP server...");
    run_http_server(
        http_addr,
        auth_service,
        post_service,
        theme_service,
        support_service,
        auth_state,
        config.cors_allowed_origins,
        config.upload_dir,
    )
    .await?;

    tracing::info!("Shutting down...");
    Ok(())
}

/// Configure CORS for the HTTP server with allowed origins from .env
fn configure_cors(allowed_origins: &str) -> actix_cors::Cors {
    use actix_cors::Cors;
    use actix_web::http::header;

    let origins: Vec<&str> = allowed_origins.split(',').map(|s| s.trim()).collect();

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .expose_headers(vec![header::AUTHORIZATION])
        .max_age(3600);

    // Добавляем каждый разрешенный домен
    for origin in origins {
        if !origin.is_empty() {
            cors = cors.allowed_origin(origin);
            tracing::debug!("Added allowed CORS origin: {}", origin);
        }
    }

    cors
}

#[allow(clippy::too_many_arguments)]
async fn run_http_server(
    addr: String,
    auth_service: Arc<AuthService>,
    post_service: Arc<PostService>,
    theme_service: Arc<ThemeService>,
    support_service: Arc<SupportService>,
    auth_state: AuthState,
    cors_allowed_origins: String,
    upload_dir: String,
) -> anyhow::Result<()> {
    use actix_web::{middleware::Logger, web, App, HttpServer};

    tracing::info!("Configuring HTTP server...");

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(configure_cors(&cors_allowed_origins))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(post_service.clone()))
            .app_data(web::Data::new(theme_service.clone()))
            .app_data(web::Data::new(support_service.clone()))
            .app_data(web::Data::new(auth_state.clone()))
            .configure(routes::configure)
            // Stored images are served back from the upload directory
            .service(actix_files::Files::new("/uploads", &upload_dir))
    })
    .bind(&addr)?
    .run();

    tracing::info!("HTTP server running on {}", addr);

    server.await?;

    Ok(())
}
