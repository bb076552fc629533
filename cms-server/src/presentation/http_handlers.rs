use crate::application::auth_service::AuthService;
use crate::application::post_service::PostService;
use crate::application::support_service::SupportService;
use crate::application::theme_service::{ThemeService, MAX_IMAGE_BYTES};
use crate::domain::post::{CreatePostRequest, PostResponse};
use crate::domain::theme::{ThemeImageResponse, ThemeUpload};
use crate::domain::ticket::CreateTicketRequest;
use crate::domain::user::{SigninRequest, SignupRequest, UserResponse};
use crate::domain::DomainError;
use crate::infrastructure::jwt::Claims;
use actix_multipart::Multipart;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, Responder};
use futures::TryStreamExt;
use std::sync::Arc;

// Структура для ответа с токеном
#[derive(serde::Serialize)]
struct AuthResponse {
    token: String,
    user: UserResponse,
}

#[derive(serde::Serialize)]
struct PostCreatedResponse {
    post: PostResponse,
}

#[derive(serde::Serialize)]
struct ThemeCreatedResponse {
    theme_image: ThemeImageResponse,
}

#[derive(serde::Serialize)]
struct TicketCreatedResponse {
    message: String,
    ticket_id: i64,
}

#[derive(serde::Serialize)]
struct MessageResponse {
    message: String,
}

// Вспомогательная функция для извлечения claims из request extensions
fn authenticated_claims(req: &HttpRequest) -> Result<Claims, DomainError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or(DomainError::Unauthorized(
            "User not authenticated".to_string(),
        ))
}

// Преобразование DomainError в HttpResponse
fn error_to_response(err: DomainError) -> HttpResponse {
    let status_code = err.to_status_code();
    let message = err.to_string();

    match status_code {
        400 => HttpResponse::BadRequest().json(serde_json::json!({ "error": message })),
        401 => HttpResponse::Unauthorized().json(serde_json::json!({ "error": message })),
        403 => HttpResponse::Forbidden().json(serde_json::json!({ "error": message })),
        404 => HttpResponse::NotFound().json(serde_json::json!({ "error": message })),
        413 => HttpResponse::PayloadTooLarge().json(serde_json::json!({ "error": message })),
        415 => HttpResponse::UnsupportedMediaType().json(serde_json::json!({ "error": message })),
        _ => HttpResponse::InternalServerError()
            .json(serde_json::json!({ "error": "Internal server error" })),
    }
}

// ============== Auth Handlers ==============

pub async fn signup(
    auth_service: web::Data<Arc<AuthService>>,
    req: web::Json<SignupRequest>,
) -> impl Responder {
    match auth_service.signup(req.into_inner()).await {
        Ok((token, user)) => HttpResponse::Created().json(AuthResponse { token, user }),
        Err(err) => error_to_response(err),
    }
}

pub async fn signin(
    auth_service: web::Data<Arc<AuthService>>,
    req: web::Json<SigninRequest>,
) -> impl Responder {
    match auth_service.signin(req.into_inner()).await {
        Ok((token, user)) => HttpResponse::Ok().json(AuthResponse { token, user }),
        Err(err) => error_to_response(err),
    }
}

// ============== Post Handlers ==============

pub async fn list_posts(post_service: web::Data<Arc<PostService>>) -> impl Responder {
    tracing::info!("Listing posts");

    match post_service.list_posts().await {
        Ok(posts) => HttpResponse::Ok().json(posts),
        Err(err) => error_to_response(err),
    }
}

pub async fn get_post(
    post_service: web::Data<Arc<PostService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();

    tracing::info!("Getting post with id={}", post_id);

    match post_service.get_post(post_id).await {
        Ok(post) => HttpResponse::Ok().json(post),
        Err(err) => error_to_response(err),
    }
}

pub async fn search_posts(
    post_service: web::Data<Arc<PostService>>,
    path: web::Path<String>,
) -> impl Responder {
    let query = path.into_inner();

    tracing::info!("Searching posts for {:?}", query);

    match post_service.search_posts(&query).await {
        Ok(posts) => HttpResponse::Ok().json(posts),
        Err(err) => error_to_response(err),
    }
}

pub async fn create_post(
    req: HttpRequest,
    post_service: web::Data<Arc<PostService>>,
    post_data: web::Json<CreatePostRequest>,
) -> impl Responder {
    let claims = match authenticated_claims(&req) {
        Ok(claims) => claims,
        Err(err) => return error_to_response(err),
    };

    tracing::info!("Creating post for user_id={}", claims.user_id);

    match post_service
        .create_post(&claims, post_data.into_inner())
        .await
    {
        Ok(post) => HttpResponse::Created().json(PostCreatedResponse { post }),
        Err(err) => error_to_response(err),
    }
}

pub async fn delete_post(
    req: HttpRequest,
    post_service: web::Data<Arc<PostService>>,
    path: web::Path<i64>,
) -> impl Responder {
    let post_id = path.into_inner();

    let claims = match authenticated_claims(&req) {
        Ok(claims) => claims,
        Err(err) => return error_to_response(err),
    };

    tracing::info!(
        "Deleting post id={} for user_id={}",
        post_id,
        claims.user_id
    );

    match post_service.delete_post(post_id, &claims).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse {
            message: "Post deleted successfully".to_string(),
        }),
        Err(err) => error_to_response(err),
    }
}

// ============== Theme Handlers ==============

pub async fn list_themes(theme_service: web::Data<Arc<ThemeService>>) -> impl Responder {
    tracing::info!("Listing theme images");

    match theme_service.list_themes().await {
        Ok(themes) => HttpResponse::Ok().json(themes),
        Err(err) => error_to_response(err),
    }
}

pub async fn create_theme(
    req: HttpRequest,
    theme_service: web::Data<Arc<ThemeService>>,
    payload: Multipart,
) -> impl Responder {
    let claims = match authenticated_claims(&req) {
        Ok(claims) => claims,
        Err(err) => return error_to_response(err),
    };

    tracing::info!("Uploading theme image for user_id={}", claims.user_id);

    let upload = match read_theme_upload(payload).await {
        Ok(upload) => upload,
        Err(err) => return error_to_response(err),
    };

    match theme_service.create_theme(&claims, upload).await {
        Ok(theme_image) => HttpResponse::Created().json(ThemeCreatedResponse { theme_image }),
        Err(err) => error_to_response(err),
    }
}

fn multipart_error(err: actix_multipart::MultipartError) -> DomainError {
    DomainError::ValidationError(format!("Invalid multipart payload: {}", err))
}

async fn read_text_field(field: &mut actix_multipart::Field) -> Result<String, DomainError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes)
        .map_err(|_| DomainError::ValidationError("Form fields must be valid UTF-8".to_string()))
}

/// Collects the multipart form into a ThemeUpload. The image field is
/// buffered with a running size cap so an oversized body is cut off
/// mid-stream instead of being read to completion.
async fn read_theme_upload(mut payload: Multipart) -> Result<ThemeUpload, DomainError> {
    let mut title = String::new();
    let mut description: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut content_type = String::new();
    let mut data: Vec<u8> = Vec::new();

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let field_name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();

        match field_name.as_str() {
            "title" => title = read_text_field(&mut field).await?,
            "description" => description = Some(read_text_field(&mut field).await?),
            "image" => {
                file_name = field
                    .content_disposition()
                    .get_filename()
                    .map(|s| s.to_string());
                content_type = field
                    .content_type()
                    .map(|m| m.to_string())
                    .unwrap_or_default();

                while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
                    if data.len() + chunk.len() > MAX_IMAGE_BYTES {
                        return Err(DomainError::PayloadTooLarge(MAX_IMAGE_BYTES));
                    }
                    data.extend_from_slice(&chunk);
                }
            }
            // Unknown fields are drained so the stream stays consumable
            _ => while field.try_next().await.map_err(multipart_error)?.is_some() {},
        }
    }

    let file_name = match file_name {
        Some(name) => name,
        None => {
            return Err(DomainError::ValidationError(
                "No image uploaded".to_string(),
            ))
        }
    };

    Ok(ThemeUpload {
        title,
        description,
        file_name,
        content_type,
        data,
    })
}

// ============== Support Handlers ==============

pub async fn create_ticket(
    support_service: web::Data<Arc<SupportService>>,
    req: web::Json<CreateTicketRequest>,
) -> impl Responder {
    match support_service.create_ticket(req.into_inner()).await {
        Ok(ticket) => HttpResponse::Created().json(TicketCreatedResponse {
            message: "Support ticket submitted successfully. Check your email for confirmation."
                .to_string(),
            ticket_id: ticket.id,
        }),
        Err(err) => error_to_response(err),
    }
}

pub async fn list_tickets(support_service: web::Data<Arc<SupportService>>) -> impl Responder {
    tracing::info!("Listing support tickets");

    match support_service.list_tickets().await {
        Ok(tickets) => HttpResponse::Ok().json(tickets),
        Err(err) => error_to_response(err),
    }
}
