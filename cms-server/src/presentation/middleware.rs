use crate::data::user_repository::UserRepository;
use crate::infrastructure::jwt::JwtService;
use actix_web::{dev::ServiceRequest, web, Error, HttpMessage, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use serde_json::json;
use std::sync::Arc;

/// Everything bearer authentication needs, registered once as app data.
#[derive(Clone)]
pub struct AuthState {
    jwt_service: Arc<JwtService>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    refresh_claims: bool,
}

impl AuthState {
    pub fn new(
        jwt_service: Arc<JwtService>,
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        refresh_claims: bool,
    ) -> Self {
        Self {
            jwt_service,
            user_repo,
            refresh_claims,
        }
    }
}

pub async fn jwt_middleware(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let auth_state = match req.app_data::<web::Data<AuthState>>() {
        Some(state) => state.clone(),
        None => {
            return Err((
                actix_web::error::ErrorInternalServerError("Auth state not configured"),
                req,
            ));
        }
    };

    // Verify token
    let mut claims = match auth_state.jwt_service.verify_token(credentials.token()) {
        Ok(claims) => claims,
        Err(e) => {
            return Err((unauthorized_error(&e.to_string()), req));
        }
    };

    // Tokens embed the username at issue time. The opt-in refresh trades a
    // lookup per request for claims that track the stored record.
    if auth_state.refresh_claims {
        match auth_state.user_repo.find_by_id(claims.user_id).await {
            Ok(user) => claims.username = user.username,
            Err(_) => {
                tracing::warn!(
                    "Token for user {} no longer matches a stored user",
                    claims.user_id
                );
                return Err((unauthorized_error("Invalid token"), req));
            }
        }
    }

    req.extensions_mut().insert(claims);
    Ok(req)
}

/// 401 with the same JSON error shape the handlers produce.
fn unauthorized_error(message: &str) -> Error {
    actix_web::error::InternalError::from_response(
        message.to_string(),
        HttpResponse::Unauthorized().json(json!({ "error": message })),
    )
    .into()
}
