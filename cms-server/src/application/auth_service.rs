use crate::data::user_repository::UserRepository;
use crate::domain::user::{SigninRequest, SignupRequest, UserResponse};
use crate::domain::DomainError;
use crate::infrastructure::jwt::JwtService;
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::Arc;

pub struct AuthService {
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    jwt_service: Arc<JwtService>,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            user_repo,
            jwt_service,
        }
    }

    pub async fn signup(&self, req: SignupRequest) -> Result<(String, UserResponse), DomainError> {
        tracing::debug!("=== SIGNUP START ===");
        tracing::debug!("Username: {}, Email: {}", req.username, req.email);

        if req.username.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty()
        {
            return Err(DomainError::ValidationError(
                "Username, email and password are required".to_string(),
            ));
        }

        // Check if user already exists
        tracing::debug!("Checking if username exists...");
        match self.user_repo.find_by_username(&req.username).await {
            Ok(_) => {
                tracing::warn!("Signup failed: username already exists");
                return Err(DomainError::UserAlreadyExists);
            }
            Err(DomainError::UserNotFound) => {}
            Err(e) => return Err(e),
        }

        tracing::debug!("Checking if email exists...");
        match self.user_repo.find_by_email(&req.email).await {
            Ok(_) => {
                tracing::warn!("Signup failed: email already exists");
                return Err(DomainError::UserAlreadyExists);
            }
            Err(DomainError::UserNotFound) => {}
            Err(e) => return Err(e),
        }

        // Hash password
        tracing::debug!("Hashing password...");
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = match argon2.hash_password(req.password.as_bytes(), &salt) {
            Ok(hash) => hash.to_string(),
            Err(e) => {
                tracing::error!("Password hashing failed: {}", e);
                return Err(DomainError::InternalError(format!(
                    "Password hashing failed: {}",
                    e
                )));
            }
        };

        tracing::debug!("Creating user in database...");
        let user = match self.user_repo.create(req, password_hash).await {
            Ok(u) => {
                tracing::debug!("User created with ID: {}", u.id);
                u
            }
            Err(e) => {
                tracing::error!("Failed to create user in database: {:?}", e);
                return Err(e);
            }
        };

        tracing::debug!("Generating JWT token for user ID: {}", user.id);
        match self
            .jwt_service
            .generate_token(user.id, user.username.clone())
        {
            Ok(token) => {
                tracing::info!(
                    "User signed up successfully: id={}, username={}",
                    user.id,
                    user.username
                );
                Ok((token, UserResponse::from(user)))
            }
            Err(e) => {
                tracing::error!("JWT GENERATION FAILED: {:?}", e);
                Err(e)
            }
        }
    }

    pub async fn signin(&self, req: SigninRequest) -> Result<(String, UserResponse), DomainError> {
        tracing::debug!("=== SIGNIN START ===");
        tracing::debug!("Email: {}", req.email);

        // Find user by email. Unknown email and wrong password surface the
        // same error so callers cannot probe which accounts exist.
        tracing::debug!("Finding user in database...");
        let user = match self.user_repo.find_by_email(&req.email).await {
            Ok(u) => {
                tracing::debug!("User found with ID: {}", u.id);
                u
            }
            Err(DomainError::UserNotFound) => {
                tracing::warn!("Signin failed: no user with email {}", req.email);
                return Err(DomainError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        // Verify password
        tracing::debug!("Verifying password...");
        let parsed_hash = match PasswordHash::new(&user.password_hash) {
            Ok(h) => h,
            Err(e) => {
                tracing::error!("Invalid password hash format: {}", e);
                return Err(DomainError::InternalError(format!(
                    "Invalid password hash: {}",
                    e
                )));
            }
        };

        let argon2 = Argon2::default();
        if argon2
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            tracing::warn!("Invalid password for user {}", user.username);
            return Err(DomainError::InvalidCredentials);
        }

        tracing::debug!("Generating JWT token for user ID: {}", user.id);
        match self
            .jwt_service
            .generate_token(user.id, user.username.clone())
        {
            Ok(token) => {
                tracing::info!(
                    "User signed in successfully: id={}, username={}",
                    user.id,
                    user.username
                );
                Ok((token, UserResponse::from(user)))
            }
            Err(e) => {
                tracing::error!("JWT GENERATION FAILED: {:?}", e);
                Err(e)
            }
        }
    }
}
