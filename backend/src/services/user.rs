//! User service for registration, login and token management
//!
//! Password hashing/verification runs on the blocking thread pool and the
//! JWT service is passed by reference with its keys pre-computed.

use crate::auth::{JwtService, PasswordService};
use crate::error::ApiError;
use crate::repositories::{
    violated_unique_constraint, NewUser, ProfileRepository, UserRecord, UserRepository,
    EMAIL_UNIQUE_CONSTRAINT, USERNAME_UNIQUE_CONSTRAINT,
};
use edunova_shared::password_validation::validate_password_strength;
use edunova_shared::types::{
    AccessTokenResponse, AuthResponse, LoginRequest, ProfileResponse, RefreshTokenRequest,
    RegisterRequest, UserResponse,
};
use edunova_shared::validation::{
    check, require, validate_email, validate_full_name, validate_username,
};
use edunova_shared::{AuthError, FieldErrors};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const USERNAME_TAKEN: &str = "A user with this username already exists.";
pub const EMAIL_TAKEN: &str = "A user with this email already exists.";

/// Registration fields that passed format validation
#[derive(Debug)]
struct RegistrationInput<'a> {
    username: Option<&'a str>,
    email: Option<&'a str>,
    password: Option<&'a str>,
    full_name: &'a str,
}

/// Format and strength checks that need no database access
fn validate_registration<'a>(
    req: &'a RegisterRequest,
    errors: &mut FieldErrors,
) -> RegistrationInput<'a> {
    let username = require(errors, "username", req.username.as_deref())
        .map(str::trim)
        .and_then(|username| check(errors, "username", username, validate_username));

    let email = require(errors, "email", req.email.as_deref())
        .map(str::trim)
        .and_then(|email| check(errors, "email", email, validate_email));

    let password = require(
        errors,
        "password",
        req.password.as_ref().map(|p| p.expose_secret().as_str()),
    );
    if let Some(password) = password {
        let attributes = [
            ("username", req.username.as_deref().map(str::trim).unwrap_or_default()),
            ("email address", req.email.as_deref().map(str::trim).unwrap_or_default()),
        ];
        errors.extend("password", validate_password_strength(password, &attributes));
    }

    let full_name = req.full_name.as_deref().map(str::trim).unwrap_or_default();
    if let Err(message) = validate_full_name(full_name) {
        errors.add("full_name", message);
    }

    RegistrationInput {
        username,
        email,
        password,
        full_name,
    }
}

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user and its profile, then issue a token pair
    pub async fn register(
        pool: &PgPool,
        jwt_service: &JwtService,
        req: RegisterRequest,
    ) -> Result<AuthResponse, ApiError> {
        let mut errors = FieldErrors::new();
        let input = validate_registration(&req, &mut errors);

        // Uniqueness is only checked for fields that are otherwise valid
        if let Some(username) = input.username {
            if UserRepository::username_exists(pool, username)
                .await
                .map_err(ApiError::Internal)?
            {
                errors.add("username", USERNAME_TAKEN);
            }
        }
        if let Some(email) = input.email {
            if UserRepository::email_exists(pool, email)
                .await
                .map_err(ApiError::Internal)?
            {
                errors.add("email", EMAIL_TAKEN);
            }
        }

        let (Some(username), Some(email), Some(password)) =
            (input.username, input.email, input.password)
        else {
            return Err(errors.into());
        };
        errors.into_result()?;

        let password_hash = PasswordService::hash_async(password.to_string())
            .await
            .map_err(ApiError::Internal)?;

        let new_user = NewUser {
            username,
            email,
            password_hash: &password_hash,
            full_name: input.full_name,
        };
        let user = match UserRepository::create(pool, &new_user).await {
            Ok(user) => user,
            // Lost a race against a concurrent registration
            Err(err) => {
                return Err(match violated_unique_constraint(&err).as_deref() {
                    Some(USERNAME_UNIQUE_CONSTRAINT) => {
                        FieldErrors::single("username", USERNAME_TAKEN).into()
                    }
                    Some(EMAIL_UNIQUE_CONSTRAINT) => FieldErrors::single("email", EMAIL_TAKEN).into(),
                    _ => ApiError::Internal(err),
                })
            }
        };

        info!(user_id = %user.id, username = %user.username, "User registered");

        let tokens = jwt_service.issue_pair(user.id).map_err(ApiError::Internal)?;

        Ok(AuthResponse {
            user: Self::user_response(pool, user).await?,
            tokens,
            message: "User registered successfully".to_string(),
        })
    }

    /// Login with username and password
    ///
    /// Unknown usernames, wrong passwords and inactive accounts all fail
    /// with the same error.
    pub async fn login(
        pool: &PgPool,
        jwt_service: &JwtService,
        req: LoginRequest,
    ) -> Result<AuthResponse, ApiError> {
        let mut errors = FieldErrors::new();
        let username = require(&mut errors, "username", req.username.as_deref()).map(str::trim);
        let password = require(
            &mut errors,
            "password",
            req.password.as_ref().map(|p| p.expose_secret().as_str()),
        );
        let (Some(username), Some(password)) = (username, password) else {
            return Err(ApiError::FieldValidation {
                message: "Invalid credentials".to_string(),
                errors,
            });
        };

        let user = UserRepository::find_by_username(pool, username)
            .await
            .map_err(ApiError::Internal)?;

        let Some(user) = user else {
            PasswordService::verify_dummy_async(password.to_string()).await;
            warn!(username, "Login failed: unknown username");
            return Err(AuthError::InvalidCredentials.into());
        };

        let valid = PasswordService::verify_async(password.to_string(), user.password_hash.clone())
            .await
            .map_err(ApiError::Internal)?;

        if !valid || !user.is_active {
            warn!(user_id = %user.id, active = user.is_active, "Login failed");
            return Err(AuthError::InvalidCredentials.into());
        }

        let tokens = jwt_service.issue_pair(user.id).map_err(ApiError::Internal)?;
        info!(user_id = %user.id, "User logged in");

        Ok(AuthResponse {
            user: Self::user_response(pool, user).await?,
            tokens,
            message: "Login successful".to_string(),
        })
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The refresh token itself is not rotated.
    pub async fn refresh_token(
        pool: &PgPool,
        jwt_service: &JwtService,
        req: RefreshTokenRequest,
    ) -> Result<AccessTokenResponse, ApiError> {
        let mut errors = FieldErrors::new();
        let Some(token) = require(&mut errors, "refresh", req.refresh.as_deref()) else {
            return Err(errors.into());
        };

        let claims = jwt_service.validate_refresh_token(token.trim()).map_err(|e| {
            debug!(error = %e, "Refresh token rejected");
            ApiError::from(e)
        })?;
        let user_id = claims.user_id()?;

        let user = Self::active_user(pool, user_id).await?;

        let access = jwt_service
            .generate_access_token(user.id)
            .map_err(ApiError::Internal)?;
        debug!(user_id = %user.id, "Access token refreshed");

        Ok(AccessTokenResponse { access })
    }

    /// Representation of the authenticated user
    pub async fn current_user(pool: &PgPool, user_id: Uuid) -> Result<UserResponse, ApiError> {
        let user = Self::active_user(pool, user_id).await?;
        Self::user_response(pool, user).await
    }

    /// Load a user a token points at; gone or inactive users are unauthorized
    async fn active_user(pool: &PgPool, user_id: Uuid) -> Result<UserRecord, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

        if !user.is_active {
            return Err(ApiError::Unauthorized("User is inactive".to_string()));
        }

        Ok(user)
    }

    /// User with nested profile; a missing profile is a broken invariant
    async fn user_response(pool: &PgPool, user: UserRecord) -> Result<UserResponse, ApiError> {
        let profile = ProfileRepository::find_by_user_id(pool, user.id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!("user {} has no profile", user.id))
            })?;

        Ok(UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            profile: ProfileResponse {
                full_name: profile.full_name,
            },
        })
    }
}
