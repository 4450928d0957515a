//! Authentication service.
//!
//! Registration, login and token refresh. Access and refresh tokens
//! are both HS256 JWTs distinguished by a `kind` claim; password
//! hashing lives in the domain `Password` value object.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    Config, SECONDS_PER_HOUR, TOKEN_KIND_ACCESS, TOKEN_KIND_REFRESH, TOKEN_TYPE_BEARER,
};
use crate::domain::{NewUser, Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    /// "access" or "refresh"
    pub kind: String,
    pub exp: i64,
    pub iat: i64,
}

/// Access/refresh pair returned after registration, login or refresh.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Registration payload handed down from the handler.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and issue their first token pair.
    async fn register(&self, data: Registration) -> AppResult<(User, TokenPair)>;

    /// Login and return a token pair.
    async fn login(&self, email: String, password: String) -> AppResult<TokenPair>;

    /// Exchange a refresh token for a fresh pair.
    async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair>;

    /// Verify an access token and extract claims.
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

fn issue_token(user: &User, kind: &str, lifetime: Duration, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        kind: kind.to_string(),
        exp: (now + lifetime).timestamp(),
        iat: now.timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?)
}

fn issue_pair(user: &User, config: &Config) -> AppResult<TokenPair> {
    let access = issue_token(
        user,
        TOKEN_KIND_ACCESS,
        Duration::hours(config.jwt_expiration_hours),
        config,
    )?;
    let refresh = issue_token(
        user,
        TOKEN_KIND_REFRESH,
        Duration::days(config.refresh_expiration_days),
        config,
    )?;

    Ok(TokenPair {
        access_token: access,
        refresh_token: refresh,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

fn decode_claims(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, data: Registration) -> AppResult<(User, TokenPair)> {
        // Email format and password length are validated by the
        // handler's extractor; uniqueness is re-checked here and
        // ultimately enforced by the store's unique index.
        if self.uow.users().find_by_email(&data.email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&data.password)?.into_string();
        let user = self
            .uow
            .users()
            .create(
                NewUser {
                    email: data.email,
                    password_hash,
                    first_name: data.first_name,
                    last_name: data.last_name,
                },
                Utc::now(),
            )
            .await?;

        let tokens = issue_pair(&user, &self.config)?;
        Ok((user, tokens))
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenPair> {
        let user_result = self.uow.users().find_by_email(&email).await?;

        // SECURITY: verify against a dummy hash when the user doesn't
        // exist so response timing cannot enumerate valid emails.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let (password_hash, user_exists) = match &user_result {
            Some(user) => (user.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let stored = Password::from_hash(password_hash.to_string());
        let password_valid = stored.verify(&password);

        if !user_exists || !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        issue_pair(user_result.as_ref().unwrap(), &self.config)
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = decode_claims(refresh_token, &self.config)?;
        if claims.kind != TOKEN_KIND_REFRESH {
            return Err(AppError::Unauthorized);
        }

        let user = self
            .uow
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        issue_pair(&user, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let claims = decode_claims(token, &self.config)?;
        if claims.kind != TOKEN_KIND_ACCESS {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }
}
