//! Authentication for the two identity spaces: staff (dashboard, role-bearing)
//! and app users (customer reservation site). Both use HS256 bearer tokens
//! signed with the same secret but distinct audiences, so a customer token can
//! never be replayed against a staff endpoint.

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::models::Role;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Token audience for dashboard (staff) sessions.
pub const STAFF_AUDIENCE: &str = "mesa:staff";
/// Token audience for customer app sessions.
pub const APP_AUDIENCE: &str = "mesa:app";

/// Claim structure shared by both token kinds. `role` is only present on
/// staff tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Wrong token audience")]
    WrongAudience,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "AUTH_MISSING_TOKEN"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "AUTH_INVALID_TOKEN"),
            Self::TokenExpired => (StatusCode::UNAUTHORIZED, "AUTH_TOKEN_EXPIRED"),
            Self::WrongAudience => (StatusCode::UNAUTHORIZED, "AUTH_WRONG_AUDIENCE"),
            Self::TokenCreation(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_TOKEN_CREATION")
            }
            Self::InsufficientPermissions => {
                (StatusCode::FORBIDDEN, "AUTH_INSUFFICIENT_PERMISSIONS")
            }
        };

        let body = json!({
            "error": { "code": code, "message": self.to_string() }
        });
        (status, Json(body)).into_response()
    }
}

/// Issues and verifies bearer tokens; hashes and checks passwords.
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_secs: u64,
}

impl AuthService {
    pub fn new(secret: &str, expiration_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_secs,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(&cfg.jwt_secret, cfg.jwt_expiration)
    }

    pub fn create_staff_token(
        &self,
        user_id: Uuid,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<String, AuthError> {
        self.create_token(user_id, name, email, Some(role), STAFF_AUDIENCE)
    }

    pub fn create_app_token(
        &self,
        user_id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<String, AuthError> {
        self.create_token(user_id, name, email, None, APP_AUDIENCE)
    }

    fn create_token(
        &self,
        user_id: Uuid,
        name: &str,
        email: &str,
        role: Option<Role>,
        audience: &str,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role: role.map(|r| r.to_string()),
            aud: audience.to_string(),
            iat: now,
            exp: now + self.expiration_secs as i64,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    pub fn verify(&self, token: &str, audience: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidAudience => AuthError::WrongAudience,
                _ => AuthError::InvalidToken,
            })
    }
}

/// Hashes a password with argon2 and a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::HashError(e.to_string()))
}

/// Verifies a password against a stored argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash).map_err(|e| ServiceError::HashError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn bearer_token(parts: &Parts) -> Result<String, AuthError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string())
        .ok_or(AuthError::MissingToken)
}

/// Authenticated staff member, extracted from a staff-audience bearer token.
#[derive(Debug, Clone)]
pub struct AuthStaff {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AuthStaff {
    /// Guard for admin-only handlers.
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "this operation requires the ADMIN role".to_string(),
            ))
        }
    }
}

/// Authenticated customer, extracted from an app-audience bearer token.
#[derive(Debug, Clone)]
pub struct AuthCustomer {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthStaff
where
    S: Send + Sync,
    Arc<AuthService>: axum::extract::FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth: Arc<AuthService> = axum::extract::FromRef::from_ref(state);
        let token = bearer_token(parts)?;
        let claims = auth.verify(&token, STAFF_AUDIENCE)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let role = claims
            .role
            .as_deref()
            .and_then(|r| Role::from_str(r).ok())
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthStaff {
            user_id,
            name: claims.name,
            email: claims.email,
            role,
        })
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthCustomer
where
    S: Send + Sync,
    Arc<AuthService>: axum::extract::FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth: Arc<AuthService> = axum::extract::FromRef::from_ref(state);
        let token = bearer_token(parts)?;
        let claims = auth.verify(&token, APP_AUDIENCE)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthCustomer {
            user_id,
            name: claims.name,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new("a_test_secret_that_is_long_enough_for_hs256", 3600)
    }

    #[test]
    fn staff_token_round_trips_with_role() {
        let svc = service();
        let id = Uuid::new_v4();
        let token = svc
            .create_staff_token(id, "Ana", "ana@mesa.rest", Role::Garcom)
            .unwrap();

        let claims = svc.verify(&token, STAFF_AUDIENCE).unwrap();
        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.role.as_deref(), Some("GARCOM"));
    }

    #[test]
    fn app_token_is_rejected_on_staff_endpoints() {
        let svc = service();
        let token = svc
            .create_app_token(Uuid::new_v4(), "Bruno", "bruno@example.com")
            .unwrap();

        let err = svc.verify(&token, STAFF_AUDIENCE).unwrap_err();
        assert!(matches!(
            err,
            AuthError::WrongAudience | AuthError::InvalidToken
        ));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("segredo123").unwrap();
        assert!(verify_password("segredo123", &hash).unwrap());
        assert!(!verify_password("errado", &hash).unwrap());
    }
}
