use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use ring::hmac;
use serde_json::json;
use std::sync::Arc;
use crate::{AppState, Config};

const BEARER_PREFIX: &str = "Bearer ";

// Credential tags are domain-separated from token signatures.
fn credential_message(kind: &str, value: &str) -> Vec<u8> {
    format!("{}:{}", kind, value).into_bytes()
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing token")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    Expired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let msg = match self {
            AuthError::InvalidCredentials => self.to_string(),
            _ => "Unauthorized".to_string(),
        };

        (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg }))).into_response()
    }
}

/// Issues and checks the opaque tokens guarding the API.
pub trait Authenticator: Send + Sync {
    /// Returns a fresh token when `username`/`password` match the admin identity.
    fn authenticate(&self, username: &str, password: &str) -> Result<String, AuthError>;

    fn verify(&self, token: &str) -> Result<(), AuthError>;
}

/// Stateless tokens of the form `<hex(username)>.<issued_at>.<hex(hmac)>`,
/// signed with HMAC-SHA256 over `<username>.<issued_at>`.
pub struct HmacAuthenticator {
    username: String,
    username_tag: hmac::Tag,
    password_tag: hmac::Tag,
    key: hmac::Key,
    ttl_secs: Option<i64>,
}

impl HmacAuthenticator {
    pub fn new(username: &str, password: &str, secret: &str, ttl_secs: Option<u64>) -> Self {
        let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
        let username_tag = hmac::sign(&key, &credential_message("username", username));
        let password_tag = hmac::sign(&key, &credential_message("password", password));

        Self {
            username: username.to_string(),
            username_tag,
            password_tag,
            key,
            ttl_secs: ttl_secs.map(|s| i64::try_from(s).unwrap_or(i64::MAX)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.admin_username,
            &config.admin_password,
            &config.token_secret,
            config.token_ttl_secs,
        )
    }

    /// Constant-time match of a submitted username against the admin identity.
    fn is_admin(&self, username: &str) -> bool {
        hmac::verify(&self.key, &credential_message("username", username), self.username_tag.as_ref()).is_ok()
    }

    fn sign(&self, username: &str, issued_at: i64) -> hmac::Tag {
        hmac::sign(&self.key, format!("{}.{}", username, issued_at).as_bytes())
    }

    pub(crate) fn issue_at(&self, issued_at: i64) -> String {
        let tag = self.sign(&self.username, issued_at);
        format!(
            "{}.{}.{}",
            hex::encode(&self.username),
            issued_at,
            hex::encode(tag.as_ref())
        )
    }

    pub(crate) fn verify_at(&self, token: &str, now: i64) -> Result<(), AuthError> {
        let mut parts = token.splitn(3, '.');
        let (Some(user_hex), Some(issued), Some(sig_hex)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(AuthError::InvalidToken);
        };

        let username = hex::decode(user_hex)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or(AuthError::InvalidToken)?;
        let issued_at: i64 = issued.parse().map_err(|_| AuthError::InvalidToken)?;
        let signature = hex::decode(sig_hex).map_err(|_| AuthError::InvalidToken)?;

        hmac::verify(&self.key, format!("{}.{}", username, issued_at).as_bytes(), &signature)
            .map_err(|_| AuthError::InvalidToken)?;

        // A token signed with our key but for a since-renamed admin is stale.
        if !self.is_admin(&username) {
            return Err(AuthError::InvalidToken);
        }

        if let Some(ttl) = self.ttl_secs {
            if now.saturating_sub(issued_at) > ttl {
                return Err(AuthError::Expired);
            }
        }

        Ok(())
    }
}

impl Authenticator for HmacAuthenticator {
    fn authenticate(&self, username: &str, password: &str) -> Result<String, AuthError> {
        // Both checks always run so timing does not reveal which one failed.
        let username_ok = self.is_admin(username);
        let password_ok = hmac::verify(
            &self.key,
            &credential_message("password", password),
            self.password_tag.as_ref(),
        )
        .is_ok();
        if !(username_ok && password_ok) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(self.issue_at(chrono::Utc::now().timestamp()))
    }

    fn verify(&self, token: &str) -> Result<(), AuthError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }
}

/// Reads the raw token from the `Authorization` header. A `Bearer ` prefix is tolerated.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?
        .trim();

    let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value);
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

pub async fn require_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let result = extract_token(request.headers()).and_then(|token| state.auth.verify(token));

    if let Err(err) = result {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            reason = %err,
            "Rejected unauthenticated request"
        );
        return Err(err);
    }

    Ok(next.run(request).await)
}
