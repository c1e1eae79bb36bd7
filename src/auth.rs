//! Bearer-token authorization. Token issuance lives elsewhere; this service
//! only maps a presented token to the identity it was issued for.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::collections::HashMap;

use crate::{
    config::TokenConfig,
    error::AppError,
    security,
    state::AppState,
    store::{NamespaceKey, RootPath},
};

/// The application a token was issued to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub app_id: String,
    pub drive_access: bool,
}

impl Identity {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            drive_access: false,
        }
    }

    pub fn with_drive_access(mut self) -> Self {
        self.drive_access = true;
        self
    }

    /// The namespace `root` refers to for this identity.
    pub fn namespace(&self, root: RootPath) -> Result<NamespaceKey, AppError> {
        match root {
            RootPath::App => Ok(NamespaceKey::app(self.app_id.clone())),
            RootPath::Drive if self.drive_access => Ok(NamespaceKey::drive()),
            RootPath::Drive => {
                tracing::warn!(app_id = %self.app_id, "drive access denied");
                Err(AppError::Unauthorized)
            }
        }
    }
}

pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str) -> Option<Identity>;
}

/// Validator over a fixed token table. Only SHA-256 digests of the tokens
/// are kept.
#[derive(Debug, Default, Clone)]
pub struct StaticTokenValidator {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(tokens: &[TokenConfig]) -> Self {
        tokens.iter().fold(Self::new(), |validator, entry| {
            let mut identity = Identity::new(entry.app_id.clone());
            identity.drive_access = entry.drive_access;
            validator.with_token(&entry.token, identity)
        })
    }

    pub fn with_token(mut self, token: &str, identity: Identity) -> Self {
        self.tokens
            .insert(security::calculate_checksum(token.as_bytes()), identity);
        self
    }
}

impl TokenValidator for StaticTokenValidator {
    fn validate(&self, token: &str) -> Option<Identity> {
        self.tokens
            .get(&security::calculate_checksum(token.as_bytes()))
            .cloned()
    }
}

/// Extract the token of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Extractor for handlers that require a valid bearer token. Rejects with
/// 401 before any other request validation happens.
#[derive(Debug, Clone)]
pub struct Authorized(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for Authorized {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            tracing::debug!("request without bearer token");
            return Err(AppError::Unauthorized);
        };
        match state.tokens.validate(token) {
            Some(identity) => Ok(Authorized(identity)),
            None => {
                tracing::warn!("rejected invalid bearer token");
                Err(AppError::Unauthorized)
            }
        }
    }
}
