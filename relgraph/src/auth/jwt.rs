//! HS256 bearer token verification

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{AuthContext, AuthGate};
use crate::config::AuthConfig;
use crate::storage::{DocumentStore, EntityKind};
use crate::{RelgraphError, Result};

const BEARER_SCHEME: &str = "Bearer";

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// User ID
    pub id: String,
    pub user_name: String,
    pub email: String,
    /// Expiration timestamp
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

/// Verifies HS256 tokens and checks that their user still exists
#[derive(Clone)]
pub struct JwtAuthGate {
    key: DecodingKey,
    validation: Validation,
    store: Arc<dyn DocumentStore>,
}

impl JwtAuthGate {
    pub fn new(config: &AuthConfig, store: Arc<dyn DocumentStore>) -> Result<Self> {
        if config.secret.trim().is_empty() {
            return Err(RelgraphError::Configuration(
                "auth secret cannot be empty".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;

        Ok(Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            store,
        })
    }

    fn decode_claims(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| RelgraphError::Authentication(format!("Invalid token: {}", e)))
    }
}

impl fmt::Debug for JwtAuthGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtAuthGate")
            .field("algorithms", &self.validation.algorithms)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

/// Accepts `Bearer <token>` (scheme matched case-insensitively) or a bare token
fn extract_token(credential: &str) -> Result<&str> {
    let credential = credential.trim();
    let token = match credential.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => rest.trim(),
        _ => credential,
    };
    if token.is_empty() || token.contains(' ') {
        return Err(RelgraphError::Authentication(
            "Missing or malformed bearer token".to_string(),
        ));
    }
    Ok(token)
}

#[async_trait]
impl AuthGate for JwtAuthGate {
    #[instrument(skip_all)]
    async fn authenticate(&self, credential: &str) -> Result<AuthContext> {
        let claims = self.decode_claims(extract_token(credential)?)?;

        let exists = self
            .store
            .find_by_id(EntityKind::User, &claims.id)
            .await?
            .is_some();
        if !exists {
            warn!(user = %claims.id, "Token subject no longer exists");
            return Err(RelgraphError::Authentication(
                "Token subject does not exist".to_string(),
            ));
        }

        debug!(user = %claims.id, "Authenticated");
        Ok(AuthContext {
            owner_id: claims.id,
            user_name: claims.user_name,
            email: claims.email,
        })
    }
}
