//! Authentication
//!
//! An [`AuthGate`] turns a request credential into the id of an existing
//! user. Relation operations only ever see the resulting owner id.

mod jwt;

pub use jwt::{Claims, JwtAuthGate};

use async_trait::async_trait;
use std::fmt::Debug;

use crate::Result;

/// Identity of an authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub owner_id: String,
    pub user_name: String,
    pub email: String,
}

/// Resolves a credential to an authenticated owner
#[async_trait]
pub trait AuthGate: Send + Sync + Debug {
    /// Verify `credential` (a raw token or an `Authorization` header value).
    ///
    /// Fails with [`RelgraphError::Authentication`](crate::RelgraphError::Authentication).
    async fn authenticate(&self, credential: &str) -> Result<AuthContext>;
}
