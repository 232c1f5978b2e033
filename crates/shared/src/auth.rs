//! Authentication claims carried by access tokens.
//!
//! Tokens are issued by the identity service; this workspace only verifies them
//! and uses the subject as the owner every wallet and allocation is scoped to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::OwnerId;

/// Token type accepted on the API.
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (owner ID).
    pub sub: Uuid,
    /// Token type, `"access"` for API tokens.
    pub typ: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates access-token claims for an owner.
    #[must_use]
    pub fn new(owner_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: owner_id,
            typ: ACCESS_TOKEN_TYPE.to_string(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the owner the request acts for.
    #[must_use]
    pub const fn owner_id(&self) -> OwnerId {
        OwnerId::from_uuid(self.sub)
    }

    /// Returns true if this is an access token.
    #[must_use]
    pub fn is_access(&self) -> bool {
        self.typ == ACCESS_TOKEN_TYPE
    }
}
