//! Authorization for the storefront
//!
//! Token verification lives outside this crate. The service only needs to
//! know who is calling, so authentication is modelled as an injected
//! [`AuthProvider`] that turns request headers into an [`AuthContext`]:
//! - Anonymous callers
//! - Authenticated users with roles
//! - Administrators

use crate::config::{AuthConfig, TokenRole};
use crate::core::error::{StoreError, StoreResult};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use std::collections::HashMap;
use uuid::Uuid;

/// Role name that grants administrative access
pub const ADMIN_ROLE: &str = "admin";

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Authenticated user
    User { user_id: Uuid, roles: Vec<String> },

    /// Store administrator
    Admin { admin_id: Uuid },

    /// No authentication (public access)
    Anonymous,
}

impl AuthContext {
    /// Shorthand for a user without roles
    pub fn user(user_id: Uuid) -> Self {
        AuthContext::User {
            user_id,
            roles: Vec::new(),
        }
    }

    /// Check if context represents an admin
    ///
    /// A user holding the `admin` role counts as an admin.
    pub fn is_admin(&self) -> bool {
        match self {
            AuthContext::Admin { .. } => true,
            AuthContext::User { roles, .. } => roles.iter().any(|r| r == ADMIN_ROLE),
            AuthContext::Anonymous => false,
        }
    }

    /// Get the id of the calling principal if available
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id, .. } => Some(*user_id),
            AuthContext::Admin { admin_id } => Some(*admin_id),
            AuthContext::Anonymous => None,
        }
    }

    /// Whether the caller owns a resource belonging to `owner` or is an admin
    pub fn can_access(&self, owner: Uuid) -> bool {
        self.is_admin() || self.user_id() == Some(owner)
    }
}

/// Access rule guarding a storefront operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// The principal owning a resource, or an admin
    OwnerOrAdmin(Uuid),

    /// Admin only
    AdminOnly,
}

impl AuthPolicy {
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::OwnerOrAdmin(owner) => context.can_access(*owner),
            AuthPolicy::AdminOnly => context.is_admin(),
        }
    }

    /// Like [`check`](Self::check), but fails with `Unauthorized` naming `action`
    pub fn require(&self, context: &AuthContext, action: &str) -> StoreResult<()> {
        if self.check(context) {
            Ok(())
        } else {
            Err(StoreError::unauthorized(format!("Not authorized to {}", action)))
        }
    }
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract auth context from request headers
    ///
    /// Missing credentials yield [`AuthContext::Anonymous`]; credentials that
    /// are present but not recognised are an error.
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext>;
}

/// Default no-auth provider (for development)
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn extract_context(&self, _headers: &HeaderMap) -> Result<AuthContext> {
        Ok(AuthContext::Anonymous)
    }
}

/// Resolves `Authorization: Bearer <token>` against a fixed token table
///
/// Issuing and verifying real tokens belongs to the identity service in
/// front of the storefront; this provider covers trusted deployments and
/// tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthProvider {
    tokens: HashMap<String, AuthContext>,
}

impl StaticTokenAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for a regular user
    pub fn with_user(mut self, token: impl Into<String>, user_id: Uuid) -> Self {
        self.tokens.insert(token.into(), AuthContext::user(user_id));
        self
    }

    /// Register a token for an administrator
    pub fn with_admin(mut self, token: impl Into<String>, admin_id: Uuid) -> Self {
        self.tokens
            .insert(token.into(), AuthContext::Admin { admin_id });
        self
    }

    /// Build the provider from the `auth` configuration section
    pub fn from_config(config: &AuthConfig) -> Self {
        config
            .tokens
            .iter()
            .fold(Self::new(), |provider, entry| match entry.role {
                TokenRole::User => provider.with_user(entry.token.clone(), entry.user_id),
                TokenRole::Admin => provider.with_admin(entry.token.clone(), entry.user_id),
            })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuthProvider {
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext> {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return Ok(AuthContext::Anonymous);
        };

        let value = value
            .to_str()
            .map_err(|_| anyhow!("Authorization header is not valid ASCII"))?;

        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| anyhow!("Authorization header must use the Bearer scheme"))?
            .trim();

        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| anyhow!("Not authorized to access this route"))
    }
}
