use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::SigningSecret;
use crate::repos::post_repo::ResourceOwnerLookup;
use crate::services::auth::{access_token, bearer, error::AuthError};

/// Authentication and ownership checks for protected endpoints.
///
/// `authenticate` alone covers endpoints that act on the caller's own identity.
/// `authorize` adds the owner comparison for mutations on a specific resource.
#[derive(Clone, Debug)]
pub struct AuthorizationGuard {
    secret: SigningSecret,
}

impl AuthorizationGuard {
    pub fn new(secret: SigningSecret) -> Self {
        Self { secret }
    }

    pub fn secret(&self) -> &SigningSecret {
        &self.secret
    }

    /// Resolve the caller from a raw `Authorization` header value.
    pub fn authenticate(&self, header: Option<&str>) -> Result<Uuid, AuthError> {
        let token = bearer::extract_bearer(header).map_err(|e| {
            debug!(error = %e, "Rejected authorization header");
            AuthError::from(e)
        })?;

        access_token::validate(token, &self.secret).map_err(|e| {
            warn!(error = %e, "Access token validation failed");
            AuthError::from(e)
        })
    }

    /// Allow `caller` to act on `resource_id` only if they own it.
    ///
    /// A missing resource is reported before any owner comparison.
    pub async fn check_owner<L>(
        &self,
        caller: Uuid,
        lookup: &L,
        resource_id: i64,
    ) -> Result<(), AuthError>
    where
        L: ResourceOwnerLookup + ?Sized,
    {
        let owner = lookup.resource_owner(resource_id).await.map_err(|e| {
            error!(resource_id, error = %e, "Failed to look up resource owner");
            AuthError::Internal(e.to_string())
        })?;

        let Some(owner) = owner else {
            return Err(AuthError::NotFound);
        };

        if owner != caller {
            warn!(caller = %caller, owner = %owner, resource_id, "Ownership check failed");
            return Err(AuthError::Forbidden);
        }

        Ok(())
    }

    /// Full check for a resource mutation: header, token, existence, ownership.
    pub async fn authorize<L>(
        &self,
        header: Option<&str>,
        lookup: &L,
        resource_id: i64,
    ) -> Result<Uuid, AuthError>
    where
        L: ResourceOwnerLookup + ?Sized,
    {
        let caller = self.authenticate(header)?;
        self.check_owner(caller, lookup, resource_id).await?;
        Ok(caller)
    }
}
