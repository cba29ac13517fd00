use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;
use std::time::Duration;

pub struct RealIdentityResolver {
    store: Arc<dyn KvStore>,
    directory: Arc<dyn UserDirectory>,
    codec: Arc<dyn TokenCodec>,
    clock: Arc<dyn Clock>,
    keys: KeyLayout,
    identity_ttl: Duration,
}

impl RealIdentityResolver {
    pub fn new(
        store: Arc<dyn KvStore>,
        directory: Arc<dyn UserDirectory>,
        codec: Arc<dyn TokenCodec>,
        clock: Arc<dyn Clock>,
        keys: KeyLayout,
        identity_ttl: Duration,
    ) -> Self {
        Self {
            store,
            directory,
            codec,
            clock,
            keys,
            identity_ttl,
        }
    }

    async fn cached(&self, key: &str) -> Result<Option<CurrentUser>, AuthError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<CurrentUser>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(key, error = %e, "discarding unreadable cached identity");
                Ok(None)
            }
        }
    }

    /// Best effort: the caller already has a valid identity either way.
    async fn remember(&self, key: &str, user: &CurrentUser) {
        let json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                warn!(subject = %user.id, error = %e, "failed to serialize identity");
                return;
            }
        };
        if let Err(e) = self
            .store
            .set_ex(key, &json, self.identity_ttl.as_secs().max(1))
            .await
        {
            warn!(subject = %user.id, error = %e, "failed to cache identity");
        }
    }
}

#[async_trait::async_trait]
impl IdentityResolver for RealIdentityResolver {
    async fn resolve(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let claims = self
            .codec
            .decode(TokenKind::Access, token, self.clock.now())
            .inspect_err(|e| debug!(kind = e.kind(), "access token rejected"))?;
        let subject = claims.subject;

        let marker = self.keys.marker(TokenKind::Access, subject, token);
        if self.store.get(&marker).await?.is_none() {
            debug!(%subject, kind = "token_revoked", "no liveness marker");
            return Err(AuthError::TokenRevoked);
        }

        let cache_key = self.keys.identity(subject);
        if let Some(user) = self.cached(&cache_key).await? {
            return Ok(user);
        }

        let record = self
            .directory
            .find_by_id(subject)
            .await?
            .ok_or_else(|| {
                debug!(%subject, kind = "account_not_found", "token subject not in directory");
                AuthError::AccountNotFound
            })?;
        if !record.status.is_enabled() {
            debug!(%subject, kind = "account_locked", "token subject is disabled");
            return Err(AuthError::AccountLocked);
        }

        let user = record.to_identity();
        self.remember(&cache_key, &user).await;
        Ok(user)
    }

    async fn invalidate(&self, subject: UserId) -> Result<(), AuthError> {
        self.store.delete(&self.keys.identity(subject)).await?;
        debug!(%subject, "identity cache invalidated");
        Ok(())
    }
}
