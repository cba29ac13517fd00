use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub keys: KeyLayout,
}

impl TokenSettings {
    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }
}

pub struct RealTokenService {
    store: Arc<dyn KvStore>,
    codec: Arc<dyn TokenCodec>,
    clock: Arc<dyn Clock>,
    settings: TokenSettings,
}

impl RealTokenService {
    pub fn new(
        store: Arc<dyn KvStore>,
        codec: Arc<dyn TokenCodec>,
        clock: Arc<dyn Clock>,
        settings: TokenSettings,
    ) -> Self {
        Self {
            store,
            codec,
            clock,
            settings,
        }
    }

    fn expiry(issued_at: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, AuthError> {
        i64::try_from(ttl.as_secs())
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .ok_or_else(|| AuthError::InternalError(format!("token ttl out of range: {ttl:?}")))
    }

    async fn issue(
        &self,
        kind: TokenKind,
        subject: UserId,
        multi_login: bool,
    ) -> Result<IssuedToken, AuthError> {
        let ttl = self.settings.ttl(kind);
        let issued_at = self.clock.now();
        let expires_at = Self::expiry(issued_at, ttl)?;
        let token = self.codec.encode(kind, subject, issued_at, expires_at)?;

        if !multi_login {
            let scope = self.settings.keys.subject_scope(kind, subject);
            let removed = self.store.delete_prefix(&scope, None).await?;
            if removed > 0 {
                debug!(%subject, %kind, removed, "single-login policy revoked previous sessions");
            }
        }

        self.record(kind, subject, token, expires_at).await
    }

    /// Sign a token and write its marker without touching existing sessions.
    async fn mint(&self, kind: TokenKind, subject: UserId) -> Result<IssuedToken, AuthError> {
        let issued_at = self.clock.now();
        let expires_at = Self::expiry(issued_at, self.settings.ttl(kind))?;
        let token = self.codec.encode(kind, subject, issued_at, expires_at)?;
        self.record(kind, subject, token, expires_at).await
    }

    async fn record(
        &self,
        kind: TokenKind,
        subject: UserId,
        token: String,
        expires_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let key = self.settings.keys.marker(kind, subject, &token);
        let ttl = self.settings.ttl(kind).as_secs().max(1);
        self.store.set_ex(&key, &token, ttl).await?;
        Ok(IssuedToken { token, expires_at })
    }

    async fn forget(&self, subject: UserId, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            warn!(%subject, error = %e, "failed to delete rotated token marker");
        }
    }
}

#[async_trait::async_trait]
impl TokenService for RealTokenService {
    async fn issue_access_token(
        &self,
        subject: UserId,
        multi_login: bool,
    ) -> Result<IssuedToken, AuthError> {
        self.issue(TokenKind::Access, subject, multi_login).await
    }

    async fn issue_refresh_token(
        &self,
        subject: UserId,
        multi_login: bool,
    ) -> Result<IssuedToken, AuthError> {
        self.issue(TokenKind::Refresh, subject, multi_login).await
    }

    async fn refresh(
        &self,
        subject: UserId,
        old_access_token: &str,
        refresh_token: &str,
        multi_login: bool,
    ) -> Result<TokenPair, AuthError> {
        let claims = self
            .codec
            .decode(TokenKind::Refresh, refresh_token, self.clock.now())?;
        if claims.subject != subject {
            warn!(%subject, token_subject = %claims.subject, "refresh token subject mismatch");
            return Err(AuthError::TokenInvalid);
        }

        let refresh_key = self
            .settings
            .keys
            .marker(TokenKind::Refresh, subject, refresh_token);
        match self.store.get(&refresh_key).await? {
            Some(stored) if stored == refresh_token => {}
            _ => {
                debug!(%subject, "refresh marker missing or mismatched");
                return Err(AuthError::TokenInvalid);
            }
        }

        // Mint both before touching anything old: on failure the old pair still works.
        let access = self.mint(TokenKind::Access, subject).await?;
        let refresh = match self.mint(TokenKind::Refresh, subject).await {
            Ok(refresh) => refresh,
            Err(e) => {
                let orphan = self
                    .settings
                    .keys
                    .marker(TokenKind::Access, subject, &access.token);
                self.forget(subject, &orphan).await;
                return Err(e);
            }
        };

        let old_access_key = self
            .settings
            .keys
            .marker(TokenKind::Access, subject, old_access_token);
        self.forget(subject, &old_access_key).await;
        self.forget(subject, &refresh_key).await;

        if !multi_login {
            for (kind, keep) in [
                (TokenKind::Access, &access.token),
                (TokenKind::Refresh, &refresh.token),
            ] {
                if let Err(e) = self.revoke_all_except(subject, kind, Some(keep)).await {
                    warn!(%subject, %kind, error = %e, "failed to revoke sessions after rotation");
                }
            }
        }

        Ok(TokenPair { access, refresh })
    }

    async fn revoke(
        &self,
        subject: UserId,
        access_token: &str,
        refresh_token: Option<&str>,
        multi_login: bool,
    ) -> Result<(), AuthError> {
        let keys = &self.settings.keys;
        if multi_login {
            self.store
                .delete(&keys.marker(TokenKind::Access, subject, access_token))
                .await?;
            if let Some(refresh_token) = refresh_token {
                self.store
                    .delete(&keys.marker(TokenKind::Refresh, subject, refresh_token))
                    .await?;
            }
        } else {
            for kind in [TokenKind::Access, TokenKind::Refresh] {
                self.store
                    .delete_prefix(&keys.subject_scope(kind, subject), None)
                    .await?;
            }
        }
        info!(%subject, multi_login, "session revoked");
        Ok(())
    }

    async fn revoke_all_except(
        &self,
        subject: UserId,
        kind: TokenKind,
        keep: Option<&str>,
    ) -> Result<(), AuthError> {
        let keys = &self.settings.keys;
        let exclude = keep.map(|token| keys.marker(kind, subject, token));
        let removed = self
            .store
            .delete_prefix(&keys.subject_scope(kind, subject), exclude.as_deref())
            .await?;
        info!(%subject, %kind, removed, kept = keep.is_some(), "revoked sessions");
        Ok(())
    }
}
