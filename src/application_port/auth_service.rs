use crate::domain_model::*;
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token invalid")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("token revoked")]
    TokenRevoked,
    #[error("account not found")]
    AccountNotFound,
    #[error("account locked")]
    AccountLocked,
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Errors that must reach the client as one indistinguishable
    /// "unauthenticated" outcome.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::TokenInvalid
                | AuthError::TokenExpired
                | AuthError::TokenRevoked
                | AuthError::AccountNotFound
                | AuthError::AccountLocked
        )
    }

    /// Stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::TokenInvalid => "token_invalid",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenRevoked => "token_revoked",
            AuthError::AccountNotFound => "account_not_found",
            AuthError::AccountLocked => "account_locked",
            AuthError::StoreUnavailable(_) => "store_unavailable",
            AuthError::InternalError(_) => "internal",
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::StoreUnavailable(err.to_string())
    }
}

// region token primitives

pub trait TokenCodec: Send + Sync {
    fn encode(
        &self,
        kind: TokenKind,
        subject: UserId,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AuthError>;

    /// Verify signature and expiry against `now`. A token of the other kind is
    /// rejected as invalid.
    fn decode(
        &self,
        kind: TokenKind,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Fresh random salt for a new account.
    fn generate_salt(&self) -> String;
    async fn hash_password(&self, password: &str, salt: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

// endregion

// region session core

/// Mints and revokes tokens. The only writer of liveness markers.
#[async_trait::async_trait]
pub trait TokenService: Send + Sync {
    async fn issue_access_token(
        &self,
        subject: UserId,
        multi_login: bool,
    ) -> Result<IssuedToken, AuthError>;

    async fn issue_refresh_token(
        &self,
        subject: UserId,
        multi_login: bool,
    ) -> Result<IssuedToken, AuthError>;

    /// Rotate a token pair. The old markers are gone once this returns `Ok`.
    async fn refresh(
        &self,
        subject: UserId,
        old_access_token: &str,
        refresh_token: &str,
        multi_login: bool,
    ) -> Result<TokenPair, AuthError>;

    async fn revoke(
        &self,
        subject: UserId,
        access_token: &str,
        refresh_token: Option<&str>,
        multi_login: bool,
    ) -> Result<(), AuthError>;

    /// Delete every marker of `kind` for `subject` except the one for `keep`.
    /// `keep = None` clears the whole namespace.
    async fn revoke_all_except(
        &self,
        subject: UserId,
        kind: TokenKind,
        keep: Option<&str>,
    ) -> Result<(), AuthError>;

    async fn revoke_all(&self, subject: UserId) -> Result<(), AuthError> {
        self.revoke_all_except(subject, TokenKind::Access, None)
            .await?;
        self.revoke_all_except(subject, TokenKind::Refresh, None)
            .await
    }
}

/// Turns a bearer token into a trusted identity. The only reader and writer of
/// the identity cache.
#[async_trait::async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<CurrentUser, AuthError>;

    /// Drop the cached snapshot so the next request reloads from the directory.
    async fn invalidate(&self, subject: UserId) -> Result<(), AuthError>;
}

// endregion

// region auth service

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
    /// Client address and agent, recorded in the login log.
    pub ip: String,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: CurrentUser,
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError>;

    async fn refresh(
        &self,
        context: &RequestContext,
        refresh_token: Option<&str>,
    ) -> Result<TokenPair, AuthError>;

    async fn logout(&self, context: &RequestContext) -> Result<(), AuthError>;
}

// endregion
