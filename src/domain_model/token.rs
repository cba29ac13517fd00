use super::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub subject: UserId,
    pub kind: TokenKind,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// Key namespaces in the session store.
///
/// Markers live at `{namespace}:{subject}:{token}`, cached identities at
/// `{identity}:{subject}`. Subject scopes always end with `:` so that subject `4`
/// never matches keys of subject `42`.
#[derive(Debug, Clone)]
pub struct KeyLayout {
    pub access_prefix: String,
    pub refresh_prefix: String,
    pub identity_prefix: String,
}

impl Default for KeyLayout {
    fn default() -> Self {
        KeyLayout {
            access_prefix: "access".to_string(),
            refresh_prefix: "refresh".to_string(),
            identity_prefix: "identity".to_string(),
        }
    }
}

impl KeyLayout {
    pub fn namespace(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Access => &self.access_prefix,
            TokenKind::Refresh => &self.refresh_prefix,
        }
    }

    pub fn marker(&self, kind: TokenKind, subject: UserId, token: &str) -> String {
        format!("{}:{}:{}", self.namespace(kind), subject, token)
    }

    pub fn subject_scope(&self, kind: TokenKind, subject: UserId) -> String {
        format!("{}:{}:", self.namespace(kind), subject)
    }

    pub fn identity(&self, subject: UserId) -> String {
        format!("{}:{}", self.identity_prefix, subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_scope_does_not_cover_longer_ids() {
        let keys = KeyLayout::default();
        let scope = keys.subject_scope(TokenKind::Access, UserId(4));
        let other = keys.marker(TokenKind::Access, UserId(42), "tok");

        assert_eq!(scope, "access:4:");
        assert!(!other.starts_with(&scope));
        assert!(keys
            .marker(TokenKind::Access, UserId(4), "tok")
            .starts_with(&scope));
    }

    #[test]
    fn namespaces_stay_distinct() {
        let keys = KeyLayout::default();
        let access = keys.marker(TokenKind::Access, UserId(1), "t");
        let refresh = keys.marker(TokenKind::Refresh, UserId(1), "t");

        assert_ne!(access, refresh);
        assert_eq!(keys.identity(UserId(1)), "identity:1");
    }
}
