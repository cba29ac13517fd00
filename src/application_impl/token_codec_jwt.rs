use crate::application_port::{AuthError, TokenCodec};
use crate::domain_model::*;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub signing_key: Vec<u8>,
    /// Grace period on `exp`, in seconds.
    pub leeway_secs: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user id as string
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
    jti: String, // makes every token unique, even within one second
    typ: String,
}

/// HS256 JWTs. Expiry is checked against the caller's clock rather than the
/// library's, so tests can move time.
pub struct JwtHs256Codec {
    cfg: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(&cfg.signing_key);
        let decoding_key = DecodingKey::from_secret(&cfg.signing_key);
        JwtHs256Codec {
            cfg,
            encoding_key,
            decoding_key,
        }
    }

    #[inline]
    fn gen_jti() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn validation(&self) -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = false;
        v.set_audience(&[self.cfg.audience.clone()]);
        v.set_issuer(&[self.cfg.issuer.clone()]);
        v
    }
}

impl TokenCodec for JwtHs256Codec {
    fn encode(
        &self,
        kind: TokenKind,
        subject: UserId,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
            jti: Self::gen_jti(),
            typ: kind.as_str().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(e.to_string()))
    }

    fn decode(
        &self,
        kind: TokenKind,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation())
            .map_err(|_| AuthError::TokenInvalid)?;
        let claims = data.claims;

        if claims.typ != kind.as_str() {
            return Err(AuthError::TokenInvalid);
        }
        if claims.exp + self.cfg.leeway_secs <= now.timestamp() {
            return Err(AuthError::TokenExpired);
        }

        let subject = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::TokenInvalid)?;
        if subject.0 <= 0 {
            return Err(AuthError::TokenInvalid);
        }
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or(AuthError::TokenInvalid)?;

        Ok(TokenClaims {
            subject,
            kind,
            jti: claims.jti,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn codec(secret: &str) -> JwtHs256Codec {
        JwtHs256Codec::new(JwtConfig {
            issuer: "hintdesk.test".to_string(),
            audience: "hintdesk-client".to_string(),
            signing_key: secret.as_bytes().to_vec(),
            leeway_secs: 0,
        })
    }

    #[test]
    fn decodes_its_own_tokens() {
        let codec = codec("secret");
        let now = Utc::now();
        let token = codec
            .encode(TokenKind::Access, UserId(42), now, now + Duration::minutes(5))
            .unwrap();

        let claims = codec.decode(TokenKind::Access, &token, now).unwrap();
        assert_eq!(claims.subject, UserId(42));
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.expires_at.timestamp(), (now + Duration::minutes(5)).timestamp());
    }

    #[test]
    fn tokens_are_unique_within_the_same_second() {
        let codec = codec("secret");
        let now = Utc::now();
        let exp = now + Duration::minutes(5);
        let a = codec.encode(TokenKind::Access, UserId(1), now, exp).unwrap();
        let b = codec.encode(TokenKind::Access, UserId(1), now, exp).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn expired_is_distinguished_from_invalid() {
        let codec = codec("secret");
        let now = Utc::now();
        let token = codec
            .encode(TokenKind::Access, UserId(1), now, now + Duration::seconds(30))
            .unwrap();

        let later = now + Duration::seconds(31);
        assert!(matches!(
            codec.decode(TokenKind::Access, &token, later),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn rejects_foreign_signature_wrong_kind_and_garbage() {
        let ours = codec("secret");
        let theirs = codec("other-secret");
        let now = Utc::now();
        let exp = now + Duration::minutes(5);

        let foreign = theirs.encode(TokenKind::Access, UserId(1), now, exp).unwrap();
        assert!(matches!(
            ours.decode(TokenKind::Access, &foreign, now),
            Err(AuthError::TokenInvalid)
        ));

        let refresh = ours.encode(TokenKind::Refresh, UserId(1), now, exp).unwrap();
        assert!(matches!(
            ours.decode(TokenKind::Access, &refresh, now),
            Err(AuthError::TokenInvalid)
        ));

        assert!(matches!(
            ours.decode(TokenKind::Access, "not.a.jwt", now),
            Err(AuthError::TokenInvalid)
        ));
    }
}
