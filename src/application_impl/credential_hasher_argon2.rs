use crate::application_port::{AuthError, CredentialHasher};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// Argon2id with library defaults. The salt is generated once per account and
/// stored next to the PHC hash; password resets reuse it.
pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    fn generate_salt(&self) -> String {
        SaltString::generate(&mut OsRng).as_str().to_string()
    }

    async fn hash_password(&self, password: &str, salt: &str) -> Result<String, AuthError> {
        let salt = SaltString::from_b64(salt)
            .map_err(|e| AuthError::InternalError(format!("invalid salt: {e}")))?;
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| AuthError::InternalError(format!("invalid PHC hash: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::InternalError(format!("verify error: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn verify_accepts_only_the_original_password() {
        let hasher = Argon2PasswordHasher;
        let salt = hasher.generate_salt();
        let hash = hasher.hash_password("hunter22", &salt).await.unwrap();

        assert!(hasher.verify_password("hunter22", &hash).await.unwrap());
        assert!(!hasher.verify_password("hunter23", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn salts_differ_per_account() {
        let hasher = Argon2PasswordHasher;
        let a = hasher.generate_salt();
        let b = hasher.generate_salt();
        assert_ne!(a, b);

        let ha = hasher.hash_password("same", &a).await.unwrap();
        let hb = hasher.hash_password("same", &b).await.unwrap();
        assert_ne!(ha, hb);

        let again = hasher.hash_password("same", &a).await.unwrap();
        assert_eq!(ha, again);
    }

    #[tokio::test]
    async fn garbage_hash_is_an_error() {
        let hasher = Argon2PasswordHasher;
        let err = hasher.verify_password("x", "not-a-phc").await.unwrap_err();
        assert!(matches!(err, AuthError::InternalError(_)));
    }
}
