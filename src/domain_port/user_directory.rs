use super::StoreError;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

/// Read side of the user table. This is all the auth core is allowed to see.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
}

/// Write side of the user table, used by account management. Update methods
/// return the number of affected rows.
#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<UserId, StoreError>;

    async fn update_profile(
        &self,
        id: UserId,
        username: &str,
        email: &str,
    ) -> Result<u64, StoreError>;

    async fn update_avatar(&self, id: UserId, avatar: &str) -> Result<u64, StoreError>;

    async fn set_password(&self, id: UserId, password_hash: &str) -> Result<u64, StoreError>;

    async fn set_superuser(&self, id: UserId, is_superuser: bool) -> Result<u64, StoreError>;

    async fn set_status(&self, id: UserId, status: AccountStatus) -> Result<u64, StoreError>;

    async fn set_multi_login(&self, id: UserId, multi_login: bool) -> Result<u64, StoreError>;

    async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<u64, StoreError>;

    async fn delete(&self, id: UserId) -> Result<u64, StoreError>;
}
