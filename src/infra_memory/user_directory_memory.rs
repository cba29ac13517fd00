use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

/// In-process user table. Implements both the read-only directory and the
/// write-side repo.
pub struct MemoryUserDirectory {
    users: Mutex<Vec<UserRecord>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::with_users(Vec::new())
    }

    pub fn with_users(users: Vec<UserRecord>) -> Self {
        MemoryUserDirectory {
            users: Mutex::new(users),
        }
    }

    fn users(&self) -> Result<MutexGuard<'_, Vec<UserRecord>>, StoreError> {
        self.users
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn update<F>(&self, id: UserId, apply: F) -> Result<u64, StoreError>
    where
        F: FnOnce(&mut UserRecord),
    {
        let mut users = self.users()?;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                apply(user);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

impl Default for MemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users()?.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .users()?
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users()?.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserDirectory {
    async fn create(&self, user: NewUser) -> Result<UserId, StoreError> {
        let mut users = self.users()?;
        if users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::Backend("duplicate username or email".to_string()));
        }
        let id = UserId(users.iter().map(|u| u.id.0).max().unwrap_or(0) + 1);
        users.push(UserRecord {
            id,
            uuid: user.uuid,
            username: user.username,
            password_hash: user.password_hash,
            salt: user.salt,
            email: user.email,
            is_superuser: user.is_superuser,
            status: user.status,
            is_multi_login: user.is_multi_login,
            avatar: None,
            join_time: user.join_time,
            last_login_time: None,
        });
        Ok(id)
    }

    async fn update_profile(
        &self,
        id: UserId,
        username: &str,
        email: &str,
    ) -> Result<u64, StoreError> {
        self.update(id, |u| {
            u.username = username.to_string();
            u.email = email.to_string();
        })
    }

    async fn update_avatar(&self, id: UserId, avatar: &str) -> Result<u64, StoreError> {
        self.update(id, |u| u.avatar = Some(avatar.to_string()))
    }

    async fn set_password(&self, id: UserId, password_hash: &str) -> Result<u64, StoreError> {
        self.update(id, |u| u.password_hash = password_hash.to_string())
    }

    async fn set_superuser(&self, id: UserId, is_superuser: bool) -> Result<u64, StoreError> {
        self.update(id, |u| u.is_superuser = is_superuser)
    }

    async fn set_status(&self, id: UserId, status: AccountStatus) -> Result<u64, StoreError> {
        self.update(id, |u| u.status = status)
    }

    async fn set_multi_login(&self, id: UserId, multi_login: bool) -> Result<u64, StoreError> {
        self.update(id, |u| u.is_multi_login = multi_login)
    }

    async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<u64, StoreError> {
        self.update(id, |u| u.last_login_time = Some(at))
    }

    async fn delete(&self, id: UserId) -> Result<u64, StoreError> {
        let mut users = self.users()?;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok((before - users.len()) as u64)
    }
}
