use super::CurrentUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(UserId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Disabled,
    Enabled,
}

impl AccountStatus {
    pub fn is_enabled(self) -> bool {
        matches!(self, AccountStatus::Enabled)
    }

    pub fn toggled(self) -> Self {
        match self {
            AccountStatus::Disabled => AccountStatus::Enabled,
            AccountStatus::Enabled => AccountStatus::Disabled,
        }
    }

    /// Column encoding: 0 disabled, 1 enabled.
    pub fn as_i8(self) -> i8 {
        match self {
            AccountStatus::Disabled => 0,
            AccountStatus::Enabled => 1,
        }
    }

    pub fn from_i8(v: i8) -> Self {
        if v == 0 {
            AccountStatus::Disabled
        } else {
            AccountStatus::Enabled
        }
    }
}

/// A full user row, including credential material. Never leaves the service layer;
/// request handlers only ever see [`CurrentUser`].
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub uuid: uuid::Uuid,
    pub username: String,
    pub password_hash: String,
    pub salt: String,
    pub email: String,
    pub is_superuser: bool,
    pub status: AccountStatus,
    pub is_multi_login: bool,
    pub avatar: Option<String>,
    pub join_time: DateTime<Utc>,
    pub last_login_time: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn to_identity(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            uuid: self.uuid,
            username: self.username.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
            status: self.status,
            is_superuser: self.is_superuser,
            is_multi_login: self.is_multi_login,
            join_time: self.join_time,
            last_login_time: self.last_login_time,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub uuid: uuid::Uuid,
    pub username: String,
    pub password_hash: String,
    pub salt: String,
    pub email: String,
    pub is_superuser: bool,
    pub is_multi_login: bool,
    pub status: AccountStatus,
    pub join_time: DateTime<Utc>,
}
