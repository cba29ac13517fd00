use super::{AccountStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public profile snapshot of an authenticated user. This is what gets cached under
/// the identity key and what handlers receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub uuid: uuid::Uuid,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub status: AccountStatus,
    pub is_superuser: bool,
    pub is_multi_login: bool,
    pub join_time: DateTime<Utc>,
    pub last_login_time: Option<DateTime<Utc>>,
}

/// Everything a handler knows about the caller of one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub user: CurrentUser,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Identity used by offline tools (seeding). It carries no user id and cannot be
/// produced by token resolution.
#[derive(Debug, Clone)]
pub struct SystemActor {
    name: &'static str,
}

impl SystemActor {
    pub fn seeder() -> Self {
        SystemActor { name: "seeder" }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Actor<'a> {
    User(&'a CurrentUser),
    System(&'a SystemActor),
}

impl Actor<'_> {
    pub fn is_superuser(&self) -> bool {
        match self {
            Actor::User(user) => user.is_superuser,
            Actor::System(_) => true,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Actor::User(user) => format!("user:{}", user.id),
            Actor::System(system) => format!("system:{}", system.name()),
        }
    }
}
