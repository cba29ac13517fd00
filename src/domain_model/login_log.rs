use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginStatus {
    Failure,
    Success,
}

impl LoginStatus {
    /// Column encoding: 0 failure, 1 success.
    pub fn as_i8(self) -> i8 {
        match self {
            LoginStatus::Failure => 0,
            LoginStatus::Success => 1,
        }
    }
}

/// One login attempt against a known account.
#[derive(Debug, Clone)]
pub struct NewLoginLog {
    pub user_uuid: uuid::Uuid,
    pub username: String,
    pub status: LoginStatus,
    pub ip: String,
    pub user_agent: String,
    pub msg: String,
    pub login_time: DateTime<Utc>,
}
