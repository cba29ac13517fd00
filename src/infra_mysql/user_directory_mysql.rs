use super::util::is_dup_key;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::{MySqlPool, Row};
use std::time::Duration;

type MySqlQuery<'q> = sqlx::query::Query<'q, sqlx::MySql, MySqlArguments>;

const USER_COLUMNS: &str = "id, uuid, username, password, salt, email, is_superuser, status, \
                            is_multi_login, avatar, join_time, last_login_time";

/// `sys_user` table. Serves both the read-only directory and account writes.
pub struct MySqlUserDirectory {
    pool: MySqlPool,
    op_timeout: Duration,
}

impl MySqlUserDirectory {
    pub fn new(pool: MySqlPool, op_timeout: Duration) -> Self {
        MySqlUserDirectory { pool, op_timeout }
    }

    async fn find_one(
        &self,
        column: &str,
        value: FindBy<'_>,
    ) -> Result<Option<UserRecord>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM sys_user WHERE {column} = ?");
        let query = sqlx::query(&sql);
        let query = match value {
            FindBy::Id(id) => query.bind(id),
            FindBy::Text(text) => query.bind(text),
        };
        let row = bounded(self.op_timeout, async {
            let row: Option<MySqlRow> = query.fetch_optional(&self.pool).await?;
            Ok::<_, StoreError>(row)
        })
        .await?;
        row.map(|r| row_to_record(&r)).transpose()
    }

    async fn execute(&self, query: MySqlQuery<'_>) -> Result<u64, StoreError> {
        bounded(self.op_timeout, async {
            let result = query.execute(&self.pool).await?;
            Ok::<_, StoreError>(result.rows_affected())
        })
        .await
    }
}

enum FindBy<'a> {
    Id(UserId),
    Text(&'a str),
}

fn row_to_record(row: &MySqlRow) -> Result<UserRecord, StoreError> {
    let uuid: String = row.try_get("uuid")?;
    let uuid = uuid::Uuid::parse_str(&uuid)
        .map_err(|e| StoreError::Corrupt(format!("sys_user.uuid: {e}")))?;
    let status = AccountStatus::from_i8(row.try_get("status")?);

    Ok(UserRecord {
        id: row.try_get("id")?,
        uuid,
        username: row.try_get("username")?,
        password_hash: row.try_get("password")?,
        salt: row.try_get("salt")?,
        email: row.try_get("email")?,
        is_superuser: row.try_get("is_superuser")?,
        status,
        is_multi_login: row.try_get("is_multi_login")?,
        avatar: row.try_get("avatar")?,
        join_time: row.try_get("join_time")?,
        last_login_time: row.try_get("last_login_time")?,
    })
}

#[async_trait::async_trait]
impl UserDirectory for MySqlUserDirectory {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        self.find_one("id", FindBy::Id(id)).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        self.find_one("username", FindBy::Text(username)).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.find_one("email", FindBy::Text(email)).await
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserDirectory {
    async fn create(&self, user: NewUser) -> Result<UserId, StoreError> {
        let query = sqlx::query(
            r#"
INSERT INTO sys_user (uuid, username, password, salt, email, is_superuser, status, is_multi_login, join_time)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(user.uuid.to_string())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.salt)
        .bind(&user.email)
        .bind(user.is_superuser)
        .bind(user.status.as_i8())
        .bind(user.is_multi_login)
        .bind(user.join_time);

        let result = bounded(self.op_timeout, async {
            query.execute(&self.pool).await.map_err(|e| {
                if is_dup_key(&e) {
                    StoreError::Backend(format!("duplicate user {}", user.username))
                } else {
                    e.into()
                }
            })
        })
        .await?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|e| StoreError::Corrupt(format!("sys_user.id: {e}")))?;
        Ok(UserId(id))
    }

    async fn update_profile(
        &self,
        id: UserId,
        username: &str,
        email: &str,
    ) -> Result<u64, StoreError> {
        self.execute(
            sqlx::query("UPDATE sys_user SET username = ?, email = ? WHERE id = ?")
                .bind(username)
                .bind(email)
                .bind(id),
        )
        .await
    }

    async fn update_avatar(&self, id: UserId, avatar: &str) -> Result<u64, StoreError> {
        self.execute(
            sqlx::query("UPDATE sys_user SET avatar = ? WHERE id = ?")
                .bind(avatar)
                .bind(id),
        )
        .await
    }

    async fn set_password(&self, id: UserId, password_hash: &str) -> Result<u64, StoreError> {
        self.execute(
            sqlx::query("UPDATE sys_user SET password = ? WHERE id = ?")
                .bind(password_hash)
                .bind(id),
        )
        .await
    }

    async fn set_superuser(&self, id: UserId, is_superuser: bool) -> Result<u64, StoreError> {
        self.execute(
            sqlx::query("UPDATE sys_user SET is_superuser = ? WHERE id = ?")
                .bind(is_superuser)
                .bind(id),
        )
        .await
    }

    async fn set_status(&self, id: UserId, status: AccountStatus) -> Result<u64, StoreError> {
        self.execute(
            sqlx::query("UPDATE sys_user SET status = ? WHERE id = ?")
                .bind(status.as_i8())
                .bind(id),
        )
        .await
    }

    async fn set_multi_login(&self, id: UserId, multi_login: bool) -> Result<u64, StoreError> {
        self.execute(
            sqlx::query("UPDATE sys_user SET is_multi_login = ? WHERE id = ?")
                .bind(multi_login)
                .bind(id),
        )
        .await
    }

    async fn touch_last_login(&self, id: UserId, at: DateTime<Utc>) -> Result<u64, StoreError> {
        self.execute(
            sqlx::query("UPDATE sys_user SET last_login_time = ? WHERE id = ?")
                .bind(at)
                .bind(id),
        )
        .await
    }

    async fn delete(&self, id: UserId) -> Result<u64, StoreError> {
        self.execute(sqlx::query("DELETE FROM sys_user WHERE id = ?").bind(id))
            .await
    }
}
