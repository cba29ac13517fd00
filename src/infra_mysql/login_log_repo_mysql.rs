use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::MySqlPool;
use std::time::Duration;

/// `sys_login_log` table.
pub struct MySqlLoginLogRepo {
    pool: MySqlPool,
    op_timeout: Duration,
}

impl MySqlLoginLogRepo {
    pub fn new(pool: MySqlPool, op_timeout: Duration) -> Self {
        MySqlLoginLogRepo { pool, op_timeout }
    }
}

#[async_trait::async_trait]
impl LoginLogRepo for MySqlLoginLogRepo {
    async fn create(&self, entry: NewLoginLog) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
INSERT INTO sys_login_log (user_uuid, username, status, ip, user_agent, msg, login_time)
VALUES (?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(entry.user_uuid.to_string())
        .bind(&entry.username)
        .bind(entry.status.as_i8())
        .bind(&entry.ip)
        .bind(&entry.user_agent)
        .bind(&entry.msg)
        .bind(entry.login_time);

        bounded(self.op_timeout, async {
            query.execute(&self.pool).await?;
            Ok::<_, StoreError>(())
        })
        .await
    }
}
