use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::time::Duration;

pub struct MySqlHintRepo {
    pool: MySqlPool,
    op_timeout: Duration,
}

impl MySqlHintRepo {
    pub fn new(pool: MySqlPool, op_timeout: Duration) -> Self {
        MySqlHintRepo { pool, op_timeout }
    }
}

fn row_to_hint(row: &MySqlRow) -> Result<Hint, StoreError> {
    Ok(Hint {
        id: row.try_get("id")?,
        pos_x: row.try_get("pos_x")?,
        pos_y: row.try_get("pos_y")?,
        hint_en: row.try_get("hint_en")?,
        hint_fr: row.try_get("hint_fr")?,
        hint_es: row.try_get("hint_es")?,
        hint_de: row.try_get("hint_de")?,
        hint_pt: row.try_get("hint_pt")?,
    })
}

#[async_trait::async_trait]
impl HintRepo for MySqlHintRepo {
    async fn find_in_window(&self, window: &HintWindow) -> Result<Vec<Hint>, StoreError> {
        let query = sqlx::query(
            r#"
SELECT id, pos_x, pos_y, hint_en, hint_fr, hint_es, hint_de, hint_pt
FROM hints
WHERE pos_x BETWEEN ? AND ? AND pos_y BETWEEN ? AND ?
"#,
        )
        .bind(*window.x.start())
        .bind(*window.x.end())
        .bind(*window.y.start())
        .bind(*window.y.end());

        let rows = bounded(self.op_timeout, async {
            let rows: Vec<MySqlRow> = query.fetch_all(&self.pool).await?;
            Ok::<_, StoreError>(rows)
        })
        .await?;
        rows.iter().map(row_to_hint).collect()
    }

    async fn insert_many(&self, hints: &[NewHint]) -> Result<u64, StoreError> {
        if hints.is_empty() {
            return Ok(0);
        }
        let mut builder = sqlx::QueryBuilder::<sqlx::MySql>::new(
            "INSERT INTO hints (pos_x, pos_y, hint_en, hint_fr, hint_es, hint_de, hint_pt) ",
        );
        builder.push_values(hints, |mut row, hint| {
            row.push_bind(hint.pos_x)
                .push_bind(hint.pos_y)
                .push_bind(&hint.hint_en)
                .push_bind(&hint.hint_fr)
                .push_bind(&hint.hint_es)
                .push_bind(&hint.hint_de)
                .push_bind(&hint.hint_pt);
        });

        bounded(self.op_timeout, async {
            let result = builder.build().execute(&self.pool).await?;
            Ok::<_, StoreError>(result.rows_affected())
        })
        .await
    }
}
