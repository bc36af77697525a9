//! Repository layer for database operations
//!
//! Record documents are stored per table as JSON text and filtered with
//! SQLite's JSON functions. Field paths are always bound as parameters.

use super::models::*;
use crate::backend::query::{is_valid_field, Filter, Op, Query};
use crate::error::{AppError, RemoteError, Result};
use chrono::Utc;
use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Select record documents matching a query
    pub async fn select_records(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT data FROM records WHERE table_name = ");
        qb.push_bind(table.to_string());
        push_filters(&mut qb, query)?;

        match &query.order {
            Some(order) => {
                qb.push(" ORDER BY json_extract(data, ");
                qb.push_bind(json_path(&order.field));
                qb.push(if order.ascending { ") ASC" } else { ") DESC" });
                qb.push(", seq ASC");
            }
            None => {
                qb.push(" ORDER BY seq ASC");
            }
        }

        if let Some(limit) = query.limit {
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(limit));
        }

        let rows: Vec<String> = qb.build_query_scalar().fetch_all(&self.pool).await?;
        decode_documents(rows)
    }

    /// Pick one matching record document at random
    pub async fn random_record(&self, table: &str, query: &Query) -> Result<Option<Value>> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT data FROM records WHERE table_name = ");
        qb.push_bind(table.to_string());
        push_filters(&mut qb, query)?;
        qb.push(" ORDER BY RANDOM() LIMIT 1");

        let row: Option<String> = qb.build_query_scalar().fetch_optional(&self.pool).await?;
        row.map(|data| serde_json::from_str(&data).map_err(AppError::from))
            .transpose()
    }

    /// Insert a record document
    pub async fn insert_record(&self, table: &str, id: &str, data: &Value) -> Result<Value> {
        let now = Utc::now();

        let stored: String = sqlx::query_scalar(
            r#"
            INSERT INTO records (table_name, id, data, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING data
            "#,
        )
        .bind(table)
        .bind(id)
        .bind(data.to_string())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Inserted {} record: {}", table, id);
        Ok(serde_json::from_str(&stored)?)
    }

    /// Replace a record document; `None` if the record does not exist
    pub async fn update_record(
        &self,
        table: &str,
        id: &str,
        data: &Value,
    ) -> Result<Option<Value>> {
        let now = Utc::now();

        let stored: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE records SET data = ?, updated_at = ?
            WHERE table_name = ? AND id = ?
            RETURNING data
            "#,
        )
        .bind(data.to_string())
        .bind(now)
        .bind(table)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match stored {
            Some(data) => {
                tracing::debug!("Updated {} record: {}", table, id);
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => Ok(None),
        }
    }

    /// Delete a record; returns whether it existed
    pub async fn delete_record(&self, table: &str, id: &str) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM records WHERE table_name = ? AND id = ?")
            .bind(table)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!("Deleted {} record {} ({} rows)", table, id, rows);
        Ok(rows > 0)
    }

    /// Create or replace a profile
    pub async fn upsert_profile(
        &self,
        role: &str,
        display_name: &str,
        pin_hash: &str,
    ) -> Result<ProfileRow> {
        let now = Utc::now();

        let profile = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (role, display_name, pin_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(role) DO UPDATE SET
                display_name = excluded.display_name,
                pin_hash = excluded.pin_hash,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(role)
        .bind(display_name)
        .bind(pin_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Upserted profile: {}", role);
        Ok(profile)
    }

    pub async fn get_profile(&self, role: &str) -> Result<Option<ProfileRow>> {
        let profile = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE role = ?")
            .bind(role)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    /// Record object metadata; re-uploads of the same content are no-ops
    pub async fn record_object(
        &self,
        bucket: &str,
        hash: &str,
        content_type: &str,
        size: i64,
    ) -> Result<StoredObject> {
        let object = sqlx::query_as::<_, StoredObject>(
            r#"
            INSERT INTO objects (bucket, hash, content_type, size, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(bucket, hash) DO UPDATE SET content_type = excluded.content_type
            RETURNING *
            "#,
        )
        .bind(bucket)
        .bind(hash)
        .bind(content_type)
        .bind(size)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(object)
    }
}

fn json_path(field: &str) -> String {
    format!("$.{}", field)
}

fn decode_documents(rows: Vec<String>) -> Result<Vec<Value>> {
    rows.iter()
        .map(|data| serde_json::from_str(data).map_err(AppError::from))
        .collect()
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &Query) -> Result<()> {
    if let Some(field) = query.fields().find(|f| !is_valid_field(f)) {
        return Err(RemoteError::Validation(format!("invalid field name: {}", field)).into());
    }

    for filter in &query.filters {
        qb.push(" AND json_extract(data, ");
        qb.push_bind(json_path(filter.field()));

        match filter {
            Filter::IsNull(_) => {
                qb.push(") IS NULL");
            }
            Filter::NotNull(_) => {
                qb.push(") IS NOT NULL");
            }
            Filter::Compare { op, value: Value::Null, .. } => match op {
                Op::Eq => {
                    qb.push(") IS NULL");
                }
                Op::Neq => {
                    qb.push(") IS NOT NULL");
                }
                _ => {
                    return Err(RemoteError::Validation("null is not ordered".to_string()).into());
                }
            },
            Filter::Compare { op, value, .. } => {
                qb.push(") ");
                qb.push(op.as_sql());
                qb.push(" ");
                push_value(qb, value)?;
            }
        }
    }

    Ok(())
}

fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: &Value) -> Result<()> {
    match value {
        Value::String(s) => {
            qb.push_bind(s.clone());
        }
        Value::Bool(b) => {
            qb.push_bind(i64::from(*b));
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) => {
                qb.push_bind(i);
            }
            None => {
                qb.push_bind(n.as_f64().unwrap_or_default());
            }
        },
        Value::Null | Value::Array(_) | Value::Object(_) => {
            return Err(RemoteError::Validation("unsupported filter value".to_string()).into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_memory_pool;
    use serde_json::json;

    async fn create_test_repo() -> Repository {
        let pool = create_memory_pool().await.unwrap();
        Repository::new(pool)
    }

    #[tokio::test]
    async fn test_insert_and_select_in_insertion_order() {
        let repo = create_test_repo().await;

        for i in 1..=3 {
            let id = format!("t{}", i);
            repo.insert_record("todos", &id, &json!({"id": id, "title": format!("Todo {}", i)}))
                .await
                .unwrap();
        }
        repo.insert_record("goals", "g1", &json!({"id": "g1"})).await.unwrap();

        let todos = repo.select_records("todos", &Query::new()).await.unwrap();
        let ids: Vec<&str> = todos.iter().map(|t| t["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
    }

    #[tokio::test]
    async fn test_filters_and_order() {
        let repo = create_test_repo().await;

        for (id, completed, due) in [
            ("a", true, Some("2026-10-20")),
            ("b", false, Some("2026-10-10")),
            ("c", false, None),
        ] {
            let row = json!({"id": id, "is_completed": completed, "due_date": due});
            repo.insert_record("todos", id, &row).await.unwrap();
        }

        let open = repo
            .select_records("todos", &Query::new().eq("is_completed", false))
            .await
            .unwrap();
        assert_eq!(open.len(), 2);

        let dated = repo
            .select_records("todos", &Query::new().not_null("due_date").order_by("due_date", false))
            .await
            .unwrap();
        assert_eq!(dated[0]["id"], "a");
        assert_eq!(dated[1]["id"], "b");

        let before = repo
            .select_records("todos", &Query::new().lt("due_date", "2026-10-15"))
            .await
            .unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(before[0]["id"], "b");

        let limited = repo.select_records("todos", &Query::new().limit(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_field_is_rejected() {
        let repo = create_test_repo().await;

        let result = repo
            .select_records("todos", &Query::new().eq("id') OR 1=1 --", "x"))
            .await;

        assert!(matches!(result, Err(AppError::Remote(RemoteError::Validation(_)))));
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_validation_error() {
        let repo = create_test_repo().await;

        repo.insert_record("todos", "dup", &json!({"id": "dup"})).await.unwrap();
        let result = repo.insert_record("todos", "dup", &json!({"id": "dup"})).await;

        assert!(matches!(result, Err(AppError::Remote(RemoteError::Validation(_)))));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_rows() {
        let repo = create_test_repo().await;

        let updated = repo.update_record("todos", "nope", &json!({"id": "nope"})).await.unwrap();
        assert!(updated.is_none());

        assert!(!repo.delete_record("todos", "nope").await.unwrap());

        repo.insert_record("todos", "x", &json!({"id": "x", "title": "old"})).await.unwrap();
        let updated = repo
            .update_record("todos", "x", &json!({"id": "x", "title": "new"}))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["title"], "new");
        assert!(repo.delete_record("todos", "x").await.unwrap());
    }

    #[tokio::test]
    async fn test_random_record_respects_filters() {
        let repo = create_test_repo().await;

        for (id, mood) in [("1", "sad"), ("2", "happy")] {
            let row = json!({"id": id, "mood_id": mood});
            repo.insert_record("mood_messages", id, &row).await.unwrap();
        }

        for _ in 0..5 {
            let picked = repo
                .random_record("mood_messages", &Query::new().eq("mood_id", "happy"))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(picked["id"], "2");
        }

        let none = repo
            .random_record("mood_messages", &Query::new().eq("mood_id", "angry"))
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_profiles() {
        let repo = create_test_repo().await;

        repo.upsert_profile("shah", "Shah", "hash1").await.unwrap();
        let updated = repo.upsert_profile("shah", "Shahzad", "hash2").await.unwrap();
        assert_eq!(updated.display_name, "Shahzad");
        assert_eq!(updated.pin_hash, "hash2");

        assert!(repo.get_profile("dane").await.unwrap().is_none());
        assert!(repo.upsert_profile("guest", "Guest", "h").await.is_err());
    }
}
