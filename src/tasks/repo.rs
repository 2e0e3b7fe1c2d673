use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Task state. Two states, freely bidirectional, changed only by an
/// explicit update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    /// Exact, case-sensitive match; anything else is invalid input.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(TaskStatus::Pending),
            "completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated input for task creation.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
}

/// Validated, partial input for task updates. At least one field is set.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

/// Optional list predicate, always applied together with the owner id.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub q: Option<String>,
}

// Every query below is scoped by the owner id in the same statement.
// A row owned by someone else is indistinguishable from a missing row.
impl Task {
    pub async fn list_by_user(
        db: &PgPool,
        user_id: i64,
        filter: &TaskFilter,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<Task>> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, user_id, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
              AND ($2::task_status IS NULL OR status = $2)
              AND ($3::text IS NULL
                   OR title ILIKE '%' || $3 || '%'
                   OR description ILIKE '%' || $3 || '%')
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(user_id)
        .bind(filter.status)
        .bind(filter.q.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    pub async fn count_by_user(
        db: &PgPool,
        user_id: i64,
        filter: &TaskFilter,
    ) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM tasks
            WHERE user_id = $1
              AND ($2::task_status IS NULL OR status = $2)
              AND ($3::text IS NULL
                   OR title ILIKE '%' || $3 || '%'
                   OR description ILIKE '%' || $3 || '%')
            "#,
        )
        .bind(user_id)
        .bind(filter.status)
        .bind(filter.q.as_deref())
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id_and_user(
        db: &PgPool,
        id: i64,
        user_id: i64,
    ) -> sqlx::Result<Option<Task>> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, user_id, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn insert(db: &PgPool, user_id: i64, new_task: &NewTask) -> sqlx::Result<Task> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, status, user_id, created_at, updated_at
            "#,
        )
        .bind(&new_task.title)
        .bind(new_task.description.as_deref())
        .bind(new_task.status)
        .bind(user_id)
        .fetch_one(db)
        .await
    }

    /// Apply the supplied fields in one scoped statement; `None` means the
    /// task does not exist for this owner.
    pub async fn update(
        db: &PgPool,
        id: i64,
        user_id: i64,
        changes: &TaskChanges,
    ) -> sqlx::Result<Option<Task>> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, title, description, status, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.status)
        .fetch_optional(db)
        .await
    }

    /// Returns whether a row was deleted. Deleting twice is success then
    /// not-found, never an error.
    pub async fn delete(db: &PgPool, id: i64, user_id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn status_counts(
        db: &PgPool,
        user_id: i64,
    ) -> sqlx::Result<Vec<(TaskStatus, i64)>> {
        sqlx::query_as::<_, (TaskStatus, i64)>(
            "SELECT status, COUNT(*) FROM tasks WHERE user_id = $1 GROUP BY status",
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}
