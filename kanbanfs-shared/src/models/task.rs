/// Task model
///
/// Tasks are cards ordered inside a board. Like boards, every statement that
/// assigns or changes `index` lives in [`crate::ordering`]; this module covers
/// reads and content edits.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL,
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     body TEXT NOT NULL DEFAULT '',
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     "index" INTEGER NOT NULL CHECK ("index" >= 0),
///     archived BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (board_id, "index") DEFERRABLE INITIALLY IMMEDIATE
/// );
/// ```
///
/// Archived tasks keep their position; the index sequence covers them too.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use crate::ordering::Ordered;

/// A task card inside a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,

    /// Owner
    pub user_id: Uuid,

    /// Containing board
    pub board_id: Uuid,

    pub title: String,

    /// Free-form body (markdown in the client)
    pub body: String,

    pub tags: Vec<String>,

    /// Position inside the board, dense from 0
    pub index: i32,

    /// Hidden from the default board view
    pub archived: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,

    #[serde(default)]
    pub body: String,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Content edit; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,

    pub body: Option<String>,

    pub tags: Option<Vec<String>>,

    pub archived: Option<bool>,
}

impl UpdateTask {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.tags.is_none() && self.archived.is_none()
    }
}

impl Ordered for Task {
    fn id(&self) -> Uuid {
        self.id
    }

    fn index(&self) -> i32 {
        self.index
    }

    fn scope_id(&self) -> Uuid {
        self.board_id
    }
}

impl Task {
    pub const COLUMNS: &'static str = r#"id, user_id, board_id, title, body, tags, "index", archived, created_at, updated_at"#;

    pub(crate) async fn insert_at<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        board_id: Uuid,
        data: NewTask,
        index: i32,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, board_id, title, body, tags, "index")
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, board_id, title, body, tags, "index", archived,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(board_id)
        .bind(data.title)
        .bind(data.body)
        .bind(data.tags)
        .bind(index)
        .fetch_one(executor)
        .await
    }

    /// Finds a task by ID with user isolation
    pub async fn find_by_id_and_user<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, board_id, title, body, tags, "index", archived,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Lists a board's tasks in display order
    pub async fn list_by_board<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        board_id: Uuid,
        include_archived: bool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, board_id, title, body, tags, "index", archived,
                   created_at, updated_at
            FROM tasks
            WHERE user_id = $1 AND board_id = $2 AND ($3 OR NOT archived)
            ORDER BY "index" ASC
            "#,
        )
        .bind(user_id)
        .bind(board_id)
        .bind(include_archived)
        .fetch_all(executor)
        .await
    }

    /// Applies a content edit
    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($3, title),
                body = COALESCE($4, body),
                tags = COALESCE($5, tags),
                archived = COALESCE($6, archived),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, board_id, title, body, tags, "index", archived,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.title)
        .bind(data.body)
        .bind(data.tags)
        .bind(data.archived)
        .fetch_optional(executor)
        .await
    }
}
