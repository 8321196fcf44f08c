/// Node model: the per-user folder/file tree
///
/// Nodes form a forest per user through a self-referential `parent_id`.
/// Exactly one root (`parent_id IS NULL`, named [`ROOT_NAME`]) is created per
/// user at signup. Paths are never stored; see [`crate::paths`] for resolution.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE nodes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL,
///     name VARCHAR(255) NOT NULL,
///     parent_id UUID REFERENCES nodes(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (user_id, parent_id, name)
/// );
/// ```
///
/// Deleting a node cascades to its descendants, their boards and their tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

/// Name of the root node; doubles as the root sentinel segment in stored-path queries
pub const ROOT_NAME: &str = "root";

/// Suffix that marks a file node as a project holding boards
pub const PROJECT_SUFFIX: &str = ".kanban";

/// What a node is, derived from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Name contains no `.`
    Folder,

    /// Name ends with [`PROJECT_SUFFIX`]
    Project,

    /// Any other dotted name
    File,
}

impl NodeKind {
    pub fn of(name: &str) -> Self {
        if !name.contains('.') {
            NodeKind::Folder
        } else if name.ends_with(PROJECT_SUFFIX) {
            NodeKind::Project
        } else {
            NodeKind::File
        }
    }
}

/// A folder or file in a user's tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Node {
    pub id: Uuid,

    /// Owner
    pub user_id: Uuid,

    /// Path segment; never contains `/`
    pub name: String,

    /// Containing folder, `None` for a root
    pub parent_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        NodeKind::of(&self.name)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Inserts a node under `parent_id`
    ///
    /// Callers are expected to have checked path rules first; a lost race on
    /// `(user_id, parent_id, name)` still comes back as a unique violation.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Node>(
            r#"
            INSERT INTO nodes (user_id, parent_id, name)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name, parent_id, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(parent_id)
        .bind(name)
        .fetch_one(executor)
        .await
    }

    /// Finds a node by ID with user isolation
    pub async fn find_by_id_and_user<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Node>(
            r#"
            SELECT id, user_id, name, parent_id, created_at, updated_at
            FROM nodes
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Finds the user's root node
    pub async fn find_root<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Node>(
            r#"
            SELECT id, user_id, name, parent_id, created_at, updated_at
            FROM nodes
            WHERE user_id = $1 AND parent_id IS NULL AND name = $2
            "#,
        )
        .bind(user_id)
        .bind(ROOT_NAME)
        .fetch_optional(executor)
        .await
    }

    /// Lists direct children of a node, folders and files alike, by name
    pub async fn list_children<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        parent_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Node>(
            r#"
            SELECT id, user_id, name, parent_id, created_at, updated_at
            FROM nodes
            WHERE user_id = $1 AND parent_id = $2
            ORDER BY name ASC
            "#,
        )
        .bind(user_id)
        .bind(parent_id)
        .fetch_all(executor)
        .await
    }

    /// Loads every node the user owns
    ///
    /// Trees are per-user and shallow, so this is the input for the in-memory
    /// [`crate::paths::NodeTree`].
    pub async fn list_by_user<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Node>(
            r#"
            SELECT id, user_id, name, parent_id, created_at, updated_at
            FROM nodes
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    /// Sets name and parent in one statement
    pub async fn update_placement<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Node>(
            r#"
            UPDATE nodes
            SET name = $3,
                parent_id = $4,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, parent_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(parent_id)
        .fetch_optional(executor)
        .await
    }

    /// Deletes a node
    ///
    /// ⚠️  Cascades to every descendant node, board and task.
    pub async fn delete<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM nodes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
