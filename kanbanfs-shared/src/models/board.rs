/// Board model
///
/// Boards belong to a node (normally a project file) and are ordered inside it
/// by a dense `index`. Creating, deleting and reordering boards goes through
/// [`crate::ordering::OrderMaintainer`] with the
/// [`BoardsInFolder`](crate::ordering::BoardsInFolder) container; this module
/// only holds the row type and the statements that never touch `index`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL,
///     node_id UUID NOT NULL REFERENCES nodes(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     "index" INTEGER NOT NULL CHECK ("index" >= 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (user_id, node_id, "index") DEFERRABLE INITIALLY IMMEDIATE
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use uuid::Uuid;

use crate::ordering::Ordered;

/// A board inside a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    pub id: Uuid,

    /// Owner
    pub user_id: Uuid,

    /// Containing node
    pub node_id: Uuid,

    pub title: String,

    /// Position inside the node, dense from 0
    pub index: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBoard {
    pub title: String,
}

impl Ordered for Board {
    fn id(&self) -> Uuid {
        self.id
    }

    fn index(&self) -> i32 {
        self.index
    }

    fn scope_id(&self) -> Uuid {
        self.node_id
    }
}

impl Board {
    pub const COLUMNS: &'static str =
        r#"id, user_id, node_id, title, "index", created_at, updated_at"#;

    pub(crate) async fn insert_at<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        node_id: Uuid,
        data: NewBoard,
        index: i32,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (user_id, node_id, title, "index")
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, node_id, title, "index", created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(node_id)
        .bind(data.title)
        .bind(index)
        .fetch_one(executor)
        .await
    }

    /// Finds a board by ID with user isolation
    pub async fn find_by_id_and_user<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT id, user_id, node_id, title, "index", created_at, updated_at
            FROM boards
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
    }

    /// Lists a node's boards in display order
    pub async fn list_by_node<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: Uuid,
        node_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            SELECT id, user_id, node_id, title, "index", created_at, updated_at
            FROM boards
            WHERE user_id = $1 AND node_id = $2
            ORDER BY "index" ASC
            "#,
        )
        .bind(user_id)
        .bind(node_id)
        .fetch_all(executor)
        .await
    }

    /// Renames a board
    pub async fn update_title<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        user_id: Uuid,
        title: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET title = $3,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, node_id, title, "index", created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(title)
        .fetch_optional(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_ordered_accessors() {
        let board = Board {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            node_id: Uuid::new_v4(),
            title: "Backlog".to_string(),
            index: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(Ordered::id(&board), board.id);
        assert_eq!(Ordered::index(&board), 3);
        assert_eq!(board.scope_id(), board.node_id);
    }
}
