/// Ordered containers: sibling rows sharing a dense `index`
///
/// A container is a table plus a scope column. Boards are scoped by
/// `(user_id, node_id)`, tasks by `board_id` (with `user_id` as the ownership
/// filter). The maintainer builds its statements from the constants declared
/// here, so both instantiations share one implementation of every algorithm.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, PgConnection};
use uuid::Uuid;

use crate::models::board::{Board, NewBoard};
use crate::models::task::{NewTask, Task};

/// Identifies one container for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerKey {
    /// Acting user; every statement filters on it
    pub user_id: Uuid,

    /// Value of the container's scope column (node id or board id)
    pub scope_id: Uuid,
}

impl ContainerKey {
    pub fn new(user_id: Uuid, scope_id: Uuid) -> Self {
        Self { user_id, scope_id }
    }

    /// The container a row currently sits in
    pub fn of<R: Ordered>(user_id: Uuid, row: &R) -> Self {
        Self::new(user_id, row.scope_id())
    }
}

/// A row that lives at a position inside a container
pub trait Ordered {
    fn id(&self) -> Uuid;

    fn index(&self) -> i32;

    /// Value of the scope column
    fn scope_id(&self) -> Uuid;
}

/// Table-level description of a container kind
#[async_trait]
pub trait OrderedContainer: Send + Sync + 'static {
    /// Row type returned by every operation
    type Row: for<'r> FromRow<'r, PgRow> + Ordered + Send + Unpin;

    /// Row contents supplied by the caller; the index is assigned on insert
    type NewRow: Send;

    /// Human-readable row kind, used in error messages
    const LABEL: &'static str;

    const TABLE: &'static str;

    /// Column holding the container id
    const SCOPE_COLUMN: &'static str;

    /// Table the scope column points into
    const PARENT_TABLE: &'static str;

    /// Column list selected and returned by every statement
    const COLUMNS: &'static str;

    /// Inserts a row at `index`, which the caller has already computed
    async fn insert_row(
        conn: &mut PgConnection,
        key: ContainerKey,
        row: Self::NewRow,
        index: i32,
    ) -> Result<Self::Row, sqlx::Error>;
}

/// Boards ordered inside a node
#[derive(Debug, Clone, Copy)]
pub struct BoardsInFolder;

/// Tasks ordered inside a board
#[derive(Debug, Clone, Copy)]
pub struct TasksInBoard;

#[async_trait]
impl OrderedContainer for BoardsInFolder {
    type Row = Board;
    type NewRow = NewBoard;

    const LABEL: &'static str = "Board";
    const TABLE: &'static str = "boards";
    const SCOPE_COLUMN: &'static str = "node_id";
    const PARENT_TABLE: &'static str = "nodes";
    const COLUMNS: &'static str = Board::COLUMNS;

    async fn insert_row(
        conn: &mut PgConnection,
        key: ContainerKey,
        row: NewBoard,
        index: i32,
    ) -> Result<Board, sqlx::Error> {
        Board::insert_at(conn, key.user_id, key.scope_id, row, index).await
    }
}

#[async_trait]
impl OrderedContainer for TasksInBoard {
    type Row = Task;
    type NewRow = NewTask;

    const LABEL: &'static str = "Task";
    const TABLE: &'static str = "tasks";
    const SCOPE_COLUMN: &'static str = "board_id";
    const PARENT_TABLE: &'static str = "boards";
    const COLUMNS: &'static str = Task::COLUMNS;

    async fn insert_row(
        conn: &mut PgConnection,
        key: ContainerKey,
        row: NewTask,
        index: i32,
    ) -> Result<Task, sqlx::Error> {
        Task::insert_at(conn, key.user_id, key.scope_id, row, index).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_tables() {
        assert_eq!(BoardsInFolder::TABLE, "boards");
        assert_eq!(BoardsInFolder::SCOPE_COLUMN, "node_id");
        assert_eq!(TasksInBoard::TABLE, "tasks");
        assert_eq!(TasksInBoard::SCOPE_COLUMN, "board_id");
        assert_eq!(TasksInBoard::PARENT_TABLE, "boards");
    }

    #[test]
    fn test_container_key() {
        let user_id = Uuid::new_v4();
        let board_id = Uuid::new_v4();
        let key = ContainerKey::new(user_id, board_id);
        assert_eq!(key.user_id, user_id);
        assert_eq!(key.scope_id, board_id);
        assert_ne!(key, ContainerKey::new(user_id, Uuid::new_v4()));
    }

    #[test]
    fn test_container_key_of_row() {
        let user_id = Uuid::new_v4();
        let task = Task {
            id: Uuid::new_v4(),
            user_id,
            board_id: Uuid::new_v4(),
            title: "Write tests".to_string(),
            body: String::new(),
            tags: Vec::new(),
            index: 3,
            archived: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert_eq!(ContainerKey::of(user_id, &task), ContainerKey::new(user_id, task.board_id));
    }
}
