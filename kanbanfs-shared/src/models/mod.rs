/// Database models for kanbanfs
///
/// Row types and the statements that read them or edit their content.
/// Statements that create, delete or reorder boards and tasks live in
/// [`crate::ordering`], and path-based node lookups in [`crate::paths`].
///
/// # Models
///
/// - `node`: folders and files in a user's tree
/// - `board`: boards ordered inside a node
/// - `task`: tasks ordered inside a board
///
/// # Example
///
/// ```no_run
/// use kanbanfs_shared::models::board::Board;
/// use kanbanfs_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid, node_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let boards = Board::list_by_node(&pool, user_id, node_id).await?;
/// # Ok(())
/// # }
/// ```

pub mod board;
pub mod node;
pub mod task;
