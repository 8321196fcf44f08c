/// Dense order maintenance for boards and tasks
///
/// Every container keeps its rows at indices `0..n` with no gaps and no
/// duplicates. The unique constraint on `(container, index)` is checked at
/// the end of every statement, so reorders that need more than one statement
/// park rows above [`DEFAULT_REINDEX_OFFSET`] until the last statement of
/// their batch brings them back down.
///
/// # Modules
///
/// - `container`: the [`OrderedContainer`] trait and its two instantiations
/// - `plan`: pure index arithmetic (bounds, wraparound, displaced ranges)
/// - `maintainer`: [`OrderMaintainer`], which runs each operation as one transaction
///
/// # Example
///
/// ```no_run
/// use kanbanfs_shared::models::task::NewTask;
/// use kanbanfs_shared::ordering::{ContainerKey, Direction, OrderMaintainer, TasksInBoard};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid, board_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let order = OrderMaintainer::new(pool);
/// let key = ContainerKey::new(user_id, board_id);
///
/// let task = order
///     .insert::<TasksInBoard>(key, NewTask { title: "Ship it".to_string(), ..Default::default() })
///     .await?;
/// order.shift_by_one::<TasksInBoard>(key, task.id, Direction::Left).await.ok();
/// # Ok(())
/// # }
/// ```

pub mod container;
pub mod maintainer;
pub mod plan;

pub use container::{BoardsInFolder, ContainerKey, Ordered, OrderedContainer, TasksInBoard};
pub use maintainer::{MoveOutcome, OrderMaintainer};
pub use plan::Direction;

/// Amount added to an index while a row is parked mid-batch
///
/// Must exceed the largest container ever expected; values at or above it are
/// never visible outside a transaction.
pub const DEFAULT_REINDEX_OFFSET: i32 = 100_000;

/// Smallest offset accepted from configuration
pub const MIN_REINDEX_OFFSET: i32 = 10_000;
