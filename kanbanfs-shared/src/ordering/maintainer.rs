/// Order maintenance algorithms
///
/// Each public operation opens one transaction, runs an ordered batch of
/// statements on it, and commits. Any error drops the transaction, which rolls
/// it back, so a container is only ever observed as a permutation of `0..n`.
///
/// # Batches
///
/// ```text
/// insert        INSERT at max + 1
/// delete        DELETE row; decrement siblings above it
/// shift_by_one  park row at target + OFFSET; neighbour -> old index; row -> target
/// move_to_index park row at target + OFFSET; displaced siblings +-1 (+ OFFSET);
///               subtract OFFSET from everything parked
/// move_across   close gap in source (+ OFFSET); open slot in destination (+ OFFSET);
///               move row in at target + OFFSET; subtract OFFSET in both containers
/// ```
///
/// There is no optimistic concurrency check: two sessions reordering the same
/// container concurrently both read the same starting state, and the later
/// commit wins. Nothing here retries.

use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::container::{ContainerKey, Ordered, OrderedContainer};
use super::plan::{self, Direction, SiblingShift};
use super::{DEFAULT_REINDEX_OFFSET, MIN_REINDEX_OFFSET};
use crate::error::{CoreError, CoreResult};

/// Result of an absolute move
#[derive(Debug, Clone)]
pub struct MoveOutcome<R> {
    /// The row after the operation
    pub row: R,

    /// False when the row was already at the requested index
    pub moved: bool,
}

/// Runs order-preserving mutations against the store
#[derive(Debug, Clone)]
pub struct OrderMaintainer {
    pool: PgPool,
    offset: i32,
}

impl OrderMaintainer {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            offset: DEFAULT_REINDEX_OFFSET,
        }
    }

    /// Uses a configured offset; values below [`MIN_REINDEX_OFFSET`] are raised to it
    pub fn with_offset(pool: PgPool, offset: i32) -> Self {
        Self {
            pool,
            offset: offset.max(MIN_REINDEX_OFFSET),
        }
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Appends a row to a container
    ///
    /// # Errors
    ///
    /// - `NotFound` if the container does not exist for this user
    /// - `Conflict` if a concurrent insert claimed the same index first
    pub async fn insert<C: OrderedContainer>(
        &self,
        key: ContainerKey,
        row: C::NewRow,
    ) -> CoreResult<C::Row> {
        let mut tx = self.pool.begin().await?;

        ensure_container::<C>(&mut tx, key).await?;
        let index = next_index::<C>(&mut tx, key).await?;
        let inserted = C::insert_row(&mut tx, key, row, index).await?;

        tx.commit().await?;

        info!(
            table = C::TABLE,
            user_id = %key.user_id,
            scope_id = %key.scope_id,
            row_id = %inserted.id(),
            index,
            "Inserted row"
        );
        Ok(inserted)
    }

    /// Deletes a row and closes the gap it leaves
    pub async fn delete<C: OrderedContainer>(
        &self,
        key: ContainerKey,
        row_id: Uuid,
    ) -> CoreResult<C::Row> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "DELETE FROM {} WHERE id = $1 AND user_id = $2 AND {} = $3 RETURNING {}",
            C::TABLE,
            C::SCOPE_COLUMN,
            C::COLUMNS
        );
        let deleted = sqlx::query_as::<_, C::Row>(&sql)
            .bind(row_id)
            .bind(key.user_id)
            .bind(key.scope_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found::<C>(row_id))?;

        let sql = format!(
            r#"UPDATE {} SET "index" = "index" - 1 WHERE user_id = $1 AND {} = $2 AND "index" > $3"#,
            C::TABLE,
            C::SCOPE_COLUMN
        );
        let shifted = sqlx::query(&sql)
            .bind(key.user_id)
            .bind(key.scope_id)
            .bind(deleted.index())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        info!(
            table = C::TABLE,
            user_id = %key.user_id,
            scope_id = %key.scope_id,
            row_id = %row_id,
            index = deleted.index(),
            shifted,
            "Deleted row"
        );
        Ok(deleted)
    }

    /// Swaps a row with its neighbour on one side
    ///
    /// # Errors
    ///
    /// - `NotFound` if the row is not in this container
    /// - `InvalidOperation` when shifting the first row left or the last row right
    pub async fn shift_by_one<C: OrderedContainer>(
        &self,
        key: ContainerKey,
        row_id: Uuid,
        direction: Direction,
    ) -> CoreResult<C::Row> {
        let mut tx = self.pool.begin().await?;

        let row = fetch_row::<C>(&mut tx, key, row_id).await?;
        let current = row.index();
        let max = max_index::<C>(&mut tx, key).await?.unwrap_or(current);

        let target = plan::step_target(current, direction, max).map_err(|e| {
            warn!(
                table = C::TABLE,
                row_id = %row_id,
                current,
                max,
                ?direction,
                "Rejected shift past container edge"
            );
            e
        })?;

        park_row::<C>(&mut tx, key, row_id, target + self.offset).await?;

        let sql = format!(
            r#"UPDATE {} SET "index" = $3 WHERE user_id = $1 AND {} = $2 AND "index" = $4"#,
            C::TABLE,
            C::SCOPE_COLUMN
        );
        sqlx::query(&sql)
            .bind(key.user_id)
            .bind(key.scope_id)
            .bind(current)
            .bind(target)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            r#"UPDATE {} SET "index" = $3 WHERE id = $1 AND user_id = $2 RETURNING {}"#,
            C::TABLE,
            C::COLUMNS
        );
        let shifted = sqlx::query_as::<_, C::Row>(&sql)
            .bind(row_id)
            .bind(key.user_id)
            .bind(target)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            table = C::TABLE,
            user_id = %key.user_id,
            row_id = %row_id,
            from = current,
            to = target,
            "Shifted row"
        );
        Ok(shifted)
    }

    /// Moves a row to an absolute index inside its container
    ///
    /// Moving a row to the index it already has mutates nothing.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the row is not in this container
    /// - `InvalidOperation` if `new_index` is outside `0..=max`
    pub async fn move_to_index<C: OrderedContainer>(
        &self,
        key: ContainerKey,
        row_id: Uuid,
        new_index: i32,
    ) -> CoreResult<MoveOutcome<C::Row>> {
        let mut tx = self.pool.begin().await?;

        let row = fetch_row::<C>(&mut tx, key, row_id).await?;
        let max = max_index::<C>(&mut tx, key).await?.unwrap_or(row.index());
        plan::check_target(new_index, max)?;

        let outcome = self.move_within::<C>(&mut tx, key, row, new_index).await?;

        tx.commit().await?;
        Ok(outcome)
    }

    /// The drag-and-drop shift action: move by `direction` places, wrapping
    /// around either end of the container
    pub async fn shift_wrapping<C: OrderedContainer>(
        &self,
        key: ContainerKey,
        row_id: Uuid,
        direction: i32,
    ) -> CoreResult<MoveOutcome<C::Row>> {
        let mut tx = self.pool.begin().await?;

        let row = fetch_row::<C>(&mut tx, key, row_id).await?;
        let max = max_index::<C>(&mut tx, key).await?.unwrap_or(row.index());
        let target = plan::wrapping_target(row.index(), direction, max);

        let outcome = self.move_within::<C>(&mut tx, key, row, target).await?;

        tx.commit().await?;
        Ok(outcome)
    }

    /// Moves a row into another container of the same kind
    ///
    /// `new_index` defaults to appending after the destination's last row.
    /// When source and destination are the same container this is a plain
    /// [`move_to_index`](Self::move_to_index), defaulting to the last index.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the row or the destination is missing for this user
    /// - `InvalidOperation` if `new_index` is outside `0..=count(destination)`
    pub async fn move_across<C: OrderedContainer>(
        &self,
        row_id: Uuid,
        from: ContainerKey,
        to: ContainerKey,
        new_index: Option<i32>,
    ) -> CoreResult<C::Row> {
        if from.user_id != to.user_id {
            return Err(CoreError::NotFound(format!("Container {}", to.scope_id)));
        }

        let mut tx = self.pool.begin().await?;

        let row = fetch_row::<C>(&mut tx, from, row_id).await?;
        let old_index = row.index();

        if from.scope_id == to.scope_id {
            let max = max_index::<C>(&mut tx, from).await?.unwrap_or(old_index);
            let target = new_index.unwrap_or(max);
            plan::check_target(target, max)?;
            let outcome = self.move_within::<C>(&mut tx, from, row, target).await?;
            tx.commit().await?;
            return Ok(outcome.row);
        }

        ensure_container::<C>(&mut tx, to).await?;
        let append_at = next_index::<C>(&mut tx, to).await?;
        let target = new_index.unwrap_or(append_at);
        plan::check_target(target, append_at)?;

        // Close the gap in the source.
        let sql = format!(
            r#"UPDATE {} SET "index" = "index" + $3 WHERE user_id = $1 AND {} = $2 AND "index" > $4"#,
            C::TABLE,
            C::SCOPE_COLUMN
        );
        sqlx::query(&sql)
            .bind(from.user_id)
            .bind(from.scope_id)
            .bind(self.offset - 1)
            .bind(old_index)
            .execute(&mut *tx)
            .await?;

        // Open a slot in the destination.
        let sql = format!(
            r#"UPDATE {} SET "index" = "index" + $3 WHERE user_id = $1 AND {} = $2 AND "index" >= $4"#,
            C::TABLE,
            C::SCOPE_COLUMN
        );
        sqlx::query(&sql)
            .bind(to.user_id)
            .bind(to.scope_id)
            .bind(self.offset + 1)
            .bind(target)
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            r#"UPDATE {} SET {} = $3, "index" = $4, updated_at = NOW() WHERE id = $1 AND user_id = $2"#,
            C::TABLE,
            C::SCOPE_COLUMN
        );
        sqlx::query(&sql)
            .bind(row_id)
            .bind(from.user_id)
            .bind(to.scope_id)
            .bind(target + self.offset)
            .execute(&mut *tx)
            .await?;

        self.unpark::<C>(&mut tx, from.user_id, vec![from.scope_id, to.scope_id])
            .await?;

        let moved = fetch_row::<C>(&mut tx, to, row_id).await?;

        tx.commit().await?;

        info!(
            table = C::TABLE,
            user_id = %from.user_id,
            row_id = %row_id,
            from_scope = %from.scope_id,
            to_scope = %to.scope_id,
            from_index = old_index,
            to_index = target,
            "Moved row across containers"
        );
        Ok(moved)
    }

    /// Finds a row by id alone, for callers that don't know its container yet
    pub async fn locate<C: OrderedContainer>(
        &self,
        user_id: Uuid,
        row_id: Uuid,
    ) -> CoreResult<C::Row> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1 AND user_id = $2",
            C::COLUMNS,
            C::TABLE
        );
        sqlx::query_as::<_, C::Row>(&sql)
            .bind(row_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found::<C>(row_id))
    }

    /// All rows of a container in index order
    pub async fn list<C: OrderedContainer>(&self, key: ContainerKey) -> CoreResult<Vec<C::Row>> {
        let sql = format!(
            r#"SELECT {} FROM {} WHERE user_id = $1 AND {} = $2 ORDER BY "index" ASC"#,
            C::COLUMNS,
            C::TABLE,
            C::SCOPE_COLUMN
        );
        let rows = sqlx::query_as::<_, C::Row>(&sql)
            .bind(key.user_id)
            .bind(key.scope_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Whether a container's indices are exactly `0..n`
    pub async fn verify_dense<C: OrderedContainer>(&self, key: ContainerKey) -> CoreResult<bool> {
        let sql = format!(
            r#"SELECT "index" FROM {} WHERE user_id = $1 AND {} = $2"#,
            C::TABLE,
            C::SCOPE_COLUMN
        );
        let indices: Vec<i32> = sqlx::query_scalar(&sql)
            .bind(key.user_id)
            .bind(key.scope_id)
            .fetch_all(&self.pool)
            .await?;

        let dense = plan::is_dense(&indices);
        if !dense {
            warn!(
                table = C::TABLE,
                scope_id = %key.scope_id,
                ?indices,
                "Container indices are not dense"
            );
        }
        Ok(dense)
    }

    async fn move_within<C: OrderedContainer>(
        &self,
        conn: &mut PgConnection,
        key: ContainerKey,
        row: C::Row,
        target: i32,
    ) -> CoreResult<MoveOutcome<C::Row>> {
        let current = row.index();
        let row_id = row.id();

        let Some(shift) = SiblingShift::for_move(current, target) else {
            debug!(table = C::TABLE, row_id = %row_id, index = current, "Move is a no-op");
            return Ok(MoveOutcome { row, moved: false });
        };

        park_row::<C>(conn, key, row_id, target + self.offset).await?;

        let sql = format!(
            r#"UPDATE {} SET "index" = "index" + $3 WHERE user_id = $1 AND {} = $2 AND "index" BETWEEN $4 AND $5"#,
            C::TABLE,
            C::SCOPE_COLUMN
        );
        sqlx::query(&sql)
            .bind(key.user_id)
            .bind(key.scope_id)
            .bind(shift.delta + self.offset)
            .bind(shift.lower)
            .bind(shift.upper)
            .execute(&mut *conn)
            .await?;

        self.unpark::<C>(conn, key.user_id, vec![key.scope_id]).await?;

        let moved = fetch_row::<C>(conn, key, row_id).await?;

        info!(
            table = C::TABLE,
            user_id = %key.user_id,
            row_id = %row_id,
            from = current,
            to = target,
            "Moved row"
        );
        Ok(MoveOutcome { row: moved, moved: true })
    }

    async fn unpark<C: OrderedContainer>(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        scopes: Vec<Uuid>,
    ) -> CoreResult<()> {
        let sql = format!(
            r#"UPDATE {} SET "index" = "index" - $1 WHERE user_id = $2 AND {} = ANY($3) AND "index" >= $1"#,
            C::TABLE,
            C::SCOPE_COLUMN
        );
        let landed = sqlx::query(&sql)
            .bind(self.offset)
            .bind(user_id)
            .bind(scopes)
            .execute(&mut *conn)
            .await?
            .rows_affected();

        debug!(table = C::TABLE, landed, "Removed reindex offset");
        Ok(())
    }
}

fn not_found<C: OrderedContainer>(row_id: Uuid) -> CoreError {
    CoreError::NotFound(format!("{} {}", C::LABEL, row_id))
}

async fn ensure_container<C: OrderedContainer>(
    conn: &mut PgConnection,
    key: ContainerKey,
) -> CoreResult<()> {
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1 AND user_id = $2)",
        C::PARENT_TABLE
    );
    let exists: bool = sqlx::query_scalar(&sql)
        .bind(key.scope_id)
        .bind(key.user_id)
        .fetch_one(&mut *conn)
        .await?;

    if exists {
        Ok(())
    } else {
        Err(CoreError::NotFound(format!("Container {}", key.scope_id)))
    }
}

async fn fetch_row<C: OrderedContainer>(
    conn: &mut PgConnection,
    key: ContainerKey,
    row_id: Uuid,
) -> CoreResult<C::Row> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = $1 AND user_id = $2 AND {} = $3",
        C::COLUMNS,
        C::TABLE,
        C::SCOPE_COLUMN
    );
    sqlx::query_as::<_, C::Row>(&sql)
        .bind(row_id)
        .bind(key.user_id)
        .bind(key.scope_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found::<C>(row_id))
}

async fn max_index<C: OrderedContainer>(
    conn: &mut PgConnection,
    key: ContainerKey,
) -> CoreResult<Option<i32>> {
    let sql = format!(
        r#"SELECT MAX("index") FROM {} WHERE user_id = $1 AND {} = $2"#,
        C::TABLE,
        C::SCOPE_COLUMN
    );
    let max: Option<i32> = sqlx::query_scalar(&sql)
        .bind(key.user_id)
        .bind(key.scope_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(max)
}

async fn next_index<C: OrderedContainer>(conn: &mut PgConnection, key: ContainerKey) -> CoreResult<i32> {
    Ok(max_index::<C>(conn, key).await?.map_or(0, |max| max + 1))
}

/// Moves one row out of the live range; also stamps `updated_at`
async fn park_row<C: OrderedContainer>(
    conn: &mut PgConnection,
    key: ContainerKey,
    row_id: Uuid,
    parked_index: i32,
) -> CoreResult<()> {
    let sql = format!(
        r#"UPDATE {} SET "index" = $3, updated_at = NOW() WHERE id = $1 AND user_id = $2"#,
        C::TABLE
    );
    sqlx::query(&sql)
        .bind(row_id)
        .bind(key.user_id)
        .bind(parked_index)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
