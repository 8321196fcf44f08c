/// Path resolution over the per-user node tree
///
/// Paths are never stored. Resolution runs a recursive query that rebuilds
/// paths from parent pointers, in one of two directions:
///
/// - **path → node**: descend from the user's roots (`parent_id IS NULL`),
///   joining names with `/`, and keep the node whose path matches.
/// - **node → path**: ascend from one node to its root and join the names in
///   reverse.
///
/// Inside both queries the root is its own name ([`ROOT_NAME`]); the external
/// form maps it to `/`. Mutations that need several lookups load the user's
/// tree into a [`NodeTree`] within the same transaction and walk it in memory.
///
/// # Example
///
/// ```no_run
/// use kanbanfs_shared::paths::PathResolver;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let paths = PathResolver::new(pool);
/// paths.ensure_root(user_id).await?;
///
/// let folder = paths.create(user_id, "/", "work").await?;
/// paths.create(user_id, "/work", "roadmap.kanban").await?;
///
/// assert_eq!(paths.path_of(user_id, folder.id).await?, "/work");
/// # Ok(())
/// # }
/// ```

pub mod path;
pub mod tree;

pub use path::{ReservedPaths, DEFAULT_RESERVED_PATHS, ROOT_PATH};
pub use tree::NodeTree;

use serde::Serialize;
use sqlx::{postgres::PgExecutor, PgPool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::node::{Node, ROOT_NAME};

/// Recursion bound for both tree queries
pub const MAX_TREE_DEPTH: i32 = 256;

/// A resolved node together with its direct children
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedNode {
    pub node: Node,
    pub children: Vec<Node>,
}

/// Requested change of name and/or parent
#[derive(Debug, Clone, Default)]
pub struct NodePlacement {
    pub name: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// Outcome of a rename or reparent; both paths are returned so callers can
/// drop anything they cached under the old one
#[derive(Debug, Clone, Serialize)]
pub struct NodeMove {
    pub node: Node,
    pub old_path: String,
    pub new_path: String,
}

impl NodeMove {
    pub fn path_changed(&self) -> bool {
        self.old_path != self.new_path
    }
}

#[derive(sqlx::FromRow)]
struct ResolvedRow {
    #[sqlx(flatten)]
    node: Node,
    is_target: bool,
}

/// Translates between logical paths and nodes, scoped per user
#[derive(Debug, Clone)]
pub struct PathResolver {
    pool: PgPool,
    reserved: ReservedPaths,
}

impl PathResolver {
    pub fn new(pool: PgPool) -> Self {
        Self::with_reserved(pool, ReservedPaths::default())
    }

    pub fn with_reserved(pool: PgPool, reserved: ReservedPaths) -> Self {
        Self { pool, reserved }
    }

    pub fn reserved(&self) -> &ReservedPaths {
        &self.reserved
    }

    /// Creates the user's root node if it does not exist yet
    pub async fn ensure_root(&self, user_id: Uuid) -> CoreResult<Node> {
        if let Some(root) = Node::find_root(&self.pool, user_id).await? {
            return Ok(root);
        }

        match Node::create(&self.pool, user_id, None, ROOT_NAME).await.map_err(CoreError::from) {
            Ok(root) => {
                info!(user_id = %user_id, node_id = %root.id, "Created root node");
                Ok(root)
            }
            // A concurrent signup got there first.
            Err(CoreError::Conflict(_)) => Node::find_root(&self.pool, user_id)
                .await?
                .ok_or_else(|| CoreError::path_not_found(ROOT_PATH)),
            Err(e) => Err(e),
        }
    }

    /// Resolves an external path to its node
    pub async fn resolve(&self, user_id: Uuid, path: &str) -> CoreResult<Node> {
        let path = path::normalize(path)?;
        find_by_path(&self.pool, user_id, &path)
            .await?
            .ok_or_else(|| CoreError::path_not_found(&path))
    }

    /// Resolves a path and returns its direct children in the same query
    pub async fn resolve_with_children(&self, user_id: Uuid, path: &str) -> CoreResult<ResolvedNode> {
        let path = path::normalize(path)?;

        let rows = sqlx::query_as::<_, ResolvedRow>(
            r#"
            WITH RECURSIVE tree AS (
                SELECT id, user_id, name, parent_id, created_at, updated_at,
                       name::TEXT AS path, 0 AS depth
                FROM nodes
                WHERE user_id = $1 AND parent_id IS NULL
                UNION ALL
                SELECT n.id, n.user_id, n.name, n.parent_id, n.created_at, n.updated_at,
                       tree.path || '/' || n.name, tree.depth + 1
                FROM nodes n
                JOIN tree ON n.parent_id = tree.id
                WHERE n.user_id = $1
                  AND tree.depth < $3
                  AND starts_with($2, tree.path || '/')
            ),
            target AS (
                SELECT id, user_id, name, parent_id, created_at, updated_at
                FROM tree
                WHERE path = $2
                LIMIT 1
            )
            SELECT id, user_id, name, parent_id, created_at, updated_at, TRUE AS is_target
            FROM target
            UNION ALL
            SELECT n.id, n.user_id, n.name, n.parent_id, n.created_at, n.updated_at, FALSE
            FROM nodes n
            JOIN target ON n.parent_id = target.id
            WHERE n.user_id = $1
            ORDER BY is_target DESC, name ASC
            "#,
        )
        .bind(user_id)
        .bind(path::to_stored(&path))
        .bind(MAX_TREE_DEPTH)
        .fetch_all(&self.pool)
        .await?;

        let mut rows = rows.into_iter();
        let node = match rows.next() {
            Some(row) if row.is_target => row.node,
            _ => return Err(CoreError::path_not_found(&path)),
        };
        let children = rows.map(|row| row.node).collect();

        Ok(ResolvedNode { node, children })
    }

    /// External path of a node
    pub async fn path_of(&self, user_id: Uuid, node_id: Uuid) -> CoreResult<String> {
        path_of_node(&self.pool, user_id, node_id)
            .await?
            .ok_or_else(|| CoreError::node_not_found(node_id))
    }

    /// Loads the user's whole tree for in-memory walks
    pub async fn load_tree(&self, user_id: Uuid) -> CoreResult<NodeTree> {
        Ok(NodeTree::new(Node::list_by_user(&self.pool, user_id).await?))
    }

    /// Creates `name` under `parent_path`
    ///
    /// # Errors
    ///
    /// - `Conflict` if the new path is reserved or already taken
    /// - `NotFound` if `parent_path` does not resolve
    /// - `InvalidOperation` if the name or parent path is malformed
    pub async fn create(&self, user_id: Uuid, parent_path: &str, name: &str) -> CoreResult<Node> {
        path::validate_name(name)?;
        let parent_path = path::normalize(parent_path)?;
        let full_path = path::join(&parent_path, name);

        if self.reserved.contains(&full_path) {
            warn!(user_id = %user_id, path = %full_path, "Rejected reserved path");
            return Err(CoreError::Conflict(format!("Path {} is reserved", full_path)));
        }

        let mut tx = self.pool.begin().await?;

        if find_by_path(&mut *tx, user_id, &full_path).await?.is_some() {
            return Err(CoreError::Conflict(format!("Path {} already exists", full_path)));
        }

        let parent = find_by_path(&mut *tx, user_id, &parent_path)
            .await?
            .ok_or_else(|| CoreError::path_not_found(&parent_path))?;

        let node = Node::create(&mut *tx, user_id, Some(parent.id), name).await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            node_id = %node.id,
            path = %full_path,
            "Created node"
        );
        Ok(node)
    }

    /// Renames a node, moves it under another parent, or both
    ///
    /// Reserved and duplicate checks only run when the path actually changes.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the node or the new parent does not exist for this user
    /// - `Forbidden` if the node is a root
    /// - `InvalidOperation` if the new parent lies inside the node's own subtree
    /// - `Conflict` if the new path is reserved or taken
    pub async fn rename_or_reparent(
        &self,
        user_id: Uuid,
        node_id: Uuid,
        placement: NodePlacement,
    ) -> CoreResult<NodeMove> {
        if let Some(name) = &placement.name {
            path::validate_name(name)?;
        }

        let mut tx = self.pool.begin().await?;

        let tree = NodeTree::new(Node::list_by_user(&mut *tx, user_id).await?);
        let node = tree
            .get(node_id)
            .cloned()
            .ok_or_else(|| CoreError::node_not_found(node_id))?;

        let Some(current_parent) = node.parent_id else {
            return Err(CoreError::Forbidden(
                "A root node cannot be renamed or moved".to_string(),
            ));
        };

        let old_path = tree
            .path_of(node_id)
            .ok_or_else(|| CoreError::node_not_found(node_id))?;

        let new_parent = placement.parent_id.unwrap_or(current_parent);
        if tree.get(new_parent).is_none() {
            return Err(CoreError::node_not_found(new_parent));
        }
        if new_parent == node_id || tree.is_descendant(new_parent, node_id) {
            warn!(
                user_id = %user_id,
                node_id = %node_id,
                new_parent = %new_parent,
                "Rejected move into own subtree"
            );
            return Err(CoreError::InvalidOperation(
                "A node cannot be moved inside itself".to_string(),
            ));
        }

        let new_name = placement.name.unwrap_or_else(|| node.name.clone());
        let parent_path = tree
            .path_of(new_parent)
            .ok_or_else(|| CoreError::node_not_found(new_parent))?;
        let new_path = path::join(&parent_path, &new_name);

        if new_path == old_path {
            debug!(user_id = %user_id, node_id = %node_id, "Placement unchanged");
            return Ok(NodeMove {
                node,
                old_path,
                new_path,
            });
        }

        if self.reserved.contains(&new_path) {
            return Err(CoreError::Conflict(format!("Path {} is reserved", new_path)));
        }
        if tree.resolve(&new_path).is_some() {
            return Err(CoreError::Conflict(format!("Path {} already exists", new_path)));
        }

        let updated = Node::update_placement(&mut *tx, node_id, user_id, &new_name, Some(new_parent))
            .await?
            .ok_or_else(|| CoreError::node_not_found(node_id))?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            node_id = %node_id,
            old_path = %old_path,
            new_path = %new_path,
            "Moved node"
        );
        Ok(NodeMove {
            node: updated,
            old_path,
            new_path,
        })
    }

    /// Deletes a node and, through cascades, everything under it
    ///
    /// Returns the deleted node's former path.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the node does not exist for this user or has no path
    /// - `Forbidden` if the node is a root
    pub async fn delete(&self, user_id: Uuid, node_id: Uuid) -> CoreResult<String> {
        let mut tx = self.pool.begin().await?;

        let node = Node::find_by_id_and_user(&mut *tx, node_id, user_id)
            .await?
            .ok_or_else(|| CoreError::node_not_found(node_id))?;

        if node.is_root() {
            warn!(user_id = %user_id, node_id = %node_id, name = %node.name, "Rejected root deletion");
            return Err(CoreError::Forbidden("A root node cannot be deleted".to_string()));
        }

        let path = path_of_node(&mut *tx, user_id, node_id)
            .await?
            .ok_or_else(|| CoreError::node_not_found(node_id))?;

        if !Node::delete(&mut *tx, node_id, user_id).await? {
            return Err(CoreError::node_not_found(node_id));
        }

        tx.commit().await?;

        info!(user_id = %user_id, node_id = %node_id, path = %path, "Deleted node");
        Ok(path)
    }
}

/// Runs the descending recursive query for one normalized external path
pub async fn find_by_path<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    external_path: &str,
) -> Result<Option<Node>, sqlx::Error> {
    sqlx::query_as::<_, Node>(
        r#"
        WITH RECURSIVE tree AS (
            SELECT id, user_id, name, parent_id, created_at, updated_at,
                   name::TEXT AS path, 0 AS depth
            FROM nodes
            WHERE user_id = $1 AND parent_id IS NULL
            UNION ALL
            SELECT n.id, n.user_id, n.name, n.parent_id, n.created_at, n.updated_at,
                   tree.path || '/' || n.name, tree.depth + 1
            FROM nodes n
            JOIN tree ON n.parent_id = tree.id
            WHERE n.user_id = $1
              AND tree.depth < $3
              AND starts_with($2, tree.path || '/')
        )
        SELECT id, user_id, name, parent_id, created_at, updated_at
        FROM tree
        WHERE path = $2
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(path::to_stored(external_path))
    .bind(MAX_TREE_DEPTH)
    .fetch_optional(executor)
    .await
}

/// Runs the ascending recursive query
///
/// `None` if the node is not the user's or its chain does not end at the root.
pub async fn path_of_node<'e, E: PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    node_id: Uuid,
) -> Result<Option<String>, sqlx::Error> {
    // A chain cut off by the depth bound never reaches a parentless node.
    let stored: Option<Option<String>> = sqlx::query_scalar(
        r#"
        WITH RECURSIVE ancestry AS (
            SELECT id, name, parent_id, 0 AS depth
            FROM nodes
            WHERE id = $1 AND user_id = $2
            UNION ALL
            SELECT n.id, n.name, n.parent_id, ancestry.depth + 1
            FROM nodes n
            JOIN ancestry ON n.id = ancestry.parent_id
            WHERE n.user_id = $2 AND ancestry.depth < $3
        )
        SELECT string_agg(name, '/' ORDER BY depth DESC)
        FROM ancestry
        HAVING bool_or(parent_id IS NULL)
        "#,
    )
    .bind(node_id)
    .bind(user_id)
    .bind(MAX_TREE_DEPTH)
    .fetch_optional(executor)
    .await?;

    Ok(stored.flatten().and_then(|stored| path::from_stored(&stored)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn node(name: &str) -> Node {
        Node {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            parent_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_node_move_path_changed() {
        let moved = NodeMove {
            node: node("b"),
            old_path: "/a".to_string(),
            new_path: "/b".to_string(),
        };
        assert!(moved.path_changed());

        let unchanged = NodeMove {
            node: node("a"),
            old_path: "/a".to_string(),
            new_path: "/a".to_string(),
        };
        assert!(!unchanged.path_changed());
    }

    #[test]
    fn test_max_depth_is_positive() {
        assert!(MAX_TREE_DEPTH > 0);
    }
}
