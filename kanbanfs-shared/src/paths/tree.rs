/// In-memory view of one user's node tree
///
/// Built from [`Node::list_by_user`](crate::models::node::Node::list_by_user)
/// inside the same transaction that uses it, so it never outlives the writes
/// it was loaded alongside. Walks are bounded by the node count, which keeps a
/// corrupted (cyclic) parent chain from looping.

use std::collections::HashMap;

use uuid::Uuid;

use super::path::{self, ROOT_PATH};
use crate::models::node::{Node, ROOT_NAME};

#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: HashMap<Uuid, Node>,
    children: HashMap<Uuid, Vec<Uuid>>,
}

impl NodeTree {
    pub fn new(nodes: Vec<Node>) -> Self {
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for node in &nodes {
            if let Some(parent_id) = node.parent_id {
                children.entry(parent_id).or_default().push(node.id);
            }
        }

        Self {
            nodes: nodes.into_iter().map(|node| (node.id, node)).collect(),
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// The sentinel root, if the user has one
    pub fn root(&self) -> Option<&Node> {
        self.nodes
            .values()
            .find(|node| node.parent_id.is_none() && node.name == ROOT_NAME)
    }

    /// External path of a node
    ///
    /// `None` if the node is unknown, a parent pointer dangles, the chain
    /// does not terminate or it ends at a parentless node other than the root.
    pub fn path_of(&self, id: Uuid) -> Option<String> {
        let mut names = Vec::new();
        let mut cursor = self.nodes.get(&id)?;

        loop {
            names.push(cursor.name.as_str());
            match cursor.parent_id {
                None => break,
                Some(parent_id) => {
                    if names.len() > self.nodes.len() {
                        return None;
                    }
                    cursor = self.nodes.get(&parent_id)?;
                }
            }
        }

        names.reverse();
        path::from_stored(&names.join("/"))
    }

    /// Descends from the sentinel root one segment at a time
    pub fn resolve(&self, external_path: &str) -> Option<&Node> {
        let mut cursor = self.root()?;
        if external_path == ROOT_PATH {
            return Some(cursor);
        }

        for segment in path::segments(external_path) {
            let next = self
                .children
                .get(&cursor.id)?
                .iter()
                .filter_map(|child_id| self.nodes.get(child_id))
                .find(|child| child.name == segment)?;
            cursor = next;
        }
        Some(cursor)
    }

    /// True if `ancestor` appears on the parent chain of `id` (excluding `id` itself)
    pub fn is_descendant(&self, id: Uuid, ancestor: Uuid) -> bool {
        let mut cursor = self.nodes.get(&id).and_then(|node| node.parent_id);
        let mut steps = 0;

        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            cursor = self.nodes.get(&current).and_then(|node| node.parent_id);
        }
        false
    }

    /// Every node with its external path; the memoized id -> path index
    pub fn path_index(&self) -> HashMap<Uuid, String> {
        self.nodes
            .keys()
            .filter_map(|id| self.path_of(*id).map(|path| (*id, path)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn node(user_id: Uuid, name: &str, parent_id: Option<Uuid>) -> Node {
        Node {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            parent_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// / -> work -> plan.kanban, / -> notes
    fn sample() -> (NodeTree, Node, Node, Node, Node) {
        let user_id = Uuid::new_v4();
        let root = node(user_id, ROOT_NAME, None);
        let work = node(user_id, "work", Some(root.id));
        let plan = node(user_id, "plan.kanban", Some(work.id));
        let notes = node(user_id, "notes", Some(root.id));
        let tree = NodeTree::new(vec![root.clone(), work.clone(), plan.clone(), notes.clone()]);
        (tree, root, work, plan, notes)
    }

    #[test]
    fn test_path_of() {
        let (tree, root, work, plan, _) = sample();
        assert_eq!(tree.path_of(root.id).unwrap(), "/");
        assert_eq!(tree.path_of(work.id).unwrap(), "/work");
        assert_eq!(tree.path_of(plan.id).unwrap(), "/work/plan.kanban");
        assert!(tree.path_of(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_resolve_round_trip() {
        let (tree, _, _, plan, _) = sample();
        for (id, path) in tree.path_index() {
            assert_eq!(tree.resolve(&path).unwrap().id, id);
        }
        assert_eq!(tree.resolve("/work/plan.kanban").unwrap().id, plan.id);
        assert!(tree.resolve("/work/missing").is_none());
    }

    #[test]
    fn test_is_descendant() {
        let (tree, root, work, plan, notes) = sample();
        assert!(tree.is_descendant(plan.id, work.id));
        assert!(tree.is_descendant(plan.id, root.id));
        assert!(!tree.is_descendant(work.id, plan.id));
        assert!(!tree.is_descendant(notes.id, work.id));
        assert!(!tree.is_descendant(work.id, work.id));
    }

    #[test]
    fn test_parentless_non_root_has_no_path() {
        let (tree, root, _, _, _) = sample();
        let user_id = root.user_id;
        let other = node(user_id, "other", None);
        let inner = node(user_id, "inner", Some(other.id));
        let shadow = node(user_id, "other", Some(root.id));

        let mut nodes: Vec<Node> = tree.nodes.values().cloned().collect();
        nodes.extend([other.clone(), inner.clone(), shadow.clone()]);
        let tree = NodeTree::new(nodes);

        assert!(tree.path_of(other.id).is_none());
        assert!(tree.path_of(inner.id).is_none());
        assert_eq!(tree.resolve("/other").unwrap().id, shadow.id);
        assert!(tree.resolve("/other/inner").is_none());
        assert!(!tree.path_index().contains_key(&other.id));
        assert_eq!(tree.root().unwrap().id, root.id);
    }

    #[test]
    fn test_cycle_terminates() {
        let user_id = Uuid::new_v4();
        let mut a = node(user_id, "a", None);
        let b = node(user_id, "b", Some(a.id));
        a.parent_id = Some(b.id);
        let tree = NodeTree::new(vec![a.clone(), b.clone()]);

        assert!(tree.path_of(a.id).is_none());
        assert!(!tree.is_descendant(a.id, Uuid::new_v4()));
    }
}
