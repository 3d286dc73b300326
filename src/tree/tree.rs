//! The activity tree aggregate: one root node plus a flat index from leaf id
//! to leaf instance, used for O(1) routing of completion notifications.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::core::errors::{ChoreoError, Result};
use crate::tree::node::{ActivityNode, CompositeKind, CompositeNode, LeafNode, NodeId};
use crate::tree::spec::{ActivitySpec, NodeSpec};

/// The whole composite/leaf node graph plus its leaf-id index for one
/// scripted activity run.
///
/// Trees are built once per run and discarded wholesale; nodes are not reused
/// across runs.
#[derive(Debug)]
pub struct ActivityTree {
    pub name: String,
    pub description: String,
    root: Arc<ActivityNode>,
    leaf_index: HashMap<NodeId, Arc<LeafNode>>,
}

impl ActivityTree {
    /// Build a tree from its YAML description.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::from_spec(ActivitySpec::from_yaml_str(yaml)?)
    }

    /// Build a tree from a YAML file on disk.
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChoreoError::io(format!("reading {}", path.display()), e))?;
        Self::from_yaml_str(&contents)
    }

    /// Lower an authored spec into runtime nodes and build the leaf index.
    ///
    /// Fails if two leaves share an id; every leaf reachable from the root
    /// appears exactly once in the index.
    pub fn from_spec(spec: ActivitySpec) -> Result<Self> {
        let mut leaf_index = HashMap::new();
        let root = build_node(spec.root, &mut leaf_index)?;
        Ok(Self {
            name: spec.name,
            description: spec.description,
            root,
            leaf_index,
        })
    }

    pub fn root(&self) -> Arc<ActivityNode> {
        Arc::clone(&self.root)
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.leaf_index.len()
    }

    pub fn leaf_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.leaf_index.keys().copied()
    }

    /// Look up a leaf by id. Used by the completion synchronization bridge to
    /// route an inbound completion notice.
    pub fn lookup_leaf(&self, id: NodeId) -> Option<Arc<LeafNode>> {
        self.leaf_index.get(&id).cloned()
    }

    /// Inbound entry point of the completion synchronization bridge: mark the
    /// matching leaf accomplished.
    ///
    /// An unknown id is a deliberate soft failure, not an error: the run may
    /// already have ended or the tree may have been rebuilt since the notice
    /// was sent. Delivering the same notice twice has no additional effect.
    pub fn notify_accomplished(&self, id: NodeId) {
        match self.leaf_index.get(&id) {
            Some(leaf) => {
                debug!(node = %id, name = %leaf.name, "completion notice received");
                leaf.mark_accomplished();
            }
            None => {
                debug!(node = %id, "completion notice for unknown node id ignored");
            }
        }
    }
}

fn build_node(
    spec: NodeSpec,
    leaf_index: &mut HashMap<NodeId, Arc<LeafNode>>,
) -> Result<Arc<ActivityNode>> {
    let node = match spec {
        NodeSpec::Sequence { children } => ActivityNode::Composite(CompositeNode::new(
            CompositeKind::Sequence,
            build_children(children, leaf_index)?,
        )),
        NodeSpec::Parallel { children } => ActivityNode::Composite(CompositeNode::new(
            CompositeKind::Parallel,
            build_children(children, leaf_index)?,
        )),
        NodeSpec::Selector { children } => ActivityNode::Composite(CompositeNode::new(
            CompositeKind::Selector,
            build_children(children, leaf_index)?,
        )),
        NodeSpec::Leaf(leaf_spec) => {
            let leaf = Arc::new(LeafNode::from_spec(leaf_spec));
            if leaf_index.insert(leaf.id, Arc::clone(&leaf)).is_some() {
                return Err(ChoreoError::validation_field(
                    format!("duplicate leaf node id {}", leaf.id),
                    "id",
                ));
            }
            ActivityNode::Leaf(leaf)
        }
    };
    Ok(Arc::new(node))
}

fn build_children(
    specs: Vec<NodeSpec>,
    leaf_index: &mut HashMap<NodeId, Arc<LeafNode>>,
) -> Result<Vec<Arc<ActivityNode>>> {
    specs
        .into_iter()
        .map(|spec| build_node(spec, leaf_index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: u64) -> NodeSpec {
        NodeSpec::Leaf(crate::tree::spec::LeafSpec {
            id: NodeId(id),
            name: format!("leaf-{id}"),
            role: "trainee".to_string(),
            delay_ms: 0,
            action: "noop".to_string(),
            parameters: Default::default(),
            error_handling: Default::default(),
        })
    }

    #[test]
    fn leaf_index_covers_every_reachable_leaf() {
        let spec = ActivitySpec {
            name: "t".into(),
            description: String::new(),
            root: NodeSpec::Sequence {
                children: vec![
                    leaf(1),
                    NodeSpec::Parallel {
                        children: vec![leaf(2), leaf(3)],
                    },
                ],
            },
        };
        let tree = ActivityTree::from_spec(spec).unwrap();
        assert_eq!(tree.leaf_count(), 3);
        for id in [1, 2, 3] {
            assert!(tree.lookup_leaf(NodeId(id)).is_some());
        }
        assert!(tree.lookup_leaf(NodeId(4)).is_none());
    }

    #[test]
    fn duplicate_leaf_id_is_rejected() {
        let spec = ActivitySpec {
            name: "t".into(),
            description: String::new(),
            root: NodeSpec::Sequence {
                children: vec![leaf(1), leaf(1)],
            },
        };
        let err = ActivityTree::from_spec(spec).unwrap_err();
        assert!(matches!(
            err,
            crate::core::errors::ChoreoError::Validation { .. }
        ));
    }
}
