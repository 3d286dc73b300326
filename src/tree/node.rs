//! Runtime tree nodes.
//!
//! Nodes are built once from an [`crate::tree::spec::ActivitySpec`] and mutated
//! during a single execution pass. The two runtime flags (`executing`,
//! `accomplished`) are private and only reachable through their setters, so the
//! lifecycle invariants live in one place.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use super::spec::LeafSpec;

/// Stable node identifier, unique within a tree, assigned at authoring time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a composite combines its children.
///
/// `Selector` is reserved: it can be authored but has no execution semantics,
/// and the executor treats such a node as immediately complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeKind {
    Sequence,
    Parallel,
    Selector,
}

/// A node in the activity tree.
#[derive(Debug)]
pub enum ActivityNode {
    Composite(CompositeNode),
    Leaf(Arc<LeafNode>),
}

impl ActivityNode {
    pub fn is_executing(&self) -> bool {
        match self {
            ActivityNode::Composite(c) => c.is_executing(),
            ActivityNode::Leaf(l) => l.is_executing(),
        }
    }

    pub(crate) fn set_executing(&self, on: bool) {
        match self {
            ActivityNode::Composite(c) => c.set_executing(on),
            ActivityNode::Leaf(l) => l.set_executing(on),
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeNode> {
        match self {
            ActivityNode::Composite(c) => Some(c),
            ActivityNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Arc<LeafNode>> {
        match self {
            ActivityNode::Composite(_) => None,
            ActivityNode::Leaf(l) => Some(l),
        }
    }
}

/// A tree node composing children under a [`CompositeKind`] policy.
///
/// Children order is significant for `Sequence`; for `Parallel` it only
/// affects start order.
#[derive(Debug)]
pub struct CompositeNode {
    pub kind: CompositeKind,
    pub children: Vec<Arc<ActivityNode>>,
    executing: AtomicBool,
}

impl CompositeNode {
    pub fn new(kind: CompositeKind, children: Vec<Arc<ActivityNode>>) -> Self {
        Self {
            kind,
            children,
            executing: AtomicBool::new(false),
        }
    }

    pub fn is_executing(&self) -> bool {
        self.executing.load(Ordering::SeqCst)
    }

    pub(crate) fn set_executing(&self, on: bool) {
        self.executing.store(on, Ordering::SeqCst);
    }
}

/// A tree node wrapping one scripted action.
#[derive(Debug)]
pub struct LeafNode {
    pub id: NodeId,
    pub name: String,
    /// Symbolic role identifier, resolved to an actor by the injected
    /// [`crate::sync::roles::RoleResolver`].
    pub role: String,
    /// Milliseconds to wait before the action body begins.
    pub delay_ms: u64,
    /// Key into the [`crate::action::registry::ActionRegistry`].
    pub action: String,
    pub parameters: HashMap<String, String>,
    /// Stored for forward compatibility; never interpreted by the engine.
    pub error_handling: HashMap<String, String>,
    executing: AtomicBool,
    accomplished: AtomicBool,
    accomplished_notify: Notify,
}

impl LeafNode {
    pub fn from_spec(spec: LeafSpec) -> Self {
        Self {
            id: spec.id,
            name: spec.name,
            role: spec.role,
            delay_ms: spec.delay_ms,
            action: spec.action,
            parameters: spec.parameters,
            error_handling: spec.error_handling,
            executing: AtomicBool::new(false),
            accomplished: AtomicBool::new(false),
            accomplished_notify: Notify::new(),
        }
    }

    pub fn is_executing(&self) -> bool {
        self.executing.load(Ordering::SeqCst)
    }

    pub(crate) fn set_executing(&self, on: bool) {
        self.executing.store(on, Ordering::SeqCst);
    }

    pub fn is_accomplished(&self) -> bool {
        self.accomplished.load(Ordering::SeqCst)
    }

    /// Mark the node's underlying real-world condition as satisfied.
    ///
    /// Idempotent: marking twice is indistinguishable from marking once, which
    /// is what makes duplicate or racing completion notices safe. Never reset
    /// within a node's single execution lifetime.
    pub fn mark_accomplished(&self) {
        self.accomplished.store(true, Ordering::SeqCst);
        self.accomplished_notify.notify_waiters();
    }

    /// Suspend until [`mark_accomplished`](Self::mark_accomplished) is called.
    /// Returns immediately if the node is already accomplished.
    pub async fn wait_accomplished(&self) {
        loop {
            let notified = self.accomplished_notify.notified();
            if self.is_accomplished() {
                return;
            }
            notified.await;
        }
    }

    /// Get a scripted parameter by key.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}
