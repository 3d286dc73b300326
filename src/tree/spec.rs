//! Declarative activity description.
//!
//! Activities are authored in YAML and deserialized into these types before
//! being lowered into runtime nodes by [`crate::tree::ActivityTree::from_spec`].
//!
//! ```yaml
//! name: fire-drill
//! description: evacuation rehearsal
//! root:
//!   kind: sequence
//!   children:
//!     - kind: leaf
//!       id: 1
//!       name: brief
//!       role: instructor
//!       action: dialogue
//!       parameters:
//!         line: "move out"
//! ```

use std::collections::HashMap;

use serde::Deserialize;

use crate::core::errors::Result;
use crate::tree::node::NodeId;

/// Top-level description of one scripted activity.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivitySpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub root: NodeSpec,
}

impl ActivitySpec {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// One authored node: a composite with children, or a leaf.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeSpec {
    Sequence {
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    Parallel {
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    /// Reserved; accepted by the loader but carries no execution semantics.
    Selector {
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    Leaf(LeafSpec),
}

/// Authored fields of a leaf node.
#[derive(Debug, Clone, Deserialize)]
pub struct LeafSpec {
    pub id: NodeId,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub delay_ms: u64,
    /// Action identifier resolved through the action registry.
    pub action: String,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    #[serde(default)]
    pub error_handling: HashMap<String, String>,
}
