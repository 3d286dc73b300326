pub mod node;
pub mod spec;
pub mod tree;

pub use node::{ActivityNode, CompositeKind, CompositeNode, LeafNode, NodeId};
pub use spec::{ActivitySpec, LeafSpec, NodeSpec};
pub use tree::ActivityTree;
