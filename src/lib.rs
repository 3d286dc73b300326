//! Choreo - a scripted multi-agent activity tree engine.
//!
//! Drives a choreographed sequence of actions across networked human
//! participants and locally-simulated autonomous agents. Activities are
//! authored as YAML trees of sequence/parallel composites over leaf actions,
//! executed cooperatively on tokio, and kept consistent across machines by an
//! idempotent completion-acknowledgement flow routed through the leaf index.

// Core infrastructure modules
pub mod core {
    pub mod errors;
}

// Engine modules
pub mod action; // action contract, registry, built-ins
pub mod exec; // cooperative tree executor
pub mod sync; // bridge, roles, event bus
pub mod tree; // data model and authoring

// Re-exports for convenience
pub use crate::core::errors::{ChoreoError, Result};
pub use action::{Action, ActionCtx, ActionFactory, ActionRegistry, AwaitSignal, TimedPerformance};
pub use exec::{ExecutionReport, ExecutorConfig, TreeExecutor};
pub use sync::{
    ActorBinding, BusEvent, CompletionBridge, CompletionNotice, EventBus, LoopbackBridge,
    NullBridge, ParticipantId, RoleResolver, StaticRoles,
};
pub use tree::{
    ActivityNode, ActivitySpec, ActivityTree, CompositeKind, CompositeNode, LeafNode, LeafSpec,
    NodeId, NodeSpec,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const SMOKE_YAML: &str = r#"
name: smoke
description: end-to-end smoke run
root:
  kind: sequence
  children:
    - kind: leaf
      id: 1
      name: warmup
      role: npc
      action: timed_performance
      parameters:
        duration_ms: "20"
    - kind: parallel
      children:
        - kind: leaf
          id: 2
          name: confirm
          role: trainee
          action: timed_performance
          parameters:
            duration_ms: "20"
        - kind: leaf
          id: 3
          name: ambience
          role: narrator
          action: timed_performance
          parameters:
            duration_ms: "10"
"#;

    #[tokio::test]
    async fn scripted_activity_runs_to_completion() {
        let tree = Arc::new(ActivityTree::from_yaml_str(SMOKE_YAML).unwrap());

        let registry = ActionRegistry::new();
        crate::register_action!(registry, "timed_performance", TimedPerformance);

        let roles = StaticRoles::new()
            .with(
                "npc",
                ActorBinding::Autonomous {
                    agent: "npc-1".into(),
                },
            )
            .with(
                "trainee",
                ActorBinding::Local {
                    participant: ParticipantId("p1".into()),
                },
            )
            .with("narrator", ActorBinding::System);

        let (bridge, notices) = LoopbackBridge::new();
        let pump = LoopbackBridge::pump_into(notices, Arc::clone(&tree));

        let executor = TreeExecutor::new(None, registry, Arc::new(roles), bridge).unwrap();
        let report = executor.run(Arc::clone(&tree)).await.unwrap();

        assert!(report.completed);
        assert!(!report.stopped);
        for id in [1, 2, 3] {
            let leaf = tree.lookup_leaf(NodeId(id)).unwrap();
            assert!(leaf.is_accomplished(), "leaf {id} not accomplished");
            assert!(!leaf.is_executing());
        }
        assert!(!tree.root().is_executing());
        pump.abort();
    }
}
