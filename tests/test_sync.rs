//! Completion routing: idempotent notices, unknown-id safety, the loopback
//! bridge, and the event-bus driven local completion flow.

use std::sync::Arc;
use std::time::Duration;

use choreo::{
    register_action, ActionRegistry, ActivityTree, ActorBinding, AwaitSignal, LoopbackBridge,
    NodeId, ParticipantId, StaticRoles, TimedPerformance, TreeExecutor,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::time::sleep;

const TWO_LEAVES: &str = r#"
name: pair
root:
  kind: sequence
  children:
    - kind: leaf
      id: 1
      name: first
      role: trainee
      action: hold
    - kind: leaf
      id: 2
      name: second
      role: trainee
      action: hold
"#;

#[test]
fn completion_notices_are_idempotent() {
    let tree = ActivityTree::from_yaml_str(TWO_LEAVES).unwrap();
    let leaf = tree.lookup_leaf(NodeId(1)).unwrap();

    tree.notify_accomplished(NodeId(1));
    assert!(leaf.is_accomplished());
    tree.notify_accomplished(NodeId(1));
    assert!(leaf.is_accomplished());
}

#[test]
fn unknown_node_id_is_silently_ignored() {
    let tree = ActivityTree::from_yaml_str(TWO_LEAVES).unwrap();

    tree.notify_accomplished(NodeId(99));
    for id in [1, 2] {
        let leaf = tree.lookup_leaf(NodeId(id)).unwrap();
        assert!(!leaf.is_accomplished());
        assert!(!leaf.is_executing());
    }
}

#[tokio::test]
async fn local_completion_is_broadcast_through_the_bridge() {
    let yaml = r#"
name: broadcast
root:
  kind: leaf
  id: 7
  name: wave
  role: trainee
  action: perform
  parameters:
    duration_ms: "20"
"#;
    let tree = Arc::new(ActivityTree::from_yaml_str(yaml).unwrap());

    let registry = ActionRegistry::new();
    register_action!(registry, "perform", TimedPerformance);
    let roles = StaticRoles::new().with(
        "trainee",
        ActorBinding::Local {
            participant: ParticipantId("p1".into()),
        },
    );
    let (bridge, mut notices) = LoopbackBridge::new();

    let executor = TreeExecutor::new(None, registry, Arc::new(roles), bridge).unwrap();
    let report = executor.run(Arc::clone(&tree)).await.unwrap();
    assert!(report.completed);
    assert!(tree.lookup_leaf(NodeId(7)).unwrap().is_accomplished());

    let notice = notices.recv().await.expect("no completion notice sent");
    assert_eq!(notice.node_id, NodeId(7));
    assert_eq!(notice.participant, ParticipantId("p1".into()));
}

#[tokio::test]
async fn bus_signal_drives_a_local_leaf_to_completion() {
    let yaml = r#"
name: signal-flow
root:
  kind: leaf
  id: 5
  name: place-item
  role: trainee
  action: await_signal
  parameters:
    signal: interaction
"#;
    let tree = Arc::new(ActivityTree::from_yaml_str(yaml).unwrap());

    let registry = ActionRegistry::new();
    register_action!(registry, "await_signal", AwaitSignal);
    let roles = StaticRoles::new().with(
        "trainee",
        ActorBinding::Local {
            participant: ParticipantId("p1".into()),
        },
    );

    // outbound notices loop back into the tree, standing in for the network
    let (bridge, notices) = LoopbackBridge::new();
    let pump = LoopbackBridge::pump_into(notices, Arc::clone(&tree));

    let executor = Arc::new(TreeExecutor::new(None, registry, Arc::new(roles), bridge).unwrap());
    let run = tokio::spawn({
        let executor = Arc::clone(&executor);
        let tree = Arc::clone(&tree);
        async move { executor.run(tree).await.unwrap() }
    });

    // let the action subscribe before the in-world occurrence fires
    sleep(Duration::from_millis(100)).await;
    assert!(tree.lookup_leaf(NodeId(5)).unwrap().is_executing());

    // an unrelated event must not complete the leaf
    executor.bus().publish("interaction", json!({ "node_id": 99 }));
    sleep(Duration::from_millis(100)).await;
    assert!(!tree.lookup_leaf(NodeId(5)).unwrap().is_accomplished());

    executor.bus().publish("interaction", json!({ "node_id": 5 }));
    let report = run.await.unwrap();
    assert!(report.completed);
    assert!(tree.lookup_leaf(NodeId(5)).unwrap().is_accomplished());
    pump.abort();
}

#[tokio::test]
async fn autonomous_roles_self_declare_without_the_bridge() {
    let yaml = r#"
name: npc-run
root:
  kind: leaf
  id: 3
  name: act-out
  role: npc
  action: perform
  parameters:
    duration_ms: "20"
"#;
    let tree = Arc::new(ActivityTree::from_yaml_str(yaml).unwrap());

    let registry = ActionRegistry::new();
    register_action!(registry, "perform", TimedPerformance);
    let roles = StaticRoles::new().with(
        "npc",
        ActorBinding::Autonomous {
            agent: "npc-1".into(),
        },
    );
    let (bridge, mut notices) = LoopbackBridge::new();

    let executor = TreeExecutor::new(None, registry, Arc::new(roles), bridge).unwrap();
    let report = executor.run(Arc::clone(&tree)).await.unwrap();
    assert!(report.completed);
    assert!(tree.lookup_leaf(NodeId(3)).unwrap().is_accomplished());
    // no network round-trip for autonomous behavior
    assert!(notices.try_recv().is_err());
}
