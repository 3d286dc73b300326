//! The declarative YAML activity format and its lowering into runtime trees.

use choreo::{ActivitySpec, ActivityTree, ChoreoError, CompositeKind, NodeId, NodeSpec};
use pretty_assertions::assert_eq;

const DRILL: &str = r#"
name: fire-drill
description: evacuation rehearsal
root:
  kind: sequence
  children:
    - kind: leaf
      id: 1
      name: brief
      role: instructor
      delay_ms: 250
      action: dialogue
      parameters:
        line: "move out"
      error_handling:
        on_timeout: repeat
    - kind: parallel
      children:
        - kind: leaf
          id: 2
          name: evacuate
          role: trainee
          action: move_to
        - kind: leaf
          id: 3
          name: siren
          role: scene
          action: play_sound
"#;

#[test]
fn yaml_description_lowers_into_the_expected_tree() {
    let tree = ActivityTree::from_yaml_str(DRILL).unwrap();
    assert_eq!(tree.name, "fire-drill");
    assert_eq!(tree.description, "evacuation rehearsal");
    assert_eq!(tree.leaf_count(), 3);

    let root = tree.root();
    let root = root.as_composite().expect("root must be a composite");
    assert_eq!(root.kind, CompositeKind::Sequence);
    assert_eq!(root.children.len(), 2);

    let brief = root.children[0].as_leaf().expect("first child is a leaf");
    assert_eq!(brief.id, NodeId(1));
    assert_eq!(brief.role, "instructor");
    assert_eq!(brief.delay_ms, 250);
    assert_eq!(brief.action, "dialogue");
    assert_eq!(brief.param("line"), Some("move out"));
    // stored but never interpreted
    assert_eq!(
        brief.error_handling.get("on_timeout").map(String::as_str),
        Some("repeat")
    );

    let inner = root.children[1]
        .as_composite()
        .expect("second child is a composite");
    assert_eq!(inner.kind, CompositeKind::Parallel);
    assert_eq!(inner.children.len(), 2);
}

#[test]
fn leaf_defaults_apply_when_fields_are_omitted() {
    let yaml = r#"
name: minimal
root:
  kind: leaf
  id: 1
  name: only
  role: trainee
  action: noop
"#;
    let tree = ActivityTree::from_yaml_str(yaml).unwrap();
    let leaf = tree.lookup_leaf(NodeId(1)).unwrap();
    assert_eq!(leaf.delay_ms, 0);
    assert!(leaf.parameters.is_empty());
    assert!(leaf.error_handling.is_empty());
}

#[test]
fn duplicate_leaf_ids_are_rejected() {
    let yaml = r#"
name: broken
root:
  kind: parallel
  children:
    - kind: leaf
      id: 4
      name: a
      role: r
      action: x
    - kind: leaf
      id: 4
      name: b
      role: r
      action: y
"#;
    let err = ActivityTree::from_yaml_str(yaml).unwrap_err();
    match err {
        ChoreoError::Validation { message, field } => {
            assert!(message.contains("duplicate leaf node id 4"));
            assert_eq!(field.as_deref(), Some("id"));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn malformed_yaml_is_an_authoring_error() {
    let err = ActivityTree::from_yaml_str("name: [unbalanced").unwrap_err();
    assert!(matches!(err, ChoreoError::Yaml(_)));
}

#[test]
fn selector_nodes_parse_but_stay_reserved() {
    let yaml = r#"
name: reserved
root:
  kind: selector
  children:
    - kind: leaf
      id: 1
      name: option-a
      role: r
      action: x
"#;
    let spec = ActivitySpec::from_yaml_str(yaml).unwrap();
    assert!(matches!(spec.root, NodeSpec::Selector { .. }));
    let tree = ActivityTree::from_spec(spec).unwrap();
    assert_eq!(
        tree.root().as_composite().unwrap().kind,
        CompositeKind::Selector
    );
}
