//! Shared test fixtures for the rollout decision core.
//!
//! Builders keep the integration tests terse: an instance is three
//! strings, a node is a ready flag plus labels, a fleet is a prefix and a
//! count.

use std::collections::BTreeMap;

use rollout_core::{
    ConditionStatus, Instance, LifecycleState, Node, NodeCondition, ReadinessGate, NODE_READY,
};

/// An in-service instance in `zone`.
#[must_use]
pub fn in_service(id: &str, zone: &str) -> Instance {
    Instance::new(id, zone, LifecycleState::InService)
}

/// An instance in an arbitrary lifecycle state.
#[must_use]
pub fn instance(id: &str, zone: &str, state: LifecycleState) -> Instance {
    Instance::new(id, zone, state)
}

/// `count` in-service instances named `{prefix}-0..count`, all in `zone`.
#[must_use]
pub fn fleet(prefix: &str, zone: &str, count: usize) -> Vec<Instance> {
    (0..count)
        .map(|n| in_service(&format!("{prefix}-{n}"), zone))
        .collect()
}

/// A node reporting `Ready`/`True`.
#[must_use]
pub fn ready_node() -> Node {
    Node {
        conditions: vec![NodeCondition::new(NODE_READY, ConditionStatus::True)],
        ..Node::default()
    }
}

/// A ready node carrying the given labels.
#[must_use]
pub fn labeled_node(labels: &[(&str, &str)]) -> Node {
    Node {
        conditions: vec![NodeCondition::new(NODE_READY, ConditionStatus::True)],
        labels: to_label_map(labels),
    }
}

/// A readiness gate requiring the given label pairs.
#[must_use]
pub fn gate(labels: &[(&str, &str)]) -> ReadinessGate {
    ReadinessGate {
        match_labels: to_label_map(labels),
    }
}

fn to_label_map(labels: &[(&str, &str)]) -> BTreeMap<String, String> {
    labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
