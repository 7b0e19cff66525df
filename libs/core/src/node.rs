//! Node health and readiness-gate predicates.
//!
//! A node is fit for a rollout step iff it reports a `Ready`/`True`
//! condition and satisfies every configured readiness gate. Both checks
//! are pure and total over any well-formed snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Condition type that gates basic node health.
pub const NODE_READY: &str = "Ready";

/// Status of a node condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// One entry in a node's condition set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCondition {
    /// Condition type, e.g. `Ready`.
    #[serde(rename = "type")]
    pub condition_type: String,

    /// Reported status for the condition.
    pub status: ConditionStatus,
}

impl NodeCondition {
    /// Creates a condition entry.
    #[must_use]
    pub fn new(condition_type: impl Into<String>, status: ConditionStatus) -> Self {
        Self {
            condition_type: condition_type.into(),
            status,
        }
    }
}

/// A label-match constraint a node must satisfy, in addition to basic
/// `Ready` health, before a rollout proceeds past it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessGate {
    /// Required label key/value pairs; every pair must match exactly.
    #[serde(default)]
    pub match_labels: BTreeMap<String, String>,
}

/// A node snapshot: its condition set and labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Reported conditions.
    #[serde(default)]
    pub conditions: Vec<NodeCondition>,

    /// Node labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// True iff the node reports a `Ready` condition with status `True`.
///
/// A missing `Ready` condition, `False`, or `Unknown` all read as not
/// ready.
#[must_use]
pub fn is_node_ready(node: &Node) -> bool {
    node.conditions
        .iter()
        .any(|c| c.condition_type == NODE_READY && c.status == ConditionStatus::True)
}

/// True iff the node satisfies every readiness gate.
///
/// The empty gate list passes vacuously, as does a gate with no label
/// constraints.
#[must_use]
pub fn passes_readiness_gates(node: &Node, gates: &[ReadinessGate]) -> bool {
    gates.iter().all(|gate| {
        gate.match_labels
            .iter()
            .all(|(key, want)| node.labels.get(key) == Some(want))
    })
}
