//! # rollout-core
//!
//! Decision core for rolling upgrades of autoscaling-group (ASG) fleets.
//!
//! Given a snapshot of an ASG's instances and a user-authored upgrade
//! policy, this crate decides which instances to rotate next, how many may
//! be unavailable at once, and whether a node is fit to proceed past. The
//! reconciliation loop, cloud-provider calls, and node drain execution
//! live elsewhere; they call in with already-fetched snapshots and apply
//! the decisions by issuing the real side-effecting calls.
//!
//! # Invariants
//!
//! - Pure predicates are deterministic given the same input order
//! - An instance is returned by at most one claim until its ASG entry is
//!   deleted or re-initialized
//! - Unknown names, unknown zones, and empty candidate sets degrade to
//!   empty results, never errors
//! - No operation blocks on external I/O

mod cluster;
mod error;
mod ids;
mod instance;
mod node;
mod selector;
mod strategy;

pub use cluster::ClusterState;
pub use error::{StateError, StrategyError};
pub use ids::{AsgName, AvailabilityZone, InstanceId};
pub use instance::{in_service_count, in_service_ids, Instance, LifecycleState};
pub use node::{
    is_node_ready, passes_readiness_gates, ConditionStatus, Node, NodeCondition, ReadinessGate,
    NODE_READY,
};
pub use selector::{
    next_available_instances, next_available_instances_in_zone, next_rotation_batch,
};
pub use strategy::{MaxUnavailable, StrategyMode, UpdateStrategy};
