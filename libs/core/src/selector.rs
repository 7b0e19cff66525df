//! Batch selection of claimable instances.
//!
//! Candidate order comes from the caller's snapshot; membership is
//! decided inside the registry's critical section. Retries over the same
//! snapshot therefore select in the same order, and concurrent callers
//! never receive the same instance.

use tracing::debug;

use crate::cluster::ClusterState;
use crate::ids::{AsgName, AvailabilityZone, InstanceId};
use crate::instance::Instance;
use crate::strategy::{StrategyMode, UpdateStrategy};

/// Claims up to `limit` instances from `snapshot`, in snapshot order.
///
/// Returns only instances whose identifier is both present in the
/// snapshot and still unclaimed in the registry. Unknown names, no
/// availability, or a zero `limit` yield an empty vec.
pub fn next_available_instances(
    state: &ClusterState,
    name: &AsgName,
    snapshot: &[Instance],
    limit: usize,
) -> Vec<Instance> {
    claim_filtered(state, name, snapshot, limit, |_| true)
}

/// Claims up to `limit` instances whose availability zone is `zone`.
///
/// Zero matches (wrong ASG name, wrong zone, or no availability) yield
/// an empty vec.
pub fn next_available_instances_in_zone(
    state: &ClusterState,
    name: &AsgName,
    zone: &AvailabilityZone,
    snapshot: &[Instance],
    limit: usize,
) -> Vec<Instance> {
    claim_filtered(state, name, snapshot, limit, |instance| {
        instance.availability_zone == *zone
    })
}

/// Resolves the strategy's budget against the snapshot and claims the
/// next rotation batch.
///
/// The budget resolves against the snapshot's total size. `zone` is
/// honored in uniform-across-zone mode and ignored otherwise; a uniform
/// strategy without a zone falls back to group-wide selection.
pub fn next_rotation_batch(
    state: &ClusterState,
    name: &AsgName,
    zone: Option<&AvailabilityZone>,
    snapshot: &[Instance],
    strategy: &UpdateStrategy,
) -> Vec<Instance> {
    let total = snapshot.len() as u32;
    let budget = strategy.max_unavailable_for(total) as usize;
    debug!(asg = %name, total, budget, mode = ?strategy.mode, "Resolved rotation budget");

    match (strategy.mode, zone) {
        (StrategyMode::UniformAcrossAzUpdate, Some(zone)) => {
            next_available_instances_in_zone(state, name, zone, snapshot, budget)
        }
        _ => next_available_instances(state, name, snapshot, budget),
    }
}

fn claim_filtered(
    state: &ClusterState,
    name: &AsgName,
    snapshot: &[Instance],
    limit: usize,
    keep: impl Fn(&Instance) -> bool,
) -> Vec<Instance> {
    let candidates: Vec<&InstanceId> = snapshot
        .iter()
        .filter(|instance| keep(instance))
        .map(|instance| &instance.id)
        .collect();

    let claimed = state.claim_candidates(name, &candidates, limit);
    claimed
        .into_iter()
        .filter_map(|id| snapshot.iter().find(|instance| instance.id == id).cloned())
        .collect()
}
