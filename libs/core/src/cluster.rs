//! Process-wide registry of claimable instances, keyed by ASG name.
//!
//! Selection must be exactly-once across concurrent or retried
//! reconciliation passes: without a claim step, two workers could each
//! pick the same instance for rotation, double-draining capacity past the
//! unavailability budget. The registry's claim is the single
//! serialization point; everything else in the crate is stateless.
//!
//! # Invariants
//!
//! - An identifier is returned by at most one claim until its ASG entry
//!   is deleted or re-initialized
//! - Re-initialization replaces the tracked set and may legitimately
//!   re-offer previously claimed identifiers (the fresh snapshot wins)
//! - Claims on distinct ASG names never serialize behind one another
//! - Unknown names yield empty results, never errors

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, info};

use crate::ids::{AsgName, InstanceId};
use crate::instance::Instance;

type AvailabilitySet = Arc<Mutex<HashSet<InstanceId>>>;

/// Shared registry handle.
///
/// Cheap to clone; all clones observe the same state. The registry lives
/// for the process lifetime and does not survive restarts: after a
/// restart all claims are released and callers re-derive correct behavior
/// from fresh snapshots plus [`ClusterState::initialize_asg`].
#[derive(Debug, Clone, Default)]
pub struct ClusterState {
    // Outer map guards entry existence; each entry has its own mutex so
    // claims on different ASGs proceed concurrently under the read lock,
    // while initialize/delete take the write lock and therefore exclude
    // every in-flight claim.
    asgs: Arc<RwLock<HashMap<AsgName, AvailabilitySet>>>,
}

impl ClusterState {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)creates the availability set for `name` from a snapshot.
    ///
    /// Replacement semantics: a repeat call tracks exactly the new
    /// snapshot's identifiers, re-offering any previously claimed ones.
    /// Used to refresh tracking when live ASG membership has changed
    /// since the last pass. Identifiers are assumed to belong to at most
    /// one ASG; the caller owns that disjointness.
    pub fn initialize_asg(&self, name: &AsgName, instances: &[Instance]) {
        let ids: HashSet<InstanceId> = instances.iter().map(|i| i.id.clone()).collect();
        let tracked = ids.len();

        let mut asgs = self.asgs.write().unwrap_or_else(PoisonError::into_inner);
        asgs.insert(name.clone(), Arc::new(Mutex::new(ids)));

        info!(asg = %name, tracked, "Initialized ASG availability set");
    }

    /// Atomically claims up to `limit` of `candidates`, in order.
    ///
    /// Returns the prefix of `candidates` that was still available,
    /// removing each returned identifier from the set so no later claim
    /// can see it. An unknown `name` yields an empty vec.
    pub(crate) fn claim_candidates(
        &self,
        name: &AsgName,
        candidates: &[&InstanceId],
        limit: usize,
    ) -> Vec<InstanceId> {
        let asgs = self.asgs.read().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = asgs.get(name) else {
            debug!(asg = %name, "Claim against untracked ASG");
            return Vec::new();
        };

        let mut available = entry.lock().unwrap_or_else(PoisonError::into_inner);
        let mut claimed = Vec::new();
        for &candidate in candidates {
            if claimed.len() == limit {
                break;
            }
            if let Some(id) = available.take(candidate) {
                claimed.push(id);
            }
        }

        debug!(
            asg = %name,
            claimed = claimed.len(),
            remaining = available.len(),
            "Claimed instances"
        );
        claimed
    }

    /// Drops all tracked state for `name`.
    ///
    /// Always reports success: the post-condition (nothing tracked for
    /// the name) holds whether or not an entry existed.
    pub fn delete_all_instances_in_asg(&self, name: &AsgName) -> bool {
        let mut asgs = self.asgs.write().unwrap_or_else(PoisonError::into_inner);
        let existed = asgs.remove(name).is_some();

        info!(asg = %name, existed, "Deleted ASG from cluster state");
        true
    }

    /// Number of identifiers still claimable for `name`.
    ///
    /// Zero for untracked names; querying an unknown ASG is not an error.
    #[must_use]
    pub fn available_count(&self, name: &AsgName) -> usize {
        let asgs = self.asgs.read().unwrap_or_else(PoisonError::into_inner);
        asgs.get(name)
            .map(|entry| entry.lock().unwrap_or_else(PoisonError::into_inner).len())
            .unwrap_or(0)
    }

    /// True iff `id` is still claimable for `name`.
    #[must_use]
    pub fn is_available(&self, name: &AsgName, id: &InstanceId) -> bool {
        let asgs = self.asgs.read().unwrap_or_else(PoisonError::into_inner);
        asgs.get(name)
            .is_some_and(|entry| {
                entry
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .contains(id)
            })
    }
}
