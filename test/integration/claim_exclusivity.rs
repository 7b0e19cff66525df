//! Claim exclusivity under concurrent reconciliation workers.
//!
//! Several workers hammer one registry, on the same ASG and on unrelated
//! ones; no instance may ever be handed out twice before its entry is
//! deleted or re-initialized.
//!
//! Run with: cargo test -p rollout-integration --test claim_exclusivity

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use proptest::prelude::*;
use rollout_core::{
    next_available_instances, next_available_instances_in_zone, AsgName, AvailabilityZone,
    ClusterState, InstanceId,
};
use rollout_testing::{fleet, in_service};

#[test]
fn concurrent_claims_on_one_asg_never_overlap() {
    const WORKERS: usize = 8;
    const FLEET_SIZE: usize = 64;

    let state = ClusterState::new();
    let name = AsgName::from("workers");
    let snapshot = fleet("i", "us-west-2a", FLEET_SIZE);
    state.initialize_asg(&name, &snapshot);

    let barrier = Arc::new(Barrier::new(WORKERS));
    let mut handles = Vec::new();
    for _ in 0..WORKERS {
        let state = state.clone();
        let name = name.clone();
        let snapshot = snapshot.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut mine: Vec<InstanceId> = Vec::new();
            loop {
                let batch = next_available_instances(&state, &name, &snapshot, 3);
                if batch.is_empty() {
                    break;
                }
                mine.extend(batch.into_iter().map(|i| i.id));
            }
            mine
        }));
    }

    let mut seen: HashSet<InstanceId> = HashSet::new();
    let mut total = 0;
    for handle in handles {
        for id in handle.join().expect("worker panicked") {
            total += 1;
            assert!(seen.insert(id.clone()), "instance {id} claimed twice");
        }
    }

    // Every instance was rotated exactly once across all workers.
    assert_eq!(total, FLEET_SIZE);
    assert_eq!(state.available_count(&name), 0);
}

#[test]
fn concurrent_zone_claims_never_overlap() {
    const WORKERS_PER_ZONE: usize = 4;
    const PER_ZONE: usize = 24;

    let state = ClusterState::new();
    let name = AsgName::from("workers");
    let mut snapshot = fleet("a", "us-west-2a", PER_ZONE);
    snapshot.extend(fleet("b", "us-west-2b", PER_ZONE));
    state.initialize_asg(&name, &snapshot);

    let zones = ["us-west-2a", "us-west-2b"];
    let barrier = Arc::new(Barrier::new(WORKERS_PER_ZONE * zones.len()));
    let mut handles = Vec::new();
    for zone in zones {
        for _ in 0..WORKERS_PER_ZONE {
            let state = state.clone();
            let name = name.clone();
            let snapshot = snapshot.clone();
            let zone = AvailabilityZone::from(zone);
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                let mut mine: Vec<InstanceId> = Vec::new();
                loop {
                    let batch =
                        next_available_instances_in_zone(&state, &name, &zone, &snapshot, 2);
                    if batch.is_empty() {
                        break;
                    }
                    for claimed in &batch {
                        assert_eq!(claimed.availability_zone, zone);
                    }
                    mine.extend(batch.into_iter().map(|i| i.id));
                }
                mine
            }));
        }
    }

    let mut seen: HashSet<InstanceId> = HashSet::new();
    let mut total = 0;
    for handle in handles {
        for id in handle.join().expect("worker panicked") {
            total += 1;
            assert!(seen.insert(id.clone()), "instance {id} claimed twice");
        }
    }
    assert_eq!(total, PER_ZONE * zones.len());
}

#[test]
fn unrelated_asgs_do_not_interfere() {
    const ASGS: usize = 6;
    const FLEET_SIZE: usize = 16;

    let state = ClusterState::new();
    let barrier = Arc::new(Barrier::new(ASGS));
    let mut handles = Vec::new();
    for n in 0..ASGS {
        let state = state.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            let name = AsgName::from(format!("asg-{n}"));
            let snapshot = fleet(&format!("i{n}"), "us-west-2a", FLEET_SIZE);
            state.initialize_asg(&name, &snapshot);
            barrier.wait();

            let mut claimed = 0;
            loop {
                let batch = next_available_instances(&state, &name, &snapshot, 5);
                if batch.is_empty() {
                    break;
                }
                claimed += batch.len();
            }
            assert!(state.delete_all_instances_in_asg(&name));
            claimed
        }));
    }

    for handle in handles {
        assert_eq!(handle.join().expect("worker panicked"), FLEET_SIZE);
    }
}

#[test]
fn reinitialize_during_claims_keeps_set_consistent() {
    const FLEET_SIZE: usize = 32;
    const ROUNDS: usize = 50;

    let state = ClusterState::new();
    let name = AsgName::from("workers");
    let snapshot = fleet("i", "us-west-2a", FLEET_SIZE);
    state.initialize_asg(&name, &snapshot);

    let barrier = Arc::new(Barrier::new(2));

    let claimer = {
        let state = state.clone();
        let name = name.clone();
        let snapshot = snapshot.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..ROUNDS {
                // Within one batch the ids are distinct even while the
                // set is concurrently re-initialized.
                let batch = next_available_instances(&state, &name, &snapshot, 4);
                let unique: HashSet<InstanceId> =
                    batch.iter().map(|i| i.id.clone()).collect();
                assert_eq!(unique.len(), batch.len());
            }
        })
    };

    let refresher = {
        let state = state.clone();
        let name = name.clone();
        let snapshot = snapshot.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..ROUNDS {
                state.initialize_asg(&name, &snapshot);
            }
        })
    };

    claimer.join().expect("claimer panicked");
    refresher.join().expect("refresher panicked");

    // The registry is still coherent afterwards.
    assert!(state.available_count(&name) <= FLEET_SIZE);
    assert!(state.delete_all_instances_in_asg(&name));
    assert_eq!(state.available_count(&name), 0);
}

proptest! {
    // Any single-threaded sequence of claims before re-initialization
    // returns each id at most once and never more than the fleet holds.
    #[test]
    fn prop_claim_sequences_are_exactly_once(
        fleet_size in 1usize..40,
        limits in proptest::collection::vec(0usize..10, 1..20),
    ) {
        let state = ClusterState::new();
        let name = AsgName::from("workers");
        let snapshot = fleet("i", "us-west-2a", fleet_size);
        state.initialize_asg(&name, &snapshot);

        let mut seen: HashSet<InstanceId> = HashSet::new();
        for limit in limits {
            let batch = next_available_instances(&state, &name, &snapshot, limit);
            prop_assert!(batch.len() <= limit);
            for claimed in batch {
                prop_assert!(seen.insert(claimed.id));
            }
        }
        prop_assert!(seen.len() <= fleet_size);
    }

    // Zone-filtered claims only ever return the zone's own instances,
    // and mixing zone and global claims still never duplicates.
    #[test]
    fn prop_zone_claims_stay_in_zone(
        zone_a in 1usize..20,
        zone_b in 1usize..20,
        limits in proptest::collection::vec((0usize..6, proptest::bool::ANY), 1..16),
    ) {
        let state = ClusterState::new();
        let name = AsgName::from("workers");
        let mut snapshot: Vec<_> = (0..zone_a)
            .map(|n| in_service(&format!("a-{n}"), "az-a"))
            .collect();
        snapshot.extend((0..zone_b).map(|n| in_service(&format!("b-{n}"), "az-b")));
        state.initialize_asg(&name, &snapshot);

        let az_a = AvailabilityZone::from("az-a");
        let mut seen: HashSet<InstanceId> = HashSet::new();
        for (limit, zoned) in limits {
            let batch = if zoned {
                next_available_instances_in_zone(&state, &name, &az_a, &snapshot, limit)
            } else {
                next_available_instances(&state, &name, &snapshot, limit)
            };
            for claimed in batch {
                if zoned {
                    prop_assert_eq!(&claimed.availability_zone, &az_a);
                }
                prop_assert!(seen.insert(claimed.id));
            }
        }
        prop_assert!(seen.len() <= zone_a + zone_b);
    }
}
