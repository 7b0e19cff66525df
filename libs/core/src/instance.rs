//! Instance snapshots and lifecycle classification.
//!
//! Snapshots arrive from the cloud provider already ordered; the core
//! treats them as immutable, caller-owned values for the duration of a
//! call. Lifecycle states ingest permissively: a state string this build
//! does not know about is recorded and classified as out of service
//! rather than failing the reconciliation pass.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::error::StateError;
use crate::ids::{AvailabilityZone, InstanceId};

/// Provider-reported phase of an instance's membership in its ASG.
///
/// Only [`LifecycleState::InService`] counts as serving capacity; every
/// other state, including [`LifecycleState::Unknown`], contributes zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    InService,
    Pending,
    PendingWait,
    PendingProceed,
    Quarantined,
    Standby,
    EnteringStandby,
    Terminating,
    TerminatingWait,
    TerminatingProceed,
    Terminated,
    Detaching,
    Detached,

    /// Catch-all for state strings this build does not recognize.
    Unknown,
}

impl LifecycleState {
    /// The provider's wire name for this state.
    #[must_use]
    pub const fn as_provider_str(&self) -> &'static str {
        match self {
            Self::InService => "InService",
            Self::Pending => "Pending",
            Self::PendingWait => "Pending:Wait",
            Self::PendingProceed => "Pending:Proceed",
            Self::Quarantined => "Quarantined",
            Self::Standby => "Standby",
            Self::EnteringStandby => "EnteringStandby",
            Self::Terminating => "Terminating",
            Self::TerminatingWait => "Terminating:Wait",
            Self::TerminatingProceed => "Terminating:Proceed",
            Self::Terminated => "Terminated",
            Self::Detaching => "Detaching",
            Self::Detached => "Detached",
            Self::Unknown => "Unknown",
        }
    }

    /// Ingests a provider state string, degrading unrecognized values.
    ///
    /// Unrecognized strings are logged and mapped to
    /// [`LifecycleState::Unknown`], which classifies as out of service.
    /// Use the strict [`FromStr`] impl to reject them instead.
    #[must_use]
    pub fn from_provider(raw: &str) -> Self {
        match raw.parse() {
            Ok(state) => state,
            Err(StateError::UnknownState(_)) => {
                warn!(state = %raw, "Unrecognized lifecycle state, treating as out of service");
                Self::Unknown
            }
        }
    }

    /// True iff this state counts as serving capacity.
    #[must_use]
    pub const fn is_in_service(&self) -> bool {
        matches!(self, Self::InService)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_provider_str())
    }
}

impl FromStr for LifecycleState {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "InService" => Ok(Self::InService),
            "Pending" => Ok(Self::Pending),
            "Pending:Wait" => Ok(Self::PendingWait),
            "Pending:Proceed" => Ok(Self::PendingProceed),
            "Quarantined" => Ok(Self::Quarantined),
            "Standby" => Ok(Self::Standby),
            "EnteringStandby" => Ok(Self::EnteringStandby),
            "Terminating" => Ok(Self::Terminating),
            "Terminating:Wait" => Ok(Self::TerminatingWait),
            "Terminating:Proceed" => Ok(Self::TerminatingProceed),
            "Terminated" => Ok(Self::Terminated),
            "Detaching" => Ok(Self::Detaching),
            "Detached" => Ok(Self::Detached),
            other => Err(StateError::UnknownState(other.to_string())),
        }
    }
}

impl Serialize for LifecycleState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_provider_str())
    }
}

impl<'de> Deserialize<'de> for LifecycleState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_provider(&raw))
    }
}

/// A point-in-time record of one instance in an ASG snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    /// Provider-issued identifier, unique within the ASG.
    pub id: InstanceId,

    /// Zone the instance is placed in.
    pub availability_zone: AvailabilityZone,

    /// Provider-reported lifecycle state.
    pub lifecycle_state: LifecycleState,
}

impl Instance {
    /// Creates an instance record.
    #[must_use]
    pub fn new(
        id: impl Into<InstanceId>,
        availability_zone: impl Into<AvailabilityZone>,
        lifecycle_state: LifecycleState,
    ) -> Self {
        Self {
            id: id.into(),
            availability_zone: availability_zone.into(),
            lifecycle_state,
        }
    }

    /// Ingests a raw provider record, degrading unknown lifecycle states.
    #[must_use]
    pub fn from_provider(id: &str, availability_zone: &str, lifecycle_state: &str) -> Self {
        Self::new(
            id,
            availability_zone,
            LifecycleState::from_provider(lifecycle_state),
        )
    }

    /// True iff this instance counts as serving capacity.
    #[must_use]
    pub fn is_in_service(&self) -> bool {
        self.lifecycle_state.is_in_service()
    }
}

/// Number of instances currently serving.
#[must_use]
pub fn in_service_count(instances: &[Instance]) -> usize {
    instances.iter().filter(|i| i.is_in_service()).count()
}

/// Identifiers of serving instances, preserving snapshot order.
///
/// Empty when nothing serves, never absent.
#[must_use]
pub fn in_service_ids(instances: &[Instance]) -> Vec<InstanceId> {
    instances
        .iter()
        .filter(|i| i.is_in_service())
        .map(|i| i.id.clone())
        .collect()
}
