//! Upgrade policy types and unavailability budget math.
//!
//! The policy arrives from a user-authored upgrade resource. Its
//! max-unavailable field is an int-or-string in the wire format (`1`,
//! `"1"`, or `"25%"`); it is parsed into a closed [`MaxUnavailable`] here
//! so malformed values are rejected at the configuration boundary and the
//! budget math itself never fails.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StrategyError;

/// How instances are chosen across availability zones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyMode {
    /// Rotate instances regardless of zone placement.
    #[default]
    #[serde(rename = "randomUpdate")]
    RandomUpdate,

    /// Rotate one zone at a time, applying the budget within each zone.
    #[serde(rename = "uniformAcrossAzUpdate")]
    UniformAcrossAzUpdate,
}

/// Maximum simultaneous unavailability during a rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxUnavailable {
    /// An absolute instance count.
    Count(u32),

    /// A percentage (0..=100) of the group, truncated on resolution.
    Percent(u32),
}

impl MaxUnavailable {
    /// Parses the wire form: a bare integer (`"75"`) or a percentage
    /// (`"75%"`).
    pub fn parse(raw: &str) -> Result<Self, StrategyError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(StrategyError::Empty);
        }

        if let Some(percent) = raw.strip_suffix('%') {
            let value: u32 = percent
                .trim()
                .parse()
                .map_err(|_| StrategyError::InvalidPercentage(raw.to_string()))?;
            if value > 100 {
                return Err(StrategyError::PercentageOutOfRange(value));
            }
            return Ok(Self::Percent(value));
        }

        let value: u32 = raw
            .parse()
            .map_err(|_| StrategyError::InvalidCount(raw.to_string()))?;
        Ok(Self::Count(value))
    }

    /// Resolves the specification against a group size.
    ///
    /// Percentages truncate: 37% of 50 is 18. A percentage that truncates
    /// to zero against a non-empty group resolves to one, so a rollout
    /// never stalls on a zero-sized batch. Absolute counts pass through
    /// unclamped; selection caps a batch at what actually exists.
    #[must_use]
    pub fn resolve(&self, total: u32) -> u32 {
        match *self {
            Self::Count(count) => count,
            Self::Percent(percent) => {
                let scaled = (u64::from(total) * u64::from(percent) / 100) as u32;
                if scaled == 0 && total >= 1 {
                    1
                } else {
                    scaled
                }
            }
        }
    }
}

impl fmt::Display for MaxUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Count(count) => write!(f, "{count}"),
            Self::Percent(percent) => write!(f, "{percent}%"),
        }
    }
}

impl FromStr for MaxUnavailable {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for MaxUnavailable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            Self::Count(count) => serializer.serialize_u32(count),
            Self::Percent(_) => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for MaxUnavailable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MaxUnavailableVisitor;

        impl Visitor<'_> for MaxUnavailableVisitor {
            type Value = MaxUnavailable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or a percentage string")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                let count = u32::try_from(value)
                    .map_err(|_| E::custom(format!("count too large: {value}")))?;
                Ok(MaxUnavailable::Count(count))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                let count = u32::try_from(value)
                    .map_err(|_| E::custom(format!("count out of range: {value}")))?;
                Ok(MaxUnavailable::Count(count))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                MaxUnavailable::parse(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(MaxUnavailableVisitor)
    }
}

/// A user-authored rolling-upgrade policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateStrategy {
    /// Selection mode.
    pub mode: StrategyMode,

    /// Unavailability budget specification.
    pub max_unavailable: MaxUnavailable,

    /// Seconds the (external) drain executor waits for a node to drain
    /// before proceeding; -1 waits forever.
    pub drain_timeout_seconds: i64,
}

impl Default for UpdateStrategy {
    fn default() -> Self {
        Self {
            mode: StrategyMode::default(),
            max_unavailable: MaxUnavailable::Count(1),
            drain_timeout_seconds: -1,
        }
    }
}

impl UpdateStrategy {
    /// Resolves the unavailability budget against a group size.
    #[must_use]
    pub fn max_unavailable_for(&self, total: u32) -> u32 {
        self.max_unavailable.resolve(total)
    }
}
