//! Typed names for provider-issued identifiers.
//!
//! The cloud provider mints instance identifiers and the operator names
//! autoscaling groups; nothing in this crate generates either. These
//! wrappers exist so an instance id cannot be passed where an ASG name is
//! expected, and so registry keys hash and order deterministically.

/// Defines a typed wrapper around an opaque provider string.
///
/// Generated types carry `Display`, `From<&str>`/`From<String>`,
/// `AsRef<str>`, ordering, hashing, and transparent serde.
macro_rules! define_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw provider string.
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Returns the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_name!(
    /// Provider-issued instance identifier, unique within an ASG.
    InstanceId
);

define_name!(
    /// Name of an autoscaling group, the unit of rollout scope.
    AsgName
);

define_name!(
    /// Availability zone an instance is placed in.
    AvailabilityZone
);
