//! Strongly-typed identifiers for Cherry Servers resources.
//!
//! Most resources are addressed by a numeric ID; IP addresses use an opaque
//! string. Wrapping them prevents passing a project ID where a server ID is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Macro to generate strongly-typed numeric ID wrapper types.
macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $doc:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw numeric ID.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw numeric ID.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                s.trim()
                    .parse::<u64>()
                    .map(Self)
                    .map_err(|_| Error::Validation(format!("invalid {}: {s}", stringify!($name))))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(ServerId, "Server ID");
numeric_id!(ProjectId, "Project ID");
numeric_id!(TeamId, "Team ID");
numeric_id!(RegionId, "Region ID");
numeric_id!(PlanId, "Plan ID");
numeric_id!(ImageId, "Image ID");
numeric_id!(UserId, "User ID");
numeric_id!(SshKeyId, "SSH key ID");
numeric_id!(StorageId, "Block storage ID");
numeric_id!(BackupStorageId, "Backup storage ID");

/// IP address ID. The API uses opaque string identifiers for addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IpId(String);

impl IpId {
    /// Wraps a raw IP address ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw ID.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IpId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for IpId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for IpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IpId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
