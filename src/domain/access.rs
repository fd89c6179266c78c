//! Share access rules

use serde::{Deserialize, Serialize};

/// The only access type the export helper can express as a CLIENT block
pub const IP_ACCESS: &str = "ip";

/// A single access grant on a share
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    /// Access rule identifier, used in the export name, pseudo path and tag
    pub id: String,

    /// Kind of grant (`ip`, `user`, `cert`, ...)
    pub access_type: String,

    /// Grantee, for `ip` rules an address, CIDR or comma separated list
    pub access_to: String,
}

impl AccessRule {
    /// Creates an IP based access rule
    pub fn ip(id: impl Into<String>, access_to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            access_type: IP_ACCESS.to_string(),
            access_to: access_to.into(),
        }
    }

    /// Returns true if this is an IP based grant
    pub fn is_ip(&self) -> bool {
        self.access_type == IP_ACCESS
    }
}
