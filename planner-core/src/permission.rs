//! Access levels a user can hold on a calendar.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordered access level: `None < Read < Edit < Owner`.
///
/// Stored on user records as the level a calendar reference was granted at,
/// and used by callers as the minimum level a request requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    None,
    Read,
    Edit,
    Owner,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::None => "none",
            Permission::Read => "read",
            Permission::Edit => "edit",
            Permission::Owner => "owner",
        }
    }

    /// Whether this level satisfies a required minimum.
    pub fn allows(&self, required: Permission) -> bool {
        *self >= required
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = String;

    /// Accepts the stored names plus `view`, the sharing form's name for `Read`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Permission::None),
            "read" | "view" => Ok(Permission::Read),
            "edit" => Ok(Permission::Edit),
            "owner" => Ok(Permission::Owner),
            other => Err(format!("Unknown permission '{other}'")),
        }
    }
}
