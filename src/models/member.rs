//! Team member types
//!
//! Roster entries returned by the vendor's team members endpoint

use serde::{Deserialize, Serialize};

use super::{normalize_email, VendorRecord};

/// Seat role of a team member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Owner,
    Member,
    FreeOwner,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Member => "member",
            Role::FreeOwner => "free-owner",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A member of the team roster, keyed by lower-cased email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl TeamMember {
    pub fn new(email: &str, name: Option<&str>, role: Option<Role>) -> Self {
        Self {
            email: normalize_email(email),
            name: name.map(str::to_string),
            role,
        }
    }

    /// Role as written in exports; absent roles read as "member"
    pub fn role_label(&self) -> &'static str {
        self.role.unwrap_or(Role::Member).as_str()
    }
}

impl VendorRecord for TeamMember {
    fn normalized(mut self) -> Self {
        self.email = normalize_email(&self.email);
        self
    }
}

/// Response body of the team members endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMembersResponse {
    pub team_members: Vec<TeamMember>,
}
