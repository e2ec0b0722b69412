//! Locally managed team groups
//!
//! Named sets of member emails used to narrow the dashboard to one team.

use serde::{Deserialize, Serialize};

use super::{normalize_email, VendorRecord};

/// A named group of members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamGroup {
    pub name: String,
    #[serde(default)]
    pub member_emails: Vec<String>,
}

impl TeamGroup {
    pub fn new<I, S>(name: &str, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.to_string(),
            member_emails: emails.into_iter().map(|e| normalize_email(e.as_ref())).collect(),
        }
    }

    pub fn contains(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.member_emails.iter().any(|e| *e == email)
    }

    pub fn is_empty(&self) -> bool {
        self.member_emails.is_empty()
    }
}

impl VendorRecord for TeamGroup {
    fn normalized(mut self) -> Self {
        self.member_emails = self
            .member_emails
            .iter()
            .map(|e| normalize_email(e))
            .collect();
        self
    }
}

/// Find a team by name (exact match)
pub fn find_team<'a>(teams: &'a [TeamGroup], name: &str) -> Option<&'a TeamGroup> {
    teams.iter().find(|t| t.name == name)
}
