//! Cached user profile

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Role granting administrative access.
pub const ADMIN_GROUP: &str = "Admin";

/// Profile of the signed-in user as returned by the current-user endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Backend identifier.
    pub id: i64,
    /// Login e-mail address.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Groups (roles) the user belongs to.
    #[serde(default)]
    pub groups: BTreeSet<String>,
    /// Sites the user is assigned to.
    #[serde(default)]
    pub sites: BTreeSet<String>,
    /// Whether the account is active.
    #[serde(default)]
    pub is_active: bool,
}

impl UserProfile {
    /// Creates an active profile with no groups or sites.
    #[must_use]
    pub fn new(id: i64, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            groups: BTreeSet::new(),
            sites: BTreeSet::new(),
            is_active: true,
        }
    }

    /// Adds a group membership.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.insert(group.into());
        self
    }

    /// Adds a site assignment.
    #[cfg(test)]
    #[must_use]
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.sites.insert(site.into());
        self
    }

    /// Returns true if the user belongs to `group`.
    #[must_use]
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    /// Uppercased initials of the display name, at most two characters.
    #[must_use]
    pub fn initials(&self) -> String {
        initials(&self.name)
    }

    /// Decodes a profile from its stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidProfile`] if the text is not a valid profile.
    pub fn from_json(text: &str) -> DomainResult<Self> {
        serde_json::from_str(text).map_err(|e| DomainError::InvalidProfile(e.to_string()))
    }

    /// Encodes the profile for storage.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidProfile`] if serialization fails.
    pub fn to_json(&self) -> DomainResult<String> {
        serde_json::to_string(self).map_err(|e| DomainError::InvalidProfile(e.to_string()))
    }
}

/// First letter of each whitespace-separated word, uppercased, capped at two characters.
#[must_use]
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}
