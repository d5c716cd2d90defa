//! Caller identity for access checks at the gateway.

use serde::{Deserialize, Serialize};

/// The user on whose behalf a session runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub login: String,
    /// Capability groups held by the user.
    #[serde(default)]
    pub groups: Vec<String>,
}

impl UserContext {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            groups: Vec::new(),
        }
    }

    pub fn with_groups(mut self, groups: &[&str]) -> Self {
        self.groups = groups.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}
