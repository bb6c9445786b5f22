//! # Permissions
//!
//! The capability set of the signed-in user. It is passed explicitly to every page
//! container; there is no process-wide session.

use crate::error::QueryError;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionAction {
    View,
    Create,
    Update,
    Delete,
}

impl PermissionAction {
    pub const ALL: [PermissionAction; 4] = [Self::View, Self::Create, Self::Update, Self::Delete];
}

impl fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown permission action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for PermissionAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" | "read" => Ok(Self::View),
            "create" => Ok(Self::Create),
            "update" | "edit" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permission {
    pub resource: String,
    pub action: PermissionAction,
}

impl Permission {
    pub fn new(resource: impl Into<String>, action: PermissionAction) -> Self {
        Self {
            resource: resource.into(),
            action,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    user: Option<String>,
    permissions: HashSet<Permission>,
}

impl AuthContext {
    /// No user, no permissions.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            permissions: HashSet::new(),
        }
    }

    pub fn with(mut self, resource: impl Into<String>, action: PermissionAction) -> Self {
        self.permissions.insert(Permission::new(resource, action));
        self
    }

    /// Every action on `resource`.
    pub fn grant_all(mut self, resource: &str) -> Self {
        for action in PermissionAction::ALL {
            self.permissions.insert(Permission::new(resource, action));
        }
        self
    }

    /// Every action on each of `resources`.
    pub fn full_access(user: impl Into<String>, resources: &[&str]) -> Self {
        resources
            .iter()
            .fold(Self::for_user(user), |auth, resource| auth.grant_all(resource))
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn allows(&self, resource: &str, action: PermissionAction) -> bool {
        self.permissions.contains(&Permission::new(resource, action))
    }

    pub fn require(&self, resource: &str, action: PermissionAction) -> Result<(), QueryError> {
        if self.allows(resource, action) {
            Ok(())
        } else {
            Err(QueryError::Forbidden {
                resource: resource.to_string(),
                action,
            })
        }
    }
}
