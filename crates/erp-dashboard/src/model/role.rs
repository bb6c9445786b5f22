use query_framework::{AuthContext, Permission, PermissionAction, Resource};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub u32);

impl From<u32> for RoleId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named set of grants.
///
/// Grants are stored the way the API sends them: `"<resource>:<action>"`, for example
/// `"products:view"`. `"<resource>:*"` grants every action on the resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Role {
    /// The grants this role carries. Malformed entries are logged and skipped.
    pub fn grants(&self) -> Vec<Permission> {
        let mut grants = Vec::new();
        for entry in &self.permissions {
            let Some((resource, action)) = entry.split_once(':') else {
                warn!(role = %self.name, %entry, "Malformed grant");
                continue;
            };
            let resource = resource.trim();
            if action.trim() == "*" {
                grants.extend(
                    PermissionAction::ALL
                        .into_iter()
                        .map(|action| Permission::new(resource, action)),
                );
                continue;
            }
            match action.parse::<PermissionAction>() {
                Ok(action) => grants.push(Permission::new(resource, action)),
                Err(e) => warn!(role = %self.name, %entry, error = %e, "Malformed grant"),
            }
        }
        grants
    }

    /// The capability set of `user` when signed in with this role.
    pub fn auth_context(&self, user: impl Into<String>) -> AuthContext {
        self.grants()
            .into_iter()
            .fold(AuthContext::for_user(user), |auth, grant| {
                auth.with(grant.resource, grant.action)
            })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RoleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

impl Resource for Role {
    type Id = RoleId;
    type Create = RoleCreate;
    type Update = RoleUpdate;
    const PATH: &'static str = "roles";

    fn id(&self) -> RoleId {
        self.id
    }
}
