//! Project role enumerations.
//!
//! [`MemberRole`] is what a membership row stores. [`ProjectRole`] is the
//! effective role a user holds in a project once ownership and public
//! visibility are taken into account.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use codehub_core::error::AppError;

/// Role stored on a membership row. The owner never has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Full control over content, members, and overrides.
    Admin,
    /// May edit root-level folders; everything else needs an override.
    Editor,
    /// Read-only.
    Viewer,
}

impl MemberRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            _ => Err(AppError::validation(format!(
                "Invalid member role: '{s}'. Expected one of: admin, editor, viewer"
            ))),
        }
    }
}

/// Effective role of a user in a project.
///
/// `None` means the user has no membership and the project is not public
/// (or the project does not exist).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    /// The project owner.
    Owner,
    /// Member with the admin role.
    Admin,
    /// Member with the editor role.
    Editor,
    /// Member with the viewer role, or any user on a public project.
    Viewer,
    /// No access.
    None,
}

impl ProjectRole {
    /// Owner and admin bypass every per-resource check.
    pub fn is_manager(&self) -> bool {
        match self {
            Self::Owner | Self::Admin => true,
            Self::Editor | Self::Viewer | Self::None => false,
        }
    }

    /// Whether the role grants any access to the project at all.
    pub fn has_access(&self) -> bool {
        match self {
            Self::Owner | Self::Admin | Self::Editor | Self::Viewer => true,
            Self::None => false,
        }
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
            Self::None => "none",
        }
    }
}

impl From<MemberRole> for ProjectRole {
    fn from(role: MemberRole) -> Self {
        match role {
            MemberRole::Admin => Self::Admin,
            MemberRole::Editor => Self::Editor,
            MemberRole::Viewer => Self::Viewer,
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
