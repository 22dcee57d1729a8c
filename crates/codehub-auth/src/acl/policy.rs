//! The decision function.
//!
//! Precedence, first match wins:
//!
//! 1. Owner or admin: allow everything.
//! 2. Override on the resource itself: `can_edit` answers write,
//!    `can_delete` answers delete.
//! 3. Documents inside a folder: the immediate folder's override.
//! 4. Role default: an editor may write or delete root-level folders;
//!    everything else (root documents included) is denied.
//! 5. Deny.
//!
//! Read is granted to anyone with project access and never consults
//! overrides. Rules 2 and 3 apply to participants only: a public visitor
//! holding a leftover override row still gets the plain viewer default.

use serde::{Deserialize, Serialize};

use codehub_entity::membership::ProjectRole;
use codehub_entity::permission::{Action, Decision, OverrideFlags};

/// Where a resource sits in the tree, as far as the policy cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Folder directly under the project root.
    RootFolder,
    /// Folder with a parent folder.
    NestedFolder,
    /// Document with no enclosing folder.
    RootDocument,
    /// Document inside a folder.
    FolderDocument,
}

/// Facts the policy decides on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyInput {
    /// The user's effective project role.
    pub role: ProjectRole,
    /// Owner or member, as opposed to a public visitor.
    pub participant: bool,
    /// Override on the resource itself.
    pub resource_override: Option<OverrideFlags>,
    /// Override on the document's immediate folder. Ignored for folders
    /// and root documents.
    pub folder_override: Option<OverrideFlags>,
    /// Tree placement of the resource.
    pub placement: Placement,
}

/// Which rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// Project owner.
    Owner,
    /// Admin member.
    Admin,
    /// Override on the resource itself.
    ResourceOverride,
    /// Override on the enclosing folder.
    FolderOverride,
    /// The role's default for this placement.
    RoleDefault,
    /// Read granted by project access.
    ProjectAccess,
    /// The user has no access to the project.
    NoAccess,
}

/// A decision together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Allow or deny.
    pub decision: Decision,
    /// The deciding rule.
    pub source: DecisionSource,
}

impl Resolution {
    fn allow(source: DecisionSource) -> Self {
        Self {
            decision: Decision::Allow,
            source,
        }
    }

    fn deny(source: DecisionSource) -> Self {
        Self {
            decision: Decision::Deny,
            source,
        }
    }

    fn from_flags(flags: OverrideFlags, action: Action, source: DecisionSource) -> Self {
        Self {
            decision: Decision::from_bool(flags.permits(action)),
            source,
        }
    }

    /// Whether the action is allowed.
    pub fn is_allowed(&self) -> bool {
        self.decision.is_allowed()
    }
}

/// Decide `action` for the given facts.
pub fn evaluate(input: &PolicyInput, action: Action) -> Resolution {
    match input.role {
        ProjectRole::Owner => Resolution::allow(DecisionSource::Owner),
        ProjectRole::Admin => Resolution::allow(DecisionSource::Admin),
        ProjectRole::None => Resolution::deny(DecisionSource::NoAccess),
        ProjectRole::Editor | ProjectRole::Viewer => evaluate_member(input, action),
    }
}

fn evaluate_member(input: &PolicyInput, action: Action) -> Resolution {
    if action == Action::Read {
        return Resolution::allow(DecisionSource::ProjectAccess);
    }

    if !input.participant {
        return role_default(input.role, input.placement);
    }

    if let Some(flags) = input.resource_override {
        return Resolution::from_flags(flags, action, DecisionSource::ResourceOverride);
    }

    if let (Placement::FolderDocument, Some(flags)) = (input.placement, input.folder_override) {
        return Resolution::from_flags(flags, action, DecisionSource::FolderOverride);
    }

    role_default(input.role, input.placement)
}

fn role_default(role: ProjectRole, placement: Placement) -> Resolution {
    let allowed = match role {
        ProjectRole::Owner | ProjectRole::Admin => true,
        ProjectRole::Editor => match placement {
            Placement::RootFolder => true,
            Placement::NestedFolder | Placement::RootDocument | Placement::FolderDocument => false,
        },
        ProjectRole::Viewer | ProjectRole::None => false,
    };
    Resolution {
        decision: Decision::from_bool(allowed),
        source: DecisionSource::RoleDefault,
    }
}
