//! Project membership, roles, and invitations.

pub mod invitation;
pub mod model;
pub mod role;

pub use invitation::{CreateInvitation, Invitation, InvitationStatus};
pub use model::Membership;
pub use role::{MemberRole, ProjectRole};
