//! Project members and invitations.

pub mod invitation;
pub mod service;

pub use invitation::{CreateInvitationRequest, InvitationService};
pub use service::{MemberList, MembershipService};
