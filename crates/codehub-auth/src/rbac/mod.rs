//! Project-level role checks for operations that are not tied to a
//! single folder or document.

pub mod enforcer;
pub mod policies;

pub use enforcer::RbacEnforcer;
pub use policies::ProjectCapability;
