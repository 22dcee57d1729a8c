//! Per-resource access control: the override store, the pure decision
//! policy, and the resolver that feeds it.

pub mod overrides;
pub mod policy;
pub mod resolver;

pub use overrides::OverrideStore;
pub use policy::{DecisionSource, Placement, PolicyInput, Resolution};
pub use resolver::{AccessHints, EditCapability, PermissionResolver};
