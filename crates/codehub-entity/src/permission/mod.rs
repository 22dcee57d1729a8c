//! Permission domain entities: actions, decisions, and per-resource overrides.

pub mod action;
pub mod model;

pub use action::{Action, Decision};
pub use model::{OverrideFlags, ResourceOverride, ResourceRef, ResourceType, UpsertOverride};
