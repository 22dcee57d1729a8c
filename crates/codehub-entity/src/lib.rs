//! # codehub-entity
//!
//! Domain entity models for CodeHub. Every struct in this crate represents
//! a database row or a domain value object. Database entities additionally
//! derive `sqlx::FromRow`.

pub mod chat;
pub mod document;
pub mod folder;
pub mod membership;
pub mod permission;
pub mod project;
