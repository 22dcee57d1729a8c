//! HTTP-level integration tests over the in-memory store.

mod helpers;

mod auth_test;
mod cascade_test;
mod member_test;
mod permission_test;
mod project_test;
mod tree_test;
