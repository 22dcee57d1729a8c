//! Channel naming.

use std::fmt;

use codehub_core::types::{DocumentId, ProjectId};

/// A channel a connection can join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelName {
    /// Project-wide events such as chat. Wire form `project:{id}`.
    Project(ProjectId),
    /// Live edits of one document. Wire form `document:{id}`.
    Document(DocumentId),
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project(id) => write!(f, "project:{id}"),
            Self::Document(id) => write!(f, "document:{id}"),
        }
    }
}
