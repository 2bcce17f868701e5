//! Typed dependency edges.

use crate::address::ObjectAddress;
use crate::error::{DependError, Result};
use serde::{Deserialize, Serialize};

/// The policy attached to a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    /// The dependent references the referenced object: dropping the
    /// referenced object is blocked under RESTRICT and cascades under
    /// CASCADE.
    Normal,
    /// The referenced object implicitly owns the dependent for cleanup;
    /// dropping the referenced object silently drops the dependent.
    Auto,
    /// The dependent is an implementation detail of the referenced object:
    /// a direct drop of the dependent is redirected to the owner, and
    /// dropping the owner silently drops the dependent.
    Internal,
    /// The dependent is the database system itself; the referenced object
    /// can never be dropped. Stored with a zeroed dependent triple.
    Pin,
}

impl DependencyKind {
    /// Single-character tag used in the persistent edge format.
    pub fn as_char(self) -> char {
        match self {
            DependencyKind::Normal => 'n',
            DependencyKind::Auto => 'a',
            DependencyKind::Internal => 'i',
            DependencyKind::Pin => 'p',
        }
    }

    /// Decode a persistent kind tag. Unknown tags are surfaced rather than
    /// mapped to a default so that edges written by a newer system are never
    /// silently reinterpreted.
    pub fn from_char(tag: char) -> Result<Self> {
        match tag {
            'n' => Ok(DependencyKind::Normal),
            'a' => Ok(DependencyKind::Auto),
            'i' => Ok(DependencyKind::Internal),
            'p' => Ok(DependencyKind::Pin),
            other => Err(DependError::UnrecognizedDependencyType(other)),
        }
    }
}

/// One persistent record in the edge table: `dependent` depends on
/// `referenced` with the policy of `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub dependent: ObjectAddress,
    pub referenced: ObjectAddress,
    pub kind: DependencyKind,
}

impl DependencyEdge {
    pub fn new(
        dependent: ObjectAddress,
        referenced: ObjectAddress,
        kind: DependencyKind,
    ) -> Self {
        Self {
            dependent,
            referenced,
            kind,
        }
    }
}
