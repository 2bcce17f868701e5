//! Error surface of the dependency engine.
//!
//! Only RESTRICT violations are accumulated during traversal (they are
//! reported once, at the outermost entry point, so that every violation is
//! surfaced in a single pass). Everything else aborts immediately and relies
//! on the surrounding transaction to roll back partial catalog mutations.

use crate::address::Oid;
use crate::class::ObjectClass;
use thiserror::Error;

pub type Result<T, E = DependError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DependError {
    /// A drop was refused: RESTRICT violations, a PIN edge anywhere in the
    /// must-delete closure, or a direct drop of an implementation detail
    /// that must be redirected to its owning object.
    #[error("{message}")]
    DependentObjectsExist {
        message: String,
        hint: Option<String>,
    },

    /// Catalog corruption: more than one INTERNAL edge out of one dependent.
    #[error("found multiple INTERNAL dependencies for {object}")]
    MultipleInternalDependencies { object: String },

    /// Catalog corruption: a PIN edge carries a real dependent endpoint.
    #[error("incorrect use of PIN dependency with {object}")]
    IncorrectPinUse { object: String },

    /// A persistent edge carries a kind tag this build does not know.
    #[error("unrecognized dependency type {0:?}")]
    UnrecognizedDependencyType(char),

    /// A dependency endpoint names a catalog this build does not know.
    #[error("unrecognized object class {0}")]
    UnrecognizedObjectClass(Oid),

    /// The dispatch table was reached with a class it must never destroy
    /// (global objects are dropped through their own commands).
    #[error("{0:?} objects cannot be dropped by the dependency engine")]
    UnhandledObjectClass(ObjectClass),

    /// A catalog row the engine requires could not be resolved.
    #[error("cache lookup failed for {catalog} {oid}")]
    CacheLookupFailed { catalog: &'static str, oid: Oid },

    /// A Var in a scanned expression points above the range-table stack.
    #[error("invalid varlevelsup {levels_up} (scope depth {depth})")]
    InvalidVarLevel { levels_up: u32, depth: usize },

    /// A Var in a scanned expression points outside its range table.
    #[error("invalid varno {0}")]
    InvalidVarNo(u32),

    /// A join-alias Var carries an attribute number the join does not have.
    #[error("invalid varattno {0}")]
    InvalidAttrNo(i32),

    /// A construct the engine deliberately refuses to handle.
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}

impl DependError {
    /// Hint line attached to drop refusals, when one applies.
    pub fn hint(&self) -> Option<&str> {
        match self {
            DependError::DependentObjectsExist { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }
}
