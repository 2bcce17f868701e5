//! Object-dependency engine for a relational database catalog.
//!
//! Catalog objects reference each other (a view reads the tables it selects
//! from; a column default belongs to its column), and those relationships
//! live as typed edges in a persistent dependency table. This
//! crate records the edges (including discovering them from expression
//! trees), and drives cascading deletion over them: given targets and a
//! RESTRICT/CASCADE behavior, it decides what else must go, what forbids
//! the drop entirely, and in what order the destructors run so none of them
//! ever sees a dangling reference.
//!
//! Physical storage, per-class destructors, and transaction management stay
//! behind the [`backend`] traits; [`MemoryCatalog`] is a self-contained
//! backend for tests and experimentation.
//!
//! ```
//! use pgdepend::constants::RELATION_CLASS_ID;
//! use pgdepend::{
//!     DependencyEngine, DependencyKind, DropBehavior, MemoryCatalog, ObjectAddress,
//! };
//!
//! let mut catalog = MemoryCatalog::new();
//! catalog.add_table(100, "users");
//! catalog.add_view(200, "active_users");
//!
//! let users = ObjectAddress::whole(RELATION_CLASS_ID, 100);
//! let view = ObjectAddress::whole(RELATION_CLASS_ID, 200);
//! catalog.add_edge(view, users, DependencyKind::Normal);
//!
//! let mut engine = DependencyEngine::new(&mut catalog);
//! engine.perform_deletion(&users, DropBehavior::Cascade).unwrap();
//!
//! // The view went first, then the table, and no edges were left behind.
//! assert_eq!(catalog.drop_log, vec![view, users]);
//! assert!(catalog.edges().is_empty());
//! ```

pub mod address;
pub mod backend;
pub mod class;
pub mod constants;
pub mod describe;
pub mod edge;
pub mod engine;
pub mod error;
pub mod expr;
pub mod memory;
pub mod options;
pub mod report;
pub mod store;

pub use address::{ObjectAddress, ObjectAddresses, Oid};
pub use backend::{CatalogBackend, CatalogMutator, CatalogReader, RelationInfo, RelationKind};
pub use class::{ObjectClass, class_oid, object_class};
pub use describe::object_description;
pub use edge::{DependencyEdge, DependencyKind};
pub use engine::{DependencyEngine, DropBehavior};
pub use error::{DependError, Result};
pub use memory::MemoryCatalog;
pub use options::EngineOptions;
pub use report::ReportLevel;
pub use store::{EdgeRow, EdgeStore, RowId, ScanLock};
