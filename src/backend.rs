//! Catalog backend seams.
//!
//! Physical catalog storage, name resolution, and the per-class destructors
//! live outside this crate; the engine consumes them through these traits.
//! [`CatalogBackend`] is the umbrella bound the engine is generic over.

use crate::address::{ObjectAddress, Oid};
use crate::error::Result;
use crate::store::EdgeStore;

/// Kind of a `pg_class` relation, as far as the engine cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Table,
    Index,
    Sequence,
    View,
    ToastTable,
    CompositeType,
}

impl RelationKind {
    /// Noun used in object descriptions.
    pub fn label(self) -> &'static str {
        match self {
            RelationKind::Table => "table",
            RelationKind::Index => "index",
            RelationKind::Sequence => "sequence",
            RelationKind::View => "view",
            RelationKind::ToastTable => "toast table",
            RelationKind::CompositeType => "composite type",
        }
    }
}

/// Description-relevant facts about a relation.
#[derive(Debug, Clone)]
pub struct RelationInfo {
    pub name: String,
    pub schema: String,
    pub kind: RelationKind,
    /// Whether the relation resolves by bare name in the active search
    /// path. Invisible relations are described schema-qualified.
    pub visible: bool,
}

/// Facts about an operator class.
#[derive(Debug, Clone)]
pub struct OpClassInfo {
    pub name: String,
    pub access_method: String,
}

/// Read-only catalog lookups used by the descriptor, the expression
/// scanner's existence probes, and destructor selection for relations.
///
/// Every method returns `None` for an unknown oid; the engine converts that
/// to a cache-lookup failure at the points where the row must exist.
pub trait CatalogReader {
    fn relation_info(&self, oid: Oid) -> Option<RelationInfo>;
    fn attribute_name(&self, relation: Oid, attnum: u32) -> Option<String>;
    /// Display form including the argument list, e.g. `lower(text)`.
    fn function_signature(&self, oid: Oid) -> Option<String>;
    /// Display form including operand types, e.g. `+(integer,integer)`.
    fn operator_signature(&self, oid: Oid) -> Option<String>;
    fn type_name(&self, oid: Oid) -> Option<String>;
    /// `(source type, target type)` of a cast.
    fn cast_types(&self, oid: Oid) -> Option<(Oid, Oid)>;
    /// Constraint name and, for table constraints, the owning relation.
    fn constraint_info(&self, oid: Oid) -> Option<(String, Option<Oid>)>;
    fn conversion_name(&self, oid: Oid) -> Option<String>;
    /// Owning `(relation, attnum)` of a column default.
    fn attr_default_target(&self, oid: Oid) -> Option<(Oid, u32)>;
    fn language_name(&self, oid: Oid) -> Option<String>;
    fn opclass_info(&self, oid: Oid) -> Option<OpClassInfo>;
    /// Rule name and the relation it rewrites.
    fn rewrite_info(&self, oid: Oid) -> Option<(String, Oid)>;
    /// Trigger name and the relation it fires on.
    fn trigger_info(&self, oid: Oid) -> Option<(String, Oid)>;
    fn schema_name(&self, oid: Oid) -> Option<String>;
    fn role_name(&self, oid: Oid) -> Option<String>;
    fn database_name(&self, oid: Oid) -> Option<String>;
    fn tablespace_name(&self, oid: Oid) -> Option<String>;
    fn filespace_name(&self, oid: Oid) -> Option<String>;
    fn filesystem_name(&self, oid: Oid) -> Option<String>;
    fn fdw_name(&self, oid: Oid) -> Option<String>;
    fn foreign_server_name(&self, oid: Oid) -> Option<String>;
    /// Name of the role a user mapping belongs to.
    fn user_mapping_user(&self, oid: Oid) -> Option<String>;
    fn protocol_name(&self, oid: Oid) -> Option<String>;
    fn compression_name(&self, oid: Oid) -> Option<String>;
}

/// Destructive catalog operations: the per-class destructor family plus the
/// auxiliary cleanup the engine performs after each destruction.
///
/// Destructors may re-enter the engine (a destructor that rebuilds some
/// dependent description will record fresh dependencies), so the engine
/// never holds a scan open across a destructor call.
pub trait CatalogMutator {
    fn remove_relation(&mut self, oid: Oid) -> Result<()>;
    fn remove_index(&mut self, oid: Oid) -> Result<()>;
    fn remove_column(&mut self, relation: Oid, attnum: u32) -> Result<()>;
    fn remove_function(&mut self, oid: Oid) -> Result<()>;
    fn remove_type(&mut self, oid: Oid) -> Result<()>;
    fn remove_cast(&mut self, oid: Oid) -> Result<()>;
    fn remove_constraint(&mut self, oid: Oid) -> Result<()>;
    fn remove_conversion(&mut self, oid: Oid) -> Result<()>;
    fn remove_attr_default(&mut self, oid: Oid) -> Result<()>;
    fn remove_language(&mut self, oid: Oid) -> Result<()>;
    fn remove_operator(&mut self, oid: Oid) -> Result<()>;
    fn remove_opclass(&mut self, oid: Oid) -> Result<()>;
    fn remove_rewrite_rule(&mut self, oid: Oid) -> Result<()>;
    fn remove_trigger(&mut self, oid: Oid) -> Result<()>;
    fn remove_schema(&mut self, oid: Oid) -> Result<()>;
    fn remove_fdw(&mut self, oid: Oid) -> Result<()>;
    fn remove_foreign_server(&mut self, oid: Oid) -> Result<()>;
    fn remove_user_mapping(&mut self, oid: Oid) -> Result<()>;
    fn remove_protocol(&mut self, oid: Oid) -> Result<()>;

    /// Drop any comments attached to the object or sub-object.
    fn delete_comments(&mut self, address: &ObjectAddress) -> Result<()>;

    /// Drop shared-dependency records (ownership, ACL references) for a
    /// whole object.
    fn delete_shared_dependency_records(&mut self, class_id: Oid, object_id: Oid) -> Result<()>;
}

/// Everything the engine needs from the embedding catalog.
pub trait CatalogBackend: EdgeStore + CatalogReader + CatalogMutator {}

impl<T: EdgeStore + CatalogReader + CatalogMutator> CatalogBackend for T {}
