//! In-memory catalog backend.
//!
//! Backs the test-suite and embedders that have no live catalog: typed
//! object tables with fixture builders, an edge table with the same
//! command-boundary visibility the engine expects from real storage, and a
//! drop log recording every destructor invocation in order.

use crate::address::{ObjectAddress, Oid};
use crate::backend::{CatalogMutator, CatalogReader, OpClassInfo, RelationInfo, RelationKind};
use crate::class::{ObjectClass, class_oid};
use crate::constants::INVALID_OID;
use crate::edge::{DependencyEdge, DependencyKind};
use crate::error::{DependError, Result};
use crate::store::{EdgeRow, EdgeStore, RowId, ScanLock};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowState {
    Live,
    /// Deleted in the current command; still visible to scans until the
    /// deletion is published.
    PendingDead,
    Dead,
}

#[derive(Debug, Clone)]
struct EdgeSlot {
    edge: DependencyEdge,
    state: RowState,
}

#[derive(Debug, Clone)]
struct RelationEntry {
    name: String,
    schema: String,
    kind: RelationKind,
    visible: bool,
    columns: BTreeMap<u32, String>,
}

/// An in-memory [`CatalogBackend`](crate::backend::CatalogBackend).
///
/// `Clone` gives callers a cheap snapshot to fall back to after a failed
/// drop; transaction rollback proper belongs to the embedding environment.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    rows: Vec<EdgeSlot>,
    rows_locked: usize,

    relations: BTreeMap<Oid, RelationEntry>,
    functions: BTreeMap<Oid, String>,
    operators: BTreeMap<Oid, String>,
    types: BTreeMap<Oid, String>,
    casts: BTreeMap<Oid, (Oid, Oid)>,
    constraints: BTreeMap<Oid, (String, Option<Oid>)>,
    conversions: BTreeMap<Oid, String>,
    attr_defaults: BTreeMap<Oid, (Oid, u32)>,
    languages: BTreeMap<Oid, String>,
    opclasses: BTreeMap<Oid, (String, String)>,
    rewrites: BTreeMap<Oid, (String, Oid)>,
    triggers: BTreeMap<Oid, (String, Oid)>,
    schemas: BTreeMap<Oid, String>,
    roles: BTreeMap<Oid, String>,
    databases: BTreeMap<Oid, String>,
    tablespaces: BTreeMap<Oid, String>,
    filespaces: BTreeMap<Oid, String>,
    filesystems: BTreeMap<Oid, String>,
    fdws: BTreeMap<Oid, String>,
    foreign_servers: BTreeMap<Oid, String>,
    user_mappings: BTreeMap<Oid, String>,
    protocols: BTreeMap<Oid, String>,
    compressions: BTreeMap<Oid, String>,

    comments: BTreeMap<ObjectAddress, String>,
    shared_deps: BTreeSet<(Oid, Oid)>,

    /// Destructor invocations, in execution order.
    pub drop_log: Vec<ObjectAddress>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- fixture builders -------------------------------------------------

    pub fn add_relation(
        &mut self,
        oid: Oid,
        name: &str,
        schema: &str,
        kind: RelationKind,
        visible: bool,
    ) -> &mut Self {
        self.relations.insert(
            oid,
            RelationEntry {
                name: name.to_string(),
                schema: schema.to_string(),
                kind,
                visible,
                columns: BTreeMap::new(),
            },
        );
        self
    }

    pub fn add_table(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.add_relation(oid, name, "public", RelationKind::Table, true)
    }

    pub fn add_view(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.add_relation(oid, name, "public", RelationKind::View, true)
    }

    pub fn add_index(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.add_relation(oid, name, "public", RelationKind::Index, true)
    }

    pub fn add_sequence(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.add_relation(oid, name, "public", RelationKind::Sequence, true)
    }

    pub fn add_composite_relation(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.add_relation(oid, name, "public", RelationKind::CompositeType, true)
    }

    pub fn add_column(&mut self, relation: Oid, attnum: u32, name: &str) -> &mut Self {
        if let Some(entry) = self.relations.get_mut(&relation) {
            entry.columns.insert(attnum, name.to_string());
        }
        self
    }

    pub fn add_function(&mut self, oid: Oid, signature: &str) -> &mut Self {
        self.functions.insert(oid, signature.to_string());
        self
    }

    pub fn add_operator(&mut self, oid: Oid, signature: &str) -> &mut Self {
        self.operators.insert(oid, signature.to_string());
        self
    }

    pub fn add_type(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.types.insert(oid, name.to_string());
        self
    }

    pub fn add_cast(&mut self, oid: Oid, source: Oid, target: Oid) -> &mut Self {
        self.casts.insert(oid, (source, target));
        self
    }

    pub fn add_constraint(&mut self, oid: Oid, name: &str, relation: Option<Oid>) -> &mut Self {
        self.constraints.insert(oid, (name.to_string(), relation));
        self
    }

    pub fn add_conversion(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.conversions.insert(oid, name.to_string());
        self
    }

    pub fn add_attr_default(&mut self, oid: Oid, relation: Oid, attnum: u32) -> &mut Self {
        self.attr_defaults.insert(oid, (relation, attnum));
        self
    }

    pub fn add_language(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.languages.insert(oid, name.to_string());
        self
    }

    pub fn add_opclass(&mut self, oid: Oid, name: &str, access_method: &str) -> &mut Self {
        self.opclasses
            .insert(oid, (name.to_string(), access_method.to_string()));
        self
    }

    pub fn add_rewrite_rule(&mut self, oid: Oid, name: &str, relation: Oid) -> &mut Self {
        self.rewrites.insert(oid, (name.to_string(), relation));
        self
    }

    pub fn add_trigger(&mut self, oid: Oid, name: &str, relation: Oid) -> &mut Self {
        self.triggers.insert(oid, (name.to_string(), relation));
        self
    }

    pub fn add_schema(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.schemas.insert(oid, name.to_string());
        self
    }

    pub fn add_role(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.roles.insert(oid, name.to_string());
        self
    }

    pub fn add_database(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.databases.insert(oid, name.to_string());
        self
    }

    pub fn add_tablespace(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.tablespaces.insert(oid, name.to_string());
        self
    }

    pub fn add_filespace(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.filespaces.insert(oid, name.to_string());
        self
    }

    pub fn add_filesystem(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.filesystems.insert(oid, name.to_string());
        self
    }

    pub fn add_fdw(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.fdws.insert(oid, name.to_string());
        self
    }

    pub fn add_foreign_server(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.foreign_servers.insert(oid, name.to_string());
        self
    }

    pub fn add_user_mapping(&mut self, oid: Oid, user: &str) -> &mut Self {
        self.user_mappings.insert(oid, user.to_string());
        self
    }

    pub fn add_protocol(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.protocols.insert(oid, name.to_string());
        self
    }

    pub fn add_compression(&mut self, oid: Oid, name: &str) -> &mut Self {
        self.compressions.insert(oid, name.to_string());
        self
    }

    pub fn set_comment(&mut self, address: ObjectAddress, text: &str) -> &mut Self {
        self.comments.insert(address, text.to_string());
        self
    }

    pub fn add_shared_dependency(&mut self, class_id: Oid, object_id: Oid) -> &mut Self {
        self.shared_deps.insert((class_id, object_id));
        self
    }

    /// Record one dependency edge directly (fixtures bypass the engine's
    /// pinned-reference suppression).
    pub fn add_edge(
        &mut self,
        dependent: ObjectAddress,
        referenced: ObjectAddress,
        kind: DependencyKind,
    ) -> &mut Self {
        self.rows.push(EdgeSlot {
            edge: DependencyEdge::new(dependent, referenced, kind),
            state: RowState::Live,
        });
        self
    }

    /// Protect an object with a system PIN edge (zeroed dependent triple).
    pub fn pin(&mut self, referenced: ObjectAddress) -> &mut Self {
        self.add_edge(
            ObjectAddress::new(INVALID_OID, INVALID_OID, 0),
            referenced,
            DependencyKind::Pin,
        )
    }

    // ---- inspection -------------------------------------------------------

    /// Edges currently visible to a scan.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.rows
            .iter()
            .filter(|slot| slot.state != RowState::Dead)
            .map(|slot| slot.edge)
            .collect()
    }

    /// Visible edges incident to an object, on either side.
    pub fn edges_touching(&self, object: &ObjectAddress) -> Vec<DependencyEdge> {
        self.edges()
            .into_iter()
            .filter(|edge| {
                object.covers(&edge.dependent) || object.covers(&edge.referenced)
            })
            .collect()
    }

    pub fn has_comment(&self, address: &ObjectAddress) -> bool {
        self.comments.contains_key(address)
    }

    pub fn has_shared_dependency(&self, class_id: Oid, object_id: Oid) -> bool {
        self.shared_deps.contains(&(class_id, object_id))
    }

    /// Rows returned so far under a `ForUpdate` scan lock.
    pub fn rows_locked(&self) -> usize {
        self.rows_locked
    }

    fn scan(
        &mut self,
        lock: ScanLock,
        matches: impl Fn(&DependencyEdge) -> bool,
    ) -> Vec<EdgeRow> {
        let mut out = Vec::new();
        for (index, slot) in self.rows.iter().enumerate() {
            if slot.state == RowState::Dead || !matches(&slot.edge) {
                continue;
            }
            out.push(EdgeRow {
                id: RowId(index as u64),
                edge: slot.edge,
            });
        }
        if lock == ScanLock::ForUpdate {
            self.rows_locked += out.len();
        }
        out
    }

    fn missing(catalog: &'static str, oid: Oid) -> DependError {
        DependError::CacheLookupFailed { catalog, oid }
    }

    fn log_drop(&mut self, class: ObjectClass, object_id: Oid, sub_id: u32) {
        self.drop_log
            .push(ObjectAddress::new(class_oid(class), object_id, sub_id));
    }
}

impl EdgeStore for MemoryCatalog {
    fn scan_outgoing(&mut self, target: &ObjectAddress, lock: ScanLock) -> Result<Vec<EdgeRow>> {
        let target = *target;
        Ok(self.scan(lock, |edge| target.covers(&edge.dependent)))
    }

    fn scan_incoming(&mut self, target: &ObjectAddress, lock: ScanLock) -> Result<Vec<EdgeRow>> {
        let target = *target;
        Ok(self.scan(lock, |edge| target.covers(&edge.referenced)))
    }

    fn delete_row(&mut self, row: RowId) -> Result<()> {
        let slot = self
            .rows
            .get_mut(row.0 as usize)
            .ok_or(Self::missing("dependency", row.0 as Oid))?;
        if slot.state == RowState::Live {
            slot.state = RowState::PendingDead;
        }
        Ok(())
    }

    fn insert_edges(
        &mut self,
        dependent: &ObjectAddress,
        referenced: &[ObjectAddress],
        kind: DependencyKind,
    ) -> Result<()> {
        for reference in referenced {
            self.add_edge(*dependent, *reference, kind);
        }
        Ok(())
    }

    fn publish(&mut self) {
        for slot in &mut self.rows {
            if slot.state == RowState::PendingDead {
                slot.state = RowState::Dead;
            }
        }
    }
}

impl CatalogReader for MemoryCatalog {
    fn relation_info(&self, oid: Oid) -> Option<RelationInfo> {
        self.relations.get(&oid).map(|entry| RelationInfo {
            name: entry.name.clone(),
            schema: entry.schema.clone(),
            kind: entry.kind,
            visible: entry.visible,
        })
    }

    fn attribute_name(&self, relation: Oid, attnum: u32) -> Option<String> {
        self.relations
            .get(&relation)
            .and_then(|entry| entry.columns.get(&attnum).cloned())
    }

    fn function_signature(&self, oid: Oid) -> Option<String> {
        self.functions.get(&oid).cloned()
    }

    fn operator_signature(&self, oid: Oid) -> Option<String> {
        self.operators.get(&oid).cloned()
    }

    fn type_name(&self, oid: Oid) -> Option<String> {
        self.types.get(&oid).cloned()
    }

    fn cast_types(&self, oid: Oid) -> Option<(Oid, Oid)> {
        self.casts.get(&oid).copied()
    }

    fn constraint_info(&self, oid: Oid) -> Option<(String, Option<Oid>)> {
        self.constraints.get(&oid).cloned()
    }

    fn conversion_name(&self, oid: Oid) -> Option<String> {
        self.conversions.get(&oid).cloned()
    }

    fn attr_default_target(&self, oid: Oid) -> Option<(Oid, u32)> {
        self.attr_defaults.get(&oid).copied()
    }

    fn language_name(&self, oid: Oid) -> Option<String> {
        self.languages.get(&oid).cloned()
    }

    fn opclass_info(&self, oid: Oid) -> Option<OpClassInfo> {
        self.opclasses.get(&oid).map(|(name, access_method)| OpClassInfo {
            name: name.clone(),
            access_method: access_method.clone(),
        })
    }

    fn rewrite_info(&self, oid: Oid) -> Option<(String, Oid)> {
        self.rewrites.get(&oid).cloned()
    }

    fn trigger_info(&self, oid: Oid) -> Option<(String, Oid)> {
        self.triggers.get(&oid).cloned()
    }

    fn schema_name(&self, oid: Oid) -> Option<String> {
        self.schemas.get(&oid).cloned()
    }

    fn role_name(&self, oid: Oid) -> Option<String> {
        self.roles.get(&oid).cloned()
    }

    fn database_name(&self, oid: Oid) -> Option<String> {
        self.databases.get(&oid).cloned()
    }

    fn tablespace_name(&self, oid: Oid) -> Option<String> {
        self.tablespaces.get(&oid).cloned()
    }

    fn filespace_name(&self, oid: Oid) -> Option<String> {
        self.filespaces.get(&oid).cloned()
    }

    fn filesystem_name(&self, oid: Oid) -> Option<String> {
        self.filesystems.get(&oid).cloned()
    }

    fn fdw_name(&self, oid: Oid) -> Option<String> {
        self.fdws.get(&oid).cloned()
    }

    fn foreign_server_name(&self, oid: Oid) -> Option<String> {
        self.foreign_servers.get(&oid).cloned()
    }

    fn user_mapping_user(&self, oid: Oid) -> Option<String> {
        self.user_mappings.get(&oid).cloned()
    }

    fn protocol_name(&self, oid: Oid) -> Option<String> {
        self.protocols.get(&oid).cloned()
    }

    fn compression_name(&self, oid: Oid) -> Option<String> {
        self.compressions.get(&oid).cloned()
    }
}

impl CatalogMutator for MemoryCatalog {
    fn remove_relation(&mut self, oid: Oid) -> Result<()> {
        self.relations
            .remove(&oid)
            .ok_or(Self::missing("relation", oid))?;
        self.log_drop(ObjectClass::Class, oid, 0);
        Ok(())
    }

    fn remove_index(&mut self, oid: Oid) -> Result<()> {
        self.relations
            .remove(&oid)
            .ok_or(Self::missing("relation", oid))?;
        self.log_drop(ObjectClass::Class, oid, 0);
        Ok(())
    }

    fn remove_column(&mut self, relation: Oid, attnum: u32) -> Result<()> {
        let entry = self
            .relations
            .get_mut(&relation)
            .ok_or(Self::missing("relation", relation))?;
        entry
            .columns
            .remove(&attnum)
            .ok_or(Self::missing("attribute", relation))?;
        self.log_drop(ObjectClass::Class, relation, attnum);
        Ok(())
    }

    fn remove_function(&mut self, oid: Oid) -> Result<()> {
        self.functions
            .remove(&oid)
            .ok_or(Self::missing("function", oid))?;
        self.log_drop(ObjectClass::Proc, oid, 0);
        Ok(())
    }

    fn remove_type(&mut self, oid: Oid) -> Result<()> {
        self.types.remove(&oid).ok_or(Self::missing("type", oid))?;
        self.log_drop(ObjectClass::Type, oid, 0);
        Ok(())
    }

    fn remove_cast(&mut self, oid: Oid) -> Result<()> {
        self.casts.remove(&oid).ok_or(Self::missing("cast", oid))?;
        self.log_drop(ObjectClass::Cast, oid, 0);
        Ok(())
    }

    fn remove_constraint(&mut self, oid: Oid) -> Result<()> {
        self.constraints
            .remove(&oid)
            .ok_or(Self::missing("constraint", oid))?;
        self.log_drop(ObjectClass::Constraint, oid, 0);
        Ok(())
    }

    fn remove_conversion(&mut self, oid: Oid) -> Result<()> {
        self.conversions
            .remove(&oid)
            .ok_or(Self::missing("conversion", oid))?;
        self.log_drop(ObjectClass::Conversion, oid, 0);
        Ok(())
    }

    fn remove_attr_default(&mut self, oid: Oid) -> Result<()> {
        self.attr_defaults
            .remove(&oid)
            .ok_or(Self::missing("attrdef", oid))?;
        self.log_drop(ObjectClass::Default, oid, 0);
        Ok(())
    }

    fn remove_language(&mut self, oid: Oid) -> Result<()> {
        self.languages
            .remove(&oid)
            .ok_or(Self::missing("language", oid))?;
        self.log_drop(ObjectClass::Language, oid, 0);
        Ok(())
    }

    fn remove_operator(&mut self, oid: Oid) -> Result<()> {
        self.operators
            .remove(&oid)
            .ok_or(Self::missing("operator", oid))?;
        self.log_drop(ObjectClass::Operator, oid, 0);
        Ok(())
    }

    fn remove_opclass(&mut self, oid: Oid) -> Result<()> {
        self.opclasses
            .remove(&oid)
            .ok_or(Self::missing("operator class", oid))?;
        self.log_drop(ObjectClass::OpClass, oid, 0);
        Ok(())
    }

    fn remove_rewrite_rule(&mut self, oid: Oid) -> Result<()> {
        self.rewrites
            .remove(&oid)
            .ok_or(Self::missing("rewrite rule", oid))?;
        self.log_drop(ObjectClass::Rewrite, oid, 0);
        Ok(())
    }

    fn remove_trigger(&mut self, oid: Oid) -> Result<()> {
        self.triggers
            .remove(&oid)
            .ok_or(Self::missing("trigger", oid))?;
        self.log_drop(ObjectClass::Trigger, oid, 0);
        Ok(())
    }

    fn remove_schema(&mut self, oid: Oid) -> Result<()> {
        self.schemas
            .remove(&oid)
            .ok_or(Self::missing("schema", oid))?;
        self.log_drop(ObjectClass::Schema, oid, 0);
        Ok(())
    }

    fn remove_fdw(&mut self, oid: Oid) -> Result<()> {
        self.fdws
            .remove(&oid)
            .ok_or(Self::missing("foreign-data wrapper", oid))?;
        self.log_drop(ObjectClass::Fdw, oid, 0);
        Ok(())
    }

    fn remove_foreign_server(&mut self, oid: Oid) -> Result<()> {
        self.foreign_servers
            .remove(&oid)
            .ok_or(Self::missing("foreign server", oid))?;
        self.log_drop(ObjectClass::ForeignServer, oid, 0);
        Ok(())
    }

    fn remove_user_mapping(&mut self, oid: Oid) -> Result<()> {
        self.user_mappings
            .remove(&oid)
            .ok_or(Self::missing("user mapping", oid))?;
        self.log_drop(ObjectClass::UserMapping, oid, 0);
        Ok(())
    }

    fn remove_protocol(&mut self, oid: Oid) -> Result<()> {
        self.protocols
            .remove(&oid)
            .ok_or(Self::missing("protocol", oid))?;
        self.log_drop(ObjectClass::ExtProtocol, oid, 0);
        Ok(())
    }

    fn delete_comments(&mut self, address: &ObjectAddress) -> Result<()> {
        self.comments.remove(address);
        Ok(())
    }

    fn delete_shared_dependency_records(&mut self, class_id: Oid, object_id: Oid) -> Result<()> {
        self.shared_deps.remove(&(class_id, object_id));
        Ok(())
    }
}
