//! The deletion state machine and the dependency-recording entry points.
//!
//! Deletion runs in three steps per object: sever its outgoing edges, then
//! drop everything that depends on it, then destroy the object itself. The
//! removal of outgoing edges, made observable by the store's `publish`
//! barrier, doubles as the visited marker that lets traversal terminate on
//! cyclic graphs without an in-memory visited set.
//!
//! RESTRICT violations are never raised mid-traversal. They flip an `ok`
//! flag that surfaces once at the outermost entry point, so a single pass
//! reports every direct and indirect violation; partial catalog mutations
//! are undone by the surrounding transaction.

use crate::address::{ObjectAddress, ObjectAddresses, Oid};
use crate::backend::CatalogBackend;
use crate::class::dispatch_drop;
use crate::constants::RELATION_CLASS_ID;
use crate::describe::object_description;
use crate::edge::DependencyKind;
use crate::error::{DependError, Result};
use crate::expr::{Node, RangeTableEntry, expr_references};
use crate::options::EngineOptions;
use crate::report::{ReportLevel, report};
use crate::store::{RowId, ScanLock};
use std::collections::HashSet;

/// How far a drop is allowed to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DropBehavior {
    /// Refuse the drop if anything outside the implicit closure still
    /// depends on the target.
    Restrict,
    /// Recursively drop every dependent as well.
    Cascade,
}

/// The object-dependency engine, bound to one catalog backend for the
/// duration of a transaction.
pub struct DependencyEngine<'c, C: CatalogBackend> {
    catalog: &'c mut C,
    options: EngineOptions,
}

impl<'c, C: CatalogBackend> DependencyEngine<'c, C> {
    pub fn new(catalog: &'c mut C) -> Self {
        Self::with_options(catalog, EngineOptions::default())
    }

    pub fn with_options(catalog: &'c mut C, options: EngineOptions) -> Self {
        Self { catalog, options }
    }

    /// Drop one object, together with whatever the chosen behavior allows.
    pub fn perform_deletion(
        &mut self,
        object: &ObjectAddress,
        behavior: DropBehavior,
    ) -> Result<()> {
        // Captured before traversal: by the time a violation is surfaced
        // the object itself is already gone.
        let description = object_description(&*self.catalog, object)?;

        let mut oktodelete = ObjectAddresses::new();
        self.find_auto_deletable(object, &mut oktodelete, true)?;

        let mut already_deleted = None;
        let ok = self.recursive_deletion(
            object,
            behavior,
            self.options.notice_level(),
            None,
            &oktodelete,
            &mut already_deleted,
        )?;
        if !ok {
            return Err(DependError::DependentObjectsExist {
                message: format!("cannot drop {description} because other objects depend on it"),
                hint: Some("Use DROP ... CASCADE to drop the dependent objects too.".to_string()),
            });
        }
        Ok(())
    }

    /// Drop several objects as one operation. An AUTO or INTERNAL dependent
    /// of one target that happens to be a direct target itself is dropped
    /// exactly once, regardless of the order the targets were given in.
    pub fn perform_multiple_deletions(
        &mut self,
        objects: &[ObjectAddress],
        behavior: DropBehavior,
    ) -> Result<()> {
        // One implicit closure shared across all targets, computed before
        // any mutation.
        let mut implicit = ObjectAddresses::new();
        for object in objects {
            if !implicit.contains(object) {
                self.find_auto_deletable(object, &mut implicit, false)?;
            }
        }

        let mut already_deleted = Some(ObjectAddresses::new());
        for object in objects {
            if let Some(done) = already_deleted.as_ref()
                && done.contains(object)
            {
                continue;
            }
            if implicit.contains(object) {
                // Some other target's cascade will reach this one.
                continue;
            }
            let description = object_description(&*self.catalog, object)?;
            let ok = self.recursive_deletion(
                object,
                behavior,
                self.options.notice_level(),
                None,
                &implicit,
                &mut already_deleted,
            )?;
            if !ok {
                return Err(DependError::DependentObjectsExist {
                    message: format!(
                        "cannot drop {description} because other objects depend on it"
                    ),
                    hint: Some(
                        "Use DROP ... CASCADE to drop the dependent objects too.".to_string(),
                    ),
                });
            }
        }
        Ok(())
    }

    /// Drop everything that depends on `object` without dropping `object`
    /// itself. The target is seeded into the implicit closure, so
    /// self-edges are tolerated silently.
    pub fn delete_what_depends_on(
        &mut self,
        object: &ObjectAddress,
        show_notices: bool,
    ) -> Result<()> {
        let description = object_description(&*self.catalog, object)?;

        let mut oktodelete = ObjectAddresses::new();
        self.find_auto_deletable(object, &mut oktodelete, true)?;

        let msg_level = if show_notices {
            self.options.notice_level()
        } else {
            ReportLevel::Debug2
        };
        let mut already_deleted = None;
        let ok = self.delete_dependent_objects(
            object,
            &description,
            DropBehavior::Cascade,
            msg_level,
            &oktodelete,
            &mut already_deleted,
        )?;
        if !ok {
            return Err(DependError::DependentObjectsExist {
                message: format!("cannot drop {description} because other objects depend on it"),
                hint: Some("Use DROP ... CASCADE to drop the dependent objects too.".to_string()),
            });
        }
        self.catalog.publish();
        Ok(())
    }

    /// Record that `depender` depends on every address in `referenced`.
    ///
    /// References to pinned objects are suppressed: the system keeps its
    /// built-ins alive without help, and the edge table stays small.
    pub fn record_dependency_on(
        &mut self,
        depender: &ObjectAddress,
        referenced: &[ObjectAddress],
        kind: DependencyKind,
    ) -> Result<()> {
        let mut live = Vec::with_capacity(referenced.len());
        for reference in referenced {
            if !self.object_is_pinned(reference)? {
                live.push(*reference);
            }
        }
        if live.is_empty() {
            return Ok(());
        }
        self.catalog.insert_edges(depender, &live, kind)
    }

    /// Discover every catalog object referenced by an expression tree and
    /// record one edge per distinct reference.
    pub fn record_dependency_on_expr(
        &mut self,
        depender: &ObjectAddress,
        expr: &Node,
        rtable: &[RangeTableEntry],
        kind: DependencyKind,
    ) -> Result<()> {
        let mut refs = ObjectAddresses::new();
        expr_references(&*self.catalog, expr, rtable, &mut refs)?;
        refs.dedup();
        self.record_dependency_on(depender, refs.as_slice(), kind)
    }

    /// Like [`record_dependency_on_expr`](Self::record_dependency_on_expr)
    /// for an expression that can only reference one relation (a check
    /// constraint, an index expression). References to that relation are
    /// written with `self_kind`; everything else with `kind`. The scan runs
    /// over a synthetic range table holding just the named relation.
    pub fn record_dependency_on_single_rel_expr(
        &mut self,
        depender: &ObjectAddress,
        expr: &Node,
        rel_id: Oid,
        kind: DependencyKind,
        self_kind: DependencyKind,
    ) -> Result<()> {
        let rtable = vec![RangeTableEntry::Relation { relid: rel_id }];
        let mut refs = ObjectAddresses::new();
        expr_references(&*self.catalog, expr, &rtable, &mut refs)?;
        refs.dedup();

        let (self_refs, outside): (Vec<_>, Vec<_>) = refs
            .iter()
            .copied()
            .partition(|r| r.class_id == RELATION_CLASS_ID && r.object_id == rel_id);
        self.record_dependency_on(depender, &outside, kind)?;
        self.record_dependency_on(depender, &self_refs, self_kind)
    }

    /// Whether a PIN edge protects `object` from ever being dropped.
    pub fn object_is_pinned(&mut self, object: &ObjectAddress) -> Result<bool> {
        let rows = self.catalog.scan_incoming(object, ScanLock::None)?;
        Ok(rows.iter().any(|row| row.edge.kind == DependencyKind::Pin))
    }

    /// Render the diagnostic phrase for an object.
    pub fn object_description(&self, object: &ObjectAddress) -> Result<String> {
        object_description(&*self.catalog, object)
    }

    /// Pre-compute the implicit closure: everything reachable from `object`
    /// through incoming AUTO/INTERNAL edges. Runs before any mutation, so
    /// it carries its own cycle protection, and its result is what makes
    /// the deletion outcome independent of edge-visit order.
    fn find_auto_deletable(
        &mut self,
        object: &ObjectAddress,
        oktodelete: &mut ObjectAddresses,
        add_self: bool,
    ) -> Result<()> {
        if oktodelete.contains(object) {
            return Ok(());
        }
        if add_self {
            oktodelete.add(*object);
        }
        let rows = self.catalog.scan_incoming(object, ScanLock::None)?;
        for row in rows {
            match row.edge.kind {
                DependencyKind::Normal => {}
                DependencyKind::Auto | DependencyKind::Internal => {
                    self.find_auto_deletable(&row.edge.dependent, oktodelete, true)?;
                }
                DependencyKind::Pin => {
                    let description = object_description(&*self.catalog, object)?;
                    return Err(DependError::DependentObjectsExist {
                        message: format!(
                            "cannot drop {description} because it is required by the database system"
                        ),
                        hint: None,
                    });
                }
            }
        }
        Ok(())
    }

    /// One round of the deletion state machine.
    fn recursive_deletion(
        &mut self,
        object: &ObjectAddress,
        behavior: DropBehavior,
        msg_level: ReportLevel,
        caller: Option<&ObjectAddress>,
        oktodelete: &ObjectAddresses,
        already_deleted: &mut Option<ObjectAddresses>,
    ) -> Result<bool> {
        let mut ok = true;
        let description = object_description(&*self.catalog, object)?;

        // Step 1: sever outgoing edges. The scan is drained before anything
        // recurses or any destructor runs; rows are deleted as visited and
        // the removals published afterwards, which is both the cycle
        // breaker and the visited marker for the rest of the traversal.
        let mut owning_object: Option<ObjectAddress> = None;
        for row in self.catalog.scan_outgoing(object, ScanLock::ForUpdate)? {
            let other = row.edge.referenced;
            match row.edge.kind {
                DependencyKind::Normal | DependencyKind::Auto => {
                    self.catalog.delete_row(row.id)?;
                }
                DependencyKind::Internal => match caller {
                    None => {
                        // A direct drop of an implementation detail: the
                        // user must drop the owning object instead.
                        let owner_desc = object_description(&*self.catalog, &other)?;
                        return Err(DependError::DependentObjectsExist {
                            message: format!(
                                "cannot drop {description} because {owner_desc} requires it"
                            ),
                            hint: Some(format!("You may drop {owner_desc} instead.")),
                        });
                    }
                    Some(calling) if calling.covers(&other) => {
                        // Re-entry from the owner's own drop.
                        self.catalog.delete_row(row.id)?;
                    }
                    Some(_) => {
                        if owning_object.is_some() {
                            return Err(DependError::MultipleInternalDependencies {
                                object: description,
                            });
                        }
                        // The edge row must survive: the owner's drop will
                        // recurse back through it to reach this object.
                        owning_object = Some(other);
                    }
                },
                DependencyKind::Pin => {
                    return Err(DependError::IncorrectPinUse {
                        object: description,
                    });
                }
            }
        }
        self.catalog.publish();

        // Step 1.5: we turned out to be owned by another object, so the
        // drop is redirected there; its traversal will reach us back.
        if let Some(owner) = owning_object {
            let owner_desc = object_description(&*self.catalog, &owner)?;
            if oktodelete.contains(&owner) {
                report(
                    ReportLevel::Debug2,
                    &format!("drop auto-cascades to {owner_desc}"),
                );
            } else if behavior == DropBehavior::Restrict {
                report(msg_level, &format!("{owner_desc} depends on {description}"));
                ok = false;
            } else {
                report(msg_level, &format!("drop cascades to {owner_desc}"));
            }
            if !self.recursive_deletion(
                &owner,
                behavior,
                msg_level,
                Some(object),
                oktodelete,
                already_deleted,
            )? {
                ok = false;
            }
            return Ok(ok);
        }

        // Step 2: drop everything that depends on this object.
        if !self.delete_dependent_objects(
            object,
            &description,
            behavior,
            msg_level,
            oktodelete,
            already_deleted,
        )? {
            ok = false;
        }

        // Step 3: destroy the object itself, then its comments and, for a
        // whole object, its shared-dependency records.
        dispatch_drop(self.catalog, object)?;
        if let Some(done) = already_deleted.as_mut()
            && !done.contains(object)
        {
            done.add(*object);
        }
        self.catalog.delete_comments(object)?;
        if object.sub_id == 0 {
            self.catalog
                .delete_shared_dependency_records(object.class_id, object.object_id)?;
        }
        self.catalog.publish();

        Ok(ok)
    }

    /// Step 2 of the state machine: walk incoming edges and recurse.
    ///
    /// The scan is re-issued after every recursion rather than iterated
    /// from a snapshot: inner drops delete and publish edge rows, and a
    /// fresh scan is what keeps those rows from being visited again (the
    /// same property a live catalog scan provides).
    fn delete_dependent_objects(
        &mut self,
        object: &ObjectAddress,
        description: &str,
        behavior: DropBehavior,
        msg_level: ReportLevel,
        oktodelete: &ObjectAddresses,
        already_deleted: &mut Option<ObjectAddresses>,
    ) -> Result<bool> {
        let mut ok = true;
        let mut visited: HashSet<RowId> = HashSet::new();

        loop {
            let rows = self.catalog.scan_incoming(object, ScanLock::ForUpdate)?;
            let Some(row) = rows.into_iter().find(|row| !visited.contains(&row.id)) else {
                break;
            };
            visited.insert(row.id);

            let other = row.edge.dependent;
            match row.edge.kind {
                DependencyKind::Normal => {
                    let other_desc = object_description(&*self.catalog, &other)?;
                    if oktodelete.contains(&other) {
                        // Also reachable through an AUTO/INTERNAL path, so
                        // the cascade is implicit no matter which edge the
                        // scan happened to yield first.
                        report(
                            ReportLevel::Debug2,
                            &format!("drop auto-cascades to {other_desc}"),
                        );
                    } else if behavior == DropBehavior::Restrict {
                        report(msg_level, &format!("{other_desc} depends on {description}"));
                        ok = false;
                    } else {
                        report(msg_level, &format!("drop cascades to {other_desc}"));
                    }
                }
                DependencyKind::Auto | DependencyKind::Internal => {
                    let other_desc = object_description(&*self.catalog, &other)?;
                    report(
                        ReportLevel::Debug2,
                        &format!("drop auto-cascades to {other_desc}"),
                    );
                }
                DependencyKind::Pin => {
                    return Err(DependError::DependentObjectsExist {
                        message: format!(
                            "cannot drop {description} because it is required by the database system"
                        ),
                        hint: None,
                    });
                }
            }

            // Recurse even when a RESTRICT violation was just recorded:
            // the point is to surface every violation in one pass.
            if !self.recursive_deletion(
                &other,
                behavior,
                msg_level,
                Some(object),
                oktodelete,
                already_deleted,
            )? {
                ok = false;
            }
        }

        Ok(ok)
    }
}
