//! Reference discovery over expression trees.
//!
//! Walks a tree and appends an object address for every construct that
//! carries catalog identity: column references resolve through the
//! range-table stack, function and operator calls name their catalog
//! entries, and `reg*` constants name objects by oid (recorded only when
//! the object still exists, since a literal can outlive what it named).

use crate::address::{ObjectAddresses, Oid};
use crate::backend::CatalogReader;
use crate::class::ObjectClass;
use crate::constants::{
    INVALID_OID, REGCLASS_TYPE_ID, REGOPERATOR_TYPE_ID, REGOPER_TYPE_ID, REGPROCEDURE_TYPE_ID,
    REGPROC_TYPE_ID, REGTYPE_TYPE_ID,
};
use crate::error::{DependError, Result};
use crate::expr::{Const, Node, Query, RangeTableEntry, Var};

/// Collect every catalog object referenced by `expr` into `refs`.
///
/// `rtable` is the range table of the scope the expression belongs to;
/// subquery traversal grows the scope stack underneath it. The caller is
/// expected to run [`ObjectAddresses::dedup`] afterwards; the raw walk
/// appends one entry per occurrence.
pub fn expr_references<C: CatalogReader>(
    reader: &C,
    expr: &Node,
    rtable: &[RangeTableEntry],
    refs: &mut ObjectAddresses,
) -> Result<()> {
    let mut scan = ReferenceScan {
        reader,
        refs,
        rtables: vec![rtable],
    };
    scan.walk(expr)
}

struct ReferenceScan<'a, 'n, C: CatalogReader> {
    reader: &'a C,
    refs: &'a mut ObjectAddresses,
    /// Range tables of the enclosing query scopes, innermost first.
    rtables: Vec<&'n [RangeTableEntry]>,
}

impl<'a, 'n, C: CatalogReader> ReferenceScan<'a, 'n, C> {
    fn walk(&mut self, node: &'n Node) -> Result<()> {
        match node {
            Node::Var(var) => self.walk_var(var),
            Node::Const(c) => self.walk_const(c),
            Node::Param { param_type } => {
                self.refs.add_object(ObjectClass::Type, *param_type, 0);
                Ok(())
            }
            Node::FuncExpr { funcid, args } => {
                self.refs.add_object(ObjectClass::Proc, *funcid, 0);
                self.walk_all(args)
            }
            Node::OpExpr { opno, args }
            | Node::DistinctExpr { opno, args }
            | Node::ScalarArrayOpExpr { opno, args }
            | Node::NullIfExpr { opno, args } => {
                self.refs.add_object(ObjectClass::Operator, *opno, 0);
                self.walk_all(args)
            }
            Node::Aggref { fnoid, args } | Node::WindowRef { fnoid, args } => {
                self.refs.add_object(ObjectClass::Proc, *fnoid, 0);
                self.walk_all(args)
            }
            Node::RelabelType { result_type, arg }
            | Node::ConvertRowtypeExpr { result_type, arg }
            | Node::CoerceToDomain { result_type, arg } => {
                self.refs.add_object(ObjectClass::Type, *result_type, 0);
                self.walk(arg)
            }
            Node::RowExpr { row_type, args } => {
                self.refs.add_object(ObjectClass::Type, *row_type, 0);
                self.walk_all(args)
            }
            Node::RowCompareExpr {
                operators,
                opclasses,
                left_args,
                right_args,
            } => {
                for opno in operators {
                    self.refs.add_object(ObjectClass::Operator, *opno, 0);
                }
                for opclass in opclasses {
                    self.refs.add_object(ObjectClass::OpClass, *opclass, 0);
                }
                self.walk_all(left_args)?;
                self.walk_all(right_args)
            }
            Node::BoolExpr { args } | Node::List(args) => self.walk_all(args),
            Node::Subquery(query) => self.walk_query(query),
            Node::SubPlan => Err(DependError::Unsupported("already-planned subqueries")),
        }
    }

    fn walk_all(&mut self, nodes: &'n [Node]) -> Result<()> {
        for node in nodes {
            self.walk(node)?;
        }
        Ok(())
    }

    fn walk_var(&mut self, var: &'n Var) -> Result<()> {
        let levels_up = var.levels_up as usize;
        let rtable = self.rtables.get(levels_up).copied().ok_or(
            DependError::InvalidVarLevel {
                levels_up: var.levels_up,
                depth: self.rtables.len(),
            },
        )?;
        if var.var_no == 0 || var.var_no as usize > rtable.len() {
            return Err(DependError::InvalidVarNo(var.var_no));
        }
        match &rtable[var.var_no as usize - 1] {
            RangeTableEntry::Relation { relid } => {
                if var.att_no > 0 {
                    self.refs
                        .add_object(ObjectClass::Class, *relid, var.att_no as u32);
                }
                // Whole-row and system-column references carry no
                // per-column identity; the relation itself is covered by
                // the range-table walk.
                Ok(())
            }
            RangeTableEntry::Join { alias_vars } => {
                if var.att_no <= 0 || var.att_no as usize > alias_vars.len() {
                    return Err(DependError::InvalidAttrNo(var.att_no));
                }
                // The alias expression is written in the join's own scope,
                // so recurse with the stack trimmed to that scope.
                let alias = &alias_vars[var.att_no as usize - 1];
                self.walk_at_scope(levels_up, alias)
            }
            _ => Ok(()),
        }
    }

    fn walk_at_scope(&mut self, levels_up: usize, expr: &'n Node) -> Result<()> {
        let saved = self.rtables.clone();
        self.rtables.drain(..levels_up);
        self.walk(expr)?;
        self.rtables = saved;
        Ok(())
    }

    fn walk_const(&mut self, c: &'n Const) -> Result<()> {
        self.refs.add_object(ObjectClass::Type, c.type_oid, 0);

        // An object-identifier literal names another object by oid. The
        // literal can outlive the object it named, so record the reference
        // only while the object still exists.
        let Some(oid) = c.value else { return Ok(()) };
        if oid == INVALID_OID {
            return Ok(());
        }
        match c.type_oid {
            REGPROC_TYPE_ID | REGPROCEDURE_TYPE_ID => {
                if self.reader.function_signature(oid).is_some() {
                    self.refs.add_object(ObjectClass::Proc, oid, 0);
                }
            }
            REGOPER_TYPE_ID | REGOPERATOR_TYPE_ID => {
                if self.reader.operator_signature(oid).is_some() {
                    self.refs.add_object(ObjectClass::Operator, oid, 0);
                }
            }
            REGCLASS_TYPE_ID => {
                if self.reader.relation_info(oid).is_some() {
                    self.refs.add_object(ObjectClass::Class, oid, 0);
                }
            }
            REGTYPE_TYPE_ID => {
                if self.reader.type_name(oid).is_some() {
                    self.refs.add_object(ObjectClass::Type, oid, 0);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn walk_query(&mut self, query: &'n Query) -> Result<()> {
        for rte in &query.range_table {
            match rte {
                RangeTableEntry::Relation { relid } => {
                    self.refs.add_object(ObjectClass::Class, *relid, 0);
                }
                RangeTableEntry::Function { column_types }
                | RangeTableEntry::TableFunction { column_types } => {
                    for type_oid in column_types {
                        self.refs.add_object(ObjectClass::Type, *type_oid, 0);
                    }
                }
                _ => {}
            }
        }

        self.rtables.insert(0, &query.range_table);
        for expr in &query.exprs {
            self.walk(expr)?;
        }
        for rte in &query.range_table {
            if let RangeTableEntry::Subquery { query: nested } = rte {
                self.walk_query(nested)?;
            }
        }
        self.rtables.remove(0);
        Ok(())
    }
}
