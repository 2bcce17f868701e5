//! Expression trees as seen by the dependency engine.
//!
//! The parser and planner live outside this crate; what arrives here is an
//! already-built tree plus the range tables of the enclosing query scopes.
//! Only the shape the reference scanner needs is modelled: which constructs
//! carry catalog identity, and where the children are.

use crate::address::Oid;

pub mod scan;

pub use scan::expr_references;

/// A column reference. `var_no` selects a range-table entry (1-based),
/// `levels_up` selects the query scope counting outward from the innermost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    pub var_no: u32,
    /// Attribute number; zero is a whole-row reference and negative values
    /// are system columns, neither of which names a droppable sub-object.
    pub att_no: i32,
    pub levels_up: u32,
}

/// A literal. Only object-identifier payloads are modelled: for constants
/// of the `reg*` alias types the value names another catalog object by oid,
/// and the scanner records a dependency on it. `None` is a NULL constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Const {
    pub type_oid: Oid,
    pub value: Option<Oid>,
}

/// One entry in a query's range table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeTableEntry {
    Relation { relid: Oid },
    /// Join alias vars are expanded in place of references to the join.
    Join { alias_vars: Vec<Node> },
    Function { column_types: Vec<Oid> },
    TableFunction { column_types: Vec<Oid> },
    Subquery { query: Query },
    Values,
}

/// A (sub)query: its range table plus every expression hanging off it
/// (target list, quals, and so on, flattened).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub range_table: Vec<RangeTableEntry>,
    pub exprs: Vec<Node>,
}

/// An expression tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Var(Var),
    Const(Const),
    Param { param_type: Oid },
    FuncExpr { funcid: Oid, args: Vec<Node> },
    OpExpr { opno: Oid, args: Vec<Node> },
    DistinctExpr { opno: Oid, args: Vec<Node> },
    ScalarArrayOpExpr { opno: Oid, args: Vec<Node> },
    NullIfExpr { opno: Oid, args: Vec<Node> },
    Aggref { fnoid: Oid, args: Vec<Node> },
    WindowRef { fnoid: Oid, args: Vec<Node> },
    RelabelType { result_type: Oid, arg: Box<Node> },
    ConvertRowtypeExpr { result_type: Oid, arg: Box<Node> },
    CoerceToDomain { result_type: Oid, arg: Box<Node> },
    RowExpr { row_type: Oid, args: Vec<Node> },
    RowCompareExpr {
        operators: Vec<Oid>,
        opclasses: Vec<Oid>,
        left_args: Vec<Node>,
        right_args: Vec<Node>,
    },
    /// Pure connective; carries no catalog identity of its own.
    BoolExpr { args: Vec<Node> },
    List(Vec<Node>),
    Subquery(Box<Query>),
    /// An already-planned subplan. The scanner refuses these: references
    /// must be collected before planning flattens them away.
    SubPlan,
}
