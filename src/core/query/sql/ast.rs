//! The `Statement` AST the parser produces (§4.6) — one variant per
//! grammar production in §6.

use crate::core::common::types::{DataType, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraint {
    PrimaryKey,
    NotNull,
    Unique,
    ForeignKey { column: String, ref_table: String, ref_column: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDecl {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

/// `col`, `table.col`, or `*` — a projection item before name resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjItem {
    Star,
    Column { table: Option<String>, column: String },
    Aggregate { func: AggregateFunc, arg: AggregateArg },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateArg {
    Star,
    Column { table: Option<String>, column: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
    Gt,
    Like,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredicateClause {
    pub table: Option<String>,
    pub column: String,
    pub op: CompareOp,
    pub operand: Value,
}

/// `JOIN <right_table> ON <on_left_table>.<on_left_column> =
/// <on_right_table>.<on_right_column>`. The two qualified names in the ON
/// clause are kept exactly as written; the executor matches them against
/// the FROM table and `right_table` rather than assuming an order.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub right_table: String,
    pub on_left_table: String,
    pub on_left_column: String,
    pub on_right_table: String,
    pub on_right_column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub projections: Vec<ProjItem>,
    pub from: String,
    pub join: Option<JoinClause>,
    pub predicates: Vec<PredicateClause>,
    pub group_by: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub name: String,
    pub columns: Vec<ColumnDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    pub index_name: String,
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: String,
    pub assignments: Vec<(String, Value)>,
    pub predicates: Vec<PredicateClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: String,
    pub predicates: Vec<PredicateClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTableStatement),
    CreateIndex(CreateIndexStatement),
    Insert(InsertStatement),
    Select(SelectStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Begin,
    Commit,
    Rollback,
}
