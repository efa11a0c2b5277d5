//! `SELECT` dispatch (§4.5): resolves FROM (+ optional JOIN), applies the
//! filter protocol or a post-join row-wise `WHERE`, then either a plain
//! projection or a GROUP BY / aggregate projection, in that order.

use crate::core::common::error::OxidbError;
use crate::core::common::types::{DataType, Row, Value};
use crate::core::query::aggregate::{self, AggregateItem, AggregateKind};
use crate::core::query::executor::ExecutionResult;
use crate::core::query::filter::{self, QueryPlanKind};
use crate::core::query::join;
use crate::core::query::select::{project, ProjectItem};
use crate::core::query::sql::ast::{
    AggregateArg, AggregateFunc, PredicateClause, ProjItem, SelectStatement,
};
use crate::core::storage::Database;

/// One column of the row layout that FROM (+ optional JOIN) exposes to the
/// projection/aggregation stages — source table, name, and declared type,
/// used to resolve bare/qualified projection and predicate references.
struct SourceColumn {
    table: String,
    name: String,
    data_type: DataType,
}

pub fn select(db: &Database, stmt: SelectStatement) -> Result<ExecutionResult, OxidbError> {
    let from_table = db
        .table(&stmt.from)
        .ok_or_else(|| OxidbError::SchemaError(format!("no such table '{}'", stmt.from)))?;

    let (source_cols, rows, plan) = match &stmt.join {
        None => {
            let predicates = super::resolve_single_table_predicates(&from_table.schema, &stmt.from, &stmt.predicates)?;
            let (rids, plan) = filter::select(from_table, &predicates)?;
            let rows: Vec<Row> = rids
                .into_iter()
                .map(|rid| from_table.get(rid).expect("candidate rid must exist").clone())
                .collect();
            (source_columns(&stmt.from, from_table), rows, plan)
        }
        Some(join_clause) => {
            let right_table = db.table(&join_clause.right_table).ok_or_else(|| {
                OxidbError::SchemaError(format!("no such table '{}'", join_clause.right_table))
            })?;
            let (left_col, right_col) = resolve_join_columns(&stmt.from, &join_clause.right_table, join_clause)?;
            let joined = join::hash_equi_join(from_table, &left_col, right_table, &right_col);

            let mut cols = source_columns(&stmt.from, from_table);
            cols.extend(source_columns(&join_clause.right_table, right_table));

            let mut rows: Vec<Row> = joined.into_iter().map(|j| j.row).collect();
            apply_post_join_predicates(&cols, &stmt.predicates, &mut rows)?;

            (cols, rows, QueryPlanKind::FullScan)
        }
    };

    let has_aggregates = stmt.projections.iter().any(|p| matches!(p, ProjItem::Aggregate { .. }));
    if !has_aggregates && stmt.group_by.is_empty() {
        let (columns, items) = resolve_plain_projection(&source_cols, &stmt.projections)?;
        let projected = project(&rows, &items);
        return Ok(ExecutionResult::ResultSet { columns, rows: projected, plan });
    }

    let group_by_idx: Vec<usize> = stmt
        .group_by
        .iter()
        .map(|name| resolve_source_column(&source_cols, None, name))
        .collect::<Result<_, _>>()?;
    let (columns, items) = resolve_aggregate_projection(&source_cols, &stmt.projections, &group_by_idx)?;
    let grouped = aggregate::group_and_aggregate(&rows, &group_by_idx, &items);
    Ok(ExecutionResult::ResultSet { columns, rows: grouped, plan })
}

fn source_columns(table_name: &str, table: &crate::core::storage::Table) -> Vec<SourceColumn> {
    table
        .schema
        .columns
        .iter()
        .map(|c| SourceColumn { table: table_name.to_string(), name: c.name.clone(), data_type: c.data_type })
        .collect()
}

/// Matches the ON clause's two qualified names against `from_name`/`right_name`
/// in either order, returning `(left_table_column, right_table_column)`.
fn resolve_join_columns(
    from_name: &str,
    right_name: &str,
    join: &crate::core::query::sql::ast::JoinClause,
) -> Result<(String, String), OxidbError> {
    if join.on_left_table == from_name && join.on_right_table == right_name {
        Ok((join.on_left_column.clone(), join.on_right_column.clone()))
    } else if join.on_left_table == right_name && join.on_right_table == from_name {
        Ok((join.on_right_column.clone(), join.on_left_column.clone()))
    } else {
        Err(OxidbError::SchemaError(format!(
            "JOIN ON clause references neither '{from_name}' nor '{right_name}'"
        )))
    }
}

/// Resolves a bare or qualified column reference against the FROM(+JOIN)
/// column layout. A bare name must be unique across all sources, or it's
/// `AmbiguousColumn`.
fn resolve_source_column(cols: &[SourceColumn], table: Option<&str>, name: &str) -> Result<usize, OxidbError> {
    if let Some(table) = table {
        return cols
            .iter()
            .position(|c| c.table == table && c.name == name)
            .ok_or_else(|| OxidbError::SchemaError(format!("no such column '{table}.{name}'")));
    }
    let matches: Vec<usize> = cols.iter().enumerate().filter(|(_, c)| c.name == name).map(|(i, _)| i).collect();
    match matches.len() {
        0 => Err(OxidbError::SchemaError(format!("no such column '{name}'"))),
        1 => Ok(matches[0]),
        _ => Err(OxidbError::AmbiguousColumn(name.to_string())),
    }
}

fn apply_post_join_predicates(
    cols: &[SourceColumn],
    predicates: &[PredicateClause],
    rows: &mut Vec<Row>,
) -> Result<(), OxidbError> {
    if predicates.is_empty() {
        return Ok(());
    }
    let mut resolved = Vec::with_capacity(predicates.len());
    for pred in predicates {
        let idx = resolve_source_column(cols, pred.table.as_deref(), &pred.column)?;
        let operand = pred.operand.clone().coerce_to(cols[idx].data_type)?;
        resolved.push((idx, pred.op, operand));
    }
    rows.retain(|row| resolved.iter().all(|(idx, op, operand)| filter::compare(&row[*idx], *op, operand)));
    Ok(())
}

fn display_name(table: Option<&str>, column: &str) -> String {
    match table {
        Some(t) => format!("{t}.{column}"),
        None => column.to_string(),
    }
}

fn resolve_plain_projection(
    cols: &[SourceColumn],
    projections: &[ProjItem],
) -> Result<(Vec<String>, Vec<ProjectItem>), OxidbError> {
    let multi_source = cols.iter().map(|c| c.table.as_str()).collect::<std::collections::HashSet<_>>().len() > 1;
    let mut columns = Vec::new();
    let mut items = Vec::new();
    for p in projections {
        match p {
            ProjItem::Star => {
                items.push(ProjectItem::Star);
                for c in cols {
                    columns.push(if multi_source { format!("{}.{}", c.table, c.name) } else { c.name.clone() });
                }
            }
            ProjItem::Column { table, column } => {
                let idx = resolve_source_column(cols, table.as_deref(), column)?;
                items.push(ProjectItem::Column(idx));
                columns.push(display_name(table.as_deref(), column));
            }
            ProjItem::Aggregate { .. } => {
                return Err(OxidbError::Internal("aggregate item in non-aggregate projection".to_string()));
            }
        }
    }
    Ok((columns, items))
}

fn map_aggregate_func(func: AggregateFunc) -> (AggregateKind, &'static str) {
    match func {
        AggregateFunc::Count => (AggregateKind::Count, "COUNT"),
        AggregateFunc::Sum => (AggregateKind::Sum, "SUM"),
        AggregateFunc::Avg => (AggregateKind::Avg, "AVG"),
        AggregateFunc::Min => (AggregateKind::Min, "MIN"),
        AggregateFunc::Max => (AggregateKind::Max, "MAX"),
    }
}

fn resolve_aggregate_projection(
    cols: &[SourceColumn],
    projections: &[ProjItem],
    group_by_idx: &[usize],
) -> Result<(Vec<String>, Vec<AggregateItem>), OxidbError> {
    let mut columns = Vec::new();
    let mut items = Vec::new();
    for p in projections {
        match p {
            ProjItem::Star => {
                return Err(OxidbError::SchemaError(
                    "'*' is not allowed in a grouped/aggregate projection".to_string(),
                ));
            }
            ProjItem::Column { table, column } => {
                let idx = resolve_source_column(cols, table.as_deref(), column)?;
                if !group_by_idx.contains(&idx) {
                    return Err(OxidbError::SchemaError(format!(
                        "non-aggregate projection column '{column}' must appear in GROUP BY"
                    )));
                }
                items.push(AggregateItem::GroupKey(idx));
                columns.push(display_name(table.as_deref(), column));
            }
            ProjItem::Aggregate { func, arg } => {
                let (kind, func_name) = map_aggregate_func(*func);
                let (arg_idx, arg_name) = match arg {
                    AggregateArg::Star => {
                        if kind != AggregateKind::Count {
                            return Err(OxidbError::SchemaError(format!("{func_name}(*) is not supported")));
                        }
                        (None, "*".to_string())
                    }
                    AggregateArg::Column { table, column } => {
                        let idx = resolve_source_column(cols, table.as_deref(), column)?;
                        (Some(idx), display_name(table.as_deref(), column))
                    }
                };
                items.push(AggregateItem::Agg(kind, arg_idx));
                columns.push(format!("{func_name}({arg_name})"));
            }
        }
    }
    Ok((columns, items))
}
