//! GROUP BY partitioning and the five aggregate functions (§4.5). Input is
//! already-materialized rows (the output of a scan, filter, or join); this
//! module has no knowledge of column names, only positional indices
//! resolved by the SELECT executor.

use crate::core::common::types::{Row, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

/// One item of the projection list, in the order it should appear in the
/// output row.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateItem {
    /// A plain GROUP BY key column (every non-aggregate projection item
    /// must be one, per §4.5).
    GroupKey(usize),
    /// An aggregate function; `column = None` is only valid for `Count`
    /// (`COUNT(*)`, which counts rows rather than non-null values).
    Agg(AggregateKind, Option<usize>),
}

/// Partitions `rows` by the tuple of `group_by` column values (null forms
/// its own group), computes every `items` entry per group, and returns one
/// output row per group in ascending lexicographic key order. With an
/// empty `group_by`, a single implicit group covers all of `rows` (and is
/// still emitted — as one row — when `rows` is empty, so `COUNT(*)` reads
/// 0 and `SUM`/`AVG` read null instead of the query returning no rows).
#[must_use]
pub fn group_and_aggregate(rows: &[Row], group_by: &[usize], items: &[AggregateItem]) -> Vec<Row> {
    if group_by.is_empty() {
        let group: Vec<&Row> = rows.iter().collect();
        return vec![project_group(&group, items)];
    }

    let mut groups: HashMap<Vec<Value>, Vec<&Row>> = HashMap::new();
    let mut key_order: Vec<Vec<Value>> = Vec::new();
    for row in rows {
        let key: Vec<Value> = group_by.iter().map(|&idx| row[idx].clone()).collect();
        if !groups.contains_key(&key) {
            key_order.push(key.clone());
        }
        groups.entry(key).or_default().push(row);
    }

    key_order.sort_by(|a, b| compare_key_tuples(a, b));

    key_order
        .into_iter()
        .map(|key| {
            let group = &groups[&key];
            project_group(group, items)
        })
        .collect()
}

fn compare_key_tuples(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = x.group_key_cmp(y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn project_group(group: &[&Row], items: &[AggregateItem]) -> Row {
    items
        .iter()
        .map(|item| match item {
            AggregateItem::GroupKey(idx) => {
                group.first().map_or(Value::Null, |row| row[*idx].clone())
            }
            AggregateItem::Agg(kind, column) => apply_aggregate(*kind, *column, group),
        })
        .collect()
}

fn apply_aggregate(kind: AggregateKind, column: Option<usize>, group: &[&Row]) -> Value {
    match kind {
        AggregateKind::Count => match column {
            None => Value::Integer(group.len() as i64),
            Some(idx) => Value::Integer(group.iter().filter(|r| !r[idx].is_null()).count() as i64),
        },
        AggregateKind::Sum => sum(non_null_values(group, column)),
        AggregateKind::Avg => avg(non_null_values(group, column)),
        AggregateKind::Min => extremum(non_null_values(group, column), Ordering::Less),
        AggregateKind::Max => extremum(non_null_values(group, column), Ordering::Greater),
    }
}

fn non_null_values<'a>(group: &'a [&'a Row], column: Option<usize>) -> impl Iterator<Item = &'a Value> {
    let idx = column.expect("SUM/AVG/MIN/MAX always have a column");
    group.iter().map(move |row| &row[idx]).filter(|v| !v.is_null())
}

fn sum<'a>(values: impl Iterator<Item = &'a Value>) -> Value {
    let mut any = false;
    let mut all_int = true;
    let mut acc_f = 0.0f64;
    let mut acc_i: i64 = 0;
    for v in values {
        any = true;
        match v {
            Value::Integer(i) => {
                acc_i += i;
                acc_f += *i as f64;
            }
            Value::Real(r) => {
                all_int = false;
                acc_f += r;
            }
            _ => {}
        }
    }
    if !any {
        Value::Null
    } else if all_int {
        Value::Integer(acc_i)
    } else {
        Value::Real(acc_f)
    }
}

fn avg<'a>(values: impl Iterator<Item = &'a Value>) -> Value {
    let mut count = 0usize;
    let mut acc = 0.0f64;
    for v in values {
        count += 1;
        acc += match v {
            Value::Integer(i) => *i as f64,
            Value::Real(r) => *r,
            _ => 0.0,
        };
    }
    if count == 0 {
        Value::Null
    } else {
        Value::Real(acc / count as f64)
    }
}

fn extremum<'a>(values: impl Iterator<Item = &'a Value>, favor: Ordering) -> Value {
    let mut best: Option<&Value> = None;
    for v in values {
        best = match best {
            None => Some(v),
            Some(current) => {
                if v.domain_cmp(current) == Some(favor) {
                    Some(v)
                } else {
                    Some(current)
                }
            }
        };
    }
    best.cloned().unwrap_or(Value::Null)
}
