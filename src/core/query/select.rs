//! Projection: the final stage of a SELECT pipeline, picking and reordering
//! columns (or `*`) out of an already filtered/joined/aggregated row set.

use crate::core::common::types::Row;

/// One item of a non-aggregate projection list: either every column in
/// source order, or a single column by its index in the source row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectItem {
    Star,
    Column(usize),
}

/// Applies `items` to every row in `rows`. `Star` expands to the whole
/// source row; mixing `Star` with other `Column` items in the same list
/// produces a row with the star's columns followed by the extra ones, in
/// list order, matching ordinary positional projection semantics.
#[must_use]
pub fn project(rows: &[Row], items: &[ProjectItem]) -> Vec<Row> {
    rows.iter()
        .map(|row| {
            items
                .iter()
                .flat_map(|item| match item {
                    ProjectItem::Star => row.clone(),
                    ProjectItem::Column(idx) => vec![row[*idx].clone()],
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::types::Value;

    #[test]
    fn star_passes_rows_through_unchanged() {
        let rows = vec![vec![Value::Integer(1), Value::Text("a".into())]];
        let out = project(&rows, &[ProjectItem::Star]);
        assert_eq!(out, rows);
    }

    #[test]
    fn column_list_reorders_and_subsets() {
        let rows = vec![vec![Value::Integer(1), Value::Text("a".into()), Value::Boolean(true)]];
        let out = project(&rows, &[ProjectItem::Column(2), ProjectItem::Column(0)]);
        assert_eq!(out, vec![vec![Value::Boolean(true), Value::Integer(1)]]);
    }
}
