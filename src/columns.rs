use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::error::TableError;
use crate::model::{ResolvedColumn, Row, WordBox};
use crate::options::{AnchorSide, ColumnRule, ColumnSpec};

/// Resolves every column's absolute bounds. Columns that anchor to another
/// column are resolved after it, whatever the declaration order. The result
/// keeps declaration order, which is also the assignment precedence.
pub(crate) fn resolve_columns(
    header: &Row,
    specs: &[ColumnSpec],
) -> Result<Vec<ResolvedColumn>, TableError> {
    let order = resolution_order(specs)?;
    let mut resolved: Vec<Option<ResolvedColumn>> = vec![None; specs.len()];
    let index_of = name_index(specs);

    for index in order {
        let spec = &specs[index];
        let left = match &spec.rule {
            ColumnRule::Fixed { position } => *position,
            ColumnRule::HeaderWord { header: text, offset } => {
                let word = header
                    .find_word(text)
                    .ok_or_else(|| TableError::HeaderWordNotFound {
                        column: spec.name.clone(),
                        header: text.clone(),
                    })?;
                word.left + offset
            }
            ColumnRule::Column { column, side } => {
                let anchor = index_of
                    .get(column.as_str())
                    .and_then(|&anchor| resolved[anchor].as_ref())
                    .ok_or_else(|| TableError::UnknownColumn {
                        column: spec.name.clone(),
                        referenced: column.clone(),
                    })?;
                match side {
                    AnchorSide::Right => anchor.right(),
                    AnchorSide::Left => anchor.left,
                }
            }
        };

        debug!(column = %spec.name, left, width = spec.width, "resolved column");
        resolved[index] = Some(ResolvedColumn {
            name: spec.name.clone(),
            left,
            width: spec.width,
        });
    }

    Ok(resolved.into_iter().flatten().collect())
}

fn name_index(specs: &[ColumnSpec]) -> HashMap<&str, usize> {
    specs
        .iter()
        .enumerate()
        .map(|(index, spec)| (spec.name.as_str(), index))
        .collect()
}

/// Kahn's algorithm over column-to-column references; ready columns are
/// taken in declaration order.
fn resolution_order(specs: &[ColumnSpec]) -> Result<Vec<usize>, TableError> {
    let index_of = name_index(specs);
    let mut in_degree = vec![0_usize; specs.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); specs.len()];

    for (index, spec) in specs.iter().enumerate() {
        if let ColumnRule::Column { column, .. } = &spec.rule {
            let anchor = *index_of
                .get(column.as_str())
                .ok_or_else(|| TableError::UnknownColumn {
                    column: spec.name.clone(),
                    referenced: column.clone(),
                })?;
            in_degree[index] += 1;
            dependents[anchor].push(index);
        }
    }

    let mut ready = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(index, _)| index)
        .collect::<BTreeSet<_>>();
    let mut order = Vec::with_capacity(specs.len());

    while let Some(index) = ready.pop_first() {
        order.push(index);
        for &dependent in &dependents[index] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() < specs.len() {
        let columns = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree > 0)
            .map(|(index, _)| specs[index].name.clone())
            .collect();
        return Err(TableError::ColumnCycle { columns });
    }

    Ok(order)
}

/// Index of the first column, in declared order, that fully contains the
/// word.
pub(crate) fn determine_column(columns: &[ResolvedColumn], word: &WordBox) -> Option<usize> {
    columns.iter().position(|column| column.contains(word))
}
