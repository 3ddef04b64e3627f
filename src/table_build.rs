use tracing::debug;

use crate::columns::determine_column;
use crate::model::{OutputRow, ResolvedColumn, Row, WordBox};
use crate::options::Margins;
use crate::warning::{ExtractWarning, WarningCode};

/// Vertical extent of the table body: the header row's bottom edge and the
/// bottom edge of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TableBounds {
    pub top: i32,
    pub bottom: i32,
}

#[derive(Debug, Default)]
pub(crate) struct TableBody {
    pub rows: Vec<OutputRow>,
    /// Words placed into a cell, in row then left-to-right order.
    pub assigned: Vec<WordBox>,
}

pub(crate) fn build_rows(
    rows: &[Row],
    bounds: TableBounds,
    margins: Margins,
    columns: &[ResolvedColumn],
    warnings: &mut Vec<ExtractWarning>,
) -> TableBody {
    let body_top = bounds.top + margins.top;
    let body_bottom = bounds.bottom + margins.bottom;
    let mut body = TableBody::default();

    for row in rows {
        if row.top < body_top {
            debug!(top = row.top, "row is inside the header band");
            continue;
        }

        let mut cells: Vec<Option<String>> = vec![None; columns.len()];
        for word in &row.words {
            if word.top < body_top {
                continue;
            }
            if word.bottom > body_bottom {
                warnings.push(
                    ExtractWarning::new(
                        WarningCode::RowTruncated,
                        "word crosses the table bottom; skipping the rest of the row",
                    )
                    .with_row_top(row.top)
                    .with_text(&word.text),
                );
                break;
            }

            let Some(index) = determine_column(columns, word) else {
                debug!(text = %word.text, left = word.left, "word fits no column");
                warnings.push(
                    ExtractWarning::new(WarningCode::UnassignedWord, "word fits no column")
                        .with_row_top(row.top)
                        .with_text(&word.text),
                );
                continue;
            };

            match cells[index].as_mut() {
                Some(text) => {
                    text.push(' ');
                    text.push_str(&word.text);
                }
                None => cells[index] = Some(word.text.clone()),
            }
            body.assigned.push(word.clone());
        }

        if cells.iter().all(Option::is_none) {
            warnings.push(
                ExtractWarning::new(WarningCode::EmptyRowDropped, "row has no column values")
                    .with_row_top(row.top),
            );
            continue;
        }

        let Some((left, top, right, bottom)) = row.bounds() else {
            continue;
        };
        let values = columns
            .iter()
            .zip(cells)
            .map(|(column, cell)| (column.name.clone(), cell.unwrap_or_default()))
            .collect();
        body.rows.push(OutputRow {
            values,
            x: (left + right) / 2,
            y: (top + bottom) / 2,
        });
    }

    body
}
