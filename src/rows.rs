use crate::model::{Row, WordBox};
use crate::options::RowGrouping;

/// Groups words into rows. A word joins the first row (in creation order)
/// whose key is within tolerance of the word's adjusted top. The key never
/// moves, so one row may hold words up to twice the tolerance apart.
pub(crate) fn cluster_rows(words: &[WordBox], grouping: RowGrouping) -> Vec<Row> {
    let mut buckets: Vec<Row> = Vec::new();

    for word in words {
        let adjusted_top = word.top + grouping.top_offset;
        match buckets
            .iter_mut()
            .find(|row| (adjusted_top - row.top).abs() <= grouping.tolerance)
        {
            Some(row) => row.words.push(word.clone()),
            None => buckets.push(Row {
                top: adjusted_top,
                words: vec![word.clone()],
            }),
        }
    }

    for row in &mut buckets {
        row.words.sort_by_key(|word| word.left);
    }
    buckets.sort_by_key(|row| row.top);
    buckets
}
