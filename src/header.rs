use tracing::debug;

use crate::error::TableError;
use crate::model::Row;

/// Returns the first row containing every header text. Extra words in the
/// row do not disqualify it.
pub(crate) fn find_header_row<'a>(
    rows: &'a [Row],
    headers: &[String],
) -> Result<&'a Row, TableError> {
    for row in rows {
        let texts = row.texts().collect::<Vec<_>>();
        debug!(top = row.top, ?texts, "checking header candidate");
        if headers.iter().all(|header| texts.contains(&header.as_str())) {
            return Ok(row);
        }
    }

    Err(TableError::HeaderNotFound {
        headers: headers.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::find_header_row;
    use crate::error::TableError;
    use crate::model::{Row, WordBox};

    fn row(top: i32, texts: &[&str]) -> Row {
        Row {
            top,
            words: texts
                .iter()
                .enumerate()
                .map(|(index, text)| {
                    let left = i32::try_from(index).expect("small index") * 50;
                    WordBox::new(*text, left, top, 40, 10)
                })
                .collect(),
        }
    }

    fn headers(texts: &[&str]) -> Vec<String> {
        texts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn picks_first_row_containing_all_headers() {
        let rows = vec![
            row(10, &["Statement", "Date"]),
            row(40, &["Payee", "Date", "Amount"]),
            row(70, &["Date", "Payee"]),
        ];
        let header = find_header_row(&rows, &headers(&["Date", "Payee"])).expect("header row");
        assert_eq!(header.top, 40);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let rows = vec![row(10, &["date", "payee"])];
        let err = find_header_row(&rows, &headers(&["Date", "Payee"])).expect_err("no match");
        assert!(matches!(err, TableError::HeaderNotFound { .. }));
    }

    #[test]
    fn reports_missing_headers() {
        let rows = vec![row(10, &["Total", "100"])];
        let err = find_header_row(&rows, &headers(&["Date", "Payee"])).expect_err("no match");
        match err {
            TableError::HeaderNotFound { headers } => assert_eq!(headers, vec!["Date", "Payee"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
