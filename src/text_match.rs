use serde::{Deserialize, Serialize};

use crate::model::{ClickPoint, TextMatch, WordBox};
use crate::options::ScreenOffset;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Exact,
    Substring,
}

/// Every record whose text matches `search`, in input order. No match is an
/// empty result, not an error.
#[must_use]
pub fn find_matching(
    records: &[WordBox],
    search: &str,
    mode: MatchMode,
    case_sensitive: bool,
    offset: ScreenOffset,
) -> Vec<TextMatch> {
    let normalize = |text: &str| {
        if case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        }
    };
    let search = normalize(search);

    records
        .iter()
        .filter(|record| {
            let text = normalize(record.text.trim());
            match mode {
                MatchMode::Exact => text == search,
                MatchMode::Substring => text.contains(&search),
            }
        })
        .map(|record| TextMatch {
            text: record.text.clone(),
            point: ClickPoint {
                x: record.center_x() + offset.x,
                y: record.center_y() + offset.y,
            },
            record: record.clone(),
        })
        .collect()
}
