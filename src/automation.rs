use image::DynamicImage;

use crate::error::TableError;
use crate::model::{ClickPoint, OutputRow};
use crate::options::ScreenOffset;

/// A captured window or element together with its top-left screen position.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub image: DynamicImage,
    pub offset: ScreenOffset,
}

pub trait ScreenCapture {
    fn capture(&self, locator: &str) -> Result<CapturedImage, TableError>;
}

pub trait Clicker {
    fn click(&self, point: &ClickPoint) -> Result<(), TableError>;
}

/// First row whose every wanted column holds exactly the wanted text.
pub fn find_row<'a>(
    rows: &'a [OutputRow],
    wanted: &[(&str, &str)],
) -> Result<&'a OutputRow, TableError> {
    rows.iter()
        .find(|row| {
            wanted
                .iter()
                .all(|(column, value)| row.get(column) == Some(*value))
        })
        .ok_or_else(|| {
            TableError::RowNotFound(
                wanted
                    .iter()
                    .map(|(column, value)| ((*column).to_string(), (*value).to_string()))
                    .collect(),
            )
        })
}

/// Locator string (`point:x,y`) for clicking the first matching row.
pub fn row_locator(rows: &[OutputRow], wanted: &[(&str, &str)]) -> Result<String, TableError> {
    Ok(find_row(rows, wanted)?.click_point().to_string())
}

/// Shifts image-relative click coordinates into screen coordinates.
#[must_use]
pub fn calibrate_rows(rows: &[OutputRow], offset: ScreenOffset) -> Vec<OutputRow> {
    rows.iter()
        .map(|row| OutputRow {
            values: row.values.clone(),
            x: row.x + offset.x,
            y: row.y + offset.y,
        })
        .collect()
}
