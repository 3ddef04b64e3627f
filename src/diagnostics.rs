use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgba, RgbaImage, imageops};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;
use tracing::debug;

use crate::TableExtraction;
use crate::error::TableError;
use crate::model::{ResolvedColumn, WordBox};
use crate::options::TableConfiguration;

pub const PREPROCESSED_IMAGE_NAME: &str = "preprocessed_image_for_tesseract.png";
pub const ANNOTATED_IMAGE_NAME: &str = "table_rows_and_columns_identified.png";
pub const MATCH_IMAGE_NAME: &str = "text_match_identified.png";

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const PINK: Rgba<u8> = Rgba([255, 192, 203, 128]);
const LIGHT_BLUE: Rgba<u8> = Rgba([173, 216, 230, 128]);
const DOT_RADIUS: i32 = 3;
const MATCH_PADDING: i32 = 5;

/// Destination for diagnostic images, addressed by file name.
pub trait ArtifactSink {
    fn save_image(&self, name: &str, image: &DynamicImage) -> Result<(), TableError>;
}

#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, TableError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactSink for DirectorySink {
    fn save_image(&self, name: &str, image: &DynamicImage) -> Result<(), TableError> {
        let path = self.root.join(name);
        debug!(path = %path.display(), "saving artifact");
        image.save(path)?;
        Ok(())
    }
}

#[must_use]
pub fn crop_file_name(column: &str) -> String {
    format!("column_{}.png", column.to_lowercase())
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Draws translucent bands for the highlighted columns between the table
/// top and the image bottom, a red line at every row's key and a dot on
/// every word that was placed into a cell.
#[must_use]
pub fn annotate_table(
    image: &DynamicImage,
    extraction: &TableExtraction,
    config: &TableConfiguration,
) -> DynamicImage {
    let (columns, table_top) = (&extraction.columns, extraction.table_top);
    let mut canvas = image.to_rgba8();
    let table_bottom = to_i32(canvas.height());

    let mut overlay = RgbaImage::new(canvas.width(), canvas.height());
    let band_height = table_bottom - table_top;
    for (index, column) in columns.iter().enumerate() {
        let highlighted = config.column_highlights.is_empty()
            || config.column_highlights.contains(&column.name);
        if !highlighted || band_height <= 0 || column.width <= 0 {
            continue;
        }

        let fill = if index % 2 == 0 { LIGHT_BLUE } else { PINK };
        let band = Rect::at(column.left, table_top)
            .of_size(column.width.unsigned_abs(), band_height.unsigned_abs());
        draw_filled_rect_mut(&mut overlay, band, fill);

        let (top, bottom) = (table_top as f32, table_bottom as f32);
        for x in [column.left, column.right()] {
            draw_line_segment_mut(&mut overlay, (x as f32, top), (x as f32, bottom), RED);
        }
    }
    imageops::overlay(&mut canvas, &overlay, 0, 0);

    for row in &extraction.text_rows {
        if let Some((left, _, right, _)) = row.bounds() {
            let y = row.top as f32;
            draw_line_segment_mut(&mut canvas, (left as f32, y), (right as f32, y), RED);
        }
    }

    for word in &extraction.assigned_words {
        draw_filled_circle_mut(
            &mut canvas,
            (word.center_x(), word.center_y()),
            DOT_RADIUS,
            BLACK,
        );
    }

    DynamicImage::ImageRgba8(canvas)
}

/// Frames a matched word or phrase in red.
#[must_use]
pub fn highlight_match(image: &DynamicImage, record: &WordBox) -> DynamicImage {
    let mut canvas = image.to_rgba8();
    let width = record.width() + 2 * MATCH_PADDING;
    let height = record.height() + 2 * MATCH_PADDING;
    let frame = Rect::at(record.left - MATCH_PADDING, record.top - MATCH_PADDING)
        .of_size(width.max(1).unsigned_abs(), height.max(1).unsigned_abs());
    draw_hollow_rect_mut(&mut canvas, frame, RED);
    DynamicImage::ImageRgba8(canvas)
}

/// Cuts the body of each configured column out of the original image.
#[must_use]
pub fn crop_columns(
    image: &DynamicImage,
    columns: &[ResolvedColumn],
    config: &TableConfiguration,
    table_top: i32,
) -> Vec<(String, DynamicImage)> {
    let (width, height) = (to_i32(image.width()), to_i32(image.height()));

    columns
        .iter()
        .filter(|column| config.columns_to_crop.contains(&column.name))
        .filter_map(|column| {
            let left = column.left.clamp(0, width);
            let right = column.right().clamp(0, width);
            let top = table_top.clamp(0, height);
            if right <= left || height <= top {
                debug!(column = %column.name, "column lies outside the image; nothing to crop");
                return None;
            }
            let crop = image.crop_imm(
                left.unsigned_abs(),
                top.unsigned_abs(),
                (right - left).unsigned_abs(),
                (height - top).unsigned_abs(),
            );
            Some((crop_file_name(&column.name), crop))
        })
        .collect()
}
