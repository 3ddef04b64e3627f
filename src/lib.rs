mod automation;
mod columns;
mod diagnostics;
mod error;
mod header;
mod model;
mod ocr;
mod options;
mod output;
mod phrase;
mod preprocess;
mod reader;
mod rows;
mod table_build;
mod text_match;
mod warning;
mod word_filter;

use tracing::{debug, info};

use crate::columns::resolve_columns;
use crate::header::find_header_row;
use crate::rows::cluster_rows;
use crate::table_build::{TableBounds, build_rows};
use crate::word_filter::filter_detections;

pub use automation::{CapturedImage, Clicker, ScreenCapture, calibrate_rows, find_row, row_locator};
pub use diagnostics::{
    ANNOTATED_IMAGE_NAME, ArtifactSink, DirectorySink, MATCH_IMAGE_NAME, PREPROCESSED_IMAGE_NAME,
    annotate_table, crop_columns, crop_file_name, highlight_match,
};
pub use error::TableError;
pub use model::{ClickPoint, Detection, OutputRow, ResolvedColumn, Row, TextMatch, WordBox};
pub use ocr::{OcrData, OcrEngine, OcrRequest, TesseractCli, parse_tsv};
pub use options::{
    AnchorSide, ColumnRule, ColumnSpec, Margins, OcrOptions, RowGrouping, ScreenOffset,
    TableConfiguration,
};
pub use output::{write_csv, write_csv_to_string, write_json, write_json_to_string};
pub use phrase::{DEFAULT_MAX_VERTICAL_VARIANCE, combine_phrases};
pub use preprocess::{ImageSource, Preprocessor, StandardPreprocessor};
pub use reader::TableReader;
pub use text_match::{MatchMode, find_matching};
pub use warning::{ExtractWarning, WarningCode};

#[derive(Debug, Clone, PartialEq)]
pub struct TableExtraction {
    pub rows: Vec<OutputRow>,
    pub columns: Vec<ResolvedColumn>,
    pub header: Row,
    /// Bottom edge of the header row.
    pub table_top: i32,
    /// Every clustered row, header and body alike.
    pub text_rows: Vec<Row>,
    /// Words that ended up in a cell.
    pub assigned_words: Vec<WordBox>,
    pub warnings: Vec<ExtractWarning>,
}

impl TableExtraction {
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }
}

/// Words kept by the confidence filter, still in processed-image pixels.
#[must_use]
pub fn filter_words(detections: &[Detection], min_confidence: f32) -> Vec<WordBox> {
    filter_detections(detections, min_confidence)
}

/// Runs the table path on words already in original-image coordinates.
pub fn extract_table_from_words(
    words: &[WordBox],
    config: &TableConfiguration,
    table_bottom: i32,
) -> Result<TableExtraction, TableError> {
    config.validate()?;

    let text_rows = cluster_rows(words, config.row_grouping);
    debug!(rows = text_rows.len(), words = words.len(), "clustered words into rows");

    let header = find_header_row(&text_rows, &config.headers)?.clone();
    info!(top = header.top, words = header.words.len(), "found header row");

    let columns = resolve_columns(&header, &config.columns)?;
    let table_top = header
        .words
        .iter()
        .map(|word| word.bottom)
        .max()
        .unwrap_or(header.top);

    let body_start = text_rows.partition_point(|row| row.top < header.top);
    let mut warnings = Vec::new();
    let body = build_rows(
        &text_rows[body_start..],
        TableBounds {
            top: table_top,
            bottom: table_bottom,
        },
        config.margins,
        &columns,
        &mut warnings,
    );
    info!(rows = body.rows.len(), columns = columns.len(), "built table");

    Ok(TableExtraction {
        rows: body.rows,
        assigned_words: body.assigned,
        columns,
        header,
        table_top,
        text_rows,
        warnings,
    })
}

/// Filters raw engine detections, maps them back to original-image
/// coordinates and runs the table path. Without an image height the table
/// bottom is the lowest word.
pub fn extract_table_from_detections(
    detections: &[Detection],
    config: &TableConfiguration,
    image_height: Option<i32>,
) -> Result<TableExtraction, TableError> {
    let zoom_factor = config.ocr.zoom_factor;
    let words = filter_detections(detections, config.ocr.confidence_level)
        .iter()
        .map(|word| word.scaled_down(zoom_factor))
        .collect::<Vec<_>>();

    let low_confidence = detections
        .iter()
        .filter(|detection| {
            !detection.text.trim().is_empty() && detection.confidence < config.ocr.confidence_level
        })
        .count();

    let table_bottom = image_height.unwrap_or_else(|| {
        words
            .iter()
            .map(|word| word.bottom)
            .max()
            .unwrap_or(0)
    });
    debug!(
        detections = detections.len(),
        words = words.len(),
        zoom_factor,
        table_bottom,
        "prepared words"
    );

    let mut extraction = extract_table_from_words(&words, config, table_bottom)?;
    if low_confidence > 0 {
        extraction.warnings.insert(
            0,
            ExtractWarning::new(
                WarningCode::LowConfidenceWords,
                "words below the confidence threshold were dropped",
            )
            .with_count(low_confidence),
        );
    }
    Ok(extraction)
}
