use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("OCR engine failed: {0}")]
    Ocr(String),

    #[error("malformed OCR data: {0}")]
    MalformedOcrData(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not find header row with texts: {headers:?}")]
    HeaderNotFound { headers: Vec<String> },

    #[error("column '{column}' refers to header text '{header}' which is not in the header row")]
    HeaderWordNotFound { column: String, header: String },

    #[error("column '{column}' refers to unknown column '{referenced}'")]
    UnknownColumn { column: String, referenced: String },

    #[error("column definitions form a cycle: {columns:?}")]
    ColumnCycle { columns: Vec<String> },

    #[error("could not find text: {0}")]
    TextNotFound(String),

    #[error("no row found from the read table with values {0:?}")]
    RowNotFound(Vec<(String, String)>),
}
