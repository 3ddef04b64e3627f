#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use ocr_table::Detection;

pub const TSV_HEADER: &str =
    "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

/// `(text, left, top, width, height)` of a small bank statement, in
/// original-image pixels.
pub const STATEMENT: &[(&str, i32, i32, i32, i32)] = &[
    ("Date", 10, 100, 40, 12),
    ("Payee", 60, 100, 100, 12),
    ("1/1/2024", 12, 130, 38, 12),
    ("Acme", 65, 130, 40, 12),
    ("Corp", 110, 130, 45, 12),
];

pub fn statement_detections(zoom: i32) -> Vec<Detection> {
    STATEMENT
        .iter()
        .map(|&(text, left, top, width, height)| Detection {
            text: text.to_string(),
            left: left * zoom,
            top: top * zoom,
            width: width * zoom,
            height: height * zoom,
            confidence: 90.0,
        })
        .collect()
}

/// Renders detections the way `tesseract ... tsv` prints them, starting
/// with a page-level record that has no text.
pub fn tsv_document(detections: &[Detection]) -> String {
    let mut tsv = format!("{TSV_HEADER}\n1\t1\t0\t0\t0\t0\t0\t0\t2000\t2000\t-1\t\n");
    for (index, detection) in detections.iter().enumerate() {
        let _ = writeln!(
            tsv,
            "5\t1\t1\t1\t1\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            index + 1,
            detection.left,
            detection.top,
            detection.width,
            detection.height,
            detection.confidence,
            detection.text
        );
    }
    tsv
}

pub fn statement_config_json(zoom: u32) -> String {
    format!(
        r#"{{
    "zoom_factor": {zoom},
    "headers": ["Date", "Payee"],
    "columns": [
        {{"name": "Date", "rule": {{"kind": "header_word", "header": "Date"}}, "width": 40}},
        {{"name": "Payee", "rule": {{"kind": "header_word", "header": "Payee"}}, "width": 100}}
    ],
    "columns_to_crop": ["Payee"]
}}"#
    )
}

pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("fixture should be written");
    path
}
