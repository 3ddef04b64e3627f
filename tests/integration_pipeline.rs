mod common;

use std::process::Command;

use image::{DynamicImage, Rgba, RgbaImage};
use ocr_table::{
    ANNOTATED_IMAGE_NAME, CapturedImage, Detection, DirectorySink, OcrData, OcrEngine,
    OcrRequest, PREPROCESSED_IMAGE_NAME, ScreenCapture, ScreenOffset, TableConfiguration,
    TableError, TableReader, find_row,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

struct FixedEngine(Vec<Detection>);

impl OcrEngine for FixedEngine {
    fn detect(&self, _image: &DynamicImage, _request: &OcrRequest) -> Result<OcrData, TableError> {
        Ok(self.0.iter().cloned().collect())
    }
}

struct StatementWindow;

impl ScreenCapture for StatementWindow {
    fn capture(&self, _locator: &str) -> Result<CapturedImage, TableError> {
        Ok(CapturedImage {
            image: blank_page(),
            offset: ScreenOffset::new(300, 20),
        })
    }
}

fn blank_page() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(200, 200, Rgba([255, 255, 255, 255])))
}

fn statement_config(zoom: u32) -> TableConfiguration {
    serde_json::from_str(&common::statement_config_json(zoom)).expect("config should parse")
}

#[test]
fn reads_table_and_writes_diagnostics() {
    let dir = tempdir().expect("tempdir should be created");
    let sink = DirectorySink::new(dir.path().join("artifacts")).expect("sink should be created");
    let engine = FixedEngine(common::statement_detections(2));
    let reader = TableReader::new(&engine).with_artifacts(&sink);

    let extraction = reader
        .read_table(blank_page(), &statement_config(2))
        .expect("table should be read");

    assert_eq!(extraction.rows.len(), 1);
    let row = &extraction.rows[0];
    assert_eq!(row.get("Date"), Some("1/1/2024"));
    assert_eq!(row.get("Payee"), Some("Acme Corp"));
    assert_eq!((row.x, row.y), (83, 136));

    for name in [PREPROCESSED_IMAGE_NAME, ANNOTATED_IMAGE_NAME, "column_payee.png"] {
        assert!(sink.root().join(name).exists(), "missing artifact {name}");
    }
    assert!(!sink.root().join("column_date.png").exists());
}

#[test]
fn on_screen_rows_carry_screen_coordinates() {
    let engine = FixedEngine(common::statement_detections(2));
    let reader = TableReader::new(&engine);

    let extraction = reader
        .read_table_on_screen(&StatementWindow, "statement", &statement_config(2))
        .expect("table should be read");

    let row = find_row(&extraction.rows, &[("Payee", "Acme Corp")]).expect("row should exist");
    assert_eq!(row.click_point().to_string(), "point:383,156");
}

#[test]
fn configuration_file_round_trips_through_reader() {
    let dir = tempdir().expect("tempdir should be created");
    let path = common::write_fixture(dir.path(), "config.json", &common::statement_config_json(1));
    let config = TableConfiguration::from_json_file(&path).expect("config should load");
    let engine = FixedEngine(common::statement_detections(1));

    let extraction = TableReader::new(&engine)
        .read_table(blank_page(), &config)
        .expect("table should be read");
    assert_eq!(extraction.column_names(), vec!["Date", "Payee"]);
    assert_eq!(extraction.table_top, 112);
}

#[test]
fn cli_extracts_tsv_to_json_and_csv() {
    let dir = tempdir().expect("tempdir should be created");
    let tsv = common::write_fixture(
        dir.path(),
        "words.tsv",
        &common::tsv_document(&common::statement_detections(1)),
    );
    let config = common::write_fixture(dir.path(), "config.json", &common::statement_config_json(1));
    let json = dir.path().join("table.json");
    let csv = dir.path().join("table.csv");

    let status = Command::new(env!("CARGO_BIN_EXE_ocr-table"))
        .args([
            "extract",
            "--config",
            &config.to_string_lossy(),
            "--tsv",
            &tsv.to_string_lossy(),
            "-o",
            &json.to_string_lossy(),
            "--csv",
            &csv.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");
    assert_eq!(status.code(), Some(0));

    let json = std::fs::read_to_string(&json).expect("JSON should be readable");
    assert_eq!(
        json,
        "[\n    {\n        \"Date\": \"1/1/2024\",\n        \"Payee\": \"Acme Corp\",\n        \"x\": 83,\n        \"y\": 136\n    }\n]"
    );
    let csv = std::fs::read_to_string(&csv).expect("CSV should be readable");
    assert_eq!(csv, "Date,Payee,x,y\n1/1/2024,Acme Corp,83,136\n");
}

#[test]
fn cli_exits_with_code_2_when_no_rows() {
    let dir = tempdir().expect("tempdir should be created");
    let header_only = common::statement_detections(1)
        .into_iter()
        .take(2)
        .collect::<Vec<_>>();
    let tsv = common::write_fixture(dir.path(), "header.tsv", &common::tsv_document(&header_only));
    let config = common::write_fixture(dir.path(), "config.json", &common::statement_config_json(1));

    let status = Command::new(env!("CARGO_BIN_EXE_ocr-table"))
        .args([
            "extract",
            "--config",
            &config.to_string_lossy(),
            "--tsv",
            &tsv.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(2));
}

#[test]
fn cli_exits_with_code_1_when_header_is_missing() {
    let dir = tempdir().expect("tempdir should be created");
    let body_only = common::statement_detections(1)
        .into_iter()
        .skip(2)
        .collect::<Vec<_>>();
    let tsv = common::write_fixture(dir.path(), "body.tsv", &common::tsv_document(&body_only));
    let config = common::write_fixture(dir.path(), "config.json", &common::statement_config_json(1));

    let output = Command::new(env!("CARGO_BIN_EXE_ocr-table"))
        .args([
            "extract",
            "--config",
            &config.to_string_lossy(),
            "--tsv",
            &tsv.to_string_lossy(),
        ])
        .output()
        .expect("CLI should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("header"), "unexpected stderr: {stderr}");
}

#[test]
fn cli_finds_words_and_phrases() {
    let dir = tempdir().expect("tempdir should be created");
    let tsv = common::write_fixture(
        dir.path(),
        "words.tsv",
        &common::tsv_document(&common::statement_detections(1)),
    );

    let word = Command::new(env!("CARGO_BIN_EXE_ocr-table"))
        .args([
            "find",
            "--tsv",
            &tsv.to_string_lossy(),
            "--zoom",
            "1",
            "--text",
            "corp",
            "--ignore-case",
            "--offset",
            "100,50",
        ])
        .output()
        .expect("CLI should run");
    assert_eq!(word.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&word.stdout), "point:232,186\tCorp\n");

    let phrase = Command::new(env!("CARGO_BIN_EXE_ocr-table"))
        .args([
            "find",
            "--tsv",
            &tsv.to_string_lossy(),
            "--zoom",
            "1",
            "--text",
            "Acme Corp",
            "--combine",
            "10",
        ])
        .output()
        .expect("CLI should run");
    assert_eq!(phrase.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&phrase.stdout), "point:110,136\tAcme Corp\n");
}

#[test]
fn cli_find_exits_with_code_2_without_match() {
    let dir = tempdir().expect("tempdir should be created");
    let tsv = common::write_fixture(
        dir.path(),
        "words.tsv",
        &common::tsv_document(&common::statement_detections(1)),
    );

    let status = Command::new(env!("CARGO_BIN_EXE_ocr-table"))
        .args(["find", "--tsv", &tsv.to_string_lossy(), "--text", "Total"])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(2));
}
