use std::io::{Cursor, ErrorKind, Write};
use std::process::{Command, Stdio};

use csv::ReaderBuilder;
use image::{DynamicImage, ImageFormat};
use serde::Deserialize;
use tracing::debug;

use crate::error::TableError;
use crate::model::Detection;
use crate::options::OcrOptions;

/// Engine parameters taken from [`OcrOptions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrRequest {
    pub engine_mode: u8,
    pub page_segmentation_mode: u8,
    pub extra_options: String,
    pub language: String,
}

impl From<&OcrOptions> for OcrRequest {
    fn from(options: &OcrOptions) -> Self {
        Self {
            engine_mode: options.engine_mode,
            page_segmentation_mode: options.page_segmentation_mode,
            extra_options: options.extra_options.clone(),
            language: options.language.clone(),
        }
    }
}

/// Index-aligned arrays as emitted by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrData {
    pub text: Vec<String>,
    pub left: Vec<i32>,
    pub top: Vec<i32>,
    pub width: Vec<i32>,
    pub height: Vec<i32>,
    pub confidence: Vec<f32>,
}

impl OcrData {
    pub fn push(&mut self, detection: Detection) {
        self.text.push(detection.text);
        self.left.push(detection.left);
        self.top.push(detection.top);
        self.width.push(detection.width);
        self.height.push(detection.height);
        self.confidence.push(detection.confidence);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn detections(&self) -> Result<Vec<Detection>, TableError> {
        let len = self.text.len();
        let lengths = [
            self.left.len(),
            self.top.len(),
            self.width.len(),
            self.height.len(),
            self.confidence.len(),
        ];
        if lengths.iter().any(|&other| other != len) {
            return Err(TableError::MalformedOcrData(format!(
                "array lengths differ: text={len}, left/top/width/height/confidence={lengths:?}"
            )));
        }

        Ok((0..len)
            .map(|index| Detection {
                text: self.text[index].clone(),
                left: self.left[index],
                top: self.top[index],
                width: self.width[index],
                height: self.height[index],
                confidence: self.confidence[index],
            })
            .collect())
    }
}

impl FromIterator<Detection> for OcrData {
    fn from_iter<T: IntoIterator<Item = Detection>>(iter: T) -> Self {
        let mut data = Self::default();
        for detection in iter {
            data.push(detection);
        }
        data
    }
}

pub trait OcrEngine {
    fn detect(&self, image: &DynamicImage, request: &OcrRequest) -> Result<OcrData, TableError>;
}

#[derive(Debug, Deserialize)]
struct TsvRecord {
    left: i32,
    top: i32,
    width: i32,
    height: i32,
    conf: f32,
    #[serde(default)]
    text: String,
}

/// Parses Tesseract's `tsv` output. Rows above word level carry a
/// confidence of -1 and no text; they are kept and left to the word filter.
pub fn parse_tsv(tsv: &str) -> Result<OcrData, TableError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(tsv.as_bytes());

    let mut data = OcrData::default();
    for record in reader.deserialize::<TsvRecord>() {
        let record = record?;
        data.push(Detection {
            text: record.text,
            left: record.left,
            top: record.top,
            width: record.width,
            height: record.height,
            confidence: record.conf,
        });
    }
    Ok(data)
}

/// Runs the `tesseract` executable, feeding the image as PNG on stdin.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: String,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self {
            program: "tesseract".to_string(),
        }
    }
}

impl TesseractCli {
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn arguments(request: &OcrRequest) -> Vec<String> {
        let mut args = vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "--oem".to_string(),
            request.engine_mode.to_string(),
            "--psm".to_string(),
            request.page_segmentation_mode.to_string(),
            "-l".to_string(),
            request.language.clone(),
        ];
        args.extend(request.extra_options.split_whitespace().map(str::to_string));
        args.push("tsv".to_string());
        args
    }
}

impl OcrEngine for TesseractCli {
    fn detect(&self, image: &DynamicImage, request: &OcrRequest) -> Result<OcrData, TableError> {
        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, ImageFormat::Png)?;

        let args = Self::arguments(request);
        debug!(program = %self.program, ?args, "running OCR engine");
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| TableError::Ocr(format!("failed to start {}: {error}", self.program)))?;

        // stdin is closed before waiting; the engine may exit without reading it
        let written = child
            .stdin
            .take()
            .map_or(Ok(()), |mut stdin| stdin.write_all(png.get_ref()));
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(TableError::Ocr(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        written.or_else(|error| match error.kind() {
            ErrorKind::BrokenPipe => Ok(()),
            _ => Err(error),
        })?;

        let tsv = String::from_utf8_lossy(&output.stdout);
        parse_tsv(&tsv)
    }
}
