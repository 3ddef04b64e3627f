use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::automation::{Clicker, ScreenCapture, calibrate_rows};
use crate::diagnostics::{
    ANNOTATED_IMAGE_NAME, ArtifactSink, MATCH_IMAGE_NAME, PREPROCESSED_IMAGE_NAME,
    annotate_table, crop_columns, highlight_match,
};
use crate::error::TableError;
use crate::model::{Detection, TextMatch, WordBox};
use crate::ocr::{OcrEngine, OcrRequest};
use crate::options::{OcrOptions, TableConfiguration};
use crate::phrase::{DEFAULT_MAX_VERTICAL_VARIANCE, combine_phrases};
use crate::preprocess::{ImageSource, Preprocessor, StandardPreprocessor};
use crate::text_match::{MatchMode, find_matching};
use crate::word_filter::filter_detections;
use crate::{TableExtraction, extract_table_from_detections};

/// Wires preprocessing, the OCR engine and the optional artifact sink
/// around the table and text-matching paths.
pub struct TableReader<'a> {
    engine: &'a dyn OcrEngine,
    preprocessor: &'a dyn Preprocessor,
    artifacts: Option<&'a dyn ArtifactSink>,
}

impl<'a> TableReader<'a> {
    #[must_use]
    pub fn new(engine: &'a dyn OcrEngine) -> Self {
        Self {
            engine,
            preprocessor: &StandardPreprocessor,
            artifacts: None,
        }
    }

    #[must_use]
    pub fn with_preprocessor(mut self, preprocessor: &'a dyn Preprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    #[must_use]
    pub fn with_artifacts(mut self, artifacts: &'a dyn ArtifactSink) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    fn save_artifact(&self, name: &str, image: &DynamicImage) -> Result<(), TableError> {
        match self.artifacts {
            Some(sink) => sink.save_image(name, image),
            None => Ok(()),
        }
    }

    fn recognize(
        &self,
        image: &DynamicImage,
        options: &OcrOptions,
    ) -> Result<Vec<Detection>, TableError> {
        let processed = self.preprocessor.preprocess(image, options);
        self.save_artifact(PREPROCESSED_IMAGE_NAME, &processed)?;

        let data = self.engine.detect(&processed, &OcrRequest::from(options))?;
        debug!(detections = data.len(), "OCR engine finished");
        data.detections()
    }

    /// Reads the table described by `config` from an image.
    pub fn read_table(
        &self,
        source: impl Into<ImageSource>,
        config: &TableConfiguration,
    ) -> Result<TableExtraction, TableError> {
        config.validate()?;
        let image = source.into().load()?;
        let detections = self.recognize(&image, &config.ocr)?;
        let image_height = i32::try_from(image.height()).unwrap_or(i32::MAX);
        let extraction = extract_table_from_detections(&detections, config, Some(image_height))?;

        if self.artifacts.is_some() {
            let annotated = annotate_table(&image, &extraction, config);
            self.save_artifact(ANNOTATED_IMAGE_NAME, &annotated)?;
            let crops = crop_columns(&image, &extraction.columns, config, extraction.table_top);
            for (name, crop) in crops {
                self.save_artifact(&name, &crop)?;
            }
        }

        Ok(extraction)
    }

    /// Captures a window and reads the table from it; click coordinates in
    /// the result are screen coordinates.
    pub fn read_table_on_screen(
        &self,
        capture: &dyn ScreenCapture,
        locator: &str,
        config: &TableConfiguration,
    ) -> Result<TableExtraction, TableError> {
        let captured = capture.capture(locator)?;
        let mut extraction = self.read_table(captured.image, config)?;
        extraction.rows = calibrate_rows(&extraction.rows, captured.offset);
        Ok(extraction)
    }

    /// Every word (or, with a combination distance, every phrase) on the
    /// image, in original-image coordinates, plus the loaded image.
    pub fn find_texts(
        &self,
        source: impl Into<ImageSource>,
        options: &OcrOptions,
        max_combination_distance: Option<f32>,
    ) -> Result<(Vec<WordBox>, DynamicImage), TableError> {
        let image = source.into().load()?;
        let detections = self.recognize(&image, options)?;
        let words = filter_detections(&detections, options.confidence_level);

        let texts = match max_combination_distance {
            Some(distance) => combine_phrases(
                &words,
                distance,
                DEFAULT_MAX_VERTICAL_VARIANCE,
                options.zoom_factor,
            ),
            None => words
                .iter()
                .map(|word| word.scaled_down(options.zoom_factor))
                .collect(),
        };
        debug!(texts = texts.len(), "collected texts");
        Ok((texts, image))
    }

    /// Finds `search` exactly (case-sensitive) in the captured window and
    /// clicks the first match. Finding nothing is an error here.
    pub fn find_and_click(
        &self,
        capture: &dyn ScreenCapture,
        clicker: &dyn Clicker,
        locator: &str,
        search: &str,
        options: &OcrOptions,
        max_combination_distance: Option<f32>,
    ) -> Result<TextMatch, TableError> {
        let captured = capture.capture(locator)?;
        let (texts, image) = self.find_texts(captured.image, options, max_combination_distance)?;
        let matches = find_matching(&texts, search, MatchMode::Exact, true, captured.offset);

        let Some(found) = matches.into_iter().next() else {
            warn!(search, texts = texts.len(), "text not found");
            return Err(TableError::TextNotFound(search.to_string()));
        };

        info!(text = %found.text, point = %found.point, "clicking text");
        clicker.click(&found.point)?;
        if self.artifacts.is_some() {
            self.save_artifact(MATCH_IMAGE_NAME, &highlight_match(&image, &found.record))?;
        }
        Ok(found)
    }
}
