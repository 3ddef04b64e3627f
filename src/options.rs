use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

pub const DEFAULT_ROW_TOLERANCE: i32 = 8;
pub const DEFAULT_ROW_TOP_OFFSET: i32 = -4;

/// Parameters for preprocessing and for the OCR engine itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrOptions {
    pub engine_mode: u8,
    pub page_segmentation_mode: u8,
    /// Extra engine arguments, e.g. `-c preserve_interword_spaces=1`.
    pub extra_options: String,
    pub language: String,
    pub zoom_factor: u32,
    pub brightness: f32,
    pub contrast: f32,
    pub confidence_level: f32,
    /// Binarization threshold; zero or negative disables binarization.
    pub threshold: i32,
    pub invert_colors: bool,
    pub sharpen: bool,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            engine_mode: 3,
            page_segmentation_mode: 6,
            extra_options: String::new(),
            language: "eng".to_string(),
            zoom_factor: 8,
            brightness: 1.4,
            contrast: 1.2,
            confidence_level: 40.0,
            threshold: 190,
            invert_colors: false,
            sharpen: false,
        }
    }
}

impl OcrOptions {
    #[must_use]
    pub fn with_zoom_factor(mut self, zoom_factor: u32) -> Self {
        self.zoom_factor = zoom_factor;
        self
    }

    #[must_use]
    pub fn with_confidence_level(mut self, confidence_level: f32) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    #[must_use]
    pub fn with_extra_options(mut self, extra_options: impl Into<String>) -> Self {
        self.extra_options = extra_options.into();
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: i32) -> Self {
        self.threshold = threshold;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSide {
    Left,
    #[default]
    Right,
}

/// How a column's left edge is found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnRule {
    Fixed {
        position: i32,
    },
    HeaderWord {
        header: String,
        #[serde(default)]
        offset: i32,
    },
    Column {
        column: String,
        #[serde(default)]
        side: AnchorSide,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub rule: ColumnRule,
    pub width: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: i32,
    pub bottom: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowGrouping {
    pub tolerance: i32,
    pub top_offset: i32,
}

impl Default for RowGrouping {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_ROW_TOLERANCE,
            top_offset: DEFAULT_ROW_TOP_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfiguration {
    #[serde(flatten)]
    pub ocr: OcrOptions,
    pub headers: Vec<String>,
    pub margins: Margins,
    pub columns: Vec<ColumnSpec>,
    pub row_grouping: RowGrouping,
    /// Columns drawn on the diagnostic image; empty means all.
    pub column_highlights: Vec<String>,
    pub columns_to_crop: Vec<String>,
}

impl TableConfiguration {
    #[must_use]
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, TableError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    #[must_use]
    pub fn with_ocr(mut self, ocr: OcrOptions) -> Self {
        self.ocr = ocr;
        self
    }

    #[must_use]
    pub fn with_margins(mut self, top: i32, bottom: i32) -> Self {
        self.margins = Margins { top, bottom };
        self
    }

    #[must_use]
    pub fn with_row_grouping(mut self, tolerance: i32, top_offset: i32) -> Self {
        self.row_grouping = RowGrouping {
            tolerance,
            top_offset,
        };
        self
    }

    /// Adds or replaces a column, keeping the position of a replaced one.
    #[must_use]
    pub fn with_rule(mut self, name: impl Into<String>, rule: ColumnRule, width: i32) -> Self {
        let spec = ColumnSpec {
            name: name.into(),
            rule,
            width,
        };
        match self.columns.iter_mut().find(|column| column.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.columns.push(spec),
        }
        self
    }

    /// Column anchored to the header word carrying the column's own name.
    #[must_use]
    pub fn with_column(self, name: impl Into<String>, offset: i32, width: i32) -> Self {
        let name = name.into();
        let rule = ColumnRule::HeaderWord {
            header: name.clone(),
            offset,
        };
        self.with_rule(name, rule, width)
    }

    #[must_use]
    pub fn with_fixed_column(self, name: impl Into<String>, position: i32, width: i32) -> Self {
        self.with_rule(name, ColumnRule::Fixed { position }, width)
    }

    #[must_use]
    pub fn with_inherited_column(
        self,
        name: impl Into<String>,
        inherited: impl Into<String>,
        width: i32,
        side: AnchorSide,
    ) -> Self {
        let rule = ColumnRule::Column {
            column: inherited.into(),
            side,
        };
        self.with_rule(name, rule, width)
    }

    #[must_use]
    pub fn without_column(mut self, name: &str) -> Self {
        self.columns.retain(|column| column.name != name);
        self
    }

    #[must_use]
    pub fn with_highlights<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_highlights = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_crops<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns_to_crop = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if self.headers.is_empty() {
            return Err(TableError::InvalidConfig(
                "at least one header text is required".to_string(),
            ));
        }
        if self.ocr.zoom_factor == 0 {
            return Err(TableError::InvalidConfig(
                "zoom_factor must be at least 1".to_string(),
            ));
        }
        if self.row_grouping.tolerance < 0 {
            return Err(TableError::InvalidConfig(
                "row tolerance cannot be negative".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.name == "x" || column.name == "y" {
                return Err(TableError::InvalidConfig(format!(
                    "column name '{}' is reserved for click coordinates",
                    column.name
                )));
            }
            if column.width <= 0 {
                return Err(TableError::InvalidConfig(format!(
                    "column '{}' must have a positive width",
                    column.name
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::InvalidConfig(format!(
                    "column '{}' is defined more than once",
                    column.name
                )));
            }
        }

        Ok(())
    }
}

/// Top-left corner of the captured region in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenOffset {
    pub x: i32,
    pub y: i32,
}

impl ScreenOffset {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl FromStr for ScreenOffset {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (x, y) = spec
            .split_once(',')
            .ok_or_else(|| format!("invalid offset '{spec}', expected x,y"))?;
        let x: i32 = x
            .trim()
            .parse()
            .map_err(|_| format!("invalid x offset: '{x}'"))?;
        let y: i32 = y
            .trim()
            .parse()
            .map_err(|_| format!("invalid y offset: '{y}'"))?;
        Ok(Self { x, y })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::{AnchorSide, ColumnRule, ColumnSpec, ScreenOffset, TableConfiguration};
    use crate::error::TableError;

    #[test]
    fn builders_return_new_values_and_keep_original() {
        let base = TableConfiguration::new(["Date", "Payee"]).with_column("Date", 0, 40);
        let variant = base.clone().with_margins(5, -10).with_column("Payee", 0, 100);

        assert_eq!(base.columns.len(), 1);
        assert_eq!(variant.columns.len(), 2);
        assert_eq!(variant.margins.top, 5);
        assert_eq!(variant.margins.bottom, -10);
        assert_eq!(base.clone(), base);
    }

    #[test]
    fn replacing_a_column_keeps_declared_position() {
        let config = TableConfiguration::new(["A"])
            .with_fixed_column("A", 0, 10)
            .with_fixed_column("B", 10, 10)
            .with_fixed_column("A", 5, 20)
            .without_column("B");

        assert_eq!(
            config.columns,
            vec![ColumnSpec {
                name: "A".to_string(),
                rule: ColumnRule::Fixed { position: 5 },
                width: 20,
            }]
        );
    }

    #[test]
    fn parses_json_configuration_with_defaults() {
        let json = r#"{
            "headers": ["Date", "Amount"],
            "zoom_factor": 4,
            "margins": { "top": 2 },
            "columns": [
                { "name": "Date", "rule": { "kind": "header_word", "header": "Date", "offset": -3 }, "width": 60 },
                { "name": "Amount", "rule": { "kind": "column", "column": "Date" }, "width": 80 },
                { "name": "Id", "rule": { "kind": "fixed", "position": 0 }, "width": 10 }
            ]
        }"#;

        let config: TableConfiguration = serde_json::from_str(json).expect("config should parse");
        assert_eq!(config.ocr.zoom_factor, 4);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.margins.top, 2);
        assert_eq!(config.margins.bottom, 0);
        assert_eq!(config.row_grouping.tolerance, 8);
        assert_eq!(
            config.columns[1].rule,
            ColumnRule::Column {
                column: "Date".to_string(),
                side: AnchorSide::Right,
            }
        );
        config.validate().expect("config should be valid");
    }

    #[test]
    fn rejects_reserved_and_duplicate_column_names() {
        let reserved = TableConfiguration::new(["A"]).with_fixed_column("x", 0, 10);
        assert!(matches!(
            reserved.validate(),
            Err(TableError::InvalidConfig(message)) if message.contains("reserved")
        ));

        let mut duplicate = TableConfiguration::new(["A"]).with_fixed_column("A", 0, 10);
        duplicate.columns.push(duplicate.columns[0].clone());
        assert!(matches!(
            duplicate.validate(),
            Err(TableError::InvalidConfig(message)) if message.contains("more than once")
        ));
    }

    #[test]
    fn rejects_missing_headers() {
        let err = TableConfiguration::default()
            .validate()
            .expect_err("empty headers should fail");
        assert!(matches!(err, TableError::InvalidConfig(_)));
    }

    #[test]
    fn parses_screen_offset() {
        let offset = ScreenOffset::from_str("120, -4").expect("offset should parse");
        assert_eq!(offset, ScreenOffset::new(120, -4));

        let err = ScreenOffset::from_str("12").expect_err("missing y should fail");
        assert!(err.contains("expected x,y"));
    }
}
