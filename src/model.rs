use std::fmt::{Display, Formatter};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One raw engine record, in processed-image pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub text: String,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordBox {
    pub text: String,
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub confidence: f32,
}

impl WordBox {
    #[must_use]
    pub fn new(text: impl Into<String>, left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            right: left + width.max(0),
            bottom: top + height.max(0),
            confidence: 100.0,
        }
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    #[must_use]
    pub fn center_x(&self) -> i32 {
        (self.left + self.right) / 2
    }

    #[must_use]
    pub fn center_y(&self) -> i32 {
        (self.top + self.bottom) / 2
    }

    /// Maps processed-image coordinates back to the original image.
    #[must_use]
    pub fn scaled_down(&self, zoom_factor: u32) -> Self {
        let zoom = zoom_factor_as_i32(zoom_factor);
        Self {
            text: self.text.clone(),
            left: self.left / zoom,
            top: self.top / zoom,
            right: self.right / zoom,
            bottom: self.bottom / zoom,
            confidence: self.confidence,
        }
    }
}

pub(crate) fn zoom_factor_as_i32(zoom_factor: u32) -> i32 {
    i32::try_from(zoom_factor.max(1)).unwrap_or(i32::MAX)
}

/// Words judged to sit on the same line, keyed by a representative top.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub top: i32,
    pub words: Vec<WordBox>,
}

impl Row {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(|word| word.text.as_str())
    }

    #[must_use]
    pub fn find_word(&self, text: &str) -> Option<&WordBox> {
        self.words.iter().find(|word| word.text == text)
    }

    /// `(left, top, right, bottom)` over every word of the row.
    #[must_use]
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        let first = self.words.first()?;
        let init = (first.left, first.top, first.right, first.bottom);
        Some(self.words.iter().fold(init, |(l, t, r, b), word| {
            (
                l.min(word.left),
                t.min(word.top),
                r.max(word.right),
                b.max(word.bottom),
            )
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub name: String,
    pub left: i32,
    pub width: i32,
}

impl ResolvedColumn {
    #[must_use]
    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    #[must_use]
    pub fn contains(&self, word: &WordBox) -> bool {
        word.left >= self.left && word.right <= self.right()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub values: Vec<(String, String)>,
    pub x: i32,
    pub y: i32,
}

impl OutputRow {
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn click_point(&self) -> ClickPoint {
        ClickPoint {
            x: self.x,
            y: self.y,
        }
    }
}

impl Serialize for OutputRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 2))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry("x", &self.x)?;
        map.serialize_entry("y", &self.y)?;
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClickPoint {
    pub x: i32,
    pub y: i32,
}

impl Display for ClickPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "point:{},{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextMatch {
    pub text: String,
    pub point: ClickPoint,
    pub record: WordBox,
}
