use crate::model::{WordBox, zoom_factor_as_i32};

pub const DEFAULT_MAX_VERTICAL_VARIANCE: i32 = 5;

struct OpenPhrase {
    text: String,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    confidence: f32,
    last_right: i32,
}

impl OpenPhrase {
    fn start(word: &WordBox) -> Self {
        Self {
            text: word.text.clone(),
            left: word.left,
            top: word.top,
            right: word.right,
            bottom: word.bottom,
            confidence: word.confidence,
            last_right: word.right,
        }
    }

    fn extend(&mut self, word: &WordBox) {
        self.text.push(' ');
        self.text.push_str(&word.text);
        self.right = self.right.max(word.right);
        self.bottom = self.bottom.max(word.bottom);
        self.confidence = self.confidence.min(word.confidence);
        self.last_right = word.right;
    }

    fn finish(self, zoom: i32) -> WordBox {
        WordBox {
            text: self.text,
            left: self.left / zoom,
            top: self.top / zoom,
            right: self.right / zoom,
            bottom: self.bottom / zoom,
            confidence: self.confidence,
        }
    }
}

/// Merges consecutive processed-image words into phrases. A word joins the
/// open phrase when it starts on roughly the same line as the phrase and
/// close enough (in original-image pixels) after the previous word. The
/// returned phrases are in original-image coordinates.
#[must_use]
pub fn combine_phrases(
    words: &[WordBox],
    max_combination_distance: f32,
    max_vertical_variance: i32,
    zoom_factor: u32,
) -> Vec<WordBox> {
    let zoom = zoom_factor_as_i32(zoom_factor);
    let zoom_f = zoom_factor.max(1) as f32;
    let vertical_limit = max_vertical_variance.saturating_mul(zoom);
    let mut phrases = Vec::new();
    let mut open: Option<OpenPhrase> = None;

    for word in words {
        let joins = open.as_ref().is_some_and(|phrase| {
            (word.top - phrase.top).abs() <= vertical_limit
                && (word.left - phrase.last_right) as f32 / zoom_f <= max_combination_distance
        });

        if joins {
            if let Some(phrase) = open.as_mut() {
                phrase.extend(word);
            }
        } else if let Some(done) = open.replace(OpenPhrase::start(word)) {
            phrases.push(done.finish(zoom));
        }
    }

    if let Some(done) = open {
        phrases.push(done.finish(zoom));
    }
    phrases
}
