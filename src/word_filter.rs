use crate::model::{Detection, WordBox};

pub(crate) fn filter_detections(detections: &[Detection], min_confidence: f32) -> Vec<WordBox> {
    detections
        .iter()
        .filter_map(|detection| {
            let text = detection.text.trim();
            if text.is_empty() || detection.confidence < min_confidence {
                return None;
            }
            Some(
                WordBox::new(
                    text,
                    detection.left,
                    detection.top,
                    detection.width,
                    detection.height,
                )
                .with_confidence(detection.confidence),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::filter_detections;
    use crate::model::Detection;

    fn detection(text: &str, confidence: f32) -> Detection {
        Detection {
            text: text.to_string(),
            left: 10,
            top: 20,
            width: 30,
            height: 8,
            confidence,
        }
    }

    #[test]
    fn keeps_words_at_or_above_threshold() {
        let words = filter_detections(
            &[
                detection("Date", 40.0),
                detection("noise", 39.9),
                detection("Payee", 96.0),
            ],
            40.0,
        );
        let texts = words.iter().map(|word| word.text.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, vec!["Date", "Payee"]);
        assert_eq!((words[0].right, words[0].bottom), (40, 28));
    }

    #[test]
    fn drops_blank_text_and_trims_the_rest() {
        let words = filter_detections(
            &[
                detection("   ", 95.0),
                detection("", -1.0),
                detection(" Acme ", 90.0),
            ],
            0.0,
        );
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "Acme");
    }
}
