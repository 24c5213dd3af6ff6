//! Boundary to the classification and OCR collaborators.
//!
//! Whatever a classifier returns passes through [`RawClassification::validate`] before it can
//! touch an [`Entry`](crate::entry::Entry): labels must belong to the taxonomy, numbers must be
//! finite and are clamped into range.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::entry::Classification;
use crate::taxonomy::{Primary, Secondary, UnknownLabel};
use crate::util::{fnv1a, headline};

/// Longest title kept from a classifier reply.
pub const MAX_TITLE_CHARS: usize = 64;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("nothing to classify")]
    EmptyInput,
    #[error("too short to classify; add a little more detail")]
    TooShort,
    #[error("classifier reply is missing `{0}`")]
    MissingField(&'static str),
    #[error("classifier reply has a non-numeric `{0}`")]
    NotFinite(&'static str),
    #[error(transparent)]
    UnknownLabel(#[from] UnknownLabel),
    #[error("classifier reply is not valid JSON")]
    Malformed(#[from] serde_json::Error),
    #[error("cannot read text from {path}")]
    Unreadable { path: String },
}

/// Accepts `0.4` as well as `"0.4"`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    fn finite(&self) -> Option<f32> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value as f32)
    }
}

/// Unvalidated classifier output, in the shape the classification service replies with.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawClassification {
    pub title: Option<String>,
    pub emotion: Option<String>,
    pub plutchik_primary: Option<String>,
    pub valence: Option<LooseNumber>,
    pub arousal: Option<LooseNumber>,
    pub confidence: Option<LooseNumber>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassifierReply {
    pub title: String,
    pub classification: Classification,
}

fn required_text<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, ClassifyError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(ClassifyError::MissingField(field))
}

fn required_number(value: &Option<LooseNumber>, field: &'static str) -> Result<f32, ClassifyError> {
    value
        .as_ref()
        .ok_or(ClassifyError::MissingField(field))?
        .finite()
        .ok_or(ClassifyError::NotFinite(field))
}

impl RawClassification {
    pub fn from_json(text: &str) -> Result<Self, ClassifyError> {
        Ok(serde_json::from_str(text.trim())?)
    }

    pub fn validate(&self) -> Result<ClassifierReply, ClassifyError> {
        let title = required_text(&self.title, "title")?;
        let emotion = required_text(&self.emotion, "emotion")?.parse::<Secondary>()?;
        let valence = required_number(&self.valence, "valence")?;
        let arousal = required_number(&self.arousal, "arousal")?;
        let confidence = required_number(&self.confidence, "confidence")?;

        if let Some(label) = self
            .plutchik_primary
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
        {
            let claimed = label.parse::<Primary>()?;
            if claimed != emotion.primary() {
                warn!(
                    emotion = %emotion,
                    claimed = %claimed,
                    derived = %emotion.primary(),
                    "classifier primary disagrees with taxonomy; using taxonomy"
                );
            }
        }

        Ok(ClassifierReply {
            title: headline(title, MAX_TITLE_CHARS).to_owned(),
            classification: Classification::new(emotion, valence, arousal, confidence),
        })
    }
}

/// Fewer than two words and under eight characters: typing noise or an OCR misread.
pub fn is_too_short(text: &str) -> bool {
    let text = text.trim();
    text.split_whitespace().count() < 2 && text.chars().count() < 8
}

pub trait Classifier: Send {
    /// The collaborator's reply as received, before any checks.
    fn respond(&self, text: &str) -> Result<RawClassification, ClassifyError>;

    fn classify(&self, text: &str) -> Result<ClassifierReply, ClassifyError> {
        self.respond(text)?.validate()
    }
}

/// OCR collaborator.
pub trait TextExtractor: Send {
    fn extract(&self, image: &Path) -> Result<String, ClassifyError>;
}

/// Offline classifier that derives everything from a hash of the text.
///
/// The same text always lands on the same point and label.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeededClassifier;

const PLEASANT_ACTIVE: [Secondary; 5] = [
    Secondary::Pride,
    Secondary::Awe,
    Secondary::Determination,
    Secondary::Curiosity,
    Secondary::Wonder,
];
const PLEASANT_QUIET: [Secondary; 5] = [
    Secondary::Calm,
    Secondary::Gratitude,
    Secondary::Love,
    Secondary::Relief,
    Secondary::Hope,
];
const UNPLEASANT_ACTIVE: [Secondary; 5] = [
    Secondary::Frustration,
    Secondary::Rage,
    Secondary::Anxiety,
    Secondary::Panic,
    Secondary::Embarrassment,
];
const UNPLEASANT_QUIET: [Secondary; 5] = [
    Secondary::Grief,
    Secondary::Loneliness,
    Secondary::Disappointment,
    Secondary::Guilt,
    Secondary::Shame,
];

impl SeededClassifier {
    /// Valence and arousal in `[-1, 1)` from the FNV-1a hash of `text`.
    pub fn score(text: &str) -> (f32, f32) {
        let hash = fnv1a(text);
        let valence = (hash % 2000) as f32 / 1000.0 - 1.0;
        let arousal = ((hash >> 11) % 2000) as f32 / 1000.0 - 1.0;
        (valence, arousal)
    }

    fn emotion_for(text: &str, valence: f32, arousal: f32) -> Secondary {
        let quadrant = match (valence >= 0.0, arousal >= 0.0) {
            (true, true) => &PLEASANT_ACTIVE,
            (true, false) => &PLEASANT_QUIET,
            (false, true) => &UNPLEASANT_ACTIVE,
            (false, false) => &UNPLEASANT_QUIET,
        };
        quadrant[(fnv1a(text) >> 22) as usize % quadrant.len()]
    }
}

impl Classifier for SeededClassifier {
    fn respond(&self, text: &str) -> Result<RawClassification, ClassifyError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClassifyError::EmptyInput);
        }

        let (valence, arousal) = Self::score(text);
        let emotion = Self::emotion_for(text, valence, arousal);
        let title = match headline(text, MAX_TITLE_CHARS) {
            "" => format!("{emotion} entry"),
            line => line.to_owned(),
        };

        Ok(RawClassification {
            title: Some(title),
            emotion: Some(emotion.label().to_owned()),
            plutchik_primary: Some(emotion.primary().to_string()),
            valence: Some(LooseNumber::Number(f64::from(valence))),
            arousal: Some(LooseNumber::Number(f64::from(arousal))),
            confidence: Some(LooseNumber::Number(0.72)),
        })
    }
}

/// Stand-in OCR that produces journal-like text named after the image file.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderOcr;

impl TextExtractor for PlaceholderOcr {
    fn extract(&self, image: &Path) -> Result<String, ClassifyError> {
        let name = image
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ClassifyError::Unreadable {
                path: image.display().to_string(),
            })?;

        Ok(format!(
            "Simulated OCR from {name}.\n\nToday I felt a mix of things. There was a specific \
             moment that stuck with me, and I keep replaying it. I want to be honest about what \
             I'm feeling and what I'm avoiding."
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawClassification {
        RawClassification::from_json(json).expect("valid json")
    }

    #[test]
    fn accepts_well_formed_reply() {
        let reply = raw(
            r#"{"title":" Morning run ","emotion":"Determination","plutchikPrimary":"Anticipation",
                "valence":0.4,"arousal":"0.7","confidence":0.9}"#,
        )
        .validate()
        .expect("valid reply");
        assert_eq!(reply.title, "Morning run");
        assert_eq!(reply.classification.emotion(), Secondary::Determination);
        assert_eq!(reply.classification.primary(), Primary::Anticipation);
        assert_eq!(reply.classification.arousal(), 0.7);
    }

    #[test]
    fn clamps_out_of_range_numbers() {
        let json = r#"{"title":"t","emotion":"rage","valence":-3,"arousal":2,"confidence":1.5}"#;
        let reply = raw(json).validate().expect("valid reply");
        assert_eq!(reply.classification.valence(), -1.0);
        assert_eq!(reply.classification.arousal(), 1.0);
        assert_eq!(reply.classification.confidence(), 1.0);
    }

    #[test]
    fn rejects_missing_and_non_numeric_fields() {
        let missing_title = raw(r#"{"emotion":"Awe","valence":0,"arousal":0,"confidence":0}"#);
        assert!(matches!(missing_title.validate(), Err(ClassifyError::MissingField("title"))));

        let blank_emotion =
            raw(r#"{"title":"t","emotion":"  ","valence":0,"arousal":0,"confidence":0}"#);
        assert!(matches!(blank_emotion.validate(), Err(ClassifyError::MissingField("emotion"))));

        let bad_number = raw(
            r#"{"title":"t","emotion":"Awe","valence":"high","arousal":0,"confidence":0}"#,
        );
        assert!(matches!(bad_number.validate(), Err(ClassifyError::NotFinite("valence"))));
    }

    #[test]
    fn rejects_labels_outside_taxonomy() {
        let unknown =
            raw(r#"{"title":"t","emotion":"Ennui","valence":0,"arousal":0,"confidence":0}"#);
        assert!(matches!(unknown.validate(), Err(ClassifyError::UnknownLabel(_))));

        let bad_primary = raw(
            r#"{"title":"t","emotion":"Awe","plutchikPrimary":"Boredom",
                "valence":0,"arousal":0,"confidence":0}"#,
        );
        assert!(matches!(bad_primary.validate(), Err(ClassifyError::UnknownLabel(_))));
    }

    #[test]
    fn mismatched_primary_defers_to_taxonomy() {
        let reply = raw(
            r#"{"title":"t","emotion":"Awe","plutchikPrimary":"Anger",
                "valence":0,"arousal":0,"confidence":0.5}"#,
        )
        .validate()
        .expect("valid reply");
        assert_eq!(reply.classification.primary(), Primary::Surprise);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            RawClassification::from_json("not json"),
            Err(ClassifyError::Malformed(_))
        ));
    }

    #[test]
    fn seeded_classifier_is_deterministic() {
        let classifier = SeededClassifier;
        let text = "Walked along the river after work.\nFelt lighter.";
        let first = classifier.classify(text).expect("classified");
        let second = classifier.classify(text).expect("classified");
        assert_eq!(first, second);
        assert_eq!(first.title, "Walked along the river after work.");
        assert!((first.classification.confidence() - 0.72).abs() < 1e-6);

        let (valence, arousal) = SeededClassifier::score(text);
        let quadrant = match (valence >= 0.0, arousal >= 0.0) {
            (true, true) => PLEASANT_ACTIVE,
            (true, false) => PLEASANT_QUIET,
            (false, true) => UNPLEASANT_ACTIVE,
            (false, false) => UNPLEASANT_QUIET,
        };
        assert!(quadrant.contains(&first.classification.emotion()));
    }

    struct CannedClassifier(&'static str);

    impl Classifier for CannedClassifier {
        fn respond(&self, _text: &str) -> Result<RawClassification, ClassifyError> {
            RawClassification::from_json(self.0)
        }
    }

    #[test]
    fn classify_validates_every_reply() {
        let wild = CannedClassifier(
            r#"{"title":"t","emotion":"Calm","valence":9,"arousal":"-4","confidence":2}"#,
        );
        let reply = wild.classify("anything").expect("clamped reply");
        assert_eq!(reply.classification.valence(), 1.0);
        assert_eq!(reply.classification.arousal(), -1.0);
        assert_eq!(reply.classification.confidence(), 1.0);

        let unknown = CannedClassifier(
            r#"{"title":"t","emotion":"Ennui","valence":0,"arousal":0,"confidence":0}"#,
        );
        assert!(matches!(unknown.classify("anything"), Err(ClassifyError::UnknownLabel(_))));

        let untitled =
            CannedClassifier(r#"{"emotion":"Calm","valence":0,"arousal":0,"confidence":0}"#);
        assert!(matches!(untitled.classify("anything"), Err(ClassifyError::MissingField("title"))));
    }

    #[test]
    fn seeded_reply_names_a_consistent_family() {
        let raw = SeededClassifier.respond("Quiet evening with tea.").expect("reply");
        let emotion = raw.emotion.as_deref().expect("emotion").parse::<Secondary>().expect("label");
        assert_eq!(raw.plutchik_primary.as_deref(), Some(emotion.primary().label()));
    }

    #[test]
    fn too_short_needs_two_words_or_eight_characters() {
        assert!(is_too_short(""));
        assert!(is_too_short("  meh  "));
        assert!(!is_too_short("ok fine"));
        assert!(!is_too_short("exhausted"));
    }

    #[test]
    fn seeded_classifier_rejects_blank_text() {
        assert!(matches!(SeededClassifier.classify("   "), Err(ClassifyError::EmptyInput)));
    }

    #[test]
    fn placeholder_ocr_names_the_file() {
        let text = PlaceholderOcr
            .extract(Path::new("/tmp/notebook page.jpg"))
            .expect("text");
        assert!(text.starts_with("Simulated OCR from notebook page.jpg."));
        assert!(PlaceholderOcr.extract(Path::new("/")).is_err());
    }
}
