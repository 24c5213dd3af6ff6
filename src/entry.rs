use std::fmt;

use eframe::egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::taxonomy::{Primary, Secondary};

/// World units spanned by valence in each direction from the origin.
pub const VALENCE_SPAN: f32 = 6.0;
/// World units spanned by arousal in each direction; high arousal points up (negative y).
pub const AROUSAL_SPAN: f32 = 3.8;

pub fn affect_to_world(valence: f32, arousal: f32) -> Vec2 {
    vec2(valence * VALENCE_SPAN, -arousal * AROUSAL_SPAN)
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("stored classification has a non-finite `{0}`")]
pub struct NonFiniteValue(pub &'static str);

/// A validated classifier label. Values are always inside their declared ranges, including
/// ones read back from disk.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredClassification")]
pub struct Classification {
    emotion: Secondary,
    valence: f32,
    arousal: f32,
    confidence: f32,
}

#[derive(Deserialize)]
struct StoredClassification {
    emotion: Secondary,
    valence: f32,
    arousal: f32,
    confidence: f32,
}

impl TryFrom<StoredClassification> for Classification {
    type Error = NonFiniteValue;

    fn try_from(stored: StoredClassification) -> Result<Self, Self::Error> {
        for (field, value) in [
            ("valence", stored.valence),
            ("arousal", stored.arousal),
            ("confidence", stored.confidence),
        ] {
            if !value.is_finite() {
                return Err(NonFiniteValue(field));
            }
        }
        Ok(Self::new(
            stored.emotion,
            stored.valence,
            stored.arousal,
            stored.confidence,
        ))
    }
}

impl Classification {
    /// Clamps valence and arousal into `[-1, 1]` and confidence into `[0, 1]`.
    /// Non-finite inputs collapse to zero.
    pub fn new(emotion: Secondary, valence: f32, arousal: f32, confidence: f32) -> Self {
        let finite_or_zero = |value: f32| if value.is_finite() { value } else { 0.0 };
        Self {
            emotion,
            valence: finite_or_zero(valence).clamp(-1.0, 1.0),
            arousal: finite_or_zero(arousal).clamp(-1.0, 1.0),
            confidence: finite_or_zero(confidence).clamp(0.0, 1.0),
        }
    }

    pub fn emotion(&self) -> Secondary {
        self.emotion
    }

    pub fn valence(&self) -> f32 {
        self.valence
    }

    pub fn arousal(&self) -> f32 {
        self.arousal
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn primary(&self) -> Primary {
        self.emotion.primary()
    }

    pub fn anchor(&self) -> Vec2 {
        affect_to_world(self.valence, self.arousal)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EntryState {
    #[default]
    Unclassified,
    Classified(Classification),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    #[default]
    Text,
    Image,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// `YYYY-MM-DD`
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source: EntrySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
    #[serde(default)]
    pub state: EntryState,
}

impl Entry {
    pub fn new(id: EntryId, title: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            body: String::new(),
            created_at: created_at.into(),
            location: None,
            image_url: None,
            source: EntrySource::Text,
            ocr_text: None,
            state: EntryState::Unclassified,
        }
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.state = EntryState::Classified(classification);
        self
    }

    pub fn classification(&self) -> Option<&Classification> {
        match &self.state {
            EntryState::Classified(classification) => Some(classification),
            EntryState::Unclassified => None,
        }
    }

    pub fn emotion(&self) -> Option<Secondary> {
        self.classification().map(Classification::emotion)
    }

    pub fn primary(&self) -> Option<Primary> {
        self.classification().map(Classification::primary)
    }

    /// Rest position in world space; unclassified entries have none.
    pub fn anchor(&self) -> Option<Vec2> {
        self.classification().map(Classification::anchor)
    }

    pub fn apply(&mut self, patch: EntryPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(ocr_text) = patch.ocr_text {
            self.ocr_text = Some(ocr_text);
        }
        if let Some(state) = patch.state {
            self.state = state;
        }
    }
}

/// Partial update for [`crate::store::EntryStore::update`]. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub location: Option<String>,
    pub ocr_text: Option<String>,
    pub state: Option<EntryState>,
}

impl EntryPatch {
    pub fn classified(title: Option<String>, classification: Classification) -> Self {
        Self {
            title,
            state: Some(EntryState::Classified(classification)),
            ..Self::default()
        }
    }
}
