//! Two-tier emotion table: eight Plutchik families, four secondary emotions each.

use std::fmt;
use std::str::FromStr;

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

/// Hue arc each family spreads its secondaries across, in degrees.
const HUE_SPAN: f32 = 50.0;
const NEUTRAL_HUE: f32 = 220.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Primary {
    Joy,
    Trust,
    Fear,
    Surprise,
    Sadness,
    Disgust,
    Anger,
    Anticipation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Secondary {
    Gratitude,
    Pride,
    Relief,
    Calm,
    Acceptance,
    Love,
    Safety,
    Admiration,
    Anxiety,
    Insecurity,
    Dread,
    Panic,
    Awe,
    Shock,
    Confusion,
    Wonder,
    Grief,
    Loneliness,
    Disappointment,
    Guilt,
    Shame,
    Embarrassment,
    Aversion,
    Contempt,
    Frustration,
    Resentment,
    Irritation,
    Rage,
    Hope,
    Curiosity,
    Determination,
    Nervousness,
}

impl Primary {
    pub const ALL: [Primary; 8] = [
        Primary::Joy,
        Primary::Trust,
        Primary::Fear,
        Primary::Surprise,
        Primary::Sadness,
        Primary::Disgust,
        Primary::Anger,
        Primary::Anticipation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Joy => "Joy",
            Self::Trust => "Trust",
            Self::Fear => "Fear",
            Self::Surprise => "Surprise",
            Self::Sadness => "Sadness",
            Self::Disgust => "Disgust",
            Self::Anger => "Anger",
            Self::Anticipation => "Anticipation",
        }
    }

    /// Ordered secondaries of this family. The order drives the hue offset.
    pub fn secondaries(self) -> &'static [Secondary; 4] {
        use Secondary::*;
        match self {
            Self::Joy => &[Gratitude, Pride, Relief, Calm],
            Self::Trust => &[Acceptance, Love, Safety, Admiration],
            Self::Fear => &[Anxiety, Insecurity, Dread, Panic],
            Self::Surprise => &[Awe, Shock, Confusion, Wonder],
            Self::Sadness => &[Grief, Loneliness, Disappointment, Guilt],
            Self::Disgust => &[Shame, Embarrassment, Aversion, Contempt],
            Self::Anger => &[Frustration, Resentment, Irritation, Rage],
            Self::Anticipation => &[Hope, Curiosity, Determination, Nervousness],
        }
    }

    fn base_hue(self) -> f32 {
        match self {
            Self::Joy => 45.0,
            Self::Trust => 150.0,
            Self::Fear => 265.0,
            Self::Surprise => 205.0,
            Self::Sadness => 225.0,
            Self::Disgust => 105.0,
            Self::Anger => 12.0,
            Self::Anticipation => 315.0,
        }
    }
}

impl Secondary {
    pub const ALL: [Secondary; 32] = {
        use Secondary::*;
        [
            Gratitude,
            Pride,
            Relief,
            Calm,
            Acceptance,
            Love,
            Safety,
            Admiration,
            Anxiety,
            Insecurity,
            Dread,
            Panic,
            Awe,
            Shock,
            Confusion,
            Wonder,
            Grief,
            Loneliness,
            Disappointment,
            Guilt,
            Shame,
            Embarrassment,
            Aversion,
            Contempt,
            Frustration,
            Resentment,
            Irritation,
            Rage,
            Hope,
            Curiosity,
            Determination,
            Nervousness,
        ]
    };

    pub fn label(self) -> &'static str {
        use Secondary::*;
        match self {
            Gratitude => "Gratitude",
            Pride => "Pride",
            Relief => "Relief",
            Calm => "Calm",
            Acceptance => "Acceptance",
            Love => "Love",
            Safety => "Safety",
            Admiration => "Admiration",
            Anxiety => "Anxiety",
            Insecurity => "Insecurity",
            Dread => "Dread",
            Panic => "Panic",
            Awe => "Awe",
            Shock => "Shock",
            Confusion => "Confusion",
            Wonder => "Wonder",
            Grief => "Grief",
            Loneliness => "Loneliness",
            Disappointment => "Disappointment",
            Guilt => "Guilt",
            Shame => "Shame",
            Embarrassment => "Embarrassment",
            Aversion => "Aversion",
            Contempt => "Contempt",
            Frustration => "Frustration",
            Resentment => "Resentment",
            Irritation => "Irritation",
            Rage => "Rage",
            Hope => "Hope",
            Curiosity => "Curiosity",
            Determination => "Determination",
            Nervousness => "Nervousness",
        }
    }

    /// The family this secondary is nested in.
    pub fn primary(self) -> Primary {
        use Secondary::*;
        match self {
            Gratitude | Pride | Relief | Calm => Primary::Joy,
            Acceptance | Love | Safety | Admiration => Primary::Trust,
            Anxiety | Insecurity | Dread | Panic => Primary::Fear,
            Awe | Shock | Confusion | Wonder => Primary::Surprise,
            Grief | Loneliness | Disappointment | Guilt => Primary::Sadness,
            Shame | Embarrassment | Aversion | Contempt => Primary::Disgust,
            Frustration | Resentment | Irritation | Rage => Primary::Anger,
            Hope | Curiosity | Determination | Nervousness => Primary::Anticipation,
        }
    }

    fn ordinal(self) -> usize {
        self.primary()
            .secondaries()
            .iter()
            .position(|sibling| *sibling == self)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown emotion label: {0:?}")]
pub struct UnknownLabel(pub String);

impl FromStr for Primary {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|primary| primary.label().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownLabel(value.to_owned()))
    }
}

impl FromStr for Secondary {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|secondary| secondary.label().eq_ignore_ascii_case(value))
            .ok_or_else(|| UnknownLabel(value.to_owned()))
    }
}

impl fmt::Display for Primary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Secondary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Family of a free-form label. `None` means the label cannot be grouped.
pub fn primary_of(label: &str) -> Option<Primary> {
    label.parse::<Secondary>().ok().map(Secondary::primary)
}

/// Hue in degrees for a label pair, or `None` when the family is unknown.
///
/// A secondary that does not belong to `primary` is treated as the family's first sibling.
pub fn hue_of(primary: Option<Primary>, secondary: Option<Secondary>) -> Option<f32> {
    let primary = primary?;
    let index = secondary
        .filter(|secondary| secondary.primary() == primary)
        .map(Secondary::ordinal)
        .unwrap_or(0);
    let count = primary.secondaries().len();
    let offset = if count > 1 {
        ((index as f32 / (count - 1) as f32) - 0.5) * HUE_SPAN
    } else {
        0.0
    };
    Some((primary.base_hue() + offset + 360.0).rem_euclid(360.0))
}

/// Dot color for a label pair; neutral gray when the family is absent.
pub fn color_of(primary: Option<Primary>, secondary: Option<Secondary>) -> Color32 {
    match hue_of(primary, secondary) {
        Some(hue) => hsl(hue, 0.72, 0.58),
        None => hsl(NEUTRAL_HUE, 0.10, 0.60),
    }
}

/// String-keyed variant of [`color_of`] for labels that have not been validated yet.
pub fn color_of_labels(primary: Option<&str>, secondary: Option<&str>) -> Color32 {
    let primary = primary.and_then(|label| label.parse::<Primary>().ok());
    let secondary = secondary.and_then(|label| label.parse::<Secondary>().ok());
    color_of(primary, secondary)
}

pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let saturation = saturation.clamp(0.0, 1.0);
    let lightness = lightness.clamp(0.0, 1.0);
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue.rem_euclid(360.0) / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let channel = |value: f32| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgb(channel(r), channel(g), channel(b))
}
