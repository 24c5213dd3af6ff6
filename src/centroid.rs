use std::collections::BTreeMap;

use eframe::egui::Vec2;

use crate::entry::{Entry, affect_to_world};
use crate::taxonomy::{Primary, Secondary};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Centroid {
    pub valence: f32,
    pub arousal: f32,
    pub count: usize,
}

impl Centroid {
    pub fn world(&self) -> Vec2 {
        affect_to_world(self.valence, self.arousal)
    }
}

#[derive(Clone, Copy, Default)]
struct Accumulator {
    valence: f32,
    arousal: f32,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, valence: f32, arousal: f32) {
        self.valence += valence;
        self.arousal += arousal;
        self.count += 1;
    }

    fn finish(self) -> Centroid {
        let count = self.count as f32;
        Centroid {
            valence: self.valence / count,
            arousal: self.arousal / count,
            count: self.count,
        }
    }
}

/// Mean (valence, arousal) per label over the classified entries of the active set.
///
/// Rebuilt from scratch on every change; labels without members are absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Centroids {
    primary: BTreeMap<Primary, Centroid>,
    secondary: BTreeMap<Secondary, Centroid>,
}

impl Centroids {
    pub fn compute<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut primary = BTreeMap::<Primary, Accumulator>::new();
        let mut secondary = BTreeMap::<Secondary, Accumulator>::new();

        for classification in entries.into_iter().filter_map(Entry::classification) {
            primary
                .entry(classification.primary())
                .or_default()
                .add(classification.valence(), classification.arousal());
            secondary
                .entry(classification.emotion())
                .or_default()
                .add(classification.valence(), classification.arousal());
        }

        Self {
            primary: primary
                .into_iter()
                .map(|(label, accumulator)| (label, accumulator.finish()))
                .collect(),
            secondary: secondary
                .into_iter()
                .map(|(label, accumulator)| (label, accumulator.finish()))
                .collect(),
        }
    }

    pub fn primary(&self, label: Primary) -> Option<&Centroid> {
        self.primary.get(&label)
    }

    pub fn secondary(&self, label: Secondary) -> Option<&Centroid> {
        self.secondary.get(&label)
    }

    pub fn primaries(&self) -> impl Iterator<Item = (Primary, &Centroid)> {
        self.primary.iter().map(|(label, centroid)| (*label, centroid))
    }

    pub fn secondaries(&self) -> impl Iterator<Item = (Secondary, &Centroid)> {
        self.secondary
            .iter()
            .map(|(label, centroid)| (*label, centroid))
    }

    pub fn is_empty(&self) -> bool {
        self.secondary.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Classification, EntryId};

    fn classified(id: &str, emotion: Secondary, valence: f32, arousal: f32) -> Entry {
        Entry::new(EntryId::new(id), id, "2024-01-01")
            .with_classification(Classification::new(emotion, valence, arousal, 0.8))
    }

    #[test]
    fn averages_per_tier() {
        let entries = vec![
            classified("a", Secondary::Gratitude, 0.6, 0.2),
            classified("b", Secondary::Gratitude, 0.8, 0.4),
            classified("c", Secondary::Calm, 0.4, -0.6),
            Entry::new(EntryId::new("d"), "pending", "2024-01-01"),
        ];
        let centroids = Centroids::compute(&entries);

        let gratitude = centroids.secondary(Secondary::Gratitude).expect("gratitude present");
        assert_eq!(gratitude.count, 2);
        assert!((gratitude.valence - 0.7).abs() < 1e-6);
        assert!((gratitude.arousal - 0.3).abs() < 1e-6);

        let joy = centroids.primary(Primary::Joy).expect("joy present");
        assert_eq!(joy.count, 3);
        assert!((joy.valence - 0.6).abs() < 1e-6);
        assert!(joy.arousal.abs() < 1e-6);
    }

    #[test]
    fn empty_labels_are_absent() {
        let entries = vec![classified("a", Secondary::Rage, -0.7, 0.9)];
        let centroids = Centroids::compute(&entries);
        assert!(centroids.secondary(Secondary::Calm).is_none());
        assert!(centroids.primary(Primary::Joy).is_none());
        assert_eq!(centroids.primaries().count(), 1);
    }

    #[test]
    fn unclassified_only_yields_nothing() {
        let entries = vec![Entry::new(EntryId::new("x"), "x", "2024-01-01")];
        assert!(Centroids::compute(&entries).is_empty());
    }
}
