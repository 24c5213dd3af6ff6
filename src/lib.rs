//! Emotional atlas of journal entries: a valence/arousal plane with a force-directed layout,
//! a pan/zoom viewport and pointer hit-testing against the animated positions.

pub mod centroid;
pub mod classify;
pub mod entry;
pub mod interaction;
pub mod layout;
pub mod render;
pub mod schedule;
pub mod search;
pub mod store;
pub mod taxonomy;
pub mod util;
pub mod viewport;
