use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Duration, Local};

/// Two values in `[-1, 1]` derived from `id`; stable for the lifetime of a build.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

/// 32-bit FNV-1a over UTF-16 code units, so hashes match text typed in other frontends.
pub fn fnv1a(text: &str) -> u32 {
    let mut hash: u32 = 2_166_136_261;
    for unit in text.encode_utf16() {
        hash ^= u32::from(unit);
        hash = hash.wrapping_mul(16_777_619);
    }
    hash
}

/// First line of `text`, cut to at most `max_chars` characters.
pub fn headline(text: &str, max_chars: usize) -> &str {
    let line = text.trim().lines().next().unwrap_or_default().trim();
    match line.char_indices().nth(max_chars) {
        Some((cut, _)) => &line[..cut],
        None => line,
    }
}

pub fn short_date(iso: &str) -> &str {
    iso.get(..10).unwrap_or(iso)
}

/// `YYYY-MM-DD` for the local calendar day `days_back` days before today.
pub fn local_date(days_back: i64) -> String {
    let today = Local::now().date_naive();
    (today - Duration::days(days_back)).format("%Y-%m-%d").to_string()
}
