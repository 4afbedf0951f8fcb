use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use eframe::egui::Color32;

fn stable_hash(id: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}

/// Two values in `[-1, 1]` derived from `id`, identical across runs.
pub fn stable_pair(id: &str) -> (f64, f64) {
    let hash = stable_hash(id);

    let x = (hash & 0xffff_ffff) as f64 / u32::MAX as f64;
    let y = ((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

/// Deterministic index in `0..bound` derived from `id`.
pub fn stable_index(id: &str, bound: usize) -> usize {
    if bound == 0 {
        return 0;
    }
    (stable_hash(id) % bound as u64) as usize
}

/// Parses `#rgb`, `#rrggbb` and `#rrggbbaa`; anything else yields `None`.
pub fn parse_color(value: &str) -> Option<Color32> {
    let hex = value.trim().strip_prefix('#')?;
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();

    match hex.len() {
        3 => {
            let short = |index: usize| channel(index..index + 1).map(|value| value * 17);
            Some(Color32::from_rgb(short(0)?, short(1)?, short(2)?))
        }
        6 => Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        )),
        _ => None,
    }
}
