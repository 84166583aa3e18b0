//! Explicit distance queries evaluated by the controller each tick.
//!
//! Candidates are returned nearest first; ties keep the caller's iteration
//! order, so results are deterministic for ordered inputs.

use freezetag_types::Vec3;

/// Every candidate within `radius` of `origin`, nearest first.
pub fn within_radius<K: Copy>(
    origin: Vec3,
    radius: f64,
    candidates: impl IntoIterator<Item = (K, Vec3)>,
) -> Vec<K> {
    let mut hits: Vec<(K, f64)> = candidates
        .into_iter()
        .filter(|(_, position)| origin.within(*position, radius))
        .map(|(key, position)| (key, origin.distance_squared(position)))
        .collect();
    hits.sort_by(|a, b| a.1.total_cmp(&b.1));
    hits.into_iter().map(|(key, _)| key).collect()
}

/// The nearest candidate within `radius` of `origin`, if any.
pub fn nearest_within<K: Copy>(
    origin: Vec3,
    radius: f64,
    candidates: impl IntoIterator<Item = (K, Vec3)>,
) -> Option<K> {
    candidates
        .into_iter()
        .filter(|(_, position)| origin.within(*position, radius))
        .map(|(key, position)| (key, origin.distance_squared(position)))
        .fold(None, |best: Option<(K, f64)>, (key, d)| match best {
            Some((_, best_d)) if best_d <= d => best,
            _ => Some((key, d)),
        })
        .map(|(key, _)| key)
}
