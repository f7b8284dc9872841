//! Cache key derivation.

use super::TrackDescriptor;

/// Stable key for resolving `track` to a recording id.
///
/// Uses `isrc:<ISRC>` when an ISRC is present, otherwise the normalized
/// name and artist pair.
pub fn track_key(track: &TrackDescriptor) -> String {
    match track.isrc() {
        Some(isrc) => format!("isrc:{}", isrc.to_uppercase()),
        None => format!(
            "track:{}|{}",
            normalize(&track.name),
            normalize(&track.artist_name)
        ),
    }
}

/// Key for the features of one recording, shared by every track that
/// resolves to it.
pub fn features_key(recording_id: &str) -> String {
    format!("features:{recording_id}")
}

/// Lowercases and collapses runs of whitespace into single spaces.
fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
