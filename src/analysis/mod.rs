// src/analysis/mod.rs
pub mod models;

use std::fs;
use std::path::Path;

use crate::utils::error::InputError;
pub use models::{
    AnalysisBundle, BallPossession, BallTracks, EventId, InterceptionEvent, Label, PassEvent,
    PlayerId, PlayerSpeeds, PlayerTracks, TeamAssignment, TrackInfo,
};

impl AnalysisBundle {
    /// Reads a bundle written by the tracking pipeline.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let bundle: AnalysisBundle = serde_json::from_str(&raw)?;

        tracing::debug!(
            "Loaded bundle {} ({} frame numbers, {} player frames, {} passes)",
            path.display(),
            bundle.frame_numbers.len(),
            bundle.player_tracks.len(),
            bundle.passes.len()
        );
        Ok(bundle)
    }
}
