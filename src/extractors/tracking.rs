// src/extractors/tracking.rs

// --- Imports ---
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

use crate::analysis::{
    AnalysisBundle, BallPossession, BallTracks, EventId, InterceptionEvent, PassEvent,
    PlayerSpeeds, PlayerTracks, TeamAssignment,
};
use crate::extractors::records::{
    BallFrameRecord, ExtractedData, InterceptionRecord, PassRecord, PlayerFrameRecord,
    SpeedRecord, TeamPossessionRecord,
};
use crate::extractors::summary::AnalysisSummary;
use crate::storage::StorageManager;
use crate::utils::error::StorageError;

// --- Constants ---
/// Assumed capture rate of the source video.
pub const FRAME_RATE: f64 = 30.0;
/// Key under which the ball detector stores the ball in each frame.
pub const BALL_TRACK_ID: &str = "1";
/// Team label for players the team assigner did not cover.
pub const UNKNOWN_TEAM: &str = "Unknown";
pub const UNKNOWN_PASS_TYPE: &str = "Unknown";
pub const MPS_TO_KMH: f64 = 3.6;

/// Seconds since the start of the video for a frame number.
pub fn frame_timestamp(frame: u64) -> f64 {
    frame as f64 / FRAME_RATE
}

/// Frame number for the `index`-th per-frame entry.
///
/// Falls back to the index itself when the frame-number list is shorter than the data.
fn resolve_frame(frame_numbers: &[u64], index: usize) -> u64 {
    match frame_numbers.get(index) {
        Some(frame) => *frame,
        None => index as u64,
    }
}

/// Collects flat records from per-frame tracking output and persists them.
pub struct DataExtractor {
    storage: StorageManager,
    data: ExtractedData,
}

impl DataExtractor {
    /// Creates an extractor writing into `output_dir` (created if missing).
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self, StorageError> {
        Ok(Self {
            storage: StorageManager::new(output_dir)?,
            data: ExtractedData::default(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        self.storage.base_dir()
    }

    pub fn data(&self) -> &ExtractedData {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Runs every extraction over a bundle, in declaration order.
    pub fn extract_all(&mut self, bundle: &AnalysisBundle) {
        let frames = &bundle.frame_numbers;
        self.extract_player_data(
            &bundle.player_tracks,
            &bundle.player_assignment,
            &bundle.ball_acquisition,
            frames,
        );
        self.extract_ball_data(&bundle.ball_tracks, frames);
        self.extract_pass_data(&bundle.passes, frames);
        self.extract_interception_data(&bundle.interceptions, frames);
        self.extract_speed_data(&bundle.player_speeds, frames);
        self.extract_team_possession_data(&bundle.ball_acquisition, frames);
    }

    /// Player positions, team and ball possession, one record per player per frame.
    ///
    /// The three per-frame sequences are walked in lockstep; extra trailing
    /// frames in any of them are ignored.
    pub fn extract_player_data(
        &mut self,
        player_tracks: &[PlayerTracks],
        player_assignment: &[TeamAssignment],
        ball_acquisition: &[BallPossession],
        frame_numbers: &[u64],
    ) {
        let before = self.data.player_data.len();
        let frames = player_tracks
            .iter()
            .zip(player_assignment)
            .zip(ball_acquisition)
            .enumerate();

        for (index, ((tracks, assignment), possession)) in frames {
            let frame = resolve_frame(frame_numbers, index);

            for (player_id, track) in tracks {
                let team = assignment
                    .get(player_id)
                    .map_or_else(|| UNKNOWN_TEAM.to_string(), |t| t.as_str().to_string());
                let corners = track.corners();

                self.data.player_data.push(PlayerFrameRecord {
                    frame,
                    player_id: player_id.clone(),
                    team,
                    x_min: corners.map(|c| c[0]),
                    y_min: corners.map(|c| c[1]),
                    x_max: corners.map(|c| c[2]),
                    y_max: corners.map(|c| c[3]),
                    has_ball: possession.holds(player_id),
                    timestamp: frame_timestamp(frame),
                });
            }
        }

        tracing::debug!("Extracted {} player records", self.data.player_data.len() - before);
    }

    /// Ball position for every frame in which the ball was detected.
    pub fn extract_ball_data(&mut self, ball_tracks: &[BallTracks], frame_numbers: &[u64]) {
        let before = self.data.ball_data.len();

        for (index, ball_info) in ball_tracks.iter().enumerate() {
            let Some(track) = ball_info.get(BALL_TRACK_ID) else {
                continue;
            };
            let frame = resolve_frame(frame_numbers, index);
            let corners = track.corners();

            self.data.ball_data.push(BallFrameRecord {
                frame,
                x_min: corners.map(|c| c[0]),
                y_min: corners.map(|c| c[1]),
                x_max: corners.map(|c| c[2]),
                y_max: corners.map(|c| c[3]),
                center_x: corners.map(|c| (c[0] + c[2]) / 2.0),
                center_y: corners.map(|c| (c[1] + c[3]) / 2.0),
                timestamp: frame_timestamp(frame),
            });
        }

        tracing::debug!("Extracted {} ball records", self.data.ball_data.len() - before);
    }

    /// One record per detected pass. Passes carry their own frames, so
    /// `_frame_numbers` is not consulted.
    pub fn extract_pass_data(&mut self, passes: &[PassEvent], _frame_numbers: &[u64]) {
        for pass in passes {
            // Missing ids fall back to the insertion position
            let pass_id = pass
                .pass_id
                .clone()
                .unwrap_or_else(|| EventId::from(self.data.pass_data.len() as u64));
            let start = pass.start_frame.unwrap_or(0);
            let end = pass.end_frame.unwrap_or(0);

            self.data.pass_data.push(PassRecord {
                pass_id,
                start_frame: pass.start_frame,
                end_frame: pass.end_frame,
                passer_id: pass.passer_id.clone(),
                receiver_id: pass.receiver_id.clone(),
                passer_team: pass.passer_team.clone().map(String::from),
                receiver_team: pass.receiver_team.clone().map(String::from),
                pass_type: pass
                    .pass_type
                    .clone()
                    .map_or_else(|| UNKNOWN_PASS_TYPE.to_string(), String::from),
                start_timestamp: frame_timestamp(start),
                end_timestamp: frame_timestamp(end),
                duration: (end as f64 - start as f64) / FRAME_RATE,
            });
        }

        tracing::debug!("Extracted {} pass records", passes.len());
    }

    /// One record per detected interception. `_frame_numbers` is not consulted.
    pub fn extract_interception_data(
        &mut self,
        interceptions: &[InterceptionEvent],
        _frame_numbers: &[u64],
    ) {
        for interception in interceptions {
            let interception_id = interception
                .interception_id
                .clone()
                .unwrap_or_else(|| EventId::from(self.data.interception_data.len() as u64));

            self.data.interception_data.push(InterceptionRecord {
                interception_id,
                frame: interception.frame,
                interceptor_id: interception.interceptor_id.clone(),
                interceptor_team: interception.interceptor_team.clone().map(String::from),
                original_team: interception.original_team.clone().map(String::from),
                timestamp: frame_timestamp(interception.frame.unwrap_or(0)),
            });
        }

        tracing::debug!("Extracted {} interception records", interceptions.len());
    }

    /// Player speeds, one record per measured player per frame.
    pub fn extract_speed_data(&mut self, player_speeds: &[PlayerSpeeds], frame_numbers: &[u64]) {
        let before = self.data.speed_data.len();

        for (index, speeds) in player_speeds.iter().enumerate() {
            let frame = resolve_frame(frame_numbers, index);

            for (player_id, speed) in speeds {
                let Some(speed_mps) = *speed else {
                    continue;
                };
                self.data.speed_data.push(SpeedRecord {
                    frame,
                    player_id: player_id.clone(),
                    speed_mps,
                    speed_kmh: speed_mps * MPS_TO_KMH,
                    timestamp: frame_timestamp(frame),
                });
            }
        }

        tracing::debug!("Extracted {} speed records", self.data.speed_data.len() - before);
    }

    /// Flags every ball holder per frame. Holders are not resolved to teams.
    pub fn extract_team_possession_data(
        &mut self,
        ball_acquisition: &[BallPossession],
        frame_numbers: &[u64],
    ) {
        for (index, possession) in ball_acquisition.iter().enumerate() {
            let frame = resolve_frame(frame_numbers, index);
            let possession_data: IndexMap<_, u8> =
                possession.holders().map(|player| (player.clone(), 1)).collect();

            self.data.team_possession_data.push(TeamPossessionRecord {
                frame,
                possession_data,
                total_players_with_ball: possession.len() as u64,
                timestamp: frame_timestamp(frame),
            });
        }

        tracing::debug!("Extracted {} possession records", ball_acquisition.len());
    }

    /// Writes everything to one structured file. Returns the written path.
    pub fn save_to_json(&self, filename: Option<&str>) -> Result<PathBuf, StorageError> {
        self.storage.save_json(&self.data, filename)
    }

    /// Writes one delimited file per non-empty collection.
    pub fn save_to_csv(&self, filename_prefix: Option<&str>) -> Result<Vec<PathBuf>, StorageError> {
        self.storage.save_csv(&self.data, filename_prefix)
    }

    /// Writes one workbook with a sheet per non-empty collection.
    pub fn save_to_excel(&self, filename: Option<&str>) -> Result<PathBuf, StorageError> {
        self.storage.save_excel(&self.data, filename)
    }

    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary::from_data(&self.data)
    }
}
