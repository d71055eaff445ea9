// src/extractors/summary.rs
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use crate::analysis::PlayerId;
use crate::extractors::records::ExtractedData;
use crate::extractors::tracking::UNKNOWN_TEAM;

/// Headline numbers for one extraction run, computed from in-memory records only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub total_frames_analyzed: usize,
    pub total_players_detected: usize,
    pub total_ball_detections: usize,
    pub total_passes: usize,
    pub total_interceptions: usize,
    pub total_speed_measurements: usize,
    /// Latest player timestamp, 0 when no players were recorded.
    pub analysis_duration_seconds: f64,
    pub teams_detected: Vec<String>,
    /// Mean speed (m/s) per player, in first-seen order. Absent without speed records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_player_speeds: Option<IndexMap<PlayerId, f64>>,
}

impl AnalysisSummary {
    pub fn from_data(data: &ExtractedData) -> Self {
        let players = &data.player_data;

        let frames: HashSet<u64> = players.iter().map(|p| p.frame).collect();
        let player_ids: HashSet<&PlayerId> = players.iter().map(|p| &p.player_id).collect();
        let duration = players.iter().map(|p| p.timestamp).fold(0.0, f64::max);
        let teams: BTreeSet<&str> = players
            .iter()
            .map(|p| p.team.as_str())
            .filter(|team| *team != UNKNOWN_TEAM)
            .collect();

        Self {
            total_frames_analyzed: frames.len(),
            total_players_detected: player_ids.len(),
            total_ball_detections: data.ball_data.len(),
            total_passes: data.pass_data.len(),
            total_interceptions: data.interception_data.len(),
            total_speed_measurements: data.speed_data.len(),
            analysis_duration_seconds: duration,
            teams_detected: teams.into_iter().map(String::from).collect(),
            average_player_speeds: average_speeds(data),
        }
    }
}

fn average_speeds(data: &ExtractedData) -> Option<IndexMap<PlayerId, f64>> {
    if data.speed_data.is_empty() {
        return None;
    }

    let mut totals: IndexMap<&PlayerId, (f64, usize)> = IndexMap::new();
    for record in &data.speed_data {
        let entry = totals.entry(&record.player_id).or_insert((0.0, 0));
        entry.0 += record.speed_mps;
        entry.1 += 1;
    }

    Some(
        totals
            .into_iter()
            .map(|(player, (sum, count))| (player.clone(), sum / count as f64))
            .collect(),
    )
}
