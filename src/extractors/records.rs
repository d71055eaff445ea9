// src/extractors/records.rs
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analysis::{EventId, PlayerId};
use crate::storage::tabular::{Cell, TabularRecord, Table};

/// JSON has no literal for infinities or NaN, so those floats travel as
/// `"Infinity"`, `"-Infinity"` and `"NaN"`.
mod float_token {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::storage::tabular::non_finite_token;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Token(String),
    }

    impl Repr {
        fn into_f64<E: Error>(self) -> Result<f64, E> {
            match self {
                Repr::Number(x) => Ok(x),
                Repr::Token(token) => match token.as_str() {
                    "Infinity" => Ok(f64::INFINITY),
                    "-Infinity" => Ok(f64::NEG_INFINITY),
                    "NaN" => Ok(f64::NAN),
                    other => Err(E::custom(format!("unexpected float token {:?}", other))),
                },
            }
        }
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        match non_finite_token(*value) {
            Some(token) => serializer.serialize_str(token),
            None => serializer.serialize_f64(*value),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Repr::deserialize(deserializer)?.into_f64()
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        use super::Repr;

        pub fn serialize<S: Serializer>(
            value: &Option<f64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(x) => super::serialize(x, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<f64>, D::Error> {
            Option::<Repr>::deserialize(deserializer)?
                .map(Repr::into_f64)
                .transpose()
        }
    }
}

/// One player in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerFrameRecord {
    pub frame: u64,
    pub player_id: PlayerId,
    pub team: String,
    #[serde(with = "float_token::option")]
    pub x_min: Option<f64>,
    #[serde(with = "float_token::option")]
    pub y_min: Option<f64>,
    #[serde(with = "float_token::option")]
    pub x_max: Option<f64>,
    #[serde(with = "float_token::option")]
    pub y_max: Option<f64>,
    pub has_ball: bool,
    #[serde(with = "float_token")]
    pub timestamp: f64,
}

/// The ball in one frame where it was detected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallFrameRecord {
    pub frame: u64,
    #[serde(with = "float_token::option")]
    pub x_min: Option<f64>,
    #[serde(with = "float_token::option")]
    pub y_min: Option<f64>,
    #[serde(with = "float_token::option")]
    pub x_max: Option<f64>,
    #[serde(with = "float_token::option")]
    pub y_max: Option<f64>,
    #[serde(with = "float_token::option")]
    pub center_x: Option<f64>,
    #[serde(with = "float_token::option")]
    pub center_y: Option<f64>,
    #[serde(with = "float_token")]
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassRecord {
    pub pass_id: EventId,
    pub start_frame: Option<u64>,
    pub end_frame: Option<u64>,
    pub passer_id: Option<PlayerId>,
    pub receiver_id: Option<PlayerId>,
    pub passer_team: Option<String>,
    pub receiver_team: Option<String>,
    pub pass_type: String,
    #[serde(with = "float_token")]
    pub start_timestamp: f64,
    #[serde(with = "float_token")]
    pub end_timestamp: f64,
    /// Negative when the detector reports an end before the start.
    #[serde(with = "float_token")]
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterceptionRecord {
    pub interception_id: EventId,
    pub frame: Option<u64>,
    pub interceptor_id: Option<PlayerId>,
    pub interceptor_team: Option<String>,
    pub original_team: Option<String>,
    #[serde(with = "float_token")]
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedRecord {
    pub frame: u64,
    pub player_id: PlayerId,
    #[serde(with = "float_token")]
    pub speed_mps: f64,
    #[serde(with = "float_token")]
    pub speed_kmh: f64,
    #[serde(with = "float_token")]
    pub timestamp: f64,
}

/// Players flagged as holding the ball in one frame.
///
/// Each holder maps to `1`. No team resolution happens here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPossessionRecord {
    pub frame: u64,
    pub possession_data: IndexMap<PlayerId, u8>,
    pub total_players_with_ball: u64,
    #[serde(with = "float_token")]
    pub timestamp: f64,
}

fn event_id_cell(id: &EventId) -> Cell {
    match id {
        EventId::Number(n) => Cell::Integer(*n),
        EventId::Text(s) => Cell::Text(s.clone()),
    }
}

fn id_cell(id: &Option<PlayerId>) -> Cell {
    id.as_ref()
        .map_or(Cell::Empty, |id| Cell::Text(id.to_string()))
}

impl TabularRecord for PlayerFrameRecord {
    const COLUMNS: &'static [&'static str] = &[
        "frame", "player_id", "team", "x_min", "y_min", "x_max", "y_max", "has_ball", "timestamp",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.frame),
            Cell::Text(self.player_id.to_string()),
            Cell::Text(self.team.clone()),
            self.x_min.into(),
            self.y_min.into(),
            self.x_max.into(),
            self.y_max.into(),
            Cell::Flag(self.has_ball),
            Cell::Number(self.timestamp),
        ]
    }
}

impl TabularRecord for BallFrameRecord {
    const COLUMNS: &'static [&'static str] = &[
        "frame", "x_min", "y_min", "x_max", "y_max", "center_x", "center_y", "timestamp",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.frame),
            self.x_min.into(),
            self.y_min.into(),
            self.x_max.into(),
            self.y_max.into(),
            self.center_x.into(),
            self.center_y.into(),
            Cell::Number(self.timestamp),
        ]
    }
}

impl TabularRecord for PassRecord {
    const COLUMNS: &'static [&'static str] = &[
        "pass_id",
        "start_frame",
        "end_frame",
        "passer_id",
        "receiver_id",
        "passer_team",
        "receiver_team",
        "pass_type",
        "start_timestamp",
        "end_timestamp",
        "duration",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            event_id_cell(&self.pass_id),
            self.start_frame.into(),
            self.end_frame.into(),
            id_cell(&self.passer_id),
            id_cell(&self.receiver_id),
            self.passer_team.clone().into(),
            self.receiver_team.clone().into(),
            Cell::Text(self.pass_type.clone()),
            Cell::Number(self.start_timestamp),
            Cell::Number(self.end_timestamp),
            Cell::Number(self.duration),
        ]
    }
}

impl TabularRecord for InterceptionRecord {
    const COLUMNS: &'static [&'static str] = &[
        "interception_id",
        "frame",
        "interceptor_id",
        "interceptor_team",
        "original_team",
        "timestamp",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            event_id_cell(&self.interception_id),
            self.frame.into(),
            id_cell(&self.interceptor_id),
            self.interceptor_team.clone().into(),
            self.original_team.clone().into(),
            Cell::Number(self.timestamp),
        ]
    }
}

impl TabularRecord for SpeedRecord {
    const COLUMNS: &'static [&'static str] =
        &["frame", "player_id", "speed_mps", "speed_kmh", "timestamp"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.frame),
            Cell::Text(self.player_id.to_string()),
            Cell::Number(self.speed_mps),
            Cell::Number(self.speed_kmh),
            Cell::Number(self.timestamp),
        ]
    }
}

impl TabularRecord for TeamPossessionRecord {
    const COLUMNS: &'static [&'static str] =
        &["frame", "possession_data", "total_players_with_ball", "timestamp"];

    fn cells(&self) -> Vec<Cell> {
        // Nested map goes into a single column as JSON text
        let possession = serde_json::to_string(&self.possession_data).unwrap_or_default();
        vec![
            Cell::Integer(self.frame),
            Cell::Text(possession),
            Cell::Integer(self.total_players_with_ball),
            Cell::Number(self.timestamp),
        ]
    }
}

/// The six record collections, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedData {
    pub player_data: Vec<PlayerFrameRecord>,
    pub ball_data: Vec<BallFrameRecord>,
    pub pass_data: Vec<PassRecord>,
    pub interception_data: Vec<InterceptionRecord>,
    pub speed_data: Vec<SpeedRecord>,
    pub team_possession_data: Vec<TeamPossessionRecord>,
}

impl ExtractedData {
    pub fn is_empty(&self) -> bool {
        self.player_data.is_empty()
            && self.ball_data.is_empty()
            && self.pass_data.is_empty()
            && self.interception_data.is_empty()
            && self.speed_data.is_empty()
            && self.team_possession_data.is_empty()
    }

    /// All six collections as flat tables, in export order (empty ones included).
    pub fn tables(&self) -> Vec<Table> {
        vec![
            Table::from_records("player_data", "Player Data", &self.player_data),
            Table::from_records("ball_data", "Ball Data", &self.ball_data),
            Table::from_records("pass_data", "Pass Data", &self.pass_data),
            Table::from_records("interception_data", "Interception Data", &self.interception_data),
            Table::from_records("speed_data", "Speed Data", &self.speed_data),
            Table::from_records("team_possession_data", "Team Possession", &self.team_possession_data),
        ]
    }
}
