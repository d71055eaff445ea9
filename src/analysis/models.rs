// src/analysis/models.rs
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Reads any JSON value and keeps it only if it fits `T`; anything else becomes `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Identifiers arrive either as tracker integers or as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LooseText {
    Number(serde_json::Number),
    Text(String),
}

impl From<LooseText> for String {
    fn from(raw: LooseText) -> Self {
        match raw {
            LooseText::Number(n) => n.to_string(),
            LooseText::Text(s) => s,
        }
    }
}

/// Tracker-assigned player identifier, always rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "LooseText", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<LooseText> for PlayerId {
    fn from(raw: LooseText) -> Self {
        Self(raw.into())
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<u32> for PlayerId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form label (team, pass type) that upstream may write as a bare number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "LooseText", into = "String")]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<LooseText> for Label {
    fn from(raw: LooseText) -> Self {
        Self(raw.into())
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.0
    }
}

impl From<&str> for Label {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

/// Pass or interception id as reported upstream: a counter or an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(u64),
    Text(String),
}

impl From<u64> for EventId {
    fn from(id: u64) -> Self {
        EventId::Number(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Number(n) => write!(f, "{}", n),
            EventId::Text(s) => f.write_str(s),
        }
    }
}

/// A single detection. Only the bounding box is consumed here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackInfo {
    /// A box that is not a list of numbers reads as empty.
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub bbox: Vec<f64>,
}

impl TrackInfo {
    pub fn with_bbox(bbox: impl Into<Vec<f64>>) -> Self {
        Self { bbox: bbox.into() }
    }

    /// Returns `[x_min, y_min, x_max, y_max]` when the box has at least four components.
    pub fn corners(&self) -> Option<[f64; 4]> {
        match self.bbox.as_slice() {
            [x_min, y_min, x_max, y_max, ..] => Some([*x_min, *y_min, *x_max, *y_max]),
            _ => None,
        }
    }
}

/// Player tracks for one frame, keyed by player.
pub type PlayerTracks = IndexMap<PlayerId, TrackInfo>;

/// Team assignments for one frame.
pub type TeamAssignment = HashMap<PlayerId, Label>;

/// Ball tracks for one frame, keyed by ball id (JSON object keys, so text).
pub type BallTracks = BTreeMap<String, TrackInfo>;

/// Player speeds (m/s) for one frame. Players without a measurement carry `null`.
pub type PlayerSpeeds = IndexMap<PlayerId, Option<f64>>;

/// Who holds the ball in one frame.
///
/// The acquisition detector emits either a mapping keyed by player or a plain
/// list of players. Anything else is kept as-is and holds nobody.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BallPossession {
    Holders(IndexMap<PlayerId, serde_json::Value>),
    Players(Vec<PlayerId>),
    Unrecognized(serde_json::Value),
}

impl Default for BallPossession {
    fn default() -> Self {
        BallPossession::Players(Vec::new())
    }
}

impl BallPossession {
    pub fn holds(&self, player: &PlayerId) -> bool {
        match self {
            BallPossession::Holders(map) => map.contains_key(player),
            BallPossession::Players(players) => players.contains(player),
            BallPossession::Unrecognized(_) => false,
        }
    }

    pub fn holders(&self) -> Box<dyn Iterator<Item = &PlayerId> + '_> {
        match self {
            BallPossession::Holders(map) => Box::new(map.keys()),
            BallPossession::Players(players) => Box::new(players.iter()),
            BallPossession::Unrecognized(_) => Box::new(std::iter::empty()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            BallPossession::Holders(map) => map.len(),
            BallPossession::Players(players) => players.len(),
            BallPossession::Unrecognized(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<PlayerId>> for BallPossession {
    fn from(players: Vec<PlayerId>) -> Self {
        BallPossession::Players(players)
    }
}

/// A detected pass, as reported by the pass detector.
///
/// Fields of an unexpected shape read as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PassEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub pass_id: Option<EventId>,
    #[serde(default, deserialize_with = "lenient")]
    pub start_frame: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub end_frame: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub passer_id: Option<PlayerId>,
    #[serde(default, deserialize_with = "lenient")]
    pub receiver_id: Option<PlayerId>,
    #[serde(default, deserialize_with = "lenient")]
    pub passer_team: Option<Label>,
    #[serde(default, deserialize_with = "lenient")]
    pub receiver_team: Option<Label>,
    #[serde(default, deserialize_with = "lenient")]
    pub pass_type: Option<Label>,
}

/// A detected interception. Fields of an unexpected shape read as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterceptionEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub interception_id: Option<EventId>,
    #[serde(default, deserialize_with = "lenient")]
    pub frame: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub interceptor_id: Option<PlayerId>,
    #[serde(default, deserialize_with = "lenient")]
    pub interceptor_team: Option<Label>,
    #[serde(default, deserialize_with = "lenient")]
    pub original_team: Option<Label>,
}

/// Complete output of one tracking run, as written by the analysis pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisBundle {
    pub frame_numbers: Vec<u64>,
    pub player_tracks: Vec<PlayerTracks>,
    pub player_assignment: Vec<TeamAssignment>,
    pub ball_acquisition: Vec<BallPossession>,
    pub ball_tracks: Vec<BallTracks>,
    pub passes: Vec<PassEvent>,
    pub interceptions: Vec<InterceptionEvent>,
    pub player_speeds: Vec<PlayerSpeeds>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_ids_accept_numbers_and_strings() {
        let ids: Vec<PlayerId> = serde_json::from_str(r#"[7, "p1"]"#).unwrap();
        assert_eq!(ids, vec![PlayerId::from("7"), PlayerId::from("p1")]);
    }

    #[test]
    fn possession_shapes() {
        let frames: Vec<BallPossession> =
            serde_json::from_str(r#"[{"p1": 0.9}, ["p2", 3], -1, null]"#).unwrap();

        assert!(matches!(frames[0], BallPossession::Holders(_)));
        assert!(frames[0].holds(&"p1".into()));
        assert!(!frames[0].holds(&"p2".into()));

        assert!(matches!(frames[1], BallPossession::Players(_)));
        assert!(frames[1].holds(&"p2".into()));
        assert!(frames[1].holds(&PlayerId::from(3)));
        assert_eq!(frames[1].len(), 2);

        for other in &frames[2..] {
            assert!(matches!(other, BallPossession::Unrecognized(_)));
            assert!(!other.holds(&"p1".into()));
            assert_eq!(other.holders().count(), 0);
        }
    }

    #[test]
    fn short_boxes_have_no_corners() {
        assert_eq!(TrackInfo::with_bbox(vec![1.0, 2.0, 3.0]).corners(), None);
        assert_eq!(
            TrackInfo::with_bbox(vec![1.0, 2.0, 3.0, 4.0, 0.8]).corners(),
            Some([1.0, 2.0, 3.0, 4.0])
        );
    }

    #[test]
    fn bundle_fields_default_to_empty() {
        let bundle: AnalysisBundle =
            serde_json::from_str(r#"{"ball_tracks": [{"1": {"bbox": [2, 2, 6, 6]}}, {}]}"#).unwrap();
        assert!(bundle.player_tracks.is_empty());
        assert_eq!(bundle.ball_tracks.len(), 2);
        assert!(bundle.ball_tracks[0].contains_key("1"));
    }

    #[test]
    fn odd_ball_keys_do_not_fail_the_bundle() {
        let bundle: AnalysisBundle = serde_json::from_str(
            r#"{"ball_tracks": [{"ball": {"bbox": [1, 1, 2, 2]}}, {"1": {"bbox": "n/a"}}]}"#,
        )
        .unwrap();
        assert!(bundle.ball_tracks[0].contains_key("ball"));
        assert!(bundle.ball_tracks[1]["1"].bbox.is_empty());
    }

    #[test]
    fn malformed_event_fields_read_as_absent() {
        let passes: Vec<PassEvent> = serde_json::from_str(
            r#"[{"pass_id": "a1", "start_frame": "30", "end_frame": 60, "pass_type": 2, "passer_team": [1]},
                {"pass_id": 4.5, "pass_type": {"kind": "lob"}}]"#,
        )
        .unwrap();
        assert_eq!(passes[0].pass_id, Some(EventId::Text("a1".into())));
        assert_eq!(passes[0].start_frame, None);
        assert_eq!(passes[0].end_frame, Some(60));
        assert_eq!(passes[0].pass_type.as_ref().map(Label::as_str), Some("2"));
        assert_eq!(passes[0].passer_team, None);
        assert_eq!(passes[1].pass_id, None);
        assert_eq!(passes[1].pass_type, None);

        let interceptions: Vec<InterceptionEvent> =
            serde_json::from_str(r#"[{"interception_id": 7, "frame": -3, "interceptor_id": true}]"#)
                .unwrap();
        assert_eq!(interceptions[0].interception_id, Some(EventId::Number(7)));
        assert_eq!(interceptions[0].frame, None);
        assert_eq!(interceptions[0].interceptor_id, None);
    }
}
