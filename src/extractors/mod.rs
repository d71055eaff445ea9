// src/extractors/mod.rs
pub mod records;
pub mod summary;
pub mod tracking;

// Re-export key extraction types for convenience
pub use records::{
    BallFrameRecord, ExtractedData, InterceptionRecord, PassRecord, PlayerFrameRecord,
    SpeedRecord, TeamPossessionRecord,
};
pub use summary::AnalysisSummary;
pub use tracking::{frame_timestamp, DataExtractor, BALL_TRACK_ID, FRAME_RATE};
