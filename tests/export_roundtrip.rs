use std::fs;

use hoops_extract::analysis::PlayerId;
use hoops_extract::{AnalysisBundle, DataExtractor, StorageManager};
use tempfile::tempdir;

const BUNDLE: &str = r#"{
    "frame_numbers": [0, 15, 30],
    "player_tracks": [
        {"1": {"bbox": [10.5, 20.0, 40.25, 90.0]}, "2": {"bbox": [100, 20, 130, 95]}},
        {"1": {"bbox": [12.0, 21.0, 42.0, 91.0]}, "2": {"bbox": [101, 22]}},
        {"1": {"bbox": [14.0, 22.0, 44.0, 92.0]}, "3": {"bbox": [0, 0, 1, 1]}}
    ],
    "player_assignment": [{"1": 1, "2": 2}, {"1": 1, "2": 2}, {"1": 1}],
    "ball_acquisition": [[1], {"2": 0.7}, -1],
    "ball_tracks": [{"1": {"bbox": [30, 40, 34, 44]}}, {}, {"1": {"bbox": [50, 50, 56, 58]}}],
    "passes": [{"start_frame": 0, "end_frame": 15, "passer_id": 1, "receiver_id": 2, "passer_team": 1, "receiver_team": 2}],
    "interceptions": [{"frame": 15, "interceptor_id": 2, "interceptor_team": 2, "original_team": 1}],
    "player_speeds": [{"1": 4.2, "2": 0.1}, {"1": 3.3}, {"1": null}]
}"#;

fn extracted(dir: &std::path::Path) -> DataExtractor {
    let bundle_path = dir.join("bundle.json");
    fs::write(&bundle_path, BUNDLE).unwrap();
    let bundle = AnalysisBundle::from_path(&bundle_path).unwrap();

    let mut extractor = DataExtractor::new(dir.join("extracted_data")).unwrap();
    extractor.extract_all(&bundle);
    extractor
}

#[test]
fn structured_file_round_trips() {
    let dir = tempdir().unwrap();
    let extractor = extracted(dir.path());

    let path = extractor.save_to_json(Some("game.json")).unwrap();
    assert_eq!(path, dir.path().join("extracted_data").join("game.json"));

    let reloaded = StorageManager::load_json(&path).unwrap();
    assert_eq!(&reloaded.data, extractor.data());
    assert_eq!(reloaded.metadata.total_players, 3);
    assert_eq!(reloaded.metadata.total_passes, 1);
    assert_eq!(reloaded.metadata.total_interceptions, 1);
    assert_eq!(reloaded.metadata.total_frames, 0);

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    for key in [
        "metadata",
        "player_data",
        "ball_data",
        "pass_data",
        "interception_data",
        "speed_data",
        "team_possession_data",
    ] {
        assert!(raw.get(key).is_some(), "missing {}", key);
    }
    assert!(raw["player_data"][3]["x_min"].is_null());
}

#[test]
fn every_collection_gets_a_csv() {
    let dir = tempdir().unwrap();
    let extractor = extracted(dir.path());

    let files = extractor.save_to_csv(Some("game")).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "game_player_data.csv",
            "game_ball_data.csv",
            "game_pass_data.csv",
            "game_interception_data.csv",
            "game_speed_data.csv",
            "game_team_possession_data.csv",
        ]
    );

    let players = fs::read_to_string(&files[0]).unwrap();
    let header = players.lines().next().unwrap();
    assert_eq!(header, "frame,player_id,team,x_min,y_min,x_max,y_max,has_ball,timestamp");
    assert_eq!(players.lines().count(), 1 + 6);
}

#[test]
fn workbook_and_summary() {
    let dir = tempdir().unwrap();
    let extractor = extracted(dir.path());

    let path = extractor.save_to_excel(None).unwrap();
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("basketball_analysis_"));
    assert!(name.ends_with(".xlsx"));

    let summary = extractor.summary();
    assert_eq!(summary.total_frames_analyzed, 3);
    assert_eq!(summary.total_players_detected, 3);
    assert_eq!(summary.total_ball_detections, 2);
    assert_eq!(summary.total_speed_measurements, 3);
    assert_eq!(summary.analysis_duration_seconds, 1.0);
    assert_eq!(summary.teams_detected, vec!["1", "2"]);

    let averages = summary.average_player_speeds.unwrap();
    assert_eq!(averages.len(), 2);
    assert_eq!(averages[&PlayerId::from("2")], 0.1);
}
