// src/storage/mod.rs
pub mod tabular;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};

use crate::extractors::records::ExtractedData;
use crate::utils::error::StorageError;
use tabular::{Cell, Table};

/// Header block of the structured export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub extraction_time: String,
    /// Rough estimate: player records divided by ten.
    pub total_frames: usize,
    pub total_players: usize,
    pub total_passes: usize,
    pub total_interceptions: usize,
}

impl ExportMetadata {
    pub fn describe(data: &ExtractedData) -> Self {
        let players: HashSet<_> = data.player_data.iter().map(|p| &p.player_id).collect();
        Self {
            extraction_time: Local::now().to_rfc3339(),
            total_frames: data.player_data.len() / 10,
            total_players: players.len(),
            total_passes: data.pass_data.len(),
            total_interceptions: data.interception_data.len(),
        }
    }
}

/// Root object of the structured export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisExport {
    pub metadata: ExportMetadata,
    #[serde(flatten)]
    pub data: ExtractedData,
}

/// Borrowed form of [`AnalysisExport`] used when writing.
#[derive(Serialize)]
struct AnalysisExportRef<'a> {
    metadata: ExportMetadata,
    #[serde(flatten)]
    data: &'a ExtractedData,
}

/// File stem used when the caller does not name the output.
pub fn default_stem() -> String {
    format!("basketball_analysis_{}", Local::now().format("%Y%m%d_%H%M%S"))
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Saves metadata plus all six collections as one pretty-printed JSON file
    pub fn save_json(
        &self,
        data: &ExtractedData,
        filename: Option<&str>,
    ) -> Result<PathBuf, StorageError> {
        let filename = filename
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}.json", default_stem()));
        let file_path = self.base_dir.join(filename);

        let export = AnalysisExportRef {
            metadata: ExportMetadata::describe(data),
            data,
        };
        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, json).map_err(StorageError::IoError)?;

        tracing::info!("Data saved to JSON: {}", file_path.display());
        Ok(file_path)
    }

    /// Reads a file written by [`StorageManager::save_json`]
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<AnalysisExport, StorageError> {
        let raw = fs::read_to_string(path.as_ref()).map_err(StorageError::IoError)?;
        serde_json::from_str(&raw).map_err(|e| StorageError::SerializationError(e.to_string()))
    }

    /// Saves each non-empty collection to `<prefix>_<collection>.csv`
    pub fn save_csv(
        &self,
        data: &ExtractedData,
        filename_prefix: Option<&str>,
    ) -> Result<Vec<PathBuf>, StorageError> {
        let prefix = filename_prefix
            .map(str::to_string)
            .unwrap_or_else(default_stem);

        let mut saved_files = Vec::new();
        for table in data.tables().iter().filter(|t| !t.is_empty()) {
            let file_path = self.base_dir.join(format!("{}_{}.csv", prefix, table.name));
            write_csv_table(&file_path, table)?;

            tracing::info!("{} saved to CSV: {}", table.name, file_path.display());
            saved_files.push(file_path);
        }

        Ok(saved_files)
    }

    /// Saves each non-empty collection as a sheet of one workbook
    pub fn save_excel(
        &self,
        data: &ExtractedData,
        filename: Option<&str>,
    ) -> Result<PathBuf, StorageError> {
        let filename = filename
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}.xlsx", default_stem()));
        let file_path = self.base_dir.join(filename);

        let tables: Vec<Table> = data.tables().into_iter().filter(|t| !t.is_empty()).collect();
        if tables.is_empty() {
            return Err(StorageError::EmptyWorkbook(file_path.display().to_string()));
        }

        let mut workbook = Workbook::new();
        for table in &tables {
            write_sheet(&mut workbook, table)?;
        }
        workbook.save(&file_path)?;

        tracing::info!("Data saved to Excel: {} ({} sheets)", file_path.display(), tables.len());
        Ok(file_path)
    }
}

fn write_csv_table(path: &Path, table: &Table) -> Result<(), StorageError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(Cell::to_field))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_sheet(workbook: &mut Workbook, table: &Table) -> Result<(), StorageError> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(table.sheet_name)?;

    for (col, name) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }

    for (index, row) in table.rows.iter().enumerate() {
        let row_num = (index + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Integer(n) => {
                    worksheet.write_number(row_num, col, *n as f64)?;
                }
                Cell::Number(x) => match tabular::non_finite_token(*x) {
                    Some(token) => {
                        worksheet.write_string(row_num, col, token)?;
                    }
                    None => {
                        worksheet.write_number(row_num, col, *x)?;
                    }
                },
                Cell::Flag(b) => {
                    worksheet.write_boolean(row_num, col, *b)?;
                }
                Cell::Text(s) => {
                    worksheet.write_string(row_num, col, s.as_str())?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::EventId;
    use crate::extractors::records::{PassRecord, SpeedRecord};
    use tempfile::tempdir;

    fn pass(pass_id: u64) -> PassRecord {
        PassRecord {
            pass_id: pass_id.into(),
            start_frame: Some(30),
            end_frame: Some(60),
            passer_id: Some("p1".into()),
            receiver_id: None,
            passer_team: Some("Home".into()),
            receiver_team: None,
            pass_type: "Unknown".into(),
            start_timestamp: 1.0,
            end_timestamp: 2.0,
            duration: 1.0,
        }
    }

    #[test]
    fn creates_nested_base_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = StorageManager::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(storage.base_dir(), nested.as_path());
    }

    #[test]
    fn default_stem_embeds_timestamp() {
        let stem = default_stem();
        let stamp = stem.strip_prefix("basketball_analysis_").unwrap();
        assert_eq!(stamp.len(), "YYYYMMDD_HHMMSS".len());
        assert_eq!(stamp.as_bytes()[8], b'_');
    }

    #[test]
    fn metadata_uses_rough_frame_estimate() {
        let data = ExtractedData {
            pass_data: vec![pass(0), pass(1)],
            ..Default::default()
        };
        let metadata = ExportMetadata::describe(&data);
        assert_eq!(metadata.total_frames, 0);
        assert_eq!(metadata.total_players, 0);
        assert_eq!(metadata.total_passes, 2);
    }

    #[test]
    fn csv_only_for_non_empty_collections() {
        let dir = tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let data = ExtractedData {
            pass_data: vec![pass(0)],
            ..Default::default()
        };

        let files = storage.save_csv(&data, Some("game")).unwrap();
        assert_eq!(files, vec![dir.path().join("game_pass_data.csv")]);

        let contents = fs::read_to_string(&files[0]).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("pass_id,start_frame,end_frame,passer_id,receiver_id,passer_team,receiver_team,pass_type,start_timestamp,end_timestamp,duration")
        );
        assert_eq!(lines.next(), Some("0,30,60,p1,,Home,,Unknown,1.0,2.0,1.0"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn workbook_requires_data() {
        let dir = tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();

        let err = storage
            .save_excel(&ExtractedData::default(), Some("empty.xlsx"))
            .unwrap_err();
        assert!(matches!(err, StorageError::EmptyWorkbook(_)));
        assert!(!dir.path().join("empty.xlsx").exists());
    }

    #[test]
    fn workbook_is_written() {
        let dir = tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let data = ExtractedData {
            pass_data: vec![pass(0), pass(1)],
            ..Default::default()
        };

        let path = storage.save_excel(&data, Some("game.xlsx")).unwrap();
        let bytes = fs::read(&path).unwrap();
        // xlsx is a zip container
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn overflowing_speeds_survive_reload() {
        let dir = tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let speed_mps = 1e308;
        let mut text_id = pass(0);
        text_id.pass_id = EventId::Text("a1".into());
        let data = ExtractedData {
            pass_data: vec![text_id],
            speed_data: vec![SpeedRecord {
                frame: 0,
                player_id: "p1".into(),
                speed_mps,
                speed_kmh: speed_mps * 3.6,
                timestamp: 0.0,
            }],
            ..Default::default()
        };
        assert!(data.speed_data[0].speed_kmh.is_infinite());

        let path = storage.save_json(&data, Some("fast.json")).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains(r#""speed_kmh": "Infinity""#));

        let reloaded = StorageManager::load_json(&path).unwrap();
        assert_eq!(reloaded.data, data);

        let files = storage.save_csv(&data, Some("fast")).unwrap();
        let speeds = fs::read_to_string(&files[1]).unwrap();
        assert!(speeds.lines().nth(1).unwrap().contains(",Infinity,"));
        assert!(storage.save_excel(&data, Some("fast.xlsx")).is_ok());
    }
}
