// src/lib.rs
//! Turns per-frame basketball tracking output into flat record tables
//! (JSON, CSV, XLSX) plus a summary report.

pub mod analysis;
pub mod extractors;
pub mod storage;
pub mod utils;

pub use analysis::AnalysisBundle;
pub use extractors::{AnalysisSummary, DataExtractor, ExtractedData};
pub use storage::{AnalysisExport, StorageManager};
pub use utils::AppError;
