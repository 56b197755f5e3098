//! Local filesystem exporter.
//!
//! Files are written atomically: the content goes to a sibling `.tmp` file
//! which is then renamed over the target.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{ExportFormat, OutputConfig, ResultRow, RunStats};
use crate::storage::{ExportDocument, ExportSummary, ResultExporter, csv};
use crate::utils::time::file_stamp;

/// Writes timestamped CSV and/or JSON files into one directory.
#[derive(Debug, Clone)]
pub struct LocalExporter {
    dir: PathBuf,
    file_prefix: String,
    format: ExportFormat,
    utf8_bom: bool,
}

impl LocalExporter {
    /// Create an exporter writing CSV with a BOM into `dir`.
    pub fn new(dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_prefix: file_prefix.into(),
            format: ExportFormat::Csv,
            utf8_bom: true,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            file_prefix: config.file_prefix.clone(),
            format: config.format,
            utf8_bom: config.utf8_bom,
        }
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_bom(mut self, utf8_bom: bool) -> Self {
        self.utf8_bom = utf8_bom;
        self
    }

    /// `{dir}/{prefix}_{YYYYMMDD_HHMM}.{extension}`
    pub fn file_path(&self, stamp: &DateTime<Local>, extension: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}.{}", self.file_prefix, file_stamp(stamp), extension))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = temp_path(path);
        let written = write_then_rename(&tmp, path, bytes).await;
        if written.is_err() {
            let _ = tokio::fs::remove_file(&tmp).await;
        }
        written
    }

    async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(path, &bytes).await
    }

    /// Export with an explicit file stamp.
    pub async fn export_at(
        &self,
        rows: &[ResultRow],
        stats: &RunStats,
        stamp: &DateTime<Local>,
    ) -> Result<ExportSummary> {
        let mut files = Vec::new();

        if self.format.writes_csv() {
            let path = self.file_path(stamp, "csv");
            let text = csv::render(rows, self.utf8_bom);
            self.write_bytes(&path, text.as_bytes())
                .await
                .map_err(|e| AppError::export(path.display().to_string(), e))?;
            log::info!("CSV: {} rows written to {}", rows.len(), path.display());
            files.push(path);
        }

        if self.format.writes_json() {
            let path = self.file_path(stamp, "json");
            self.write_json(&path, &ExportDocument::new(rows, stats))
                .await
                .map_err(|e| AppError::export(path.display().to_string(), e))?;
            log::info!("JSON: {} rows written to {}", rows.len(), path.display());
            files.push(path);
        }

        Ok(ExportSummary {
            files,
            rows: rows.len(),
        })
    }
}

#[async_trait]
impl ResultExporter for LocalExporter {
    async fn export(&self, rows: &[ResultRow], stats: &RunStats) -> Result<ExportSummary> {
        self.export_at(rows, stats, &Local::now()).await
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

async fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityRecord, ChannelDetail};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn stamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 7, 1, 9, 5, 0).unwrap()
    }

    fn rows() -> Vec<ResultRow> {
        let mut detail = ChannelDetail::new("UC1", "お掃除チャンネル");
        detail.subscriber_count = Some(15_000);
        vec![ResultRow::new(&detail, &ActivityRecord::unresolved(detail.id.clone()))]
    }

    #[test]
    fn test_file_name_carries_stamp() {
        let exporter = LocalExporter::new("out", "output_youtube_channels");
        assert_eq!(
            exporter.file_path(&stamp(), "csv"),
            PathBuf::from("out/output_youtube_channels_20250701_0905.csv")
        );
    }

    #[tokio::test]
    async fn test_csv_export_with_bom() {
        let tmp = TempDir::new().unwrap();
        let exporter = LocalExporter::new(tmp.path().join("nested"), "scout");
        let stats = RunStats::started_at(Utc::now());

        let summary = exporter.export_at(&rows(), &stats, &stamp()).await.unwrap();
        assert_eq!(summary.rows, 1);
        assert_eq!(summary.files.len(), 1);

        let bytes = tokio::fs::read(&summary.files[0]).await.unwrap();
        assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("お掃除チャンネル,,https://www.youtube.com/channel/UC1,,15000"));
    }

    #[tokio::test]
    async fn test_both_formats_and_no_leftover_temp_files() {
        let tmp = TempDir::new().unwrap();
        let exporter = LocalExporter::new(tmp.path(), "scout")
            .with_format(ExportFormat::Both)
            .with_bom(false);
        let stats = RunStats::started_at(Utc::now());

        let summary = exporter.export_at(&rows(), &stats, &stamp()).await.unwrap();
        assert_eq!(summary.files.len(), 2);

        let json: serde_json::Value =
            serde_json::from_slice(&tokio::fs::read(&summary.files[1]).await.unwrap()).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["rows"][0]["channel_id"], "UC1");
        assert_eq!(json["rows"][0]["resolved_via"], "unresolved");

        let mut entries = tokio::fs::read_dir(tmp.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert!(names.iter().all(|n| !n.ends_with(".tmp")));
        assert_eq!(names.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let tmp = TempDir::new().unwrap();
        let exporter = LocalExporter::new(tmp.path(), "scout");
        let target = exporter.file_path(&stamp(), "csv");
        // A non-empty directory in the way makes the rename fail.
        tokio::fs::create_dir_all(target.join("occupied")).await.unwrap();

        let err = exporter.export_at(&rows(), &RunStats::started_at(Utc::now()), &stamp()).await;
        assert!(matches!(err, Err(AppError::Export { .. })));
        assert!(!temp_path(&target).exists());
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn test_empty_export_still_writes_header() {
        let tmp = TempDir::new().unwrap();
        let exporter = LocalExporter::new(tmp.path(), "scout").with_bom(false);
        let stats = RunStats::started_at(Utc::now());

        let summary = exporter.export(&[], &stats).await.unwrap();
        let text = tokio::fs::read_to_string(&summary.files[0]).await.unwrap();
        assert_eq!(text, format!("{}\r\n", csv::HEADER.join(",")));
    }
}
