//! Capture store: camera snapshots and their style analysis.
//!
//! Layout under the captures directory:
//!
//! ```text
//! capture_<ts>.png     snapshot image
//! capture_<ts>.json    CaptureRecord
//! capture_<ts>.txt     text rendering of the analysis, for prompts
//! latest.txt           copy of the newest capture_<ts>.txt
//! latest.json          sentinel naming the newest capture
//! generated_<ts>.<ext> edited photos
//! ```

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use silhouette_core::analysis::StyleAnalysis;
use silhouette_core::error::CoreError;
use silhouette_core::types::{EpochMillis, Timestamp};
use tokio::sync::Mutex;

use crate::{ensure_dir, read_json, read_optional, write_atomic, write_json, Clock, DiskError};

/// Public URL prefix under which the captures directory is served.
pub const CAPTURES_URL_PREFIX: &str = "/captures";

const LATEST_POINTER: &str = "latest.json";
const LATEST_TEXT: &str = "latest.txt";
const CAPTURE_PREFIX: &str = "capture_";

/// Persisted metadata of one capture (`capture_<ts>.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRecord {
    pub timestamp: EpochMillis,
    /// Image file name, relative to the captures directory.
    pub snapshot_path: String,
    pub snapshot_url: String,
    pub style_analysis: StyleAnalysis,
    pub created_at: Timestamp,
}

/// A capture read back from disk, with its snapshot bytes.
#[derive(Debug, Clone)]
pub struct Capture {
    pub record: CaptureRecord,
    /// `None` when the image file has gone missing.
    pub snapshot: Option<Vec<u8>>,
}

/// A generated photo written next to the captures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFile {
    pub file_name: String,
    pub url: String,
}

/// Contents of the `latest.json` sentinel.
#[derive(Debug, Serialize, Deserialize)]
struct LatestPointer {
    timestamp: EpochMillis,
    record: CaptureRecord,
}

/// Filesystem-backed capture persistence.
pub struct CaptureStore {
    dir: PathBuf,
    clock: Mutex<Clock>,
}

impl CaptureStore {
    /// Open (and create if needed) the captures directory.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, DiskError> {
        let dir = dir.into();
        ensure_dir(&dir).await?;
        Ok(Self {
            dir,
            clock: Mutex::new(Clock::default()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a snapshot and its analysis, then point `latest` at it.
    ///
    /// The sentinel is written last, so `latest()` only ever sees a capture
    /// whose files are complete.
    pub async fn save(
        &self,
        snapshot: &[u8],
        analysis: StyleAnalysis,
    ) -> Result<CaptureRecord, DiskError> {
        if snapshot.is_empty() {
            return Err(CoreError::Validation("Snapshot must not be empty".into()).into());
        }

        let mut clock = self.clock.lock().await;
        let timestamp = clock.next();

        let image_name = format!("{CAPTURE_PREFIX}{timestamp}.png");
        write_atomic(&self.dir.join(&image_name), snapshot).await?;

        let record = CaptureRecord {
            timestamp,
            snapshot_url: format!("{CAPTURES_URL_PREFIX}/{image_name}"),
            snapshot_path: image_name,
            style_analysis: analysis,
            created_at: Utc::now(),
        };
        write_json(&self.record_path(timestamp), &record).await?;

        let text = render_analysis(&record);
        write_atomic(
            &self.dir.join(format!("{CAPTURE_PREFIX}{timestamp}.txt")),
            text.as_bytes(),
        )
        .await?;
        write_atomic(&self.dir.join(LATEST_TEXT), text.as_bytes()).await?;

        let pointer = LatestPointer { timestamp, record };
        write_json(&self.dir.join(LATEST_POINTER), &pointer).await?;
        let record = pointer.record;

        tracing::info!(
            timestamp,
            bytes = snapshot.len(),
            dir = %self.dir.display(),
            "Capture saved",
        );
        Ok(record)
    }

    /// The most recent capture, with its snapshot re-read from disk.
    pub async fn latest(&self) -> Result<Option<Capture>, DiskError> {
        let record = match read_json::<LatestPointer>(&self.dir.join(LATEST_POINTER)).await? {
            Some(pointer) => pointer.record,
            None => {
                let Some(timestamp) = self.scan_newest().await? else {
                    return Ok(None);
                };
                let Some(record) = read_json::<CaptureRecord>(&self.record_path(timestamp)).await?
                else {
                    return Ok(None);
                };
                record
            }
        };
        let timestamp = record.timestamp;

        let image_path = self.dir.join(format!("{CAPTURE_PREFIX}{timestamp}.png"));
        let snapshot = read_optional(&image_path).await?;
        if snapshot.is_none() {
            tracing::warn!(timestamp, path = %image_path.display(), "Capture image is missing");
        }

        Ok(Some(Capture { record, snapshot }))
    }

    /// Text rendering of the latest capture's analysis.
    pub async fn latest_text(&self) -> Result<Option<String>, DiskError> {
        Ok(read_optional(&self.dir.join(LATEST_TEXT))
            .await?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Write an edited photo as `generated_<ts>.<ext>`.
    pub async fn save_generated(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<GeneratedFile, DiskError> {
        let mut clock = self.clock.lock().await;
        let timestamp = clock.next();
        let file_name = format!("generated_{timestamp}.{}", extension_for(mime_type));
        write_atomic(&self.dir.join(&file_name), bytes).await?;

        tracing::info!(file_name = %file_name, bytes = bytes.len(), "Generated photo saved");
        Ok(GeneratedFile {
            url: format!("{CAPTURES_URL_PREFIX}/{file_name}"),
            file_name,
        })
    }

    fn record_path(&self, timestamp: EpochMillis) -> PathBuf {
        self.dir.join(format!("{CAPTURE_PREFIX}{timestamp}.json"))
    }

    /// Find the newest `capture_<ts>.json` by its key.
    ///
    /// Only used for directories written before the sentinel existed.
    async fn scan_newest(&self) -> Result<Option<EpochMillis>, DiskError> {
        let io_err = |source| DiskError::Io {
            path: self.dir.clone(),
            source,
        };
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(io_err)?;
        let mut newest: Option<EpochMillis> = None;
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let name = entry.file_name();
            let ts = name
                .to_str()
                .and_then(|n| n.strip_prefix(CAPTURE_PREFIX))
                .and_then(|n| n.strip_suffix(".json"))
                .and_then(|n| n.parse::<EpochMillis>().ok());
            if let Some(ts) = ts {
                newest = Some(newest.map_or(ts, |cur| cur.max(ts)));
            }
        }
        Ok(newest)
    }
}

/// Text rendering of a capture's analysis for prompt construction.
fn render_analysis(record: &CaptureRecord) -> String {
    let analysis = &record.style_analysis;
    format!(
        "Style Analysis:\n\nColor: {}\nStyle: {}\nItem Category: {}\n\nCaptured at: {}\n",
        analysis.color().unwrap_or("unknown"),
        analysis.style().unwrap_or("unknown"),
        analysis.item_category().unwrap_or("unknown"),
        record.created_at.to_rfc3339(),
    )
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analysis() -> StyleAnalysis {
        StyleAnalysis::from_value(json!({
            "color": "navy",
            "style": "formal",
            "itemCategory": "tops"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn empty_store_has_no_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaptureStore::open(dir.path()).await.unwrap();
        assert!(store.latest().await.unwrap().is_none());
        assert!(store.latest_text().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_latest_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaptureStore::open(dir.path()).await.unwrap();
        let snapshot = vec![0x89, b'P', b'N', b'G', 0, 1, 2, 255];

        let saved = store.save(&snapshot, analysis()).await.unwrap();
        let latest = store.latest().await.unwrap().unwrap();

        assert_eq!(latest.record, saved);
        assert_eq!(latest.record.style_analysis, analysis());
        assert_eq!(latest.snapshot.as_deref(), Some(snapshot.as_slice()));
        assert_eq!(
            latest.record.snapshot_url,
            format!("/captures/capture_{}.png", saved.timestamp)
        );
    }

    #[tokio::test]
    async fn record_does_not_leak_the_server_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaptureStore::open(dir.path()).await.unwrap();

        let saved = store.save(b"img", analysis()).await.unwrap();

        assert_eq!(saved.snapshot_path, format!("capture_{}.png", saved.timestamp));
        let raw = std::fs::read_to_string(dir.path().join(LATEST_POINTER)).unwrap();
        assert!(!raw.contains(&*dir.path().to_string_lossy()));
    }

    #[tokio::test]
    async fn second_capture_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaptureStore::open(dir.path()).await.unwrap();

        store.save(b"first", analysis()).await.unwrap();
        let second = store.save(b"second", analysis()).await.unwrap();

        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest.record.timestamp, second.timestamp);
        assert_eq!(latest.snapshot.as_deref(), Some(&b"second"[..]));
    }

    #[tokio::test]
    async fn empty_snapshot_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaptureStore::open(dir.path()).await.unwrap();
        let err = store.save(&[], analysis()).await.unwrap_err();
        assert!(matches!(err, DiskError::Invalid(_)));
        assert!(store.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn latest_text_renders_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaptureStore::open(dir.path()).await.unwrap();
        store.save(b"img", analysis()).await.unwrap();

        let text = store.latest_text().await.unwrap().unwrap();
        assert!(text.starts_with("Style Analysis:"));
        assert!(text.contains("Color: navy"));
        assert!(text.contains("Item Category: tops"));
    }

    #[tokio::test]
    async fn legacy_directory_falls_back_to_scan() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaptureStore::open(dir.path()).await.unwrap();
        store.save(b"old", analysis()).await.unwrap();
        let newer = store.save(b"new", analysis()).await.unwrap();
        std::fs::remove_file(dir.path().join(LATEST_POINTER)).unwrap();

        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest.record.timestamp, newer.timestamp);
    }

    #[tokio::test]
    async fn generated_photo_uses_mime_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = CaptureStore::open(dir.path()).await.unwrap();
        let file = store.save_generated(b"jpeg", "image/jpeg").await.unwrap();
        assert!(file.file_name.starts_with("generated_"));
        assert!(file.file_name.ends_with(".jpg"));
        assert_eq!(file.url, format!("/captures/{}", file.file_name));
        assert!(dir.path().join(&file.file_name).exists());
    }
}
