//! Preferences store: body-part annotations and the selected style vibe.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use silhouette_core::preference::Annotation;
use silhouette_core::style::StyleVibe;
use silhouette_core::types::{EpochMillis, Timestamp};
use tokio::sync::Mutex;

use crate::{ensure_dir, read_json, write_atomic, write_json, Clock, DiskError};

const LATEST_PREFERENCES: &str = "latest.json";
const LATEST_PREFERENCES_TEXT: &str = "latest.txt";
const LATEST_STYLE_VIBE: &str = "latest_style_vibe.json";
const LATEST_STYLE_VIBE_TEXT: &str = "latest_style_vibe.txt";

/// One saved set of annotations, in the order the user made them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSet {
    pub timestamp: EpochMillis,
    pub preferences: Vec<Annotation>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleVibeRecord {
    pub timestamp: EpochMillis,
    pub vibe: StyleVibe,
    pub created_at: Timestamp,
}

/// Filesystem-backed preference persistence.
pub struct PreferencesStore {
    dir: PathBuf,
    clock: Mutex<Clock>,
}

impl PreferencesStore {
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

    /// Persist an annotation set and make it the latest.
    pub async fn save(&self, preferences: Vec<Annotation>) -> Result<PreferenceSet, DiskError> {
        let mut clock = self.clock.lock().await;
        let set = PreferenceSet {
            timestamp: clock.next(),
            preferences,
            created_at: Utc::now(),
        };

        let text = render_preferences(&set);
        self.write_pair(
            &format!("preferences_{}", set.timestamp),
            LATEST_PREFERENCES,
            LATEST_PREFERENCES_TEXT,
            &set,
            &text,
        )
        .await?;

        tracing::info!(
            timestamp = set.timestamp,
            count = set.preferences.len(),
            "Preferences saved",
        );
        Ok(set)
    }

    pub async fn latest(&self) -> Result<Option<PreferenceSet>, DiskError> {
        read_json(&self.dir.join(LATEST_PREFERENCES)).await
    }

    /// Persist the selected style vibe and make it the latest.
    pub async fn save_style_vibe(&self, vibe: StyleVibe) -> Result<StyleVibeRecord, DiskError> {
        let mut clock = self.clock.lock().await;
        let record = StyleVibeRecord {
            timestamp: clock.next(),
            vibe,
            created_at: Utc::now(),
        };

        let text = format!(
            "Selected Style Vibe: {}\nSaved at: {}\n",
            record.vibe,
            record.created_at.to_rfc3339(),
        );
        self.write_pair(
            &format!("style_vibe_{}", record.timestamp),
            LATEST_STYLE_VIBE,
            LATEST_STYLE_VIBE_TEXT,
            &record,
            &text,
        )
        .await?;

        tracing::info!(timestamp = record.timestamp, vibe = %record.vibe, "Style vibe saved");
        Ok(record)
    }

    pub async fn latest_style_vibe(&self) -> Result<Option<StyleVibeRecord>, DiskError> {
        read_json(&self.dir.join(LATEST_STYLE_VIBE)).await
    }

    /// Write `<stem>.json` and `<stem>.txt`, then the two latest files.
    async fn write_pair<T: Serialize>(
        &self,
        stem: &str,
        latest_json: &str,
        latest_text: &str,
        value: &T,
        text: &str,
    ) -> Result<(), DiskError> {
        write_json(&self.dir.join(format!("{stem}.json")), value).await?;
        write_atomic(&self.dir.join(format!("{stem}.txt")), text.as_bytes()).await?;
        write_atomic(&self.dir.join(latest_text), text.as_bytes()).await?;
        write_json(&self.dir.join(latest_json), value).await
    }
}

fn render_preferences(set: &PreferenceSet) -> String {
    let mut text = String::from("User Style Preferences:\n\n");
    for (i, annotation) in set.preferences.iter().enumerate() {
        let _ = write!(
            text,
            "{}. Body Part: {}\n   Comment: {}\n\n",
            i + 1,
            annotation.body_part,
            annotation.comment,
        );
    }
    let _ = writeln!(text, "Saved at: {}", set.created_at.to_rfc3339());
    text
}
