//! Filesystem persistence for captures and user preferences.
//!
//! Both stores keep timestamped records plus a fixed-name "latest"
//! sentinel. Writes within one store are serialised by an async mutex and
//! every file is replaced atomically (write to a temp file, then rename),
//! so a reader never sees a half-written record.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use silhouette_core::error::CoreError;
use silhouette_core::types::EpochMillis;

pub mod capture;
pub mod preferences;

pub use capture::{Capture, CaptureRecord, CaptureStore, GeneratedFile};
pub use preferences::{PreferenceSet, PreferencesStore, StyleVibeRecord};

/// Errors from the filesystem stores.
#[derive(Debug, thiserror::Error)]
pub enum DiskError {
    /// Input rejected before anything was written.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record at {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Strictly increasing millisecond timestamps for file keys.
///
/// Two saves within the same millisecond still get distinct, ordered keys.
#[derive(Debug, Default)]
pub(crate) struct Clock {
    last: EpochMillis,
}

impl Clock {
    pub(crate) fn next(&mut self) -> EpochMillis {
        let now = Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        self.last
    }
}

/// Create `dir` (and parents) if missing.
pub(crate) async fn ensure_dir(dir: &Path) -> Result<(), DiskError> {
    tokio::fs::create_dir_all(dir).await.map_err(|source| DiskError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Replace `path` with `contents` via a sibling temp file and a rename.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), DiskError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|source| DiskError::Io {
            path: tmp.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| DiskError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Serialize `value` as pretty JSON and write it atomically.
pub(crate) async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DiskError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| DiskError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &bytes).await
}

/// Read and parse a JSON file. A missing file yields `Ok(None)`.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DiskError> {
    let Some(bytes) = read_optional(path).await? else {
        return Ok(None);
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| DiskError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Read a file. A missing file yields `Ok(None)`.
pub(crate) async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, DiskError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(DiskError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
