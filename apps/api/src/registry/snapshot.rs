use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::matching::models::SourceDocument;

/// The on-disk announcement snapshot plus the copy requests read from.
///
/// Readers clone the inner `Arc` and keep a consistent document for the whole
/// request even if a refresh lands meanwhile.
#[derive(Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    current: Arc<RwLock<Arc<SourceDocument>>>,
    /// Held from the disk write through the swap, so concurrent replaces
    /// leave disk and memory holding the same document.
    replacing: Arc<Mutex<()>>,
}

impl SnapshotStore {
    /// Loads the snapshot at `path`. A missing file starts the store empty;
    /// an unreadable one is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let document = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<SourceDocument>(&raw).map_err(|e| {
                AppError::Snapshot(format!("{} is not a valid snapshot: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "No snapshot at {}; starting empty until /api/refresh-data runs",
                    path.display()
                );
                SourceDocument::default()
            }
            Err(e) => {
                return Err(AppError::Snapshot(format!(
                    "read {}: {e}",
                    path.display()
                )))
            }
        };

        info!(
            "Loaded snapshot from {} ({} programs)",
            path.display(),
            document.program_count()
        );
        Ok(Self {
            path,
            current: Arc::new(RwLock::new(Arc::new(document))),
            replacing: Arc::new(Mutex::new(())),
        })
    }

    pub async fn current(&self) -> Arc<SourceDocument> {
        self.current.read().await.clone()
    }

    /// Writes `document` to disk, then makes it the current snapshot.
    /// On a write failure the previous snapshot stays in place.
    pub async fn replace(&self, document: SourceDocument) -> Result<(), AppError> {
        let path = self.path.clone();
        let json = serde_json::to_vec_pretty(&document)
            .map_err(|e| AppError::Snapshot(format!("serialize snapshot: {e}")))?;

        let _replacing = self.replacing.lock().await;
        tokio::task::spawn_blocking(move || write_atomic(&path, &json))
            .await
            .map_err(|e| AppError::Internal(e.into()))??;

        let programs = document.program_count();
        *self.current.write().await = Arc::new(document);
        info!(
            "Snapshot replaced at {} ({} programs)",
            self.path.display(),
            programs
        );
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::Snapshot(format!("create {}: {e}", dir.display())))?;

    // Same directory as the target so the rename never crosses filesystems.
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| AppError::Snapshot(format!("temp file in {}: {e}", dir.display())))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| AppError::Snapshot(format!("write temp snapshot: {e}")))?;
    tmp.persist(path)
        .map_err(|e| AppError::Snapshot(format!("persist {}: {}", path.display(), e.error)))?;
    Ok(())
}
