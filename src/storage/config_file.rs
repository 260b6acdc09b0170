// Config file persistence module
// Writes the uploaded document to disk as pretty-printed JSON

use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::SaveError;

/// Config file writer
///
/// Saves are serialized through `write_lock`, so two concurrent uploads never
/// interleave bytes in the file. Whichever save takes the lock last wins.
pub struct ConfigStore {
    /// Target file
    path: PathBuf,
    /// Write-to-temp-then-rename instead of truncating in place
    atomic_writes: bool,
    write_lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, atomic_writes: bool) -> Self {
        Self {
            path: path.into(),
            atomic_writes,
            write_lock: Mutex::new(()),
        }
    }

    /// Overwrite the config file with `document`
    pub async fn save(&self, document: &Value) -> Result<(), SaveError> {
        let content = render_document(document)?;

        let _guard = self.write_lock.lock().await;
        if self.atomic_writes {
            self.replace_atomically(content.as_bytes()).await
        } else {
            fs::write(&self.path, content)
                .await
                .map_err(|source| self.write_error(source))
        }
    }

    async fn replace_atomically(&self, content: &[u8]) -> Result<(), SaveError> {
        let tmp_path = temp_path_for(&self.path);

        let written = async {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(content).await?;
            file.sync_all().await?;
            fs::rename(&tmp_path, &self.path).await
        }
        .await;

        if let Err(source) = written {
            // Best effort, the temp file may not exist yet
            let _ = fs::remove_file(&tmp_path).await;
            return Err(self.write_error(source));
        }
        Ok(())
    }

    fn write_error(&self, source: std::io::Error) -> SaveError {
        SaveError::Write {
            path: self.path.clone(),
            source,
        }
    }

    /// Get config file path
    #[allow(clippy::missing_const_for_fn)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Pretty-print with 2-space indentation, no trailing newline
fn render_document(document: &Value) -> Result<String, SaveError> {
    serde_json::to_string_pretty(document).map_err(SaveError::Serialize)
}

/// `dir/config.json` -> `dir/.config.json.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "config".to_string(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.tmp"))
}
