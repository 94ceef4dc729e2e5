use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::UserDirs;
use tracing::{debug, warn};

use crate::error::ArchiveError;

/// Persists a finished bundle somewhere the user can find it.
pub trait SaveTarget: Send + Sync {
    /// Store `bundle` under `file_name` and return where it landed.
    fn save(&self, file_name: &str, bundle: &[u8]) -> Result<PathBuf, ArchiveError>;
}

/// Name used when nothing usable is left after sanitizing.
const FALLBACK_FILE_NAME: &str = "photos.zip";

/// Replace characters that are not allowed in a single file name on common
/// platforms. Separators included, so the result never leaves the folder.
fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.trim_matches('.').is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Saves into a folder, browser style: an existing `x.zip` leaves the new
/// bundle at `x (1).zip`.
#[derive(Debug, Clone)]
pub struct DownloadFolder {
    dir: PathBuf,
}

impl DownloadFolder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Configured folder, else the user's Downloads folder, else the working
    /// directory.
    pub fn resolve(configured: Option<PathBuf>) -> Self {
        let dir = configured
            .or_else(|| UserDirs::new().and_then(|dirs| dirs.download_dir().map(Path::to_path_buf)))
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn available_path(&self, file_name: &str) -> PathBuf {
        let candidate = self.dir.join(file_name);
        if !candidate.exists() {
            return candidate;
        }

        let (stem, ext) = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (file_name, None),
        };
        (1..)
            .map(|n| match ext {
                Some(ext) => self.dir.join(format!("{stem} ({n}).{ext}")),
                None => self.dir.join(format!("{stem} ({n})")),
            })
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }
}

impl SaveTarget for DownloadFolder {
    fn save(&self, file_name: &str, bundle: &[u8]) -> Result<PathBuf, ArchiveError> {
        fs::create_dir_all(&self.dir).map_err(|source| ArchiveError::Save {
            path: self.dir.clone(),
            source,
        })?;

        let file_name = sanitize_file_name(file_name);
        let target = self.available_path(&file_name);
        // Written beside the target so the final rename stays on one filesystem.
        let staging = self.dir.join(format!(".{file_name}.part"));

        let result = fs::write(&staging, bundle).and_then(|_| fs::rename(&staging, &target));
        if let Err(source) = result {
            if staging.exists() {
                if let Err(cleanup) = fs::remove_file(&staging) {
                    warn!(path = %staging.display(), error = %cleanup, "could not remove staging file");
                }
            }
            return Err(ArchiveError::Save {
                path: target,
                source,
            });
        }

        debug!(path = %target.display(), bytes = bundle.len(), "bundle saved");
        Ok(target)
    }
}
