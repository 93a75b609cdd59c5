//! Persist the game between runs (XDG config or ~/.config/powermerge).

use crate::board::Board;
use crate::progress::Progress;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DIRNAME: &str = "powermerge";
const FILENAME: &str = "save.json";

/// Save format version written by this build.
pub const SAVE_VERSION: u32 = 1;

/// Everything needed to pick a game back up. The board is restored, not regenerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub version: u32,
    #[serde(flatten)]
    pub progress: Progress,
    pub board: Board,
}

impl SaveRecord {
    pub fn new(board: Board, progress: Progress) -> Self {
        Self {
            version: SAVE_VERSION,
            progress,
            board,
        }
    }
}

/// Returns the default save path (config dir / powermerge / save.json).
pub fn default_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join(DIRNAME).join(FILENAME)
}

/// JSON file holding one [`SaveRecord`].
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<SaveRecord>> {
        let content = match fs::read(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        let record: SaveRecord = serde_json::from_slice(&content)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        if record.version > SAVE_VERSION {
            bail!(
                "{} was written by a newer version (format {})",
                self.path.display(),
                record.version
            );
        }
        Ok(Some(record))
    }

    /// Writes the record, creating the parent directory if needed.
    ///
    /// The file is written beside the target and renamed over it, so a failed
    /// save leaves the previous one intact.
    pub fn save(&self, record: &SaveRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_vec_pretty(record)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    /// Removes the save. Missing file is fine.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}
