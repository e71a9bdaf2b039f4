use crate::index::TrackIndex;
use crate::{LibraryError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk location of a saved [`TrackIndex`].
///
/// The index is stored as pretty-printed JSON, by default at
/// `~/.local/share/baton/library.json`. Saves go through a temporary file in
/// the same directory followed by a rename, so an interrupted save never
/// leaves a truncated library behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryStore {
    path: PathBuf,
}

impl LibraryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The store in the XDG data directory.
    ///
    /// Returns a path like: `~/.local/share/baton/library.json`
    pub fn default_location() -> Result<Self> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            LibraryError::Config("Cannot determine XDG data directory".to_string())
        })?;
        Ok(Self::new(data_dir.join("baton").join("library.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write `index`, creating parent directories as needed.
    pub fn save(&self, index: &TrackIndex) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(index)?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, json)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        log::debug!(
            "Saved {} tracks to: {}",
            index.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Read a previously saved index.
    pub fn load(&self) -> Result<TrackIndex> {
        let json = fs::read_to_string(&self.path)?;
        let index: TrackIndex = serde_json::from_str(&json)?;
        log::debug!(
            "Loaded {} tracks from: {}",
            index.len(),
            self.path.display()
        );
        Ok(index)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "library.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
