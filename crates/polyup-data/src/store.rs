//! JSON file implementation of the save-store contract.
//!
//! One file per player under a root directory. A missing file means a fresh
//! player; a failed write leaves any previous save intact because the
//! snapshot is written to a temporary file first and renamed into place.

use polyup_core::id::PlayerId;
use polyup_core::persist::{PersistError, SaveSnapshot, SaveStore};
use std::path::{Path, PathBuf};

/// Per-player JSON save files under a root directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, player: &PlayerId) -> PathBuf {
        // Player ids are flat names; escape separators so an id can never
        // address a file outside the root.
        let name: String = player
            .as_str()
            .chars()
            .map(|c| if c == '/' || c == '\\' || c == '.' { '_' } else { c })
            .collect();
        self.root.join(format!("{name}.json"))
    }
}

impl SaveStore for JsonFileStore {
    fn save(&mut self, player: &PlayerId, snapshot: &SaveSnapshot) -> Result<(), PersistError> {
        let json =
            serde_json::to_string_pretty(snapshot).map_err(|e| PersistError::Encode {
                detail: e.to_string(),
            })?;
        let path = self.path_for(player);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn load(&mut self, player: &PlayerId) -> Result<Option<SaveSnapshot>, PersistError> {
        let path = self.path_for(player);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: SaveSnapshot =
            serde_json::from_str(&content).map_err(|e| PersistError::Decode {
                detail: e.to_string(),
            })?;
        snapshot.validate()?;
        Ok(Some(snapshot))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
