use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use directories::ProjectDirs;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{info, warn};

use crate::error::PersistError;
use crate::history::HistoryStack;
use crate::rules::{GameKind, Rules};

type HmacSha256 = Hmac<Sha256>;

const SECRET_KEY: &[u8] = b"patience_save_key_do_not_cheat";
const HMAC_SIZE: usize = 32;

/// Bumped whenever [`SavedGame`] changes shape. Older saves are discarded.
pub const SAVE_VERSION: u32 = 1;

/// Everything persisted for one game kind. `version` must stay the first
/// field: it is peeked before the rest is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub version: u32,
    pub kind: GameKind,
    pub rules: Rules,
    pub history: HistoryStack,
}

impl SavedGame {
    pub fn new(rules: Rules, history: HistoryStack) -> Self {
        SavedGame {
            version: SAVE_VERSION,
            kind: rules.kind,
            rules,
            history,
        }
    }
}

/// Encode a save as `bincode payload || HMAC-SHA256(payload)`.
pub fn encode(saved: &SavedGame) -> Result<Vec<u8>, PersistError> {
    let mut data = bincode::serialize(saved)?;
    let mut mac = HmacSha256::new_from_slice(SECRET_KEY).map_err(|_| PersistError::Signature)?;
    mac.update(&data);
    data.extend_from_slice(&mac.finalize().into_bytes());
    Ok(data)
}

/// Verify and decode a save produced by [`encode`].
pub fn decode(data: &[u8]) -> Result<SavedGame, PersistError> {
    if data.len() < HMAC_SIZE {
        return Err(PersistError::Truncated(data.len()));
    }

    let split_idx = data.len() - HMAC_SIZE;
    let payload = &data[..split_idx];
    let signature = &data[split_idx..];

    let mut mac = HmacSha256::new_from_slice(SECRET_KEY).map_err(|_| PersistError::Signature)?;
    mac.update(payload);
    mac.verify_slice(signature)
        .map_err(|_| PersistError::Signature)?;

    let version: u32 = bincode::deserialize(payload)?;
    if version != SAVE_VERSION {
        return Err(PersistError::Version {
            found: version,
            expected: SAVE_VERSION,
        });
    }

    Ok(bincode::deserialize(payload)?)
}

/// Durable key/value storage for save payloads.
pub trait Storage {
    /// `Ok(None)` when nothing is stored under `key`.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError>;
    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), PersistError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
}

// ---------------------------------------------------------------------------
// File storage
// ---------------------------------------------------------------------------

/// One file per key inside a directory, written atomically.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    /// The platform data directory (e.g. `~/.local/share/patience`).
    pub fn platform() -> Result<Self, PersistError> {
        let proj_dirs =
            ProjectDirs::from("com", "patience", "patience").ok_or(PersistError::NoDataDir)?;
        Ok(Self::new(proj_dirs.data_dir()))
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(&path)?))
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);

        // Write to a temp file, flush it, then rename over the target so a
        // crash mid-write never leaves a half-written save behind.
        let mut temp_path = path.clone();
        temp_path.set_extension("tmp");

        let result = File::create(&temp_path).and_then(|mut temp_file| {
            temp_file.write_all(data)?;
            temp_file.sync_all()
        });
        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        fs::rename(&temp_path, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory storage
// ---------------------------------------------------------------------------

/// Storage that lives only as long as the process. Used when persistence is
/// switched off, and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, Vec<u8>>,
    /// Refuse every write, like a full quota.
    pub fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn insert(&mut self, key: &str, data: Vec<u8>) {
        self.entries.insert(key.to_string(), data);
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), PersistError> {
        if self.fail_writes {
            return Err(PersistError::Refused);
        }
        self.entries.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.entries.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Save slots
// ---------------------------------------------------------------------------

/// Per-game save slots over a [`Storage`]. Every failure is resolved here:
/// a bad save reads as "no save", a failed write is logged and dropped.
#[derive(Debug, Clone)]
pub struct SaveSlots<S: Storage> {
    storage: S,
}

impl<S: Storage> SaveSlots<S> {
    pub fn new(storage: S) -> Self {
        SaveSlots { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Storage key for a game kind.
    pub fn key(kind: GameKind) -> String {
        format!("{}.dat", kind.id())
    }

    /// The saved game for `kind`, if one exists and checks out.
    pub fn load(&self, kind: GameKind) -> Option<SavedGame> {
        match self.try_load(kind) {
            Ok(Some(saved)) => {
                info!(kind = kind.id(), seed = saved.history.initial().seed, "restored saved game");
                Some(saved)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(kind = kind.id(), error = %e, "discarding unreadable save");
                None
            }
        }
    }

    fn try_load(&self, kind: GameKind) -> Result<Option<SavedGame>, PersistError> {
        let Some(data) = self.storage.read(&Self::key(kind))? else {
            return Ok(None);
        };
        let saved = decode(&data)?;
        if saved.kind != kind || saved.rules.kind != kind {
            return Err(PersistError::WrongGame {
                found: saved.kind,
                expected: kind,
            });
        }
        if !saved.history.is_structurally_valid()
            || saved.history.current().tableau.len() != saved.rules.tableau_columns
            || saved.history.current().free_cells.len() != saved.rules.free_cells
        {
            return Err(PersistError::Invalid);
        }
        Ok(Some(saved))
    }

    /// Best-effort write. Returns whether it landed.
    pub fn save(&mut self, rules: &Rules, history: &HistoryStack) -> bool {
        let saved = SavedGame::new(*rules, history.clone());
        match encode(&saved).and_then(|data| self.storage.write(&Self::key(rules.kind), &data)) {
            Ok(()) => true,
            Err(e) => {
                warn!(kind = rules.kind.id(), error = %e, "could not write save; continuing in memory");
                false
            }
        }
    }

    pub fn clear(&mut self, kind: GameKind) {
        if let Err(e) = self.storage.remove(&Self::key(kind)) {
            warn!(kind = kind.id(), error = %e, "could not remove save");
        }
    }
}
