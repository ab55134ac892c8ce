use thiserror::Error;

use crate::rules::GameKind;

/// Why a save slot could not be read or written. These never reach the
/// player: the save slot logs them and carries on in memory.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("no data directory available on this platform")]
    NoDataDir,

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("save payload codec failed: {0}")]
    Codec(#[from] bincode::Error),

    #[error("save file is too short to carry a signature ({0} bytes)")]
    Truncated(usize),

    #[error("save file signature mismatch")]
    Signature,

    #[error("save format version {found}, expected {expected}")]
    Version { found: u32, expected: u32 },

    #[error("save belongs to {found:?}, expected {expected:?}")]
    WrongGame { found: GameKind, expected: GameKind },

    #[error("saved history failed structural validation")]
    Invalid,

    #[error("storage refused the write")]
    Refused,
}
