use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("Unknown combatant class: {0:?}")]
    UnknownClass(String),

    #[error("Cannot access action-value table at {}: {source}", path.display())]
    PersistenceIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed action-value table at {}: {reason}", path.display())]
    PersistenceDecode { path: PathBuf, reason: String },
}

impl DecisionError {
    /// Returns true for the persistence variants, which never invalidate the
    /// in-memory table.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            DecisionError::PersistenceIo { .. } | DecisionError::PersistenceDecode { .. }
        )
    }
}
