use cid::Cid;
use dealmarket_types::ChainEpoch;
use fvm_ipld_amt::Error as AmtError;
use thiserror::Error;

/// Queue failures. Array failures are wrapped with the operation and epoch
/// that hit them; the underlying error stays reachable via `source()` and
/// [`QueueError::store_error`].
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("failed to load epoch queue {root}: {source}")]
    Load {
        root: Cid,
        #[source]
        source: AmtError,
    },

    #[error("failed to lookup queue epoch {epoch}: {source}")]
    Lookup {
        epoch: ChainEpoch,
        #[source]
        source: AmtError,
    },

    #[error("failed to set queue epoch {epoch}: {source}")]
    Set {
        epoch: ChainEpoch,
        #[source]
        source: AmtError,
    },

    #[error("failed to iterate queue: {0}")]
    Iterate(#[source] AmtError),

    #[error("failed to delete popped epochs {epochs:?}: {source}")]
    Delete {
        epochs: Vec<ChainEpoch>,
        #[source]
        source: AmtError,
    },

    #[error("failed to flush epoch queue: {0}")]
    Flush(#[source] AmtError),

    #[error("queue root counts {count} epochs but {found} are due")]
    CountMismatch { count: u64, found: u64 },

    #[error("Invalid epoch: {0}")]
    InvalidEpoch(ChainEpoch),

    #[error("key out of range for a key set")]
    KeyOutOfRange,
}

impl QueueError {
    /// The array failure behind this error, if any
    pub fn store_error(&self) -> Option<&AmtError> {
        match self {
            QueueError::Load { source, .. }
            | QueueError::Lookup { source, .. }
            | QueueError::Set { source, .. }
            | QueueError::Delete { source, .. } => Some(source),
            QueueError::Iterate(source) | QueueError::Flush(source) => Some(source),
            QueueError::CountMismatch { .. }
            | QueueError::InvalidEpoch(_)
            | QueueError::KeyOutOfRange => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, QueueError>;
