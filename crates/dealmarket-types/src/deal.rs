use serde::{Deserialize, Serialize};

pub use fvm_shared::piece::PaddedPieceSize;

use crate::epoch::ChainEpoch;

/// The parts of a storage deal proposal consumed by the market policy.
/// Validation of proposals happens before they reach this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealProposal {
    pub piece_size: PaddedPieceSize,
    pub verified_deal: bool,
    pub start_epoch: ChainEpoch,
    pub end_epoch: ChainEpoch,
}

impl DealProposal {
    /// Number of epochs the deal is active
    pub fn duration(&self) -> ChainEpoch {
        self.end_epoch - self.start_epoch
    }
}
