mod accumulator;
mod amount;
mod deal;
mod epoch;
mod error;

pub use accumulator::{AccumulatedErrors, ErrAccumulator};
pub use amount::{
    parse_amount, token_str, total_supply, DealWeight, StoragePower, TokenAmount,
    TOTAL_SUPPLY_TOKENS,
};
pub use deal::{DealProposal, PaddedPieceSize};
pub use epoch::{ChainEpoch, EPOCHS_IN_DAY, EPOCH_DURATION_SECONDS, SECONDS_IN_DAY};
pub use error::{Result, TypesError};

/// Run-length encoded set of integer keys
pub use fvm_ipld_bitfield::BitField;
