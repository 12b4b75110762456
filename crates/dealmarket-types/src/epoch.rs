pub use fvm_shared::clock::ChainEpoch;

/// Filecoin epoch duration in seconds (no longer exported by fvm_shared 4.x)
pub const EPOCH_DURATION_SECONDS: ChainEpoch = 30;

pub const SECONDS_IN_DAY: i64 = 86_400;

/// Number of epochs in a day (2880 at 30s epochs)
pub const EPOCHS_IN_DAY: ChainEpoch = SECONDS_IN_DAY / EPOCH_DURATION_SECONDS;
