mod error;
mod queue;

pub use error::{QueueError, Result};
pub use queue::EpochQueue;

#[cfg(test)]
mod tests;
