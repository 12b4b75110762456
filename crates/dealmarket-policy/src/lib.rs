//! Deal collateral and weight policy for the storage market.
//!
//! Every function here is pure and uses exact big-integer arithmetic, so
//! results are identical on every node.

mod config;
mod error;
mod policy;

pub use config::PolicyConfig;
pub use error::{PolicyError, Result};
pub use policy::{Bounds, MarketPolicy, DEAL_UPDATES_INTERVAL};
