//! Fixtures and conformance checks shared by the cross-crate tests.

use dealmarket_policy::MarketPolicy;
use dealmarket_queue::EpochQueue;
use fvm_ipld_blockstore::Blockstore;
use dealmarket_types::{AccumulatedErrors, DealProposal, ErrAccumulator};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness. Safe to call from
/// every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Check the stored shape of a queue: epochs strictly ascending, no empty
/// entries, and an epoch count matching the entries.
pub fn check_queue<BS: Blockstore>(queue: &EpochQueue<'_, BS>) -> Result<(), AccumulatedErrors> {
    let mut acc = ErrAccumulator::new();
    let entries = match queue.entries() {
        Ok(entries) => entries,
        Err(err) => {
            acc.add(format!("failed to read queue: {}", err));
            return acc.as_result();
        }
    };

    acc.require(
        entries.len() as u64 == queue.len(),
        format!("queue reports {} epochs but holds {}", queue.len(), entries.len()),
    );

    let mut prev = None;
    for (epoch, keys) in &entries {
        acc.require(!keys.is_empty(), format!("epoch {} holds an empty set", epoch));
        if let Some(prev) = prev {
            acc.require(prev < *epoch, format!("epoch {} follows {}", epoch, prev));
        }
        prev = Some(*epoch);
    }
    acc.as_result()
}

/// Check a proposal against the market policy, reporting every violation
pub fn check_proposal(
    policy: &MarketPolicy,
    proposal: &DealProposal,
) -> Result<(), AccumulatedErrors> {
    let mut acc = ErrAccumulator::new();
    let bounds = policy.deal_duration_bounds(proposal.piece_size);

    acc.require(
        proposal.piece_size.0 > 0,
        "piece size must be positive".to_string(),
    );
    acc.require(
        proposal.start_epoch >= 0,
        format!("start epoch {} is negative", proposal.start_epoch),
    );
    acc.require(
        bounds.contains(&proposal.duration()),
        format!(
            "duration {} outside {}..={}",
            proposal.duration(),
            bounds.min,
            bounds.max
        ),
    );
    acc.as_result()
}
