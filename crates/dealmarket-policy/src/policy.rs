use dealmarket_types::{
    ChainEpoch, DealProposal, DealWeight, PaddedPieceSize, StoragePower, TokenAmount,
};
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::config::PolicyConfig;
use crate::error::{PolicyError, Result};

/// Epochs between scheduled updates of an active deal
pub const DEAL_UPDATES_INTERVAL: ChainEpoch = 100;

/// Inclusive range returned by the bound functions. `min <= max` holds for
/// every value the policy produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd> Bounds<T> {
    pub fn new(min: T, max: T) -> Self {
        Bounds { min, max }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.min <= *value && *value <= self.max
    }
}

/// Market policy for deal durations, prices, collateral and weight.
/// Holds a config that passed [`PolicyConfig::validate`].
#[derive(Debug, Clone, Default)]
pub struct MarketPolicy {
    config: PolicyConfig,
}

impl MarketPolicy {
    pub fn new(config: PolicyConfig) -> Result<Self> {
        config.validate()?;
        Ok(MarketPolicy { config })
    }

    pub fn with_defaults() -> Self {
        MarketPolicy {
            config: PolicyConfig::default(),
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Allowed deal duration in epochs. The piece size does not affect the
    /// current window.
    pub fn deal_duration_bounds(&self, _piece_size: PaddedPieceSize) -> Bounds<ChainEpoch> {
        let day = self.config.epochs_in_day;
        Bounds::new(
            self.config.min_deal_duration_days * day,
            self.config.max_deal_duration_days * day,
        )
    }

    /// Allowed storage price per epoch. Provisional: spans zero to the total
    /// supply regardless of inputs.
    pub fn deal_price_per_epoch_bounds(
        &self,
        _piece_size: PaddedPieceSize,
        _duration: ChainEpoch,
    ) -> Bounds<TokenAmount> {
        Bounds::new(TokenAmount::zero(), self.config.total_supply.clone())
    }

    /// Provider collateral range for a deal.
    ///
    /// The minimum is the deal's share of network power applied to a fixed
    /// share of circulating supply:
    ///
    /// ```text
    /// min = num × supply × qa / (denom × max(network_qa, baseline, qa))
    /// ```
    ///
    /// Fails with [`PolicyError::ZeroPowerDenominator`] when all three
    /// powers are zero. The maximum is provisionally the total supply.
    pub fn deal_provider_collateral_bounds(
        &self,
        piece_size: PaddedPieceSize,
        verified: bool,
        network_qa_power: &StoragePower,
        baseline_power: &StoragePower,
        network_circulating_supply: &TokenAmount,
    ) -> Result<Bounds<TokenAmount>> {
        let qa_power = self.deal_qa_power(piece_size, verified);
        let power_share_denom = network_qa_power.max(baseline_power).max(&qa_power);
        if !power_share_denom.is_positive() {
            return Err(PolicyError::ZeroPowerDenominator);
        }

        let lock_target_num = BigInt::from(self.config.provider_collateral_percent_num)
            * network_circulating_supply.atto();
        let lock_target_denom = BigInt::from(self.config.provider_collateral_percent_denom);

        let min = (lock_target_num * &qa_power) / (lock_target_denom * power_share_denom);
        Ok(Bounds::new(
            TokenAmount::from_atto(min),
            self.config.total_supply.clone(),
        ))
    }

    /// Client collateral range. Provisional: unconstrained up to the total
    /// supply.
    pub fn deal_client_collateral_bounds(
        &self,
        _piece_size: PaddedPieceSize,
        _duration: ChainEpoch,
    ) -> Bounds<TokenAmount> {
        Bounds::new(TokenAmount::zero(), self.config.total_supply.clone())
    }

    /// Space-time weight: `duration × piece_size`
    pub fn deal_weight(&self, piece_size: PaddedPieceSize, duration: ChainEpoch) -> DealWeight {
        BigInt::from(duration) * BigInt::from(piece_size.0)
    }

    pub fn deal_weight_for(&self, proposal: &DealProposal) -> DealWeight {
        self.deal_weight(proposal.piece_size, proposal.duration())
    }

    /// Quality-adjusted power of a piece.
    ///
    /// Fixed point: the multiplier is scaled up by the precision shift,
    /// divided by the base, applied to the size and only then scaled down.
    pub fn deal_qa_power(&self, piece_size: PaddedPieceSize, verified: bool) -> StoragePower {
        let multiplier = if verified {
            self.config.verified_deal_weight_multiplier
        } else {
            self.config.deal_weight_multiplier
        };
        let precision = self.config.sector_quality_precision as usize;

        let scaled_quality =
            (BigInt::from(multiplier) << precision) / BigInt::from(self.config.quality_base_multiplier);
        (scaled_quality * BigInt::from(piece_size.0)) >> precision
    }

    /// Penalty for a deal that missed activation. Provisional: forfeits the
    /// whole provider collateral.
    pub fn collateral_penalty_for_deal_activation_missed(
        &self,
        provider_collateral: &TokenAmount,
    ) -> TokenAmount {
        provider_collateral.clone()
    }
}
