use dealmarket_types::{token_str, total_supply, ChainEpoch, TokenAmount, EPOCHS_IN_DAY};
use num_traits::Signed;
use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, Result};

/// Market policy parameters.
///
/// The defaults are the reference policy; changing any of them changes
/// consensus results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub epochs_in_day: ChainEpoch,
    pub min_deal_duration_days: ChainEpoch,
    pub max_deal_duration_days: ChainEpoch,
    /// Share of circulating supply providers lock as collateral
    pub provider_collateral_percent_num: u64,
    pub provider_collateral_percent_denom: u64,
    pub quality_base_multiplier: u64,
    pub deal_weight_multiplier: u64,
    pub verified_deal_weight_multiplier: u64,
    /// Fixed-point shift used for quality scaling
    pub sector_quality_precision: u32,
    /// Upper bound for every token amount (atto-units)
    #[serde(with = "token_str")]
    pub total_supply: TokenAmount,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            epochs_in_day: EPOCHS_IN_DAY,
            min_deal_duration_days: 180,
            max_deal_duration_days: 366,
            provider_collateral_percent_num: 5,
            provider_collateral_percent_denom: 100,
            quality_base_multiplier: 10,
            deal_weight_multiplier: 10,
            verified_deal_weight_multiplier: 100,
            sector_quality_precision: 20,
            total_supply: total_supply(),
        }
    }
}

impl PolicyConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PolicyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs_in_day <= 0 {
            return Err(PolicyError::InvalidConfig(format!(
                "epochs_in_day must be positive, got {}",
                self.epochs_in_day
            )));
        }
        if self.min_deal_duration_days < 0
            || self.min_deal_duration_days > self.max_deal_duration_days
        {
            return Err(PolicyError::InvalidConfig(format!(
                "deal duration days out of order: {}..{}",
                self.min_deal_duration_days, self.max_deal_duration_days
            )));
        }
        // Both duration bounds must fit an epoch.
        if self
            .max_deal_duration_days
            .checked_mul(self.epochs_in_day)
            .is_none()
        {
            return Err(PolicyError::InvalidConfig(
                "max deal duration overflows epochs".to_string(),
            ));
        }
        if self.provider_collateral_percent_denom == 0 {
            return Err(PolicyError::InvalidConfig(
                "provider_collateral_percent_denom must be non-zero".to_string(),
            ));
        }
        // Keeps the minimum provider collateral within the supply ceiling.
        if self.provider_collateral_percent_num > self.provider_collateral_percent_denom {
            return Err(PolicyError::InvalidConfig(format!(
                "provider collateral share {}/{} exceeds one",
                self.provider_collateral_percent_num, self.provider_collateral_percent_denom
            )));
        }
        if self.quality_base_multiplier == 0 {
            return Err(PolicyError::InvalidConfig(
                "quality_base_multiplier must be non-zero".to_string(),
            ));
        }
        if self.sector_quality_precision > 64 {
            return Err(PolicyError::InvalidConfig(format!(
                "sector_quality_precision {} exceeds 64",
                self.sector_quality_precision
            )));
        }
        if self.total_supply.atto().is_negative() {
            return Err(PolicyError::InvalidConfig(
                "total_supply must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
