use num_bigint::BigInt;
use num_traits::Signed;

use crate::error::{Result, TypesError};

pub use fvm_shared::econ::TokenAmount;
pub use fvm_shared::sector::StoragePower;

/// Space-time weight of a deal (bytes × epochs)
pub type DealWeight = BigInt;

/// Whole tokens ever issued
pub const TOTAL_SUPPLY_TOKENS: u64 = 2_000_000_000;

/// Total token supply
pub fn total_supply() -> TokenAmount {
    TokenAmount::from_whole(TOTAL_SUPPLY_TOKENS)
}

/// Parse a non-negative decimal amount of atto-tokens
pub fn parse_amount(s: &str) -> Result<TokenAmount> {
    let value: BigInt = s
        .trim()
        .parse()
        .map_err(|_| TypesError::InvalidAmount(format!("cannot parse: {}", s)))?;
    if value.is_negative() {
        return Err(TypesError::InvalidAmount(format!("negative: {}", s)));
    }
    Ok(TokenAmount::from_atto(value))
}

/// Serde helper writing token amounts as decimal atto strings, so
/// configuration files stay readable.
pub mod token_str {
    use fvm_shared::econ::TokenAmount;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &TokenAmount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value.atto())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<TokenAmount, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_amount(&s).map_err(de::Error::custom)
    }
}
