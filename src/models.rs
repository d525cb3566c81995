use serde::{Deserialize, Serialize};

use crate::errors::AdsError;

/// Entities that carry a server-assigned identifier.
pub trait Identified {
    fn id(&self) -> Option<i64>;
}

/// Currency amount in micros (1 unit = 1,000,000 micros).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub micro_amount: i64,
}

impl Money {
    /// Converts a currency amount such as `1.25` into micros.
    pub fn from_units(amount: f64) -> Result<Self, AdsError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(AdsError::Configuration(format!(
                "Invalid currency amount: {}",
                amount
            )));
        }
        Ok(Self {
            micro_amount: (amount * 1_000_000.0).round() as i64,
        })
    }

    pub fn as_units(&self) -> f64 {
        self.micro_amount as f64 / 1_000_000.0
    }
}

/// A single bid inside a bidding strategy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Bid {
    CpcBid { bid: Money },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiddingStrategyType {
    ManualCpc,
    ManualCpm,
    TargetSpend,
    TargetCpa,
    TargetRoas,
    MaximizeConversions,
    MaximizeConversionValue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiddingStrategyConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidding_strategy_type: Option<BiddingStrategyType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bids: Vec<Bid>,
}

impl BiddingStrategyConfiguration {
    /// Manual CPC configuration with a single bid, given in currency units.
    pub fn cpc(amount: f64) -> Result<Self, AdsError> {
        Ok(Self {
            bidding_strategy_type: None,
            bids: vec![Bid::CpcBid {
                bid: Money::from_units(amount)?,
            }],
        })
    }

    pub fn strategy(strategy: BiddingStrategyType) -> Self {
        Self {
            bidding_strategy_type: Some(strategy),
            bids: Vec::new(),
        }
    }

    /// First CPC bid, if any.
    pub fn cpc_bid(&self) -> Option<Money> {
        self.bids.iter().map(|Bid::CpcBid { bid }| *bid).next()
    }
}
