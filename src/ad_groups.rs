use serde::{Deserialize, Serialize};

use crate::batch::Operation;
use crate::entity::EntityKind;
use crate::errors::AdsError;
use crate::models::{BiddingStrategyConfiguration, Identified};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdGroupStatus {
    Enabled,
    Paused,
    Removed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AdGroupStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidding_strategy_configuration: Option<BiddingStrategyConfiguration>,
}

impl Identified for AdGroup {
    fn id(&self) -> Option<i64> {
        self.id
    }
}

pub struct AdGroups;

impl EntityKind for AdGroups {
    type Record = AdGroup;
    const SERVICE: &'static str = "AdGroupService";
    const DEFAULT_FIELDS: &'static [&'static str] = &["Id", "Name", "CampaignId", "Status"];
}

/// Settings for creating an ad group.
#[derive(Debug, Clone, PartialEq)]
pub struct AdGroupConfig {
    pub campaign_id: Option<i64>,
    pub name: Option<String>,
    pub status: AdGroupStatus,
    /// Default max CPC in currency units.
    pub bid: Option<f64>,
}

impl Default for AdGroupConfig {
    fn default() -> Self {
        Self {
            campaign_id: None,
            name: None,
            status: AdGroupStatus::Paused,
            bid: None,
        }
    }
}

impl AdGroupConfig {
    pub fn new(campaign_id: i64, name: impl Into<String>, bid: f64) -> Self {
        Self {
            campaign_id: Some(campaign_id),
            name: Some(name.into()),
            bid: Some(bid),
            ..Self::default()
        }
    }

    pub fn to_add_operation(&self) -> Result<Operation<AdGroup>, AdsError> {
        let name = self
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| {
                AdsError::Configuration(
                    "AdGroup name must be set in order to create an ad group".to_string(),
                )
            })?;
        let bid = self.bid.filter(|b| *b > 0.0).ok_or_else(|| {
            AdsError::Configuration(
                "Bid amount must be set in order to create an ad group".to_string(),
            )
        })?;
        let campaign_id = self.campaign_id.ok_or_else(|| {
            AdsError::Configuration(
                "Campaign ID must be set in order to create an ad group".to_string(),
            )
        })?;

        Ok(Operation::add(AdGroup {
            id: None,
            campaign_id: Some(campaign_id),
            name: Some(name.to_string()),
            status: Some(self.status),
            bidding_strategy_configuration: Some(BiddingStrategyConfiguration::cpc(bid)?),
        }))
    }
}

/// SET operation that flips the ad group to REMOVED.
pub fn removal_operation(ad_group_id: i64) -> Operation<AdGroup> {
    Operation::set(AdGroup {
        id: Some(ad_group_id),
        status: Some(AdGroupStatus::Removed),
        ..AdGroup::default()
    })
}
