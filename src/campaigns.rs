//! Campaign entity: wire record, creation config and operation builders.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::batch::{MutateService, Operation};
use crate::budgets::{create_budget, Budget, BudgetDeliveryMethod};
use crate::entity::EntityKind;
use crate::errors::{AdsError, ResultExt};
use crate::models::{BiddingStrategyConfiguration, BiddingStrategyType, Identified};
use crate::selector::{Predicate, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Enabled,
    Paused,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvertisingChannelType {
    Search,
    Display,
    Shopping,
    Video,
    Multichannel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingStatus {
    Serving,
    None,
    Ended,
    Pending,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdServingOptimizationStatus {
    Optimize,
    ConversionOptimize,
    Rotate,
    RotateIndefinitely,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSetting {
    pub target_google_search: bool,
    pub target_search_network: bool,
    pub target_content_network: bool,
}

/// Campaign as exchanged with `CampaignService`. Every field is optional because
/// listings only return the selected fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_status: Option<ServingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertising_channel_type: Option<AdvertisingChannelType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidding_strategy_configuration: Option<BiddingStrategyConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_setting: Option<NetworkSetting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_serving_optimization_status: Option<AdServingOptimizationStatus>,
}

impl Identified for Campaign {
    fn id(&self) -> Option<i64> {
        self.id
    }
}

pub struct Campaigns;

impl EntityKind for Campaigns {
    type Record = Campaign;
    const SERVICE: &'static str = "CampaignService";
    const DEFAULT_FIELDS: &'static [&'static str] = &["Id", "Name", "Status"];
}

/// Settings for creating a campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignConfig {
    pub name: String,
    pub advertising_channel_type: AdvertisingChannelType,
    pub status: CampaignStatus,
    /// Daily budget in currency units.
    pub budget: f64,
    pub budget_name: String,
    pub bidding_strategy_type: BiddingStrategyType,
    pub budget_delivery_method: BudgetDeliveryMethod,
    pub target_google_search: bool,
    pub target_search_network: bool,
    pub target_content_network: bool,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub ad_serving_optimization_status: Option<AdServingOptimizationStatus>,
    pub serving_status: Option<ServingStatus>,
}

impl CampaignConfig {
    /// Paused search campaign with a 50.00 standard budget, manual CPC, all
    /// networks targeted and starting today.
    pub fn new(name: impl Into<String>) -> Result<Self, AdsError> {
        let config = Self {
            name: name.into(),
            advertising_channel_type: AdvertisingChannelType::Search,
            status: CampaignStatus::Paused,
            budget: 50.0,
            budget_name: format!("Budget #{}", uuid::Uuid::new_v4().simple()),
            bidding_strategy_type: BiddingStrategyType::ManualCpc,
            budget_delivery_method: BudgetDeliveryMethod::Standard,
            target_google_search: true,
            target_search_network: true,
            target_content_network: true,
            start_date: Local::now().date_naive(),
            end_date: None,
            ad_serving_optimization_status: None,
            serving_status: Some(ServingStatus::Serving),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AdsError> {
        if self.name.trim().is_empty() {
            return Err(AdsError::Configuration(
                "Campaign name must be set in order to create a campaign".to_string(),
            ));
        }
        if self.budget.is_nan() || self.budget <= 0.0 {
            return Err(AdsError::Configuration(
                "Budget must be greater than zero in order to create a campaign".to_string(),
            ));
        }
        if self.budget_name.trim().is_empty() {
            return Err(AdsError::Configuration(
                "Budget name must be set in order to create a campaign".to_string(),
            ));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(AdsError::Configuration(format!(
                    "Campaign end date {} is before start date {}",
                    end, self.start_date
                )));
            }
        }
        Ok(())
    }

    /// ADD operation for this campaign, spending the given shared budget.
    pub fn to_add_operation(&self, budget_id: i64) -> Result<Operation<Campaign>, AdsError> {
        self.validate()?;
        Ok(Operation::add(Campaign {
            id: None,
            name: Some(self.name.clone()),
            status: Some(self.status),
            serving_status: self.serving_status,
            advertising_channel_type: Some(self.advertising_channel_type),
            budget: Some(Budget {
                budget_id: Some(budget_id),
                ..Budget::default()
            }),
            bidding_strategy_configuration: Some(BiddingStrategyConfiguration::strategy(
                self.bidding_strategy_type.clone(),
            )),
            network_setting: Some(NetworkSetting {
                target_google_search: self.target_google_search,
                target_search_network: self.target_search_network,
                target_content_network: self.target_content_network,
            }),
            start_date: Some(self.start_date.format("%Y%m%d").to_string()),
            end_date: self.end_date.map(|d| d.format("%Y%m%d").to_string()),
            ad_serving_optimization_status: self.ad_serving_optimization_status,
        }))
    }
}

/// Creates the campaign's shared budget, then the campaign itself.
///
/// The budget is not removed if the campaign call fails.
pub async fn create_campaign<B, C>(
    budgets: &B,
    campaigns: &C,
    config: &CampaignConfig,
) -> Result<Campaign, AdsError>
where
    B: MutateService<Budget> + ?Sized,
    C: MutateService<Campaign> + ?Sized,
{
    config.validate()?;

    let budget_id = create_budget(
        budgets,
        &config.budget_name,
        config.budget,
        config.budget_delivery_method,
    )
    .await
    .with_context(|| format!("creating budget for campaign '{}'", config.name))?;

    let operation = config.to_add_operation(budget_id)?;
    let created = campaigns.mutate(&[operation]).await?;
    let campaign = created.into_iter().next().ok_or_else(|| {
        AdsError::remote(
            Campaigns::SERVICE,
            "mutate",
            "Campaign creation response was empty",
        )
    })?;

    tracing::info!(
        "Campaign '{}' created: {:?} (budget {})",
        config.name,
        campaign.id,
        budget_id
    );
    Ok(campaign)
}

/// SET operation that flips the campaign to REMOVED.
pub fn removal_operation(campaign_id: i64) -> Operation<Campaign> {
    Operation::set(Campaign {
        id: Some(campaign_id),
        status: Some(CampaignStatus::Removed),
        ..Campaign::default()
    })
}

/// Narrows `selector` to a single campaign.
pub fn selector_for(selector: &Selector, campaign_id: i64) -> Selector {
    selector.with_predicate(Predicate::equals("Id", campaign_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[test]
    fn test_defaults() {
        let config = CampaignConfig::new("Spring Sale").unwrap();
        assert_eq!(config.advertising_channel_type, AdvertisingChannelType::Search);
        assert_eq!(config.status, CampaignStatus::Paused);
        assert_eq!(config.budget, 50.0);
        assert!(config.budget_name.starts_with("Budget #"));
        assert_eq!(config.serving_status, Some(ServingStatus::Serving));
    }

    #[test]
    fn test_validation() {
        assert!(CampaignConfig::new("  ").unwrap_err().is_configuration());

        let mut config = CampaignConfig::new("Spring Sale").unwrap();
        config.budget = 0.0;
        assert!(config.validate().is_err());
        config.budget = f64::NAN;
        assert!(config.validate().is_err());
        config.budget = -5.0;
        assert!(config.validate().is_err());

        let mut config = CampaignConfig::new("Spring Sale").unwrap();
        config.start_date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        config.end_date = NaiveDate::from_ymd_opt(2024, 4, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_removal_operation() {
        let value = serde_json::to_value(removal_operation(42)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"operator": "SET", "operand": {"id": 42, "status": "REMOVED"}})
        );
    }

    #[test]
    fn test_selector_for_adds_id_predicate() {
        let base = Selector::builder().fields(["Id", "Name"]).build().unwrap();
        let narrowed = selector_for(&base, 7);
        assert_eq!(narrowed.predicates(), &[Predicate::equals("Id", 7)]);
        assert!(base.predicates().is_empty());
    }

    struct FakeBudgets;

    #[async_trait]
    impl MutateService<Budget> for FakeBudgets {
        async fn mutate(&self, operations: &[Operation<Budget>]) -> Result<Vec<Budget>, AdsError> {
            Ok(operations
                .iter()
                .map(|op| Budget {
                    budget_id: Some(900),
                    ..op.operand.clone()
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct FakeCampaigns {
        received: Mutex<Vec<Campaign>>,
    }

    #[async_trait]
    impl MutateService<Campaign> for FakeCampaigns {
        async fn mutate(
            &self,
            operations: &[Operation<Campaign>],
        ) -> Result<Vec<Campaign>, AdsError> {
            let mut received = self.received.lock().unwrap();
            received.extend(operations.iter().map(|op| op.operand.clone()));
            Ok(operations
                .iter()
                .map(|op| Campaign {
                    id: Some(1234),
                    ..op.operand.clone()
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_create_campaign_links_new_budget() {
        let campaigns = FakeCampaigns::default();
        let config = CampaignConfig::new("Spring Sale").unwrap();

        let created = create_campaign(&FakeBudgets, &campaigns, &config)
            .await
            .unwrap();

        assert_eq!(created.id, Some(1234));
        let received = campaigns.received.lock().unwrap();
        assert_eq!(received[0].budget.as_ref().unwrap().budget_id, Some(900));
        assert_eq!(received[0].name.as_deref(), Some("Spring Sale"));
    }
}
