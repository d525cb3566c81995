//! Keyword criteria: single-keyword operations and the chunked keyword batch.

use serde::{Deserialize, Serialize};

use crate::batch::{submit_batch, MutateService, MutationResult, Operation};
use crate::config::{Config, DEFAULT_BATCH_SIZE};
use crate::entity::EntityKind;
use crate::errors::AdsError;
use crate::models::{BiddingStrategyConfiguration, Identified};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeywordMatchType {
    Exact,
    Phrase,
    Broad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Enabled,
    Paused,
    Removed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub criterion_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<KeywordMatchType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlList {
    pub urls: Vec<String>,
}

/// Ad group criterion as exchanged with `AdGroupCriterionService`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroupCriterion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_group_id: Option<i64>,
    #[serde(default)]
    pub criterion: Criterion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_status: Option<UserStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_urls: Option<UrlList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidding_strategy_configuration: Option<BiddingStrategyConfiguration>,
}

impl Identified for AdGroupCriterion {
    fn id(&self) -> Option<i64> {
        self.criterion.id
    }
}

pub struct Keywords;

impl EntityKind for Keywords {
    type Record = AdGroupCriterion;
    const SERVICE: &'static str = "AdGroupCriterionService";
    const DEFAULT_FIELDS: &'static [&'static str] =
        &["Id", "AdGroupId", "KeywordText", "KeywordMatchType", "Status"];
}

/// Settings for creating a keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordConfig {
    pub text: String,
    pub match_type: KeywordMatchType,
    pub ad_group_id: Option<i64>,
    /// Max CPC in currency units.
    pub bid: Option<f64>,
    pub status: Option<UserStatus>,
    pub final_urls: Vec<String>,
}

impl KeywordConfig {
    pub fn new(ad_group_id: i64, text: impl Into<String>, match_type: KeywordMatchType) -> Self {
        Self {
            text: text.into(),
            match_type,
            ad_group_id: Some(ad_group_id),
            bid: None,
            status: None,
            final_urls: Vec::new(),
        }
    }

    pub fn with_bid(mut self, bid: f64) -> Self {
        self.bid = Some(bid);
        self
    }

    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_final_url(mut self, url: impl Into<String>) -> Self {
        self.final_urls.push(url.into());
        self
    }

    /// Validates the config and builds the biddable-criterion ADD operation.
    pub fn to_add_operation(&self) -> Result<Operation<AdGroupCriterion>, AdsError> {
        let ad_group_id = self.ad_group_id.ok_or_else(|| {
            AdsError::Configuration(
                "Ad group ID must be set in order to create a keyword".to_string(),
            )
        })?;
        if self.text.trim().is_empty() {
            return Err(AdsError::Configuration(
                "Keyword text must be set in order to create a keyword".to_string(),
            ));
        }

        let bidding_strategy_configuration = match self.bid {
            Some(bid) => Some(BiddingStrategyConfiguration::cpc(bid)?),
            None => None,
        };

        Ok(Operation::add(AdGroupCriterion {
            ad_group_id: Some(ad_group_id),
            criterion: Criterion {
                id: None,
                criterion_type: Some("KEYWORD".to_string()),
                text: Some(self.text.clone()),
                match_type: Some(self.match_type),
            },
            user_status: self.status,
            final_urls: (!self.final_urls.is_empty()).then(|| UrlList {
                urls: self.final_urls.clone(),
            }),
            bidding_strategy_configuration,
        }))
    }
}

/// REMOVE operation for a keyword, identified by its ad group and criterion id.
pub fn removal_operation(ad_group_id: i64, keyword_id: i64) -> Operation<AdGroupCriterion> {
    Operation::remove(AdGroupCriterion {
        ad_group_id: Some(ad_group_id),
        criterion: Criterion {
            id: Some(keyword_id),
            ..Criterion::default()
        },
        ..AdGroupCriterion::default()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordBatchConfig {
    pub batch_size: usize,
}

impl Default for KeywordBatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl From<&Config> for KeywordBatchConfig {
    fn from(config: &Config) -> Self {
        Self {
            batch_size: config.batch_size,
        }
    }
}

/// Accumulates keyword specs and creates them in chunked mutate calls.
#[derive(Debug, Clone, Default)]
pub struct KeywordBatch {
    config: KeywordBatchConfig,
    keywords: Vec<KeywordConfig>,
    operations: Vec<Operation<AdGroupCriterion>>,
}

impl KeywordBatch {
    pub fn new(config: KeywordBatchConfig) -> Self {
        Self {
            config,
            keywords: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Validates `keyword` and queues its ADD operation. Rejected keywords are not queued.
    pub fn append(&mut self, keyword: KeywordConfig) -> Result<(), AdsError> {
        let operation = keyword.to_add_operation()?;
        self.keywords.push(keyword);
        self.operations.push(operation);
        Ok(())
    }

    pub fn keywords(&self) -> &[KeywordConfig] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Submits the queued operations, `batch_size` per call.
    pub async fn mutate<S>(
        &self,
        service: &S,
    ) -> Result<Vec<MutationResult<AdGroupCriterion>>, AdsError>
    where
        S: MutateService<AdGroupCriterion> + ?Sized,
    {
        tracing::info!(
            "Submitting {} keywords in batches of {}",
            self.operations.len(),
            self.config.batch_size
        );
        submit_batch(service, &self.operations, self.config.batch_size).await
    }
}
