//! Shared budgets, created ahead of the campaigns that spend them.

use serde::{Deserialize, Serialize};

use crate::batch::{MutateService, Operation};
use crate::entity::EntityKind;
use crate::errors::AdsError;
use crate::models::{Identified, Money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetDeliveryMethod {
    Standard,
    Accelerated,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_method: Option<BudgetDeliveryMethod>,
}

impl Identified for Budget {
    fn id(&self) -> Option<i64> {
        self.budget_id
    }
}

pub struct Budgets;

impl EntityKind for Budgets {
    type Record = Budget;
    const SERVICE: &'static str = "BudgetService";
    const DEFAULT_FIELDS: &'static [&'static str] =
        &["BudgetId", "BudgetName", "Amount", "DeliveryMethod"];
}

/// Creates a shared budget and returns its server-assigned id.
pub async fn create_budget<S>(
    service: &S,
    name: &str,
    amount: f64,
    delivery_method: BudgetDeliveryMethod,
) -> Result<i64, AdsError>
where
    S: MutateService<Budget> + ?Sized,
{
    let budget = Budget {
        budget_id: None,
        name: Some(name.to_string()),
        amount: Some(Money::from_units(amount)?),
        delivery_method: Some(delivery_method),
    };

    let created = service.mutate(&[Operation::add(budget)]).await?;
    let budget_id = created.first().and_then(Identified::id).ok_or_else(|| {
        AdsError::remote(
            Budgets::SERVICE,
            "mutate",
            "Budget creation response missing budgetId",
        )
    })?;

    tracing::info!("Budget '{}' created: {}", name, budget_id);
    Ok(budget_id)
}
