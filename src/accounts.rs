use serde::{Deserialize, Serialize};

use crate::entity::EntityKind;
use crate::models::Identified;

/// Account visible to the authenticated manager, as listed by `ManagedCustomerService`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedCustomer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_manage_clients: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_account: Option<bool>,
}

impl Identified for ManagedCustomer {
    fn id(&self) -> Option<i64> {
        self.customer_id
    }
}

pub struct Accounts;

impl EntityKind for Accounts {
    type Record = ManagedCustomer;
    const SERVICE: &'static str = "ManagedCustomerService";
    const DEFAULT_FIELDS: &'static [&'static str] =
        &["CustomerId", "Name", "CurrencyCode", "DateTimeZone", "CanManageClients"];
}

/// Formats a numeric customer id as `123-456-7890`.
pub fn format_customer_id(customer_id: i64) -> String {
    let digits = format!("{:010}", customer_id);
    format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..])
}
