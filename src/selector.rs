//! Selector: the filter/shape descriptor sent to remote listing and report calls.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PAGE_SIZE;
use crate::errors::AdsError;

/// Server-side comparison applied by a [`Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredicateOperator {
    Equals,
    NotEquals,
    In,
    NotIn,
    GreaterThan,
    GreaterThanEquals,
    LessThan,
    LessThanEquals,
    StartsWith,
    StartsWithIgnoreCase,
    Contains,
    ContainsIgnoreCase,
    DoesNotContain,
    DoesNotContainIgnoreCase,
}

/// One filter condition: field, operator, values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: String,
    pub operator: PredicateOperator,
    pub values: Vec<String>,
}

impl Predicate {
    pub fn new<I, V>(field: impl Into<String>, operator: PredicateOperator, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        Self {
            field: field.into(),
            operator,
            values: values.into_iter().map(|v| v.to_string()).collect(),
        }
    }

    /// `field EQUALS value`
    pub fn equals(field: impl Into<String>, value: impl ToString) -> Self {
        Self::new(field, PredicateOperator::Equals, [value])
    }

    /// `field IN values`
    pub fn any_of<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        Self::new(field, PredicateOperator::In, values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub field: String,
    pub sort_order: SortOrder,
}

/// Paging block attached to a single remote `get` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub start_index: u64,
    pub number_results: u32,
}

/// Inclusive date range, serialized in the `yyyyMMdd` form the reporting API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    #[serde(serialize_with = "serialize_compact_date")]
    pub min: NaiveDate,
    #[serde(serialize_with = "serialize_compact_date")]
    pub max: NaiveDate,
}

fn serialize_compact_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&date.format("%Y%m%d").to_string())
}

/// Describes which entities a listing call returns and how they are shaped.
///
/// Built through [`Selector::builder`]; a built selector always carries at least
/// one field and a positive page size. The paging flag and page size are local
/// settings consumed by [`crate::paging::fetch_all`] and never go on the wire
/// directly; the fetcher turns them into a [`Paging`] block per call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    fields: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    predicates: Vec<Predicate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ordering: Vec<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paging: Option<Paging>,
    #[serde(skip)]
    page_size: u32,
    #[serde(skip)]
    paginated: bool,
}

impl Selector {
    pub fn builder() -> SelectorBuilder {
        SelectorBuilder::default()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn ordering(&self) -> &[OrderBy] {
        &self.ordering
    }

    pub fn date_range(&self) -> Option<DateRange> {
        self.date_range
    }

    pub fn paging(&self) -> Option<Paging> {
        self.paging
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn is_paginated(&self) -> bool {
        self.paginated
    }

    /// Copy of this selector addressed at one page.
    pub fn with_paging(&self, start_index: u64) -> Self {
        let mut paged = self.clone();
        paged.paging = Some(Paging {
            start_index,
            number_results: self.page_size,
        });
        paged
    }

    /// Copy of this selector with an extra predicate.
    pub fn with_predicate(&self, predicate: Predicate) -> Self {
        let mut narrowed = self.clone();
        narrowed.predicates.push(predicate);
        narrowed
    }

    pub(crate) fn validate(&self) -> Result<(), AdsError> {
        if self.fields.is_empty() {
            return Err(AdsError::Configuration(
                "Selector fields must be set before calling the remote service".to_string(),
            ));
        }
        if self.fields.iter().any(|f| f.trim().is_empty()) {
            return Err(AdsError::Configuration(
                "Selector fields must not contain blank names".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(AdsError::Configuration(
                "Selector page size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Stable key used to memoize listing results.
    pub(crate) fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}",
            serde_json::to_string(self).unwrap_or_default(),
            self.paginated,
            self.page_size
        )
    }
}

#[derive(Debug, Clone)]
pub struct SelectorBuilder {
    fields: Vec<String>,
    predicates: Vec<Predicate>,
    ordering: Vec<OrderBy>,
    date_range: Option<DateRange>,
    page_size: u32,
    paginated: bool,
}

impl Default for SelectorBuilder {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            predicates: Vec::new(),
            ordering: Vec::new(),
            date_range: None,
            page_size: DEFAULT_PAGE_SIZE,
            paginated: false,
        }
    }
}

impl SelectorBuilder {
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates<I>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = Predicate>,
    {
        self.predicates.extend(predicates);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, sort_order: SortOrder) -> Self {
        self.ordering.push(OrderBy {
            field: field.into(),
            sort_order,
        });
        self
    }

    pub fn date_range(mut self, min: NaiveDate, max: NaiveDate) -> Self {
        self.date_range = Some(DateRange { min, max });
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn paginated(mut self, paginated: bool) -> Self {
        self.paginated = paginated;
        self
    }

    pub fn build(self) -> Result<Selector, AdsError> {
        let selector = Selector {
            fields: self.fields,
            predicates: self.predicates,
            ordering: self.ordering,
            date_range: self.date_range,
            paging: None,
            page_size: self.page_size,
            paginated: self.paginated,
        };
        selector.validate()?;
        Ok(selector)
    }
}
