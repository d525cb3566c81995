//! Easy AdWords Library
//!
//! A typed façade over the ads management API: build selectors and entity
//! configs, and let the crate drive paginated listings, chunked mutations and
//! report downloads.
//!
//! # Modules
//!
//! - `core`: Pagination, batching and shared error types.
//! - `integrations`: Remote API transport.
//! - `accounts`: Managed customer accounts.
//! - `ad_groups`: Ad group records and configs.
//! - `batch`: Chunked mutate submission.
//! - `budgets`: Shared budgets.
//! - `campaigns`: Campaign records, configs and creation flow.
//! - `client`: HTTP client for the ads API.
//! - `config`: Configuration management.
//! - `entity`: Generic entity operations.
//! - `errors`: Error handling types.
//! - `keywords`: Keyword criteria and keyword batches.
//! - `models`: Shared wire types (money, bids).
//! - `paging`: Paginated retrieval.
//! - `reports`: Report definitions and CSV normalization.
//! - `selector`: Selectors, predicates and ordering.

pub mod core;
pub mod integrations;

pub mod accounts;
pub mod ad_groups;
pub mod batch;
pub mod budgets;
pub mod campaigns;
pub mod client;
pub mod config;
pub mod entity;
pub mod errors;
pub mod keywords;
pub mod models;
pub mod paging;
pub mod reports;
pub mod selector;

pub use batch::{submit_batch, MutateService, MutationResult, Operation, Operator};
pub use client::{AdsClient, ServiceClient};
pub use config::Config;
pub use errors::AdsError;
pub use paging::{fetch_all, ListingService, Page};
pub use selector::{Predicate, PredicateOperator, Selector, SortOrder};
