//! Generic entity operations shared by every entity kind.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::batch::{submit_batch, MutateService, MutationResult, Operation};
use crate::errors::AdsError;
use crate::paging::{fetch_all, ListingService};
use crate::selector::Selector;

/// Describes one kind of remote entity: where it lives and what it looks like.
pub trait EntityKind: Send + Sync + 'static {
    /// Wire representation of the entity.
    type Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    /// Remote service name, e.g. `CampaignService`.
    const SERVICE: &'static str;

    /// Fields requested when the caller does not pick any.
    const DEFAULT_FIELDS: &'static [&'static str];
}

/// Listing cache settings for an [`EntityService`].
#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            capacity: 1_000,
        }
    }
}

/// get / download / create / remove for one entity kind over a remote service `S`.
///
/// Listing results are memoized per selector: `get` serves from the cache when it
/// can, `download` always goes to the remote service. Any successful mutation
/// through this service drops the cached listings.
pub struct EntityService<K: EntityKind, S> {
    service: S,
    cache: Cache<String, Arc<Vec<K::Record>>>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: EntityKind, S> EntityService<K, S> {
    pub fn new(service: S, cache: CacheSettings) -> Self {
        Self {
            service,
            cache: Cache::builder()
                .time_to_live(cache.ttl)
                .max_capacity(cache.capacity)
                .build(),
            _kind: PhantomData,
        }
    }

    /// The underlying remote service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Non-paginated selector over the kind's default fields.
    pub fn default_selector() -> Result<Selector, AdsError> {
        Selector::builder()
            .fields(K::DEFAULT_FIELDS.iter().copied())
            .build()
    }

    /// Drops every memoized listing.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}

impl<K: EntityKind, S: ListingService<K::Record>> EntityService<K, S> {
    /// Lists entities, reusing a previous download of the same selector if cached.
    pub async fn get(&self, selector: &Selector) -> Result<Vec<K::Record>, AdsError> {
        let key = selector.cache_key();
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!("{}: serving {} cached entities", K::SERVICE, cached.len());
            return Ok(cached.as_ref().clone());
        }
        self.download(selector).await
    }

    /// Lists entities from the remote service, bypassing and refreshing the cache.
    pub async fn download(&self, selector: &Selector) -> Result<Vec<K::Record>, AdsError> {
        tracing::info!("{}: downloading entities", K::SERVICE);
        let records = fetch_all(&self.service, selector).await?;
        self.cache
            .insert(selector.cache_key(), Arc::new(records.clone()))
            .await;
        Ok(records)
    }
}

impl<K: EntityKind, S: MutateService<K::Record>> EntityService<K, S> {
    /// Applies a single operation (create, update or remove).
    pub async fn mutate_one(
        &self,
        operation: Operation<K::Record>,
    ) -> Result<Vec<K::Record>, AdsError> {
        let value = self.service.mutate(std::slice::from_ref(&operation)).await?;
        self.invalidate();
        Ok(value)
    }

    /// Applies many operations in chunks of at most `chunk_size`.
    pub async fn submit(
        &self,
        operations: &[Operation<K::Record>],
        chunk_size: usize,
    ) -> Result<Vec<MutationResult<K::Record>>, AdsError> {
        let result = submit_batch(&self.service, operations, chunk_size).await;
        // A failed batch may still have applied earlier chunks.
        if !operations.is_empty() {
            self.invalidate();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::Page;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Widgets;

    impl EntityKind for Widgets {
        type Record = String;
        const SERVICE: &'static str = "WidgetService";
        const DEFAULT_FIELDS: &'static [&'static str] = &["Id", "Name"];
    }

    #[derive(Default)]
    struct CountingService {
        gets: AtomicUsize,
        mutates: AtomicUsize,
        fail_on_mutate: Option<usize>,
    }

    #[async_trait]
    impl ListingService<String> for CountingService {
        async fn get(&self, _selector: &Selector) -> Result<Page<String>, AdsError> {
            let n = self.gets.fetch_add(1, Ordering::SeqCst);
            Ok(Page::new(vec![format!("widget-{}", n)], 1))
        }
    }

    #[async_trait]
    impl MutateService<String> for CountingService {
        async fn mutate(&self, operations: &[Operation<String>]) -> Result<Vec<String>, AdsError> {
            let n = self.mutates.fetch_add(1, Ordering::SeqCst);
            if self.fail_on_mutate == Some(n) {
                return Err(AdsError::remote("WidgetService", "mutate", "quota exceeded"));
            }
            Ok(operations.iter().map(|op| op.operand.clone()).collect())
        }
    }

    #[tokio::test]
    async fn test_get_is_memoized_and_download_refreshes() {
        let entities: EntityService<Widgets, _> =
            EntityService::new(CountingService::default(), CacheSettings::default());
        let selector = EntityService::<Widgets, CountingService>::default_selector().unwrap();

        assert_eq!(entities.get(&selector).await.unwrap(), vec!["widget-0"]);
        assert_eq!(entities.get(&selector).await.unwrap(), vec!["widget-0"]);
        assert_eq!(entities.download(&selector).await.unwrap(), vec!["widget-1"]);
        assert_eq!(entities.get(&selector).await.unwrap(), vec!["widget-1"]);
        assert_eq!(entities.service().gets.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_mutation_invalidates_cache() {
        let entities: EntityService<Widgets, _> =
            EntityService::new(CountingService::default(), CacheSettings::default());
        let selector = EntityService::<Widgets, CountingService>::default_selector().unwrap();

        entities.get(&selector).await.unwrap();
        entities
            .mutate_one(Operation::add("new".to_string()))
            .await
            .unwrap();
        assert_eq!(entities.get(&selector).await.unwrap(), vec!["widget-1"]);
    }

    fn widget_operations(count: usize) -> Vec<Operation<String>> {
        (0..count)
            .map(|i| Operation::add(format!("new-{}", i)))
            .collect()
    }

    #[tokio::test]
    async fn test_submit_chunks_and_invalidates_cache() {
        let entities: EntityService<Widgets, _> =
            EntityService::new(CountingService::default(), CacheSettings::default());
        let selector = EntityService::<Widgets, CountingService>::default_selector().unwrap();

        entities.get(&selector).await.unwrap();
        let results = entities.submit(&widget_operations(5), 2).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[2].value, vec!["new-4"]);
        assert_eq!(entities.service().mutates.load(Ordering::SeqCst), 3);
        assert_eq!(entities.get(&selector).await.unwrap(), vec!["widget-1"]);
    }

    #[tokio::test]
    async fn test_failed_submit_still_invalidates_cache() {
        let service = CountingService {
            fail_on_mutate: Some(1),
            ..CountingService::default()
        };
        let entities: EntityService<Widgets, _> =
            EntityService::new(service, CacheSettings::default());
        let selector = EntityService::<Widgets, CountingService>::default_selector().unwrap();

        assert_eq!(entities.get(&selector).await.unwrap(), vec!["widget-0"]);

        let err = entities.submit(&widget_operations(4), 2).await.unwrap_err();
        assert!(matches!(
            err,
            AdsError::ChunkFailed {
                chunk_index: 1,
                applied_chunks: 1,
                ..
            }
        ));
        assert_eq!(entities.service().mutates.load(Ordering::SeqCst), 2);

        // The first chunk landed, so the listing is fetched again.
        assert_eq!(entities.get(&selector).await.unwrap(), vec!["widget-1"]);
        assert_eq!(entities.service().gets.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_submit_keeps_cache() {
        let entities: EntityService<Widgets, _> =
            EntityService::new(CountingService::default(), CacheSettings::default());
        let selector = EntityService::<Widgets, CountingService>::default_selector().unwrap();

        entities.get(&selector).await.unwrap();
        let results = entities.submit(&[], 2).await.unwrap();

        assert!(results.is_empty());
        assert_eq!(entities.service().mutates.load(Ordering::SeqCst), 0);
        assert_eq!(entities.get(&selector).await.unwrap(), vec!["widget-0"]);
        assert_eq!(entities.service().gets.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_selector_uses_kind_fields() {
        let selector = EntityService::<Widgets, CountingService>::default_selector().unwrap();
        assert_eq!(selector.fields(), &["Id".to_string(), "Name".to_string()]);
        assert!(!selector.is_paginated());
    }
}
