//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Read-through query caching.
//!
//! [`CachingRepository`] decorates any [`Store`] with memoised reads held in a process wide
//! [`QueryCache`]. Reads are keyed by database, table and query shape. Writes always reach the
//! backend and then invalidate every cached entry of the written table in that database; all
//! other staleness is left to the cache provider's TTL, idle expiry and capacity eviction. Writers
//! in other processes are not observed, so their changes surface only once the affected entries
//! expire.

use crate::config::CacheConfig;
use crate::error::PersistenceResult;
use crate::predicate::{Predicate, Select};
use crate::record::Entity;
use crate::store::Store;
use async_trait::async_trait;
use metrics::counter;
use moka::future::Cache;
use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct QueryKey {
    scope: String,
    table: String,
    shape: String,
}

impl QueryKey {
    fn new(scope: &str, table: &str, shape: String) -> Self {
        Self {
            scope: scope.to_string(),
            table: table.to_string(),
            shape,
        }
    }
}

type CachedValue = Arc<dyn Any + Send + Sync>;

/// Snapshot of cache occupancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheStats {
    pub entry_count: u64,
    pub max_capacity: Option<u64>,
}

/// Shared memoisation of query results, cheap to clone.
#[derive(Clone)]
pub struct QueryCache {
    entries: Cache<QueryKey, CachedValue>,
}

impl QueryCache {
    pub fn new(config: &CacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_seconds))
            .time_to_idle(Duration::from_secs(config.tti_seconds))
            .support_invalidation_closures()
            .build();

        debug!(
            max_capacity = config.max_capacity,
            ttl_seconds = config.ttl_seconds,
            tti_seconds = config.tti_seconds,
            "Query cache initialized"
        );

        Self { entries }
    }

    async fn get<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let value = self.entries.get(key).await?;
        value.downcast::<T>().ok()
    }

    async fn put<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        self.entries.insert(key, Arc::new(value)).await;
    }

    /// Drop every cached result read from `table` of the database named `scope`.
    pub async fn invalidate_table(&self, scope: &str, table: &str) {
        let (target_scope, target_table) = (scope.to_string(), table.to_string());
        if let Err(e) = self.entries.invalidate_entries_if(move |key, _| {
            key.scope == target_scope && key.table == target_table
        }) {
            warn!(
                database = %scope,
                table = %table,
                error = %e,
                "Falling back to full cache invalidation"
            );
            self.entries.invalidate_all();
        }
        self.entries.run_pending_tasks().await;
        counter!(
            "tabula.cache.invalidations",
            "database" => scope.to_string(),
            "table" => table.to_string()
        )
        .increment(1);
    }

    /// Drop every cached result.
    pub async fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
    }

    pub async fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks().await;
        CacheStats {
            entry_count: self.entries.entry_count(),
            max_capacity: self.entries.policy().max_capacity(),
        }
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entry_count", &self.entries.entry_count())
            .finish()
    }
}

/// A [`Store`] whose reads are served from a [`QueryCache`] when possible.
pub struct CachingRepository<E: Entity, S: Store<E>> {
    inner: S,
    cache: QueryCache,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity, S: Store<E>> CachingRepository<E, S> {
    pub fn new(inner: S, cache: QueryCache) -> Self {
        Self {
            inner,
            cache,
            _entity: PhantomData,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn key(&self, shape: String) -> QueryKey {
        QueryKey::new(self.inner.scope(), self.inner.table(), shape)
    }

    fn hit(&self) {
        counter!("tabula.cache.hits", "table" => self.inner.table().to_string()).increment(1);
    }

    fn miss(&self) {
        counter!("tabula.cache.misses", "table" => self.inner.table().to_string()).increment(1);
    }
}

#[async_trait]
impl<E: Entity, S: Store<E>> Store<E> for CachingRepository<E, S> {
    fn scope(&self) -> &str {
        self.inner.scope()
    }

    fn table(&self) -> &str {
        self.inner.table()
    }

    async fn fetch(&self, select: &Select) -> PersistenceResult<Vec<E>> {
        let key = self.key(format!("{} fetch {}", E::NAME, select));
        if let Some(cached) = self.cache.get::<Vec<E>>(&key).await {
            self.hit();
            debug!(table = %self.table(), %select, "Query cache hit");
            return Ok((*cached).clone());
        }

        self.miss();
        let rows = self.inner.fetch(select).await?;
        self.cache.put(key, rows.clone()).await;
        Ok(rows)
    }

    async fn count_by(&self, predicate: &Predicate) -> PersistenceResult<u64> {
        let key = self.key(format!("{} count {}", E::NAME, predicate));
        if let Some(cached) = self.cache.get::<u64>(&key).await {
            self.hit();
            return Ok(*cached);
        }

        self.miss();
        let total = self.inner.count_by(predicate).await?;
        self.cache.put(key, total).await;
        Ok(total)
    }

    async fn insert(&self, entity: &mut E) -> PersistenceResult<()> {
        let result = self.inner.insert(entity).await;
        self.cache
            .invalidate_table(self.inner.scope(), self.inner.table())
            .await;
        result
    }

    async fn update(&self, entity: &E) -> PersistenceResult<()> {
        let result = self.inner.update(entity).await;
        self.cache
            .invalidate_table(self.inner.scope(), self.inner.table())
            .await;
        result
    }

    async fn delete(&self, entity: &E) -> PersistenceResult<()> {
        let result = self.inner.delete(entity).await;
        self.cache
            .invalidate_table(self.inner.scope(), self.inner.table())
            .await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_typed_round_trip() {
        let cache = QueryCache::new(&CacheConfig::default());
        let key = QueryKey::new("main", "Accounts", "count *".to_string());
        cache.put(key.clone(), 5u64).await;
        assert_eq!(cache.get::<u64>(&key).await.as_deref(), Some(&5));
        assert!(cache.get::<String>(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_table_is_scoped() {
        let cache = QueryCache::new(&CacheConfig::default());
        let accounts = QueryKey::new("main", "Accounts", "count *".to_string());
        let roles = QueryKey::new("main", "Roles", "count *".to_string());
        let archived = QueryKey::new("archive", "Accounts", "count *".to_string());
        cache.put(accounts.clone(), 1u64).await;
        cache.put(roles.clone(), 2u64).await;
        cache.put(archived.clone(), 3u64).await;

        cache.invalidate_table("main", "Accounts").await;
        assert!(cache.get::<u64>(&accounts).await.is_none());
        assert_eq!(cache.get::<u64>(&roles).await.as_deref(), Some(&2));
        assert_eq!(cache.get::<u64>(&archived).await.as_deref(), Some(&3));
    }

    #[test]
    fn test_keys_differ_by_database() {
        let main = QueryKey::new("main", "Accounts", "count *".to_string());
        let archive = QueryKey::new("archive", "Accounts", "count *".to_string());
        assert_ne!(main, archive);
    }

    #[tokio::test]
    async fn test_stats_and_clear() {
        let cache = QueryCache::new(&CacheConfig {
            max_capacity: 50,
            ..CacheConfig::default()
        });
        cache
            .put(
                QueryKey::new("main", "Accounts", "fetch *".to_string()),
                Vec::<u8>::new(),
            )
            .await;

        let stats = cache.stats().await;
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.max_capacity, Some(50));

        cache.clear().await;
        assert_eq!(cache.stats().await.entry_count, 0);
    }
}
