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

mod support;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use support::{Account, repository, sqlite_database, sqlite_database_named};
use tabula_core::{
    CacheConfig, CachingRepository, Entity, PersistenceResult, PersistentEntity, Predicate,
    QueryCache, Repository, Select, Store,
};

/// Counts the reads that reach the backend.
struct CountingStore {
    inner: Repository<Account>,
    reads: AtomicUsize,
}

impl CountingStore {
    fn new(inner: Repository<Account>) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
        }
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store<Account> for CountingStore {
    fn scope(&self) -> &str {
        self.inner.scope()
    }

    fn table(&self) -> &str {
        self.inner.table()
    }

    async fn fetch(&self, select: &Select) -> PersistenceResult<Vec<Account>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(select).await
    }

    async fn count_by(&self, predicate: &Predicate) -> PersistenceResult<u64> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.count_by(predicate).await
    }

    async fn insert(&self, entity: &mut Account) -> PersistenceResult<()> {
        self.inner.insert(entity).await
    }

    async fn update(&self, entity: &Account) -> PersistenceResult<()> {
        self.inner.update(entity).await
    }

    async fn delete(&self, entity: &Account) -> PersistenceResult<()> {
        self.inner.delete(entity).await
    }
}

async fn caching_store(
    db: &support::TestDatabase,
) -> CachingRepository<Account, CountingStore> {
    let inner = CountingStore::new(repository::<Account>(&db.database).await);
    CachingRepository::new(inner, QueryCache::new(&CacheConfig::default()))
}

#[tokio::test]
async fn test_repeated_reads_are_served_from_cache() {
    let db = sqlite_database().await;
    let accounts = caching_store(&db).await;

    let mut account = Account::new("Ada");
    account.save(&accounts).await.unwrap();

    let first = Account::get(&accounts, account.id()).await.unwrap();
    let second = Account::get(&accounts, account.id()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(accounts.inner().reads(), 1);

    assert_eq!(accounts.count().await.unwrap(), 1);
    assert_eq!(accounts.count().await.unwrap(), 1);
    assert_eq!(accounts.inner().reads(), 2);
}

#[tokio::test]
async fn test_distinct_queries_are_cached_separately() {
    let db = sqlite_database().await;
    let accounts = caching_store(&db).await;

    for name in ["Ada", "Grace"] {
        let mut account = Account::new(name);
        account.save(&accounts).await.unwrap();
    }

    let ada = accounts
        .must_get_by(Predicate::eq("name", "Ada"))
        .await
        .unwrap();
    let grace = accounts
        .must_get_by(Predicate::eq("name", "Grace"))
        .await
        .unwrap();
    assert_ne!(ada, grace);
    assert_eq!(accounts.inner().reads(), 2);
}

#[tokio::test]
async fn test_writes_invalidate_cached_reads() {
    let db = sqlite_database().await;
    let accounts = caching_store(&db).await;

    let mut account = Account::new("Ada").with_rating(1);
    account.save(&accounts).await.unwrap();
    assert_eq!(
        Account::must_get(&accounts, account.id()).await.unwrap().rating,
        1
    );

    account.rating = 2;
    account.save(&accounts).await.unwrap();
    assert_eq!(
        Account::must_get(&accounts, account.id()).await.unwrap().rating,
        2
    );
    assert_eq!(accounts.inner().reads(), 2);

    let id = account.id();
    account.delete(&accounts).await.unwrap();
    assert!(Account::get(&accounts, id).await.unwrap().is_none());
    assert_eq!(accounts.inner().reads(), 3);
}

#[tokio::test]
async fn test_cache_is_shared_between_repositories() {
    let db = sqlite_database().await;
    let cache = QueryCache::new(&CacheConfig::default());
    let first = CachingRepository::new(
        CountingStore::new(repository::<Account>(&db.database).await),
        cache.clone(),
    );
    let second = CachingRepository::new(
        CountingStore::new(Repository::<Account>::new(&db.database)),
        cache.clone(),
    );

    let mut account = Account::new("Ada");
    account.save(&first).await.unwrap();
    assert_eq!(Account::count(&first).await.unwrap(), 1);
    assert_eq!(Account::count(&second).await.unwrap(), 1);
    assert_eq!(first.inner().reads() + second.inner().reads(), 1);

    let mut other = Account::new("Grace");
    other.save(&second).await.unwrap();
    assert_eq!(Account::count(&first).await.unwrap(), 2);

    assert!(cache.stats().await.entry_count >= 1);
    cache.clear().await;
    assert_eq!(cache.stats().await.entry_count, 0);
}

#[tokio::test]
async fn test_shared_cache_keeps_databases_apart() {
    let main = sqlite_database_named("main").await;
    let archive = sqlite_database_named("archive").await;
    let cache = QueryCache::new(&CacheConfig::default());
    let live = CachingRepository::new(
        CountingStore::new(repository::<Account>(&main.database).await),
        cache.clone(),
    );
    let archived = CachingRepository::new(
        CountingStore::new(repository::<Account>(&archive.database).await),
        cache.clone(),
    );
    assert_eq!(live.scope(), "main");
    assert_eq!(archived.scope(), "archive");

    let mut account = Account::new("Ada");
    account.save(&live).await.unwrap();
    assert_eq!(Account::count(&live).await.unwrap(), 1);
    assert!(Account::get(&live, account.id()).await.unwrap().is_some());

    assert_eq!(Account::count(&archived).await.unwrap(), 0);
    assert!(Account::get(&archived, account.id()).await.unwrap().is_none());
    assert!(archived.get_all(None).await.unwrap().is_empty());
    assert_eq!(archived.inner().reads(), 3);

    // A write to the archive leaves the live database's entries cached.
    let mut other = Account::new("Grace");
    other.save(&archived).await.unwrap();
    assert_eq!(Account::count(&live).await.unwrap(), 1);
    assert_eq!(live.inner().reads(), 2);
}
