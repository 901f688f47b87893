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

//! The storage seam every repository implements.
//!
//! Implementors supply the six primitives (`table`, `fetch`, `count_by`, `insert`, `update` and
//! `delete`). Everything else, including the insert-or-update decision made by
//! [`Store::save_with`], is provided in terms of those primitives so decorators such as the
//! caching repository inherit identical semantics.

use crate::error::{PersistenceError, PersistenceResult};
use crate::predicate::{Page, Predicate, Select};
use crate::record::{Entity, ID_COLUMN, Identity};
use crate::value::now;
use async_trait::async_trait;
use std::future::Future;

#[async_trait]
pub trait Store<E: Entity>: Send + Sync {
    /// Name of the database the table lives in. Two stores share rows only when both scope and
    /// table match.
    fn scope(&self) -> &str;

    /// Backing table name.
    fn table(&self) -> &str;

    /// Rows matching `select`, ordered by identity.
    async fn fetch(&self, select: &Select) -> PersistenceResult<Vec<E>>;

    async fn count_by(&self, predicate: &Predicate) -> PersistenceResult<u64>;

    /// Insert a transient entity and assign its backend generated identity.
    async fn insert(&self, entity: &mut E) -> PersistenceResult<()>;

    async fn update(&self, entity: &E) -> PersistenceResult<()>;

    /// Delete by identity. Deleting a row that does not exist is a no-op.
    async fn delete(&self, entity: &E) -> PersistenceResult<()>;

    /// First row matching `predicate`, if any.
    ///
    /// Meant for named finders declared alongside an entity rather than ad hoc searches.
    async fn get_by(&self, predicate: Predicate) -> PersistenceResult<Option<E>> {
        Ok(self.fetch(&Select::first(predicate)).await?.into_iter().next())
    }

    async fn must_get_by(&self, predicate: Predicate) -> PersistenceResult<E> {
        let criteria = predicate.to_string();
        self.get_by(predicate)
            .await?
            .ok_or_else(|| PersistenceError::not_found(E::NAME, criteria))
    }

    /// Every row matching `predicate`. Like [`Store::get_by`], intended for named finders.
    ///
    /// Offset/limit paging is unreliable once identities exceed the signed 64-bit range.
    async fn multi_get_by(
        &self,
        predicate: Predicate,
        page: Option<Page>,
    ) -> PersistenceResult<Vec<E>> {
        self.fetch(&Select::new(predicate, page)).await
    }

    async fn get(&self, id: E::Id) -> PersistenceResult<Option<E>> {
        self.get_by(Predicate::eq(ID_COLUMN, id.to_i64())).await
    }

    async fn must_get(&self, id: E::Id) -> PersistenceResult<E> {
        self.must_get_by(Predicate::eq(ID_COLUMN, id.to_i64())).await
    }

    async fn get_all(&self, page: Option<Page>) -> PersistenceResult<Vec<E>> {
        self.multi_get_by(Predicate::All, page).await
    }

    async fn count(&self) -> PersistenceResult<u64> {
        self.count_by(&Predicate::All).await
    }

    /// Return what `getter` finds, otherwise whatever `creator` produces.
    ///
    /// Not atomic: concurrent callers may both miss and both create.
    async fn get_or_create<G, GF, C, CF>(&self, getter: G, creator: C) -> PersistenceResult<E>
    where
        G: FnOnce() -> GF + Send,
        GF: Future<Output = PersistenceResult<Option<E>>> + Send,
        C: FnOnce() -> CF + Send,
        CF: Future<Output = PersistenceResult<E>> + Send,
    {
        if let Some(existing) = getter().await? {
            return Ok(existing);
        }
        creator().await
    }

    /// Insert a transient entity or update a persisted one.
    ///
    /// Timestamps are stamped first, then the matching hook runs, then the statement is issued.
    /// If the statement fails the identity and timestamps are restored to their prior values.
    async fn save_with<I, U>(
        &self,
        entity: &mut E,
        on_insert: I,
        on_update: U,
    ) -> PersistenceResult<()>
    where
        I: FnOnce(&mut E) + Send,
        U: FnOnce(&mut E) + Send,
    {
        let previous = *entity.record();
        let now = now();
        let result = if entity.is_transient() {
            entity.record_mut().stamp_inserted(now);
            on_insert(&mut *entity);
            self.insert(entity).await
        } else {
            entity.record_mut().stamp_updated(now);
            on_update(&mut *entity);
            self.update(entity).await
        };
        if result.is_err() {
            *entity.record_mut() = previous;
        }
        result
    }

    async fn save(&self, entity: &mut E) -> PersistenceResult<()> {
        self.save_with(entity, |_| {}, |_| {}).await
    }
}
