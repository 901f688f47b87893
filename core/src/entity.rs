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

//! Caller facing entity operations.
//!
//! Every operation takes the [`Store`] it should use explicitly. Construct one repository per
//! entity type at startup and pass it to the call sites that need it.

use crate::error::{PersistenceError, PersistenceResult};
use crate::predicate::Page;
use crate::record::Entity;
use crate::store::Store;
use async_trait::async_trait;

#[async_trait]
pub trait PersistentEntity: Entity {
    async fn get<S: Store<Self>>(store: &S, id: Self::Id) -> PersistenceResult<Option<Self>> {
        store.get(id).await
    }

    /// Absent identities yield absence.
    async fn get_optional<S: Store<Self>>(
        store: &S,
        id: Option<Self::Id>,
    ) -> PersistenceResult<Option<Self>> {
        match id {
            Some(id) => store.get(id).await,
            None => Ok(None),
        }
    }

    async fn must_get<S: Store<Self>>(store: &S, id: Self::Id) -> PersistenceResult<Self> {
        store.must_get(id).await
    }

    /// Fails with `NotFound` when no identity is supplied.
    async fn must_get_optional<S: Store<Self>>(
        store: &S,
        id: Option<Self::Id>,
    ) -> PersistenceResult<Self> {
        match id {
            Some(id) => store.must_get(id).await,
            None => Err(PersistenceError::not_found(Self::NAME, "no identity supplied")),
        }
    }

    async fn get_all<S: Store<Self>>(store: &S) -> PersistenceResult<Vec<Self>> {
        store.get_all(None).await
    }

    async fn get_page<S: Store<Self>>(store: &S, page: Page) -> PersistenceResult<Vec<Self>> {
        store.get_all(Some(page)).await
    }

    async fn count<S: Store<Self>>(store: &S) -> PersistenceResult<u64> {
        store.count().await
    }

    /// Insert when transient, otherwise update.
    async fn save<S: Store<Self>>(&mut self, store: &S) -> PersistenceResult<()> {
        store.save(self).await
    }

    async fn delete<S: Store<Self>>(&self, store: &S) -> PersistenceResult<()> {
        store.delete(self).await
    }
}
