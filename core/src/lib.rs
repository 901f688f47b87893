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

//! Tabula: generic entity persistence over interchangeable relational backends.
//!
//! Entities declare their columns through [`Entity`] and gain CRUD, predicate search, paging and
//! get-or-create through a [`Store`]. [`Repository`] talks to one table of a [`Database`] whose
//! SQL flavour, identity generation and table naming come from its [`Dialect`].
//! [`CachingRepository`] puts a [`QueryCache`] in front of any store.

pub mod cache;
pub mod config;
pub mod database;
pub mod dialect;
pub mod entity;
pub mod enumerated;
pub mod error;
pub mod predicate;
pub mod record;
pub mod repository;
pub mod store;
pub mod value;

pub use cache::{CacheStats, CachingRepository, QueryCache};
pub use config::{CacheConfig, Configuration, DatabaseConfig};
pub use database::{Database, DatabaseDescriptor, Databases};
pub use dialect::{Dialect, DialectKind, IdentityStrategy};
pub use entity::PersistentEntity;
pub use enumerated::{EnumeratedEntity, VALUE_COLUMN};
pub use error::{PersistenceError, PersistenceResult};
pub use predicate::{Comparison, Page, Predicate, Select};
pub use record::{
    CREATED_COLUMN, Entity, EntityRecord, EntityRow, ID_COLUMN, Identity, UPDATED_COLUMN,
};
pub use repository::Repository;
pub use store::Store;
pub use value::{Column, ColumnKind, Value};
