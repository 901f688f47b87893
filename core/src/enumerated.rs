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

//! Lookup-table entities.
//!
//! An enumerated entity is a row standing in for an enumeration constant that is only known at
//! runtime. Rows are found by their string `value` and created on demand.

use crate::entity::PersistentEntity;
use crate::error::{PersistenceError, PersistenceResult};
use crate::predicate::Predicate;
use crate::store::Store;
use async_trait::async_trait;

pub const VALUE_COLUMN: &str = "value";

#[async_trait]
pub trait EnumeratedEntity: PersistentEntity {
    fn value(&self) -> &str;

    /// A transient entity carrying `value`.
    fn from_value(value: String) -> Self;

    async fn get_by_value<S: Store<Self>>(
        store: &S,
        value: &str,
    ) -> PersistenceResult<Option<Self>> {
        store.get_by(Predicate::eq(VALUE_COLUMN, value)).await
    }

    async fn must_get_by_value<S: Store<Self>>(store: &S, value: &str) -> PersistenceResult<Self> {
        store.must_get_by(Predicate::eq(VALUE_COLUMN, value)).await
    }

    /// Existing row for `value`, or a newly created one.
    ///
    /// Two concurrent callers may both create a row; nothing enforces uniqueness of `value`.
    async fn get_or_create<S: Store<Self>>(store: &S, value: &str) -> PersistenceResult<Self> {
        store
            .get_or_create(
                move || Self::get_by_value(store, value),
                move || Self::create(store, value),
            )
            .await
    }

    /// Insert a new row. Blank values are rejected.
    async fn create<S: Store<Self>>(store: &S, value: &str) -> PersistenceResult<Self> {
        if value.trim().is_empty() {
            return Err(PersistenceError::invalid_argument(format!(
                "{} value must not be empty",
                Self::NAME
            )));
        }
        let mut entity = Self::from_value(value.to_string());
        store.save(&mut entity).await?;
        Ok(entity)
    }
}

/// Declare a lookup-table entity with a single `value` column.
///
/// ```ignore
/// enumerated_entity! {
///     /// Kinds of content creator.
///     pub struct CreatorType(i32);
/// }
///
/// enumerated_entity! {
///     pub struct Role(i16) in "roles";
/// }
/// ```
#[macro_export]
macro_rules! enumerated_entity {
    ($(#[$meta:meta])* $vis:vis struct $name:ident($id:ty) $(in $table:literal)?;) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        $vis struct $name {
            record: $crate::EntityRecord<$id>,
            value: String,
        }

        #[allow(dead_code)]
        impl $name {
            pub fn set_value(&mut self, value: impl Into<String>) {
                self.value = value.into();
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.record == other.record
            }
        }

        impl Eq for $name {}

        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&self.record, state);
            }
        }

        impl $crate::Entity for $name {
            type Id = $id;

            const NAME: &'static str = stringify!($name);
            $(const TABLE: Option<&'static str> = Some($table);)?

            fn columns() -> &'static [$crate::Column] {
                const COLUMNS: &[$crate::Column] = &[$crate::Column::text($crate::VALUE_COLUMN)];
                COLUMNS
            }

            fn record(&self) -> &$crate::EntityRecord<$id> {
                &self.record
            }

            fn record_mut(&mut self) -> &mut $crate::EntityRecord<$id> {
                &mut self.record
            }

            fn values(&self) -> Vec<$crate::Value> {
                vec![$crate::Value::from(self.value.as_str())]
            }

            fn from_row(
                record: $crate::EntityRecord<$id>,
                row: &$crate::EntityRow<'_>,
            ) -> $crate::PersistenceResult<Self> {
                Ok(Self {
                    record,
                    value: row.get::<String>($crate::VALUE_COLUMN)?,
                })
            }
        }

        impl $crate::PersistentEntity for $name {}

        impl $crate::EnumeratedEntity for $name {
            fn value(&self) -> &str {
                &self.value
            }

            fn from_value(value: String) -> Self {
                Self {
                    record: Default::default(),
                    value,
                }
            }
        }
    };
}
