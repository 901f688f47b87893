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

//! Entity identity, bookkeeping timestamps and row mapping.

use crate::error::PersistenceResult;
use crate::value::{Column, Value, parse_timestamp};
use chrono::{DateTime, Utc};
use sqlx::any::{Any, AnyRow};
use sqlx::{Decode, Row, Type};
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};

pub const ID_COLUMN: &str = "id";
pub const CREATED_COLUMN: &str = "created";
pub const UPDATED_COLUMN: &str = "updated";

/// Scalar key of a persisted record, stored as a 64-bit integer column.
///
/// The type's default value means "not yet persisted".
pub trait Identity:
    Copy + Default + Eq + Hash + Debug + Display + Send + Sync + 'static
{
    fn to_i64(self) -> i64;

    /// Narrow a stored identity, `None` if it does not fit.
    fn from_i64(value: i64) -> Option<Self>;

    fn is_unset(&self) -> bool {
        *self == Self::default()
    }
}

macro_rules! impl_identity {
    ($($ty:ty),*) => {
        $(
            impl Identity for $ty {
                fn to_i64(self) -> i64 {
                    i64::from(self)
                }

                fn from_i64(value: i64) -> Option<Self> {
                    <$ty>::try_from(value).ok()
                }
            }
        )*
    };
}

impl_identity!(i8, i16, i32, i64, u8, u16, u32);

/// Identity plus created/updated stamps.
///
/// Only the repository layer assigns the identity or stamps the timestamps. Equality and hashing
/// consider the identity alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct EntityRecord<I: Identity> {
    id: I,
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
}

impl<I: Identity> EntityRecord<I> {
    pub fn id(&self) -> I {
        self.id
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }

    /// True until an insert assigns an identity.
    pub fn is_transient(&self) -> bool {
        self.id.is_unset()
    }

    pub(crate) fn from_parts(id: I, created: DateTime<Utc>, updated: DateTime<Utc>) -> Self {
        Self {
            id,
            created: Some(created),
            updated: Some(updated),
        }
    }

    pub(crate) fn assign_id(&mut self, id: I) {
        self.id = id;
    }

    pub(crate) fn stamp_inserted(&mut self, now: DateTime<Utc>) {
        self.created = Some(now);
        self.updated = Some(now);
    }

    pub(crate) fn stamp_updated(&mut self, now: DateTime<Utc>) {
        self.updated = Some(now);
    }
}

impl<I: Identity> PartialEq for EntityRecord<I> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<I: Identity> Eq for EntityRecord<I> {}

impl<I: Identity> Hash for EntityRecord<I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A record type persisted in its own table.
///
/// `columns`, `values` and `from_row` describe the entity specific columns only. The `id`,
/// `created` and `updated` columns are managed through [`EntityRecord`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Identity;

    /// Type name, used for table naming and error messages.
    const NAME: &'static str;

    /// Explicit table name. `None`, `""` and `"Table"` fall back to `<NAME>s`.
    const TABLE: Option<&'static str> = None;

    fn columns() -> &'static [Column];

    fn record(&self) -> &EntityRecord<Self::Id>;

    fn record_mut(&mut self) -> &mut EntityRecord<Self::Id>;

    /// Values for [`Entity::columns`], in the same order.
    fn values(&self) -> Vec<Value>;

    fn from_row(record: EntityRecord<Self::Id>, row: &EntityRow<'_>) -> PersistenceResult<Self>;

    fn id(&self) -> Self::Id {
        self.record().id()
    }

    fn is_transient(&self) -> bool {
        self.record().is_transient()
    }
}

/// Read access to one result row.
#[derive(Clone, Copy)]
pub struct EntityRow<'r> {
    row: &'r AnyRow,
}

impl<'r> EntityRow<'r> {
    pub(crate) fn new(row: &'r AnyRow) -> Self {
        Self { row }
    }

    pub fn get<T>(&self, column: &str) -> PersistenceResult<T>
    where
        T: Decode<'r, Any> + Type<Any>,
    {
        let row: &'r AnyRow = self.row;
        Ok(row.try_get(column)?)
    }

    /// Boolean column, accepting the integer encoding some backends report.
    pub fn flag(&self, column: &str) -> PersistenceResult<bool> {
        match self.get::<bool>(column) {
            Ok(flag) => Ok(flag),
            Err(_) => Ok(self.get::<i64>(column)? != 0),
        }
    }

    pub fn optional_timestamp(&self, column: &str) -> PersistenceResult<Option<DateTime<Utc>>> {
        match self.get::<Option<String>>(column)? {
            None => Ok(None),
            Some(text) => parse_timestamp(&text).map(Some).map_err(|e| {
                sqlx::Error::ColumnDecode {
                    index: column.to_string(),
                    source: Box::new(e),
                }
                .into()
            }),
        }
    }

    pub fn timestamp(&self, column: &str) -> PersistenceResult<DateTime<Utc>> {
        self.optional_timestamp(column)?.ok_or_else(|| {
            sqlx::Error::ColumnDecode {
                index: column.to_string(),
                source: "unexpected NULL timestamp".into(),
            }
            .into()
        })
    }

    pub(crate) fn record<I: Identity>(&self) -> PersistenceResult<EntityRecord<I>> {
        let raw = self.get::<i64>(ID_COLUMN)?;
        let id = I::from_i64(raw).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: ID_COLUMN.to_string(),
            source: format!("identity {} is out of range", raw).into(),
        })?;
        Ok(EntityRecord::from_parts(
            id,
            self.timestamp(CREATED_COLUMN)?,
            self.timestamp(UPDATED_COLUMN)?,
        ))
    }
}
