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

//! Relational store for one entity type.

use crate::database::Database;
use crate::dialect::IdentityStrategy;
use crate::error::{PersistenceError, PersistenceResult};
use crate::predicate::{Predicate, Select};
use crate::record::{CREATED_COLUMN, Entity, EntityRow, ID_COLUMN, Identity, UPDATED_COLUMN};
use crate::store::Store;
use crate::value::{ColumnKind, Value, bind_all};
use async_trait::async_trait;
use sqlx::Row;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Reads and writes rows of `E` in a single table of one logical database.
pub struct Repository<E: Entity> {
    database: Database,
    table: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    /// Bind `E` to `database`, naming the table through the database's dialect.
    pub fn new(database: &Database) -> Self {
        let table = database.dialect().table_name(E::NAME, E::TABLE);
        Self {
            database: database.clone(),
            table,
            _entity: PhantomData,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Create the backing table if it does not already exist.
    pub async fn create_table(&self) -> PersistenceResult<()> {
        let dialect = self.database.dialect();
        let timestamp = dialect.column_type(ColumnKind::Timestamp);

        let mut definitions = vec![
            dialect.identity_column(&dialect.quote(ID_COLUMN)),
            format!("{} {} NOT NULL", dialect.quote(CREATED_COLUMN), timestamp),
            format!("{} {} NOT NULL", dialect.quote(UPDATED_COLUMN), timestamp),
        ];
        definitions.extend(E::columns().iter().map(|column| {
            format!(
                "{} {}{}",
                dialect.quote(column.name()),
                dialect.column_type(column.kind()),
                if column.is_nullable() { "" } else { " NOT NULL" }
            )
        }));
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            dialect.quote(&self.table),
            definitions.join(", ")
        );

        debug!(table = %self.table, "Creating table");
        let mut connection = self.database.acquire().await?;
        sqlx::query(&sql).execute(&mut *connection).await?;
        Ok(())
    }

    pub async fn drop_table(&self) -> PersistenceResult<()> {
        let sql = format!(
            "DROP TABLE IF EXISTS {}",
            self.database.dialect().quote(&self.table)
        );

        debug!(table = %self.table, "Dropping table");
        let mut connection = self.database.acquire().await?;
        sqlx::query(&sql).execute(&mut *connection).await?;
        Ok(())
    }

    fn validate(&self, predicate: &Predicate) -> PersistenceResult<()> {
        for column in predicate.columns() {
            let known = [ID_COLUMN, CREATED_COLUMN, UPDATED_COLUMN].contains(&column)
                || E::columns().iter().any(|c| c.name() == column);
            if !known {
                return Err(PersistenceError::invalid_argument(format!(
                    "{} has no column '{}'",
                    E::NAME,
                    column
                )));
            }
        }
        Ok(())
    }

    fn values(&self, entity: &E) -> PersistenceResult<Vec<Value>> {
        let values = entity.values();
        if values.len() != E::columns().len() {
            return Err(PersistenceError::invalid_argument(format!(
                "{} supplied {} values for {} columns",
                E::NAME,
                values.len(),
                E::columns().len()
            )));
        }
        Ok(values)
    }

    fn column_list(&self) -> String {
        let dialect = self.database.dialect();
        [ID_COLUMN, CREATED_COLUMN, UPDATED_COLUMN]
            .into_iter()
            .chain(E::columns().iter().map(|column| column.name()))
            .map(|name| dialect.quote(name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn bookkeeping(entity: &E) -> PersistenceResult<(Value, Value)> {
        let record = entity.record();
        match (record.created(), record.updated()) {
            (Some(created), Some(updated)) => Ok((created.into(), updated.into())),
            _ => Err(PersistenceError::invalid_argument(format!(
                "{} has not been stamped",
                E::NAME
            ))),
        }
    }
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            table: self.table.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> std::fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &E::NAME)
            .field("database", &self.database.name())
            .field("table", &self.table)
            .finish()
    }
}

#[async_trait]
impl<E: Entity> Store<E> for Repository<E> {
    fn scope(&self) -> &str {
        self.database.name()
    }

    fn table(&self) -> &str {
        &self.table
    }

    async fn fetch(&self, select: &Select) -> PersistenceResult<Vec<E>> {
        self.validate(&select.predicate)?;
        let dialect = self.database.dialect();

        let mut params = Vec::new();
        let condition = select.predicate.render(dialect, &mut params);
        let mut sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {}",
            self.column_list(),
            dialect.quote(&self.table),
            condition,
            dialect.quote(ID_COLUMN)
        );
        if let Some(page) = select.page {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", page.size, page.start));
        }

        debug!(table = %self.table, %select, "Fetching rows");
        let mut connection = self.database.acquire().await?;
        let rows = bind_all(sqlx::query(&sql), params)
            .fetch_all(&mut *connection)
            .await?;

        rows.iter()
            .map(|row| {
                let row = EntityRow::new(row);
                E::from_row(row.record()?, &row)
            })
            .collect()
    }

    async fn count_by(&self, predicate: &Predicate) -> PersistenceResult<u64> {
        self.validate(predicate)?;
        let dialect = self.database.dialect();

        let mut params = Vec::new();
        let condition = predicate.render(dialect, &mut params);
        let sql = format!(
            "SELECT COUNT(*) AS {} FROM {} WHERE {}",
            dialect.quote("total"),
            dialect.quote(&self.table),
            condition
        );

        let mut connection = self.database.acquire().await?;
        let row = bind_all(sqlx::query(&sql), params)
            .fetch_one(&mut *connection)
            .await?;
        let total: i64 = row.try_get(0)?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn insert(&self, entity: &mut E) -> PersistenceResult<()> {
        if !entity.is_transient() {
            return Err(PersistenceError::invalid_argument(format!(
                "{} {} is already persisted",
                E::NAME,
                entity.id()
            )));
        }
        let dialect = self.database.dialect();
        let (created, updated) = Self::bookkeeping(entity)?;

        let mut params = vec![created, updated];
        params.extend(self.values(entity)?);
        let columns = [CREATED_COLUMN, UPDATED_COLUMN]
            .into_iter()
            .chain(E::columns().iter().map(|column| column.name()))
            .map(|name| dialect.quote(name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=params.len())
            .map(|index| dialect.placeholder(index))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            dialect.quote(&self.table),
            columns,
            placeholders
        );

        let mut connection = self.database.acquire().await?;
        let raw = match dialect.identity_strategy() {
            IdentityStrategy::ServerIdentityColumn => {
                sql.push_str(&format!(" RETURNING {}", dialect.quote(ID_COLUMN)));
                let row = bind_all(sqlx::query(&sql), params)
                    .fetch_one(&mut *connection)
                    .await?;
                row.try_get::<i64, _>(0)?
            }
            IdentityStrategy::GenerateOnAdd => {
                let result = bind_all(sqlx::query(&sql), params)
                    .execute(&mut *connection)
                    .await?;
                match dialect.generated_identity_query() {
                    Some(query) => sqlx::query(query)
                        .fetch_one(&mut *connection)
                        .await?
                        .try_get::<i64, _>(0)?,
                    None => result.last_insert_id().ok_or_else(|| {
                        sqlx::Error::Protocol(format!(
                            "{} backend did not report a generated identity",
                            dialect.kind()
                        ))
                    })?,
                }
            }
        };

        let id = E::Id::from_i64(raw).ok_or_else(|| {
            sqlx::Error::Decode(format!("{} identity {} is out of range", E::NAME, raw).into())
        })?;
        entity.record_mut().assign_id(id);

        debug!(table = %self.table, id = %id, "Inserted row");
        Ok(())
    }

    async fn update(&self, entity: &E) -> PersistenceResult<()> {
        if entity.is_transient() {
            return Err(PersistenceError::invalid_argument(format!(
                "{} has no identity to update",
                E::NAME
            )));
        }
        let dialect = self.database.dialect();
        let (_, updated) = Self::bookkeeping(entity)?;

        let mut params = vec![updated];
        params.extend(self.values(entity)?);
        let assignments = std::iter::once(UPDATED_COLUMN)
            .chain(E::columns().iter().map(|column| column.name()))
            .enumerate()
            .map(|(index, name)| {
                format!("{} = {}", dialect.quote(name), dialect.placeholder(index + 1))
            })
            .collect::<Vec<_>>()
            .join(", ");
        params.push(Value::from(entity.id().to_i64()));
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = {}",
            dialect.quote(&self.table),
            assignments,
            dialect.quote(ID_COLUMN),
            dialect.placeholder(params.len())
        );

        let mut connection = self.database.acquire().await?;
        let result = bind_all(sqlx::query(&sql), params)
            .execute(&mut *connection)
            .await?;
        if result.rows_affected() == 0 {
            warn!(table = %self.table, id = %entity.id(), "Update matched no rows");
        } else {
            debug!(table = %self.table, id = %entity.id(), "Updated row");
        }
        Ok(())
    }

    async fn delete(&self, entity: &E) -> PersistenceResult<()> {
        if entity.is_transient() {
            debug!(table = %self.table, "Ignoring delete of transient entity");
            return Ok(());
        }
        let dialect = self.database.dialect();
        let sql = format!(
            "DELETE FROM {} WHERE {} = {}",
            dialect.quote(&self.table),
            dialect.quote(ID_COLUMN),
            dialect.placeholder(1)
        );

        let mut connection = self.database.acquire().await?;
        let result = sqlx::query(&sql)
            .bind(entity.id().to_i64())
            .execute(&mut *connection)
            .await?;
        debug!(
            table = %self.table,
            id = %entity.id(),
            rows = result.rows_affected(),
            "Deleted row"
        );
        Ok(())
    }
}
