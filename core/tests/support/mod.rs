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

#![allow(dead_code)]

use tabula_core::{
    Column, Database, DatabaseDescriptor, DialectKind, Entity, EntityRecord, EntityRow,
    PersistenceResult, PersistentEntity, Repository, Value,
};
use tempfile::TempDir;

/// A SQLite database living in a temporary directory.
pub struct TestDatabase {
    _dir: TempDir,
    pub database: Database,
}

pub async fn sqlite_database() -> TestDatabase {
    sqlite_database_named("test").await
}

pub async fn sqlite_database_named(name: &str) -> TestDatabase {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tabula.db");
    let descriptor =
        DatabaseDescriptor::new(DialectKind::Sqlite, format!("sqlite://{}", path.display()));
    let database = Database::connect(name, descriptor, 1)
        .await
        .expect("Failed to open test database");
    TestDatabase {
        _dir: dir,
        database,
    }
}

/// Repository with its table created.
pub async fn repository<E: Entity>(database: &Database) -> Repository<E> {
    let repository = Repository::<E>::new(database);
    repository
        .create_table()
        .await
        .expect("Failed to create table");
    repository
}

#[derive(Clone, Debug)]
pub struct Account {
    record: EntityRecord<i64>,
    pub name: String,
    pub nickname: Option<String>,
    pub rating: i64,
    pub balance: f64,
    pub active: bool,
}

impl Account {
    pub fn new(name: &str) -> Self {
        Self {
            record: EntityRecord::default(),
            name: name.to_string(),
            nickname: None,
            rating: 0,
            balance: 0.0,
            active: true,
        }
    }

    pub fn with_rating(mut self, rating: i64) -> Self {
        self.rating = rating;
        self
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record
    }
}

impl Entity for Account {
    type Id = i64;

    const NAME: &'static str = "Account";

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::text("name"),
            Column::text("nickname").nullable(),
            Column::bigint("rating"),
            Column::double("balance"),
            Column::boolean("active"),
        ];
        COLUMNS
    }

    fn record(&self) -> &EntityRecord<i64> {
        &self.record
    }

    fn record_mut(&mut self) -> &mut EntityRecord<i64> {
        &mut self.record
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.name.as_str()),
            Value::from(self.nickname.clone()),
            Value::from(self.rating),
            Value::from(self.balance),
            Value::from(self.active),
        ]
    }

    fn from_row(record: EntityRecord<i64>, row: &EntityRow<'_>) -> PersistenceResult<Self> {
        Ok(Self {
            record,
            name: row.get("name")?,
            nickname: row.get("nickname")?,
            rating: row.get("rating")?,
            balance: row.get("balance")?,
            active: row.flag("active")?,
        })
    }
}

impl PersistentEntity for Account {}
