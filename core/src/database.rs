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

//! Logical databases
//!
//! A [`DatabaseDescriptor`] names a dialect and an endpoint. Connecting it resolves the dialect
//! adapter, applies the adapter's connection overlay and opens a sqlx `Any` pool. Every
//! repository operation borrows exactly one pooled connection and returns it when the operation
//! finishes, on success and failure alike.

use crate::config::Configuration;
use crate::dialect::{self, Dialect, DialectKind};
use crate::error::{PersistenceError, PersistenceResult};
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use sqlx::pool::PoolConnection;
use sqlx::Any;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Default upper bound on pooled connections per logical database.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Identifies a backend dialect and its connection endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseDescriptor {
    kind: DialectKind,
    endpoint: String,
    trust_server_certificate: bool,
}

impl DatabaseDescriptor {
    pub fn new(kind: DialectKind, endpoint: impl Into<String>) -> Self {
        Self {
            kind,
            endpoint: endpoint.into(),
            trust_server_certificate: false,
        }
    }

    /// Accept the server certificate without validation where the dialect supports it.
    pub fn with_trust_server_certificate(mut self, trust: bool) -> Self {
        self.trust_server_certificate = trust;
        self
    }

    pub fn kind(&self) -> DialectKind {
        self.kind
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn trust_server_certificate(&self) -> bool {
        self.trust_server_certificate
    }

    /// Adapter for this descriptor's dialect.
    pub fn dialect(&self) -> PersistenceResult<&'static dyn Dialect> {
        dialect::lookup(self.kind)
    }
}

/// A descriptor bound to its dialect adapter and connection pool.
#[derive(Clone, Debug)]
pub struct Database {
    name: String,
    descriptor: DatabaseDescriptor,
    dialect: &'static dyn Dialect,
    pool: AnyPool,
}

impl Database {
    /// Connect to the database described by `descriptor`.
    pub async fn connect(
        name: impl Into<String>,
        descriptor: DatabaseDescriptor,
        max_connections: u32,
    ) -> PersistenceResult<Self> {
        sqlx::any::install_default_drivers();
        let name = name.into();
        let dialect = descriptor.dialect()?;
        let url = dialect.connection_overlay(&descriptor);

        info!(database = %name, kind = %descriptor.kind(), "Connecting to database");
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(&url)
            .await?;

        Ok(Self {
            name,
            descriptor,
            dialect,
            pool,
        })
    }

    /// Build the pool without opening a connection until first use.
    pub fn connect_lazy(
        name: impl Into<String>,
        descriptor: DatabaseDescriptor,
        max_connections: u32,
    ) -> PersistenceResult<Self> {
        sqlx::any::install_default_drivers();
        let name = name.into();
        let dialect = descriptor.dialect()?;
        let url = dialect.connection_overlay(&descriptor);

        debug!(database = %name, kind = %descriptor.kind(), "Creating lazy database pool");
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_lazy(&url)?;

        Ok(Self {
            name,
            descriptor,
            dialect,
            pool,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &DatabaseDescriptor {
        &self.descriptor
    }

    pub fn dialect(&self) -> &'static dyn Dialect {
        self.dialect
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Borrow one connection for the duration of a single operation.
    ///
    /// The connection goes back to the pool when the returned guard is dropped.
    pub(crate) async fn acquire(&self) -> PersistenceResult<PoolConnection<Any>> {
        Ok(self.pool.acquire().await?)
    }

    /// Round trip a trivial statement to verify connectivity.
    pub async fn ping(&self) -> PersistenceResult<()> {
        let mut connection = self.acquire().await?;
        sqlx::query("SELECT 1").execute(&mut *connection).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Every configured logical database, by name.
#[derive(Clone, Debug, Default)]
pub struct Databases {
    databases: BTreeMap<String, Database>,
}

impl Databases {
    /// Connect every database in `config`.
    ///
    /// All dialects are resolved before the first connection is attempted so that an unusable
    /// configuration fails without side effects.
    pub async fn connect(config: &Configuration) -> PersistenceResult<Self> {
        let descriptors = Self::descriptors(config)?;
        let mut databases = BTreeMap::new();
        for (name, descriptor, max_connections) in descriptors {
            let database = Database::connect(name.clone(), descriptor, max_connections).await?;
            databases.insert(name, database);
        }
        info!(count = databases.len(), "Databases connected");
        Ok(Self { databases })
    }

    /// Like [`Databases::connect`] but without opening connections.
    pub fn connect_lazy(config: &Configuration) -> PersistenceResult<Self> {
        let descriptors = Self::descriptors(config)?;
        let mut databases = BTreeMap::new();
        for (name, descriptor, max_connections) in descriptors {
            let database = Database::connect_lazy(name.clone(), descriptor, max_connections)?;
            databases.insert(name, database);
        }
        Ok(Self { databases })
    }

    fn descriptors(
        config: &Configuration,
    ) -> PersistenceResult<Vec<(String, DatabaseDescriptor, u32)>> {
        config
            .databases
            .iter()
            .map(|(name, database)| {
                let descriptor = database.descriptor();
                descriptor.dialect().map_err(|e| {
                    PersistenceError::configuration(format!("database '{}': {}", name, e))
                })?;
                Ok((name.clone(), descriptor, database.max_connections))
            })
            .collect()
    }

    /// Look up a logical database by name.
    pub fn get(&self, name: &str) -> PersistenceResult<&Database> {
        self.databases.get(name).ok_or_else(|| {
            PersistenceError::configuration(format!("unknown logical database '{}'", name))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Database> {
        self.databases.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.databases.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub async fn close(&self) {
        for database in self.databases.values() {
            database.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Configuration {
        Configuration::from_yaml(
            "databases:\n  master:\n    kind: postgres\n    endpoint: \"postgres://u:p@localhost/master\"\n  local:\n    kind: sqlite\n    endpoint: \"sqlite::memory:\"\n    max_connections: 1\n",
        )
        .unwrap()
    }

    #[test]
    fn test_descriptor_defaults() {
        let descriptor = DatabaseDescriptor::new(DialectKind::MySql, "mysql://localhost/db");
        assert_eq!(descriptor.kind(), DialectKind::MySql);
        assert_eq!(descriptor.endpoint(), "mysql://localhost/db");
        assert!(!descriptor.trust_server_certificate());
        assert_eq!(descriptor.dialect().unwrap().kind(), DialectKind::MySql);
    }

    #[tokio::test]
    async fn test_lazy_databases_are_addressable_by_name() {
        let databases = Databases::connect_lazy(&config()).unwrap();
        assert_eq!(databases.len(), 2);
        assert_eq!(databases.names().collect::<Vec<_>>(), vec!["local", "master"]);

        let master = databases.get("master").unwrap();
        assert_eq!(master.name(), "master");
        assert_eq!(master.dialect().kind(), DialectKind::Postgres);

        let local = databases.get("local").unwrap();
        assert_eq!(local.descriptor().kind(), DialectKind::Sqlite);
    }

    #[tokio::test]
    async fn test_unknown_database_is_configuration_error() {
        let databases = Databases::connect_lazy(&config()).unwrap();
        let error = databases.get("archive").unwrap_err();
        assert!(error.is_configuration());
    }

    #[tokio::test]
    async fn test_in_memory_sqlite_ping() {
        let descriptor = DatabaseDescriptor::new(DialectKind::Sqlite, "sqlite::memory:");
        let database = Database::connect("memory", descriptor, 1).await.unwrap();
        database.ping().await.unwrap();
        database.close().await;
    }
}
