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

//! Dialect adapters
//!
//! Each supported backend contributes one [`Dialect`] implementation describing:
//! - How identities are generated (server identity column or generate-on-add)
//! - How tables are named and identifiers quoted
//! - How the configured endpoint is overlaid with dialect specific connection options
//!
//! Adapters are selected by looking up a [`DialectKind`] in a static registry.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::database::DatabaseDescriptor;
use crate::error::{PersistenceError, PersistenceResult};
use crate::value::ColumnKind;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Table name that is treated as "not configured".
pub const TABLE_NAME_PLACEHOLDER: &str = "Table";

/// Supported backend kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "lowercase")]
pub enum DialectKind {
    /// Server managed identity column.
    Postgres,
    /// Embedded, file based.
    Sqlite,
    /// Generate-on-add.
    MySql,
}

impl DialectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialectKind::Postgres => "postgres",
            DialectKind::Sqlite => "sqlite",
            DialectKind::MySql => "mysql",
        }
    }
}

impl FromStr for DialectKind {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            "sqlite" => Ok(DialectKind::Sqlite),
            "mysql" | "mariadb" => Ok(DialectKind::MySql),
            other => Err(PersistenceError::configuration(format!(
                "unrecognized database kind '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for DialectKind {
    type Error = PersistenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for DialectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a backend assigns identities to inserted rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityStrategy {
    /// The identity column is owned by the server and returned by the insert statement.
    ServerIdentityColumn,
    /// The row id is generated on add and read back on the inserting connection.
    GenerateOnAdd,
}

/// Per-dialect rule set.
pub trait Dialect: std::fmt::Debug + Send + Sync {
    fn kind(&self) -> DialectKind;

    fn identity_strategy(&self) -> IdentityStrategy;

    /// Column definition for the identity column named `quoted_name`.
    fn identity_column(&self, quoted_name: &str) -> String;

    fn column_type(&self, kind: ColumnKind) -> &'static str;

    /// Statement reading back the identity generated by the last insert on the same connection.
    ///
    /// `None` means the driver reports it through the query result.
    fn generated_identity_query(&self) -> Option<&'static str> {
        None
    }

    /// Positional parameter marker for the 1-based `index`.
    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn quote(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    /// Connection url with dialect specific options applied.
    fn connection_overlay(&self, descriptor: &DatabaseDescriptor) -> String {
        descriptor.endpoint().to_string()
    }

    /// Table name for an entity type.
    fn table_name(&self, type_name: &str, configured: Option<&str>) -> String {
        default_table_name(type_name, configured)
    }
}

/// `<TypeName>s` unless a real table name is configured.
///
/// Pluralization is a naive append of `s`; irregular plurals must be configured explicitly.
pub fn default_table_name(type_name: &str, configured: Option<&str>) -> String {
    match configured.map(str::trim) {
        Some(name) if !name.is_empty() && name != TABLE_NAME_PLACEHOLDER => name.to_string(),
        _ => format!("{}s", type_name),
    }
}

/// Append `key=value` to a connection url unless the key is already present.
pub(crate) fn append_parameter(endpoint: &str, key: &str, value: &str) -> String {
    let query = endpoint.split_once('?').map(|(_, query)| query).unwrap_or("");
    if query
        .split('&')
        .any(|pair| pair.split('=').next() == Some(key))
    {
        return endpoint.to_string();
    }
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", endpoint, separator, key, value)
}

static DIALECTS: &[&dyn Dialect] = &[&PostgresDialect, &SqliteDialect, &MySqlDialect];

/// Look up the adapter registered for `kind`.
pub fn lookup(kind: DialectKind) -> PersistenceResult<&'static dyn Dialect> {
    DIALECTS
        .iter()
        .find(|dialect| dialect.kind() == kind)
        .copied()
        .ok_or_else(|| {
            PersistenceError::configuration(format!("no dialect adapter registered for '{}'", kind))
        })
}

/// Parse a kind name and look up its adapter.
pub fn resolve(kind: &str) -> PersistenceResult<&'static dyn Dialect> {
    lookup(kind.parse()?)
}
