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

use super::{Dialect, DialectKind, IdentityStrategy, append_parameter};
use crate::database::DatabaseDescriptor;
use crate::value::ColumnKind;

/// SQLite: embedded file database, row ids generated on add.
#[derive(Clone, Copy, Debug, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn identity_strategy(&self) -> IdentityStrategy {
        IdentityStrategy::GenerateOnAdd
    }

    fn identity_column(&self, quoted_name: &str) -> String {
        format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quoted_name)
    }

    fn column_type(&self, kind: ColumnKind) -> &'static str {
        match kind {
            ColumnKind::BigInt => "INTEGER",
            ColumnKind::Double => "REAL",
            ColumnKind::Text => "TEXT",
            ColumnKind::Bool => "INTEGER",
            ColumnKind::Timestamp => "TEXT",
        }
    }

    fn generated_identity_query(&self) -> Option<&'static str> {
        Some("SELECT last_insert_rowid()")
    }

    fn connection_overlay(&self, descriptor: &DatabaseDescriptor) -> String {
        let endpoint = descriptor.endpoint();
        if endpoint.contains(":memory:") {
            endpoint.to_string()
        } else {
            // Create the database file on first use.
            append_parameter(endpoint, "mode", "rwc")
        }
    }
}
