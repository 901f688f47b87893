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

/// PostgreSQL: identities come from a server managed identity column.
#[derive(Clone, Copy, Debug, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
    }

    fn identity_strategy(&self) -> IdentityStrategy {
        IdentityStrategy::ServerIdentityColumn
    }

    fn identity_column(&self, quoted_name: &str) -> String {
        format!("{} BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY", quoted_name)
    }

    fn column_type(&self, kind: ColumnKind) -> &'static str {
        match kind {
            ColumnKind::BigInt => "BIGINT",
            ColumnKind::Double => "DOUBLE PRECISION",
            ColumnKind::Text => "TEXT",
            ColumnKind::Bool => "BOOLEAN",
            ColumnKind::Timestamp => "TEXT",
        }
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn connection_overlay(&self, descriptor: &DatabaseDescriptor) -> String {
        if descriptor.trust_server_certificate() {
            // Encrypts the session without validating the server certificate.
            tracing::warn!(
                "Certificate validation disabled for postgres endpoint; configure a trusted CA instead"
            );
            append_parameter(descriptor.endpoint(), "sslmode", "require")
        } else {
            descriptor.endpoint().to_string()
        }
    }
}
