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

use super::{Dialect, DialectKind, IdentityStrategy};
use crate::value::ColumnKind;

/// MySQL and MariaDB: `AUTO_INCREMENT` identities generated on add.
#[derive(Clone, Copy, Debug, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::MySql
    }

    fn identity_strategy(&self) -> IdentityStrategy {
        IdentityStrategy::GenerateOnAdd
    }

    fn identity_column(&self, quoted_name: &str) -> String {
        format!("{} BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY", quoted_name)
    }

    fn column_type(&self, kind: ColumnKind) -> &'static str {
        match kind {
            ColumnKind::BigInt => "BIGINT",
            ColumnKind::Double => "DOUBLE",
            ColumnKind::Text => "VARCHAR(1024)",
            ColumnKind::Bool => "SMALLINT",
            ColumnKind::Timestamp => "VARCHAR(32)",
        }
    }

    fn quote(&self, identifier: &str) -> String {
        format!("`{}`", identifier.replace('`', "``"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseDescriptor;

    #[test]
    fn test_backtick_quoting() {
        assert_eq!(MySqlDialect.quote("CreatorTypes"), "`CreatorTypes`");
        assert_eq!(MySqlDialect.quote("a`b"), "`a``b`");
    }

    #[test]
    fn test_identity_column() {
        assert_eq!(
            MySqlDialect.identity_column("`id`"),
            "`id` BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY"
        );
    }

    #[test]
    fn test_endpoint_is_untouched() {
        let descriptor =
            DatabaseDescriptor::new(DialectKind::MySql, "mysql://root@localhost/tabula_master")
                .with_trust_server_certificate(true);
        assert_eq!(
            MySqlDialect.connection_overlay(&descriptor),
            "mysql://root@localhost/tabula_master"
        );
    }

    #[test]
    fn test_column_types_are_readable_through_any() {
        assert_eq!(MySqlDialect.column_type(ColumnKind::Text), "VARCHAR(1024)");
        assert_eq!(MySqlDialect.column_type(ColumnKind::Bool), "SMALLINT");
        assert_eq!(MySqlDialect.generated_identity_query(), None);
    }

    #[test]
    fn test_timestamp_fits_varchar() {
        assert_eq!(MySqlDialect.column_type(ColumnKind::Timestamp), "VARCHAR(32)");
        assert_eq!(MySqlDialect.table_name("CreatorType", None), "CreatorTypes");
    }
}
