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

use crate::database::{DEFAULT_MAX_CONNECTIONS, DatabaseDescriptor};
use crate::dialect::DialectKind;
use crate::error::{PersistenceError, PersistenceResult};
use serde::{Deserialize, Serialize};
use serde_env_field::EnvField;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Logical databases by name.
    #[serde(default)]
    pub databases: BTreeMap<String, DatabaseConfig>,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Configuration {
    pub fn load(path: impl AsRef<Path>) -> PersistenceResult<Configuration> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            PersistenceError::configuration(format!(
                "Failed to open config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let conf = serde_yaml::from_reader(file).map_err(|e| {
            PersistenceError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        Ok(conf)
    }

    pub fn from_yaml(yaml: &str) -> PersistenceResult<Configuration> {
        serde_yaml::from_str(yaml).map_err(|e| {
            PersistenceError::configuration(format!("Failed to parse configuration: {}", e))
        })
    }
}

/// Connection settings of one logical database. Its `Debug` output omits the endpoint, which may
/// carry credentials.
#[derive(Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub kind: EnvField<DialectKind>,
    pub endpoint: EnvField<String>,
    #[serde(default)]
    pub trust_server_certificate: bool,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("kind", &*self.kind)
            .field("endpoint", &"<redacted>")
            .field("trust_server_certificate", &self.trust_server_certificate)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl DatabaseConfig {
    pub fn descriptor(&self) -> DatabaseDescriptor {
        DatabaseDescriptor::new(*self.kind, self.endpoint.as_str())
            .with_trust_server_certificate(self.trust_server_certificate)
    }
}

/// Query cache sizing and expiry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_capacity: u64,
    pub ttl_seconds: u64,
    pub tti_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl_seconds: 300,
            tti_seconds: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_debug_output_hides_endpoint() {
        let config = Configuration::from_yaml(
            "databases:\n  master:\n    kind: postgres\n    endpoint: \"postgres://admin:hunter2@db/master\"\n",
        )
        .unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("master"));
        assert!(rendered.contains("Postgres"));
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("admin"));
    }

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.max_capacity, 10_000);
        assert_eq!(config.ttl_seconds, 300);
        assert_eq!(config.tti_seconds, 60);
    }

    #[test]
    fn test_configuration_default() {
        let config = Configuration::default();
        assert!(config.databases.is_empty());
        assert_eq!(config.cache, CacheConfig::default());
    }

    #[test]
    fn test_configuration_load_missing_file() {
        let result = Configuration::load("non_existent.yaml");
        assert!(result.unwrap_err().is_configuration());
    }

    #[test]
    fn test_configuration_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("tabula.yaml");
        std::fs::write(
            &file_path,
            "databases:\n  master:\n    kind: postgres\n    endpoint: \"postgres://localhost/master\"\n    trust_server_certificate: true\n    max_connections: 12\n  local:\n    kind: sqlite\n    endpoint: \"sqlite://local.db\"\ncache:\n  ttl_seconds: 30\n",
        )
        .unwrap();

        let config = Configuration::load(&file_path).unwrap();
        assert_eq!(config.databases.len(), 2);

        let master = &config.databases["master"];
        assert_eq!(*master.kind, DialectKind::Postgres);
        assert_eq!(master.max_connections, 12);
        let descriptor = master.descriptor();
        assert_eq!(descriptor.endpoint(), "postgres://localhost/master");
        assert!(descriptor.trust_server_certificate());

        let local = &config.databases["local"];
        assert_eq!(*local.kind, DialectKind::Sqlite);
        assert_eq!(local.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(!local.trust_server_certificate);

        assert_eq!(config.cache.ttl_seconds, 30);
        assert_eq!(config.cache.max_capacity, 10_000);
    }

    #[test]
    fn test_unknown_kind_fails_to_load() {
        let result = Configuration::from_yaml(
            "databases:\n  legacy:\n    kind: oracle\n    endpoint: \"oracle://localhost\"\n",
        );
        assert!(result.unwrap_err().is_configuration());
    }

    #[test]
    fn test_malformed_yaml_fails_to_load() {
        let result = Configuration::from_yaml("databases: [not, a, map");
        assert!(result.unwrap_err().is_configuration());
    }

    #[test]
    fn test_endpoint_environment_substitution() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        unsafe {
            std::env::set_var("TABULA_TEST_MASTER_URL", "postgres://env/master");
            std::env::set_var("TABULA_TEST_MASTER_KIND", "pg");
        }

        let config = Configuration::from_yaml(
            "databases:\n  master:\n    kind: \"${TABULA_TEST_MASTER_KIND}\"\n    endpoint: \"${TABULA_TEST_MASTER_URL}\"\n",
        );

        unsafe {
            std::env::remove_var("TABULA_TEST_MASTER_URL");
            std::env::remove_var("TABULA_TEST_MASTER_KIND");
        }

        let config = config.unwrap();
        let master = &config.databases["master"];
        assert_eq!(*master.kind, DialectKind::Postgres);
        assert_eq!(master.endpoint.as_str(), "postgres://env/master");
    }
}
