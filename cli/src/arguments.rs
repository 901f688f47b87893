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

use clap::Parser;
use std::path::Path;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to configuration file",
        default_value = "tabula.yaml"
    )]
    pub config_file: String,

    #[arg(short = 'e', long = "env", help = "Path to environment file")]
    pub env_file: Option<String>,
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            config_file: "tabula.yaml".to_string(),
            env_file: None,
        }
    }
}

impl Arguments {
    /// Load the environment file if one was given and exists, otherwise the default `.env`.
    pub fn load_environment(&self) {
        match self.env_file {
            Some(ref env_file) if Path::new(env_file).exists() => {
                tracing::debug!("Loading environment variables from file: {}", env_file);
                dotenv::from_filename(env_file).ok();
            }
            Some(ref env_file) => {
                tracing::warn!("Environment file {} does not exist", env_file);
            }
            None => {
                tracing::debug!("Loading environment variables from default file");
                dotenv::dotenv().ok();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_default() {
        let args = Arguments::default();
        assert_eq!(args.config_file, "tabula.yaml");
        assert_eq!(args.env_file, None);
    }

    #[test]
    fn test_arguments_parse() {
        let args =
            Arguments::try_parse_from(["tabula-cli", "-c", "prod.yaml", "--env", "prod.env"])
                .unwrap();
        assert_eq!(args.config_file, "prod.yaml");
        assert_eq!(args.env_file.as_deref(), Some("prod.env"));

        let args = Arguments::try_parse_from(["tabula-cli"]).unwrap();
        assert_eq!(args.config_file, "tabula.yaml");
        assert!(args.env_file.is_none());
    }

    #[test]
    fn test_load_environment_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test.env");
        std::fs::write(&file_path, "TABULA_CLI_TEST_VALUE=loaded\n").unwrap();

        let args = Arguments {
            config_file: "tabula.yaml".to_string(),
            env_file: Some(file_path.to_string_lossy().into_owned()),
        };
        args.load_environment();
        assert_eq!(
            std::env::var("TABULA_CLI_TEST_VALUE").as_deref(),
            Ok("loaded")
        );
        unsafe {
            std::env::remove_var("TABULA_CLI_TEST_VALUE");
        }
    }
}
