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

mod arguments;

use arguments::Arguments;
use clap::Parser;
use tabula_core::{Configuration, Databases, QueryCache};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load arguments from the command line
    let arguments: Arguments = Parser::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .with_ansi(true)
        .init();

    arguments.load_environment();

    let config = Configuration::load(&arguments.config_file)?;
    for (name, database) in &config.databases {
        tracing::debug!("Configured database {} ({})", name, *database.kind);
    }

    tracing::info!("Connecting {} logical databases", config.databases.len());
    let databases = Databases::connect(&config).await?;

    for database in databases.iter() {
        match database.ping().await {
            Ok(()) => tracing::info!(
                "Database {} ({}) is reachable",
                database.name(),
                database.descriptor().kind()
            ),
            Err(e) => {
                tracing::error!("Database {} is unreachable: {}", database.name(), e);
                databases.close().await;
                return Err(e.into());
            }
        }
    }

    let cache = QueryCache::new(&config.cache);
    let stats = cache.stats().await;
    tracing::info!(
        "Query cache ready: {} entries, capacity {:?}",
        stats.entry_count,
        stats.max_capacity
    );

    databases.close().await;
    tracing::info!("All databases verified");
    Ok(())
}
