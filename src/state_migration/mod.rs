// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::networks::{ChainConfig, Height, NetworkChain};
use crate::shim::clock::ChainEpoch;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use tokio_util::sync::CancellationToken;

pub mod balances;
pub mod common;
mod nv4;
mod type_migrations;

pub use common::{MemoryMigrationCache, MigrationCacheArc, MigrationConfig, MigrationError};

type RunMigration<DB> = fn(
    &ChainConfig,
    &DB,
    &Cid,
    ChainEpoch,
    &MigrationConfig,
    MigrationCacheArc,
    &CancellationToken,
) -> anyhow::Result<Cid>;

/// Run state migrations
pub fn run_state_migrations<DB>(
    epoch: ChainEpoch,
    chain_config: &ChainConfig,
    db: &DB,
    parent_state: &Cid,
    config: &MigrationConfig,
    cache: MigrationCacheArc,
    cancel: &CancellationToken,
) -> anyhow::Result<Option<Cid>>
where
    DB: Blockstore + Send + Sync,
{
    let mappings: Vec<(_, RunMigration<DB>)> = match chain_config.network {
        NetworkChain::Mainnet | NetworkChain::Devnet(_) => {
            vec![(Height::ActorsV2, nv4::run_migration::<DB>)]
        }
    };

    for (height, migrate) in mappings {
        if chain_config.epoch(height) == Some(epoch) {
            tracing::info!("Running {height} migration at epoch {epoch}");
            let start_time = std::time::Instant::now();
            let new_state = migrate(
                chain_config,
                db,
                parent_state,
                epoch,
                config,
                cache,
                cancel,
            )?;
            let elapsed = start_time.elapsed().as_secs_f32();
            if new_state != *parent_state {
                tracing::info!(
                    "State migration at height {height}(epoch {epoch}) was successful, Previous state: {parent_state}, new state: {new_state}. Took: {elapsed}s."
                );
            } else {
                anyhow::bail!(
                    "State post migration at height {height} must not match. Previous state: {parent_state}, new state: {new_state}. Took {elapsed}s."
                );
            }

            return Ok(Some(new_state));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests;
