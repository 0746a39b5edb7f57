// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::sync::Arc;

use crate::networks::ChainConfig;
use crate::shim::{
    address::VERIFIED_REGISTRY_ACTOR_ADDR,
    clock::ChainEpoch,
    machine::{ActorsVersion, BuiltinActor, BuiltinActorManifest},
};
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use tokio_util::sync::CancellationToken;

use super::super::common::{
    MigrationCacheArc, MigrationConfig, StateMigration, migrators::nil_migrator,
};
use super::{miner, power, system, verifier::Verifier, verifreg};

impl<BS: Blockstore> StateMigration<BS> {
    /// Registers the actors v1 to v2 migrators. `actors_in` is the root of
    /// the tree being migrated, read by the power migrator.
    pub(in crate::state_migration) fn add_nv4_migrations(
        &mut self,
        store: &BS,
        actors_in: &Cid,
    ) -> anyhow::Result<()> {
        let current_manifest = BuiltinActorManifest::builtin(ActorsVersion::V1)?;
        let new_manifest = BuiltinActorManifest::builtin(ActorsVersion::V2)?;

        for (builtin, code) in current_manifest.builtin_actors() {
            let new_code = new_manifest.get(builtin)?;
            match builtin {
                BuiltinActor::System => self.add_migrator(
                    code,
                    new_code,
                    system::system_migrator(new_manifest.put_actor_list(store)?),
                ),
                BuiltinActor::Miner => self.add_migrator(code, new_code, miner::miner_migrator()),
                BuiltinActor::Power => {
                    self.add_migrator(code, new_code, power::power_migrator(*actors_in))
                }
                BuiltinActor::VerifiedRegistry => self.add_deferred_migrator(
                    VERIFIED_REGISTRY_ACTOR_ADDR,
                    code,
                    new_code,
                    verifreg::verifreg_migrator(),
                ),
                BuiltinActor::Init
                | BuiltinActor::Cron
                | BuiltinActor::Account
                | BuiltinActor::Market
                | BuiltinActor::PaymentChannel
                | BuiltinActor::Multisig
                | BuiltinActor::Reward => self.add_migrator(code, new_code, nil_migrator()),
            }
        }

        Ok(())
    }
}

/// Runs the migration for `NV4`. Returns the new state root.
pub fn run_migration<DB>(
    chain_config: &ChainConfig,
    blockstore: &DB,
    state: &Cid,
    epoch: ChainEpoch,
    config: &MigrationConfig,
    cache: MigrationCacheArc,
    cancel: &CancellationToken,
) -> anyhow::Result<Cid>
where
    DB: Blockstore + Send + Sync,
{
    tracing::debug!("Migrating {} state {state} to actors v2", chain_config.network);

    // Add migration registry verification
    let verifier = Arc::new(Verifier::default());

    let mut migration = StateMigration::<DB>::new(Some(verifier));
    migration.add_nv4_migrations(blockstore, state)?;

    let new_state = migration.migrate_state_tree(blockstore, epoch, state, config, cache, cancel)?;

    Ok(new_state)
}
