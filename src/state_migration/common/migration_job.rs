// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::shim::{
    address::Address,
    clock::ChainEpoch,
    econ::TokenAmount,
    state_tree::{ActorState, StateTree},
};
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;

use super::{
    ActorMigration, ActorMigrationInput, ActorMigrationOutput, DeferredActorMigration,
    MigrationCacheArc, MigrationError,
};

/// Defines migration result for a single actor migration.
#[derive(Debug)]
pub(super) struct MigrationJobOutput {
    pub address: Address,
    pub actor_state: ActorState,
    pub transfer: TokenAmount,
}

/// Defines migration job for a single actor migration.
pub(super) struct MigrationJob {
    pub address: Address,
    pub actor_state: ActorState,
    pub new_code: Cid,
}

impl MigrationJob {
    pub fn run<BS: Blockstore>(
        &self,
        migrator: &(dyn ActorMigration<BS> + Send + Sync),
        store: &BS,
        prior_epoch: ChainEpoch,
        cache: MigrationCacheArc,
    ) -> Result<Option<MigrationJobOutput>, MigrationError> {
        migrator
            .migrate_state(store, self.input(prior_epoch, cache))
            .map_err(|source| self.failed(source))?
            .map(|output| self.output(output))
            .transpose()
    }

    pub fn run_deferred<BS: Blockstore>(
        &self,
        migrator: &(dyn DeferredActorMigration<BS> + Send + Sync),
        store: &BS,
        prior_epoch: ChainEpoch,
        cache: MigrationCacheArc,
        actors_out: &StateTree<&BS>,
    ) -> Result<MigrationJobOutput, MigrationError> {
        let output = migrator
            .migrate_deferred(store, self.input(prior_epoch, cache), actors_out)
            .map_err(|source| self.failed(source))?;
        self.output(output)
    }

    fn input(&self, prior_epoch: ChainEpoch, cache: MigrationCacheArc) -> ActorMigrationInput {
        ActorMigrationInput {
            address: self.address,
            balance: self.actor_state.balance.clone(),
            head: self.actor_state.state,
            prior_epoch,
            cache,
        }
    }

    /// Builds the migrated actor, crediting it with the reported transfer.
    fn output(&self, output: ActorMigrationOutput) -> Result<MigrationJobOutput, MigrationError> {
        if output.transfer.is_negative() {
            return Err(self.failed(anyhow::anyhow!(
                "negative transfer {} from burnt funds",
                output.transfer
            )));
        }
        Ok(MigrationJobOutput {
            address: self.address,
            actor_state: ActorState::new(
                self.new_code,
                output.new_head,
                &self.actor_state.balance + &output.transfer,
                self.actor_state.sequence,
            ),
            transfer: output.transfer,
        })
    }

    pub fn failed(&self, source: anyhow::Error) -> MigrationError {
        MigrationError::ActorMigration {
            address: self.address,
            code: self.new_code,
            source,
        }
    }
}
