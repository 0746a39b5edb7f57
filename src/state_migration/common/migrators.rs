// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::sync::Arc;

use crate::shim::address::Address;
use fvm_ipld_blockstore::Blockstore;

use super::{ActorMigration, ActorMigrationInput, ActorMigrationOutput, Migrator};

/// Migrator that only re-codes the actor, keeping its state head.
pub(in crate::state_migration) fn nil_migrator<BS: Blockstore>() -> Migrator<BS> {
    Arc::new(NilMigrator)
}

pub(in crate::state_migration) struct NilMigrator;

impl<BS: Blockstore> ActorMigration<BS> for NilMigrator {
    fn migrate_state(
        &self,
        _store: &BS,
        input: ActorMigrationInput,
    ) -> anyhow::Result<Option<ActorMigrationOutput>> {
        Ok(Some(ActorMigrationOutput::new(input.head)))
    }
}

/// Dispatch table entry of an actor migrated after the concurrent pass. It
/// does no work; the actor is written by its deferred migrator.
pub(super) struct DeferredMigrator {
    pub address: Address,
}

impl<BS: Blockstore> ActorMigration<BS> for DeferredMigrator {
    fn migrate_state(
        &self,
        _store: &BS,
        input: ActorMigrationInput,
    ) -> anyhow::Result<Option<ActorMigrationOutput>> {
        anyhow::ensure!(
            input.address == self.address,
            "deferred actor code found at {}, expected only at {}",
            input.address,
            self.address
        );
        Ok(None)
    }
}
