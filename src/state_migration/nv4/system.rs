// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::sync::Arc;

use crate::actors::system::v2::State as SystemStateNew;
use crate::state_migration::common::{
    ActorMigration, ActorMigrationInput, ActorMigrationOutput, Migrator,
};
use crate::utils::db::CborStoreExt as _;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;

pub(super) fn system_migrator<BS: Blockstore>(new_builtin_actors_cid: Cid) -> Migrator<BS> {
    Arc::new(SystemMigrator {
        new_builtin_actors_cid,
    })
}

/// The v1 system actor has no state; the v2 one records the actor list.
pub struct SystemMigrator {
    new_builtin_actors_cid: Cid,
}

impl<BS: Blockstore> ActorMigration<BS> for SystemMigrator {
    fn migrate_state(
        &self,
        store: &BS,
        _input: ActorMigrationInput,
    ) -> anyhow::Result<Option<ActorMigrationOutput>> {
        let state = SystemStateNew {
            builtin_actors: self.new_builtin_actors_cid,
        };
        let new_head = store.put_cbor_default(&state)?;

        Ok(Some(ActorMigrationOutput::new(new_head)))
    }
}
