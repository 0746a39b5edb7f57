// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! This module contains the migration logic for the `NV4` upgrade for the
//! Verified Registry actor. It runs after every other actor is migrated.

use std::sync::Arc;

use crate::actors::{
    power::v2::State as PowerStateNew,
    verifreg::{DataCap, v1::State as VerifregStateOld, v2::State as VerifregStateNew},
};
use crate::shim::{address::STORAGE_POWER_ACTOR_ADDR, state_tree::StateTree};
use crate::state_migration::common::{
    ActorMigrationInput, ActorMigrationOutput, DeferredActorMigration, DeferredMigratorArc,
};
use crate::utils::db::CborStoreExt as _;
use anyhow::Context as _;
use fvm_ipld_blockstore::Blockstore;

use super::util::migrate_hamt;

pub struct VerifregMigrator;

pub(super) fn verifreg_migrator<BS: Blockstore>() -> DeferredMigratorArc<BS> {
    Arc::new(VerifregMigrator)
}

impl<BS: Blockstore> DeferredActorMigration<BS> for VerifregMigrator {
    fn migrate_deferred(
        &self,
        store: &BS,
        input: ActorMigrationInput,
        actors_out: &StateTree<&BS>,
    ) -> anyhow::Result<ActorMigrationOutput> {
        let in_state: VerifregStateOld = store
            .get_cbor_required(&input.head)
            .context("Verifreg actor: could not read v1 state")?;

        let power = actors_out
            .get_required_actor(&STORAGE_POWER_ACTOR_ADDR)
            .context("Verifreg actor: power actor must be migrated first")?;
        let power_state: PowerStateNew = store
            .get_cbor_required(&power.state)
            .context("Verifreg actor: could not read v2 power state")?;

        let out_state = VerifregStateNew {
            root_key: in_state.root_key,
            verifiers: migrate_hamt::<_, DataCap>(store, &in_state.verifiers)?,
            verified_clients: migrate_hamt::<_, DataCap>(store, &in_state.verified_clients)?,
            power_claims: power_state.claims,
        };

        let new_head = store.put_cbor_default(&out_state)?;

        Ok(ActorMigrationOutput::new(new_head))
    }
}
