// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! This module contains the migration logic for the `NV4` upgrade for the
//! Power actor.

use std::sync::Arc;

use crate::actors::{
    make_empty_map, make_map_with_root,
    miner::v1::State as MinerStateOld,
    power::{
        v1::{Claim as ClaimV1, State as PowerStateOld},
        v2::{Claim as ClaimV2, State as PowerStateNew},
    },
};
use crate::shim::{address::Address, state_tree::StateTree};
use crate::state_migration::common::{
    ActorMigration, ActorMigrationInput, ActorMigrationOutput, Migrator,
};
use crate::utils::db::CborStoreExt as _;
use anyhow::Context as _;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;

/// v2 claims carry the seal proof type of their miner, which lives in the
/// miner's own state. The migrator therefore reads the whole input tree.
pub struct PowerMigrator {
    actors_in: Cid,
}

pub(super) fn power_migrator<BS: Blockstore>(actors_in: Cid) -> Migrator<BS> {
    Arc::new(PowerMigrator { actors_in })
}

impl<BS: Blockstore> ActorMigration<BS> for PowerMigrator {
    fn migrate_state(
        &self,
        store: &BS,
        input: ActorMigrationInput,
    ) -> anyhow::Result<Option<ActorMigrationOutput>> {
        let in_state: PowerStateOld = store
            .get_cbor_required(&input.head)
            .context("Power actor: could not read v1 state")?;
        let actors_in = StateTree::new_from_root(store, &self.actors_in)?;

        let in_claims = make_map_with_root::<_, ClaimV1>(&in_state.claims, store)?;
        let mut out_claims = make_empty_map::<_, ClaimV2>(store);

        in_claims.for_each(|key, claim| {
            let miner_addr = Address::from_bytes(&key.0)?;
            let miner = actors_in
                .get_actor(&miner_addr)?
                .with_context(|| format!("claim for miner {miner_addr} not in state tree"))?;
            let miner_state: MinerStateOld = store
                .get_cbor_required(&miner.state)
                .with_context(|| format!("failed to load state of miner {miner_addr}"))?;
            let out_claim = ClaimV2 {
                seal_proof_type: miner_state.seal_proof_type,
                raw_byte_power: claim.raw_byte_power,
                quality_adj_power: claim.quality_adj_power,
            };
            out_claims.set(key.to_owned(), out_claim)?;
            Ok(())
        })?;

        let out_state = PowerStateNew {
            total_raw_byte_power: in_state.total_raw_byte_power,
            total_quality_adj_power: in_state.total_quality_adj_power,
            miner_count: in_state.miner_count,
            claims: out_claims.flush()?,
        };

        let new_head = store.put_cbor_default(&out_state)?;

        Ok(Some(ActorMigrationOutput::new(new_head)))
    }
}
