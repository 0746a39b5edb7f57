// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! This module contains the migration logic for the `NV4` upgrade for the
//! Miner actor.

use std::sync::Arc;

use crate::actors::{
    make_empty_map, make_map_with_root,
    miner::{
        v1::{SectorOnChainInfo as SectorOnChainInfoV1, State as MinerStateOld},
        v2::{SectorOnChainInfo as SectorOnChainInfoV2, State as MinerStateNew},
    },
    parse_u64_key,
};
use crate::shim::econ::TokenAmount;
use crate::state_migration::balances::miner_available_balance;
use crate::state_migration::common::{
    ActorMigration, ActorMigrationInput, ActorMigrationOutput, Migrator, TypeMigration,
    TypeMigrator, cache_key,
};
use crate::utils::db::CborStoreExt as _;
use anyhow::Context as _;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use num_traits::Zero as _;

/// Cache name of the v1 to v2 sectors conversion, keyed by the v1 root.
pub(super) const SECTORS_CACHE_NAME: &str = "miner-sectors";

pub struct MinerMigrator;

pub(super) fn miner_migrator<BS: Blockstore>() -> Migrator<BS> {
    Arc::new(MinerMigrator)
}

impl<BS: Blockstore> ActorMigration<BS> for MinerMigrator {
    fn migrate_state(
        &self,
        store: &BS,
        input: ActorMigrationInput,
    ) -> anyhow::Result<Option<ActorMigrationOutput>> {
        let in_state: MinerStateOld = store
            .get_cbor_required(&input.head)
            .context("Miner actor: could not read v1 state")?;

        let sectors = input.cache.load(
            &cache_key(SECTORS_CACHE_NAME, &in_state.sectors),
            || migrate_sectors(store, &in_state.sectors),
        )?;

        // Debt the miner could not cover is unburnt into its balance and
        // owed back as fee debt.
        let available = miner_available_balance(&input.balance, &in_state);
        let fee_debt = if available.is_negative() {
            -available
        } else {
            TokenAmount::zero()
        };

        let out_state = MinerStateNew {
            owner: in_state.owner,
            seal_proof_type: in_state.seal_proof_type,
            pre_commit_deposits: in_state.pre_commit_deposits,
            locked_funds: in_state.locked_funds,
            initial_pledge: in_state.initial_pledge,
            fee_debt: fee_debt.clone(),
            sectors,
        };

        let new_head = store.put_cbor_default(&out_state)?;

        Ok(Some(ActorMigrationOutput {
            new_head,
            transfer: fee_debt,
        }))
    }
}

fn migrate_sectors<BS: Blockstore>(store: &BS, sectors: &Cid) -> anyhow::Result<Cid> {
    let in_sectors = make_map_with_root::<_, SectorOnChainInfoV1>(sectors, store)
        .context("Miner actor: could not load v1 sectors")?;
    let mut out_sectors = make_empty_map::<_, SectorOnChainInfoV2>(store);
    in_sectors.for_each(|key, sector| {
        let sector_number = parse_u64_key(&key.0)?;
        anyhow::ensure!(
            sector_number == sector.sector_number,
            "Miner actor: sector {} stored under key {sector_number}",
            sector.sector_number
        );
        let out_sector = TypeMigrator::migrate_type(sector.clone(), store)?;
        out_sectors.set(key.clone(), out_sector)?;
        Ok(())
    })?;
    Ok(out_sectors.flush()?)
}
