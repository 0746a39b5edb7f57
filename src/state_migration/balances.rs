// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Balance bookkeeping around a migration: the funds migrators move out of
//! the burnt funds actor, and accounting over input trees used to check that
//! a migration conserves the total supply.

use crate::actors::miner;
use crate::shim::{
    address::{Address, BURNT_FUNDS_ACTOR_ADDR},
    econ::TokenAmount,
    machine::{ActorsVersion, BuiltinActor, BuiltinActorManifest},
    state_tree::StateTree,
};
use crate::utils::db::CborStoreExt as _;
use ahash::HashMap;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;

use super::common::MigrationError;

/// Running sum of the funds migrators reported as moving from the burnt
/// funds actor into migrated actors.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransferLedger {
    total: TokenAmount,
    count: usize,
}

impl TransferLedger {
    pub fn add(&mut self, transfer: TokenAmount) {
        if transfer.is_zero() {
            return;
        }
        self.total += transfer;
        self.count += 1;
    }

    pub fn total(&self) -> &TokenAmount {
        &self.total
    }

    /// Number of non-zero transfers recorded.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Debits the burnt funds actor of `actors_out` by everything recorded in
/// `ledger`.
pub fn reconcile_burnt_funds<BS: Blockstore>(
    actors_out: &mut StateTree<BS>,
    ledger: &TransferLedger,
) -> Result<(), MigrationError> {
    let mut burnt_funds = actors_out
        .get_actor(&BURNT_FUNDS_ACTOR_ADDR)
        .map_err(MigrationError::Store)?
        .ok_or(MigrationError::MissingActor {
            name: "burnt funds",
            address: BURNT_FUNDS_ACTOR_ADDR,
        })?;
    let balance = &burnt_funds.balance - ledger.total();
    if balance.is_negative() {
        return Err(MigrationError::NegativeBurntFunds {
            balance: burnt_funds.balance,
            transfers: ledger.total().clone(),
        });
    }
    tracing::info!(
        "Debiting {} from burnt funds in {} transfers, remaining {balance}",
        ledger.total(),
        ledger.count()
    );
    burnt_funds.balance = balance;
    actors_out
        .set_actor(&BURNT_FUNDS_ACTOR_ADDR, burnt_funds)
        .map_err(MigrationError::Store)
}

/// Total balance held by all actors of the tree at `root`.
pub fn input_tree_balance<BS: Blockstore>(store: &BS, root: &Cid) -> anyhow::Result<TokenAmount> {
    let actors_in = StateTree::new_from_root(store, root)?;
    let mut total = TokenAmount::default();
    actors_in.for_each(|_, actor| {
        total += actor.balance.clone();
        Ok(())
    })?;
    Ok(total)
}

/// Balance of the burnt funds actor of the tree at `root`.
pub fn input_tree_burnt_funds<BS: Blockstore>(
    store: &BS,
    root: &Cid,
) -> anyhow::Result<TokenAmount> {
    let actors_in = StateTree::new_from_root(store, root)?;
    Ok(actors_in
        .get_actor(&BURNT_FUNDS_ACTOR_ADDR)?
        .ok_or_else(|| anyhow::anyhow!("burnt funds actor not found"))?
        .balance)
}

/// Outstanding available balance of every v1 miner of the tree at `root`:
/// its balance minus locked funds, pre-commit deposits and initial pledge.
/// A negative value is debt the migration unburns into fee debt.
pub fn input_tree_miner_available_balance<BS: Blockstore>(
    store: &BS,
    root: &Cid,
) -> anyhow::Result<HashMap<Address, TokenAmount>> {
    let miner_code = BuiltinActorManifest::builtin(ActorsVersion::V1)?.get(BuiltinActor::Miner)?;
    let actors_in = StateTree::new_from_root(store, root)?;
    let mut available = HashMap::default();
    actors_in.for_each(|addr, actor| {
        if actor.code != miner_code {
            return Ok(());
        }
        let state: miner::v1::State = store.get_cbor_required(&actor.state)?;
        available.insert(addr, miner_available_balance(&actor.balance, &state));
        Ok(())
    })?;
    Ok(available)
}

pub(in crate::state_migration) fn miner_available_balance(
    balance: &TokenAmount,
    state: &miner::v1::State,
) -> TokenAmount {
    let liabilities = &state.locked_funds + &state.pre_commit_deposits + &state.initial_pledge;
    balance - liabilities
}
