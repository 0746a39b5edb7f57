// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::shim::{address::Address, econ::TokenAmount};
use cid::Cid;

/// Fatal outcome of a state tree migration. No partial root is ever returned
/// alongside any of these.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Reading or writing the block store failed.
    #[error("state store failure: {0:#}")]
    Store(#[source] anyhow::Error),
    /// A migrator rejected the state of one actor.
    #[error("state migration failed for {code} actor, addr {address}: {source:#}")]
    ActorMigration {
        address: Address,
        /// Code the actor was being migrated to.
        code: Cid,
        #[source]
        source: anyhow::Error,
    },
    #[error("no migrator registered for code {code} of actor {address}")]
    UnknownActorCode { address: Address, code: Cid },
    #[error("{name} actor {address} not found in state tree")]
    MissingActor { name: &'static str, address: Address },
    #[error("migration transfers of {transfers} send burnt funds balance {balance} below zero")]
    NegativeBurntFunds {
        balance: TokenAmount,
        transfers: TokenAmount,
    },
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("state migration cancelled")]
    Cancelled,
}

impl MigrationError {
    /// Whether the run was aborted by its caller rather than by a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
