// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Common code that's shared across all migration code.
//! Each network upgrade / state migration code lives in their own module.

use std::sync::Arc;

use crate::shim::{address::Address, clock::ChainEpoch, econ::TokenAmount, state_tree::StateTree};
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;

mod actors_out;
mod config;
mod error;
mod migration_cache;
mod migration_job;
pub(in crate::state_migration) mod migrators;
mod state_migration;
pub mod verifier;
mod worker_pool;

pub use config::MigrationConfig;
pub use error::MigrationError;
pub use migration_cache::{MemoryMigrationCache, MigrationCache, MigrationCacheArc, cache_key};
pub use state_migration::{RegisteredMigrator, StateMigration};

/// Sized wrapper of [`ActorMigration`].
pub type Migrator<BS> = Arc<dyn ActorMigration<BS> + Send + Sync>;

/// Sized wrapper of [`DeferredActorMigration`].
pub type DeferredMigratorArc<BS> = Arc<dyn DeferredActorMigration<BS> + Send + Sync>;

/// Input of a single actor migration.
#[derive(Clone)]
pub struct ActorMigrationInput {
    /// Actor's address
    pub address: Address,
    /// Actor's balance
    pub balance: TokenAmount,
    /// Actor's state head CID
    pub head: Cid,
    /// Epoch of last state transition prior to migration
    pub prior_epoch: ChainEpoch,
    /// Cache of previous migration results
    pub cache: MigrationCacheArc,
}

/// Output of actor migration job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorMigrationOutput {
    /// New state head CID
    pub new_head: Cid,
    /// Funds moved from the burnt funds actor into this actor. Never negative.
    pub transfer: TokenAmount,
}

impl ActorMigrationOutput {
    /// Output for a migration that moves no funds.
    pub fn new(new_head: Cid) -> Self {
        Self {
            new_head,
            transfer: TokenAmount::default(),
        }
    }
}

/// Trait that defines the interface for actor migration job.
///
/// Implementations are invoked concurrently from the migration worker pool
/// and must be deterministic given their input, the store and the cache.
pub trait ActorMigration<BS: Blockstore> {
    /// Returns `None` when the actor is not migrated in the concurrent pass.
    fn migrate_state(
        &self,
        store: &BS,
        input: ActorMigrationInput,
    ) -> anyhow::Result<Option<ActorMigrationOutput>>;
}

/// Migration of an actor that depends on the migrated state of other actors.
/// Runs sequentially once every other actor has been written to `actors_out`.
pub trait DeferredActorMigration<BS: Blockstore> {
    fn migrate_deferred(
        &self,
        store: &BS,
        input: ActorMigrationInput,
        actors_out: &StateTree<&BS>,
    ) -> anyhow::Result<ActorMigrationOutput>;
}

/// Trait that migrates from one data structure to another, similar to
/// [`std::convert::TryInto`] trait but taking an extra block store parameter
pub(in crate::state_migration) trait TypeMigration<From, To> {
    fn migrate_type(from: From, store: &impl Blockstore) -> anyhow::Result<To>;
}

/// Type that implements [`TypeMigration`] for different type pairs. Prefer
/// using a single `struct` so that the compiler could catch duplicate
/// implementations
pub(in crate::state_migration) struct TypeMigrator;
