// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::sync::Arc;

use crate::shim::state_tree::StateTree;
use ahash::HashMap;
use cid::Cid;

use super::{MigrationError, RegisteredMigrator};

/// The implementation should verify that the migration registry is
/// correct. This is to prevent accidental migration errors.
pub trait ActorMigrationVerifier<BS> {
    fn verify_migration(
        &self,
        store: &BS,
        migrations: &HashMap<Cid, RegisteredMigrator<BS>>,
        actors_in: &StateTree<&BS>,
    ) -> Result<(), MigrationError>;
}

/// Type implementing the `ActorMigrationVerifier` trait.
pub type MigrationVerifier<BS> = Arc<dyn ActorMigrationVerifier<BS> + Send + Sync>;
