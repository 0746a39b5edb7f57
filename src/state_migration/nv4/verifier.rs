// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::shim::{
    address::SYSTEM_ACTOR_ADDR,
    machine::{ActorsVersion, BuiltinActorManifest},
    state_tree::StateTree,
};
use crate::state_migration::common::{
    MigrationError, RegisteredMigrator, verifier::ActorMigrationVerifier,
};
use ahash::HashMap;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use itertools::Itertools as _;

#[derive(Default)]
pub struct Verifier {}

impl<BS: Blockstore> ActorMigrationVerifier<BS> for Verifier {
    fn verify_migration(
        &self,
        _store: &BS,
        migrations: &HashMap<Cid, RegisteredMigrator<BS>>,
        actors_in: &StateTree<&BS>,
    ) -> Result<(), MigrationError> {
        actors_in
            .get_actor(&SYSTEM_ACTOR_ADDR)
            .map_err(MigrationError::Store)?
            .ok_or(MigrationError::MissingActor {
                name: "system",
                address: SYSTEM_ACTOR_ADDR,
            })?;
        let manifest =
            BuiltinActorManifest::builtin(ActorsVersion::V1).map_err(MigrationError::Store)?;
        let manifest_actors_count = manifest.builtin_actors().len();
        let missing = manifest
            .builtin_actors()
            .filter(|(_, code)| !migrations.contains_key(code))
            .map(|(builtin, _)| builtin.name())
            .collect_vec();
        if missing.is_empty() {
            tracing::debug!("Migration registry is complete.");
        } else {
            tracing::warn!(
                "Incomplete migration registry. Count: {}, expected: {manifest_actors_count}, missing: [{}]",
                migrations.len(),
                missing.join(", ")
            );
        }

        Ok(())
    }
}
