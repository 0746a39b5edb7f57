// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! This module contains the migration logic for the `NV4` upgrade, moving
//! every builtin actor from actors v1 to actors v2.
//! The corresponding Go implementation can be found here:
//! <https://github.com/filecoin-project/specs-actors/blob/v2.0.0/actors/migration/nv4/top.go>

mod migration;
mod miner;
mod power;
mod system;
mod util;
mod verifier;
mod verifreg;

/// Run migration for `NV4`. This should be the only exported method in this
/// module.
pub use migration::run_migration;
