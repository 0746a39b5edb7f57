// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Network upgrade state migrations for Forest.
//!
//! A migration rewrites every actor of a persisted state tree from the schema
//! of one actors version to the next. The engine lives in
//! [`state_migration::common`], the concrete upgrades next to it.

pub mod actors;
pub mod db;
pub mod networks;
pub mod shim;
pub mod state_migration;
pub mod utils;
