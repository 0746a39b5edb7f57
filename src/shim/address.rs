// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub use super::fvm_shared_latest::address::Address;

/// System actor address.
pub const SYSTEM_ACTOR_ADDR: Address = Address::new_id(0);
/// Init actor address.
pub const INIT_ACTOR_ADDR: Address = Address::new_id(1);
/// Storage power actor address.
pub const STORAGE_POWER_ACTOR_ADDR: Address = Address::new_id(4);
/// Verified registry actor address.
pub const VERIFIED_REGISTRY_ACTOR_ADDR: Address = Address::new_id(6);
/// Distinguished account actor that is the destination of all burnt funds.
pub const BURNT_FUNDS_ACTOR_ADDR: Address = Address::new_id(99);
