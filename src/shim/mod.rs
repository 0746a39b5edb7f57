// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod address;
pub mod clock;
pub mod econ;
pub mod machine;
pub mod sector;
pub mod state_tree;

mod fvm_shared_latest {
    pub use fvm_shared4::*;
}
