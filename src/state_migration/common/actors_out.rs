// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::shim::{
    address::Address,
    state_tree::{ActorState, StateTree},
};
use fvm_ipld_blockstore::Blockstore;
use parking_lot::Mutex;

/// Output state tree shared by the migration workers. Writes are serialized;
/// since they commute by address, completion order does not affect the root.
pub(super) struct ActorsOut<S> {
    tree: Mutex<StateTree<S>>,
}

impl<S: Blockstore> ActorsOut<S> {
    pub fn new(tree: StateTree<S>) -> Self {
        Self {
            tree: Mutex::new(tree),
        }
    }

    pub fn set_actor(&self, addr: &Address, actor: ActorState) -> anyhow::Result<()> {
        self.tree.lock().set_actor(addr, actor)
    }

    pub fn into_inner(self) -> StateTree<S> {
        self.tree.into_inner()
    }
}
