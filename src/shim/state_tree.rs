// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::actors::{Map, make_empty_map, make_map_with_root};
use crate::shim::{address::Address, econ::TokenAmount};
use anyhow::Context as _;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::tuple::*;
use fvm_ipld_hamt::BytesKey;

/// State of all actor implementations.
#[derive(PartialEq, Eq, Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct ActorState {
    /// Link to code for the actor.
    pub code: Cid,
    /// Link to the state of the actor.
    pub state: Cid,
    /// Sequence of the actor.
    pub sequence: u64,
    /// Tokens available to the actor.
    pub balance: TokenAmount,
}

impl ActorState {
    pub fn new(code: Cid, state: Cid, balance: TokenAmount, sequence: u64) -> Self {
        Self {
            code,
            state,
            sequence,
            balance,
        }
    }
}

/// Content-addressed mapping from actor address to [`ActorState`]. The root
/// returned by [`StateTree::flush`] commits to the whole mapping.
pub struct StateTree<S> {
    hamt: Map<S, ActorState>,
}

impl<S: Blockstore> StateTree<S> {
    /// Creates an empty state tree backed by `store`.
    pub fn new(store: S) -> Self {
        Self {
            hamt: make_empty_map(store),
        }
    }

    /// Loads a state tree from its root.
    pub fn new_from_root(store: S, root: &Cid) -> anyhow::Result<Self> {
        let hamt = make_map_with_root(root, store)
            .with_context(|| format!("failed to load state tree {root}"))?;
        Ok(Self { hamt })
    }

    /// Get actor state from an address. Will be resolved to ID address.
    pub fn get_actor(&self, addr: &Address) -> anyhow::Result<Option<ActorState>> {
        Ok(self.hamt.get(&BytesKey(addr.to_bytes()))?.cloned())
    }

    /// Same as [`StateTree::get_actor`], but returns an error if the actor is absent.
    pub fn get_required_actor(&self, addr: &Address) -> anyhow::Result<ActorState> {
        self.get_actor(addr)?
            .with_context(|| format!("actor {addr} not found in state tree"))
    }

    /// Set actor state with an actor address.
    pub fn set_actor(&mut self, addr: &Address, actor: ActorState) -> anyhow::Result<()> {
        self.hamt.set(BytesKey(addr.to_bytes()), actor)?;
        Ok(())
    }

    /// Iterates over every actor in the tree. Iteration stops at the first
    /// error returned by `f`.
    pub fn for_each<F>(&self, mut f: F) -> anyhow::Result<()>
    where
        F: FnMut(Address, &ActorState) -> anyhow::Result<()>,
    {
        self.hamt.for_each(|key, actor| {
            let addr = Address::from_bytes(&key.0)?;
            f(addr, actor)
        })?;
        Ok(())
    }

    /// Persists all pending changes and returns the new root.
    pub fn flush(&mut self) -> anyhow::Result<Cid> {
        Ok(self.hamt.flush()?)
    }
}
