// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! On-chain state schemas of the builtin actors touched by network upgrades,
//! one submodule per actor and one nested module per actors version.

use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_hamt::{BytesKey, Error as HamtError, Hamt};
use integer_encoding::VarInt as _;
use serde::{Serialize, de::DeserializeOwned};

pub mod miner;
pub mod power;
pub mod system;
pub mod verifreg;

/// Default bit width of every HAMT used by the builtin actors.
pub const HAMT_BIT_WIDTH: u32 = 5;

/// Map type to be used within actors. The underlying type is a HAMT.
pub type Map<BS, V> = Hamt<BS, V, BytesKey>;

/// Create an empty map with the default bit width.
#[inline]
pub fn make_empty_map<BS, V>(store: BS) -> Map<BS, V>
where
    BS: Blockstore,
    V: DeserializeOwned + Serialize,
{
    Map::<_, V>::new_with_bit_width(store, HAMT_BIT_WIDTH)
}

/// Create a map with a root cid.
#[inline]
pub fn make_map_with_root<BS, V>(root: &Cid, store: BS) -> Result<Map<BS, V>, HamtError>
where
    BS: Blockstore,
    V: DeserializeOwned + Serialize,
{
    Map::<_, V>::load_with_bit_width(root, store, HAMT_BIT_WIDTH)
}

/// Varint encoding of a `u64` map key.
pub fn u64_key(k: u64) -> BytesKey {
    k.encode_var_vec().into()
}

/// Inverse of [`u64_key`].
pub fn parse_u64_key(s: &[u8]) -> anyhow::Result<u64> {
    let (v, n) = u64::decode_var(s).ok_or_else(|| anyhow::anyhow!("invalid varint key"))?;
    anyhow::ensure!(n == s.len(), "trailing bytes after varint key");
    Ok(v)
}
