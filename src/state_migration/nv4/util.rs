// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::actors::{make_empty_map, make_map_with_root};
use anyhow::Context as _;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use serde::{Serialize, de::DeserializeOwned};

/// Rewrites the map at `root` entry by entry into a fresh map, checking that
/// every value decodes as `V`.
pub(super) fn migrate_hamt<BS, V>(store: &BS, root: &Cid) -> anyhow::Result<Cid>
where
    BS: Blockstore,
    V: Serialize + DeserializeOwned + Clone + PartialEq,
{
    let in_map = make_map_with_root::<_, V>(root, store)
        .with_context(|| format!("failed to load map {root}"))?;
    let mut out_map = make_empty_map::<_, V>(store);
    in_map.for_each(|key, value| {
        out_map.set(key.clone(), value.clone())?;
        Ok(())
    })?;
    Ok(out_map.flush()?)
}
