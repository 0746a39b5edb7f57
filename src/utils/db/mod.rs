// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use anyhow::Context as _;
use cid::Cid;
use fvm_ipld_encoding::CborStore;
use multihash_codetable::Code;
use serde::{Serialize, de::DeserializeOwned};

/// Extension methods for inserting and retrieving IPLD data with CIDs
pub trait CborStoreExt: CborStore {
    /// Default hash function used when writing state objects.
    fn default_code() -> Code {
        Code::Blake2b256
    }

    /// Put an object in the block store and return the Cid identifier.
    fn put_cbor_default<S: Serialize>(&self, obj: &S) -> anyhow::Result<Cid> {
        self.put_cbor(obj, Self::default_code())
    }

    /// Get typed object from block store by `CID`, failing if it is absent.
    fn get_cbor_required<T: DeserializeOwned>(&self, cid: &Cid) -> anyhow::Result<T> {
        self.get_cbor(cid)?
            .with_context(|| format!("Cbor entry not found for cid {cid}"))
    }
}

impl<T: CborStore> CborStoreExt for T {}
