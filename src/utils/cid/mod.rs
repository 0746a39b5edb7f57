// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::{Cid, multihash::Multihash};
use multihash_codetable::{Code, MultihashDigest as _};

/// Multicodec code of the identity hash function.
const IDENTITY_HASH: u64 = 0x0;

/// Extension methods for constructing `dag-cbor` [Cid]
pub trait CidCborExt {
    /// Default CID builder for Filecoin
    ///
    /// - The default codec is [`fvm_ipld_encoding::DAG_CBOR`]
    /// - The default hash function is 256 bit BLAKE2b
    ///
    /// This matches [`abi.CidBuilder`](https://github.com/filecoin-project/go-state-types/blob/master/abi/cid.go#L49) in go
    fn from_cbor_blake2b256<S: serde::ser::Serialize>(obj: &S) -> anyhow::Result<Cid> {
        let bytes = fvm_ipld_encoding::to_vec(obj)?;
        Ok(Cid::new_v1(
            fvm_ipld_encoding::DAG_CBOR,
            Code::Blake2b256.digest(&bytes),
        ))
    }
}

impl CidCborExt for Cid {}

/// Builds a raw CID whose multihash inlines `data` with the identity hash.
/// Builtin actor code identifiers prior to the bundle era were built this way.
pub fn identity_raw_cid(data: &[u8]) -> anyhow::Result<Cid> {
    Ok(Cid::new_v1(
        fvm_ipld_encoding::IPLD_RAW,
        Multihash::wrap(IDENTITY_HASH, data)?,
    ))
}
