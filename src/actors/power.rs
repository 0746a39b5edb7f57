// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Storage power actor state. Claims are keyed by the miner address bytes.

pub mod v1 {
    use cid::Cid;
    use fvm_ipld_encoding::tuple::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
    pub struct State {
        pub total_raw_byte_power: u64,
        pub total_quality_adj_power: u64,
        pub miner_count: i64,
        pub claims: Cid,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
    pub struct Claim {
        pub raw_byte_power: u64,
        pub quality_adj_power: u64,
    }
}

pub mod v2 {
    use crate::shim::sector::RegisteredSealProof;
    use cid::Cid;
    use fvm_ipld_encoding::tuple::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
    pub struct State {
        pub total_raw_byte_power: u64,
        pub total_quality_adj_power: u64,
        pub miner_count: i64,
        pub claims: Cid,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
    pub struct Claim {
        /// Seal proof type of the claiming miner.
        pub seal_proof_type: RegisteredSealProof,
        pub raw_byte_power: u64,
        pub quality_adj_power: u64,
    }
}
