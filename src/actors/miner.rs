// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Storage miner actor state. The sectors collection is a map keyed by
//! [`crate::actors::u64_key`] of the sector number.

pub mod v1 {
    use crate::shim::{
        address::Address,
        clock::ChainEpoch,
        econ::TokenAmount,
        sector::{RegisteredSealProof, SectorNumber},
    };
    use cid::Cid;
    use fvm_ipld_encoding::tuple::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
    pub struct State {
        pub owner: Address,
        pub seal_proof_type: RegisteredSealProof,
        /// Total funds locked as pre-commit deposits.
        pub pre_commit_deposits: TokenAmount,
        /// Total rewards and added funds locked in vesting table.
        pub locked_funds: TokenAmount,
        /// Sum of initial pledge requirements of all active sectors.
        pub initial_pledge: TokenAmount,
        pub sectors: Cid,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
    pub struct SectorOnChainInfo {
        pub sector_number: SectorNumber,
        pub seal_proof: RegisteredSealProof,
        pub sealed_cid: Cid,
        pub activation: ChainEpoch,
        pub expiration: ChainEpoch,
        pub deal_weight: u64,
        pub verified_deal_weight: u64,
    }
}

pub mod v2 {
    use crate::shim::{
        address::Address,
        clock::ChainEpoch,
        econ::TokenAmount,
        sector::{RegisteredSealProof, SectorNumber},
    };
    use cid::Cid;
    use fvm_ipld_encoding::tuple::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
    pub struct State {
        pub owner: Address,
        pub seal_proof_type: RegisteredSealProof,
        pub pre_commit_deposits: TokenAmount,
        pub locked_funds: TokenAmount,
        pub initial_pledge: TokenAmount,
        /// Absolute value of debt this miner owes from unpaid fees.
        pub fee_debt: TokenAmount,
        pub sectors: Cid,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
    pub struct SectorOnChainInfo {
        pub sector_number: SectorNumber,
        pub seal_proof: RegisteredSealProof,
        pub sealed_cid: Cid,
        pub activation: ChainEpoch,
        pub expiration: ChainEpoch,
        pub deal_weight: u64,
        pub verified_deal_weight: u64,
        /// Age of the sector this sector replaced, or zero.
        pub replaced_sector_age: ChainEpoch,
        /// Day reward of the sector this sector replaced, or zero.
        pub replaced_day_reward: TokenAmount,
    }
}
