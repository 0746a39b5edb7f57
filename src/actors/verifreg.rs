// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

/// Storage, in bytes, a verifier or verified client may allocate.
pub type DataCap = u64;

pub mod v1 {
    use crate::shim::address::Address;
    use cid::Cid;
    use fvm_ipld_encoding::tuple::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
    pub struct State {
        pub root_key: Address,
        /// Map of verifier address to [`super::DataCap`].
        pub verifiers: Cid,
        /// Map of verified client address to [`super::DataCap`].
        pub verified_clients: Cid,
    }
}

pub mod v2 {
    use crate::shim::address::Address;
    use cid::Cid;
    use fvm_ipld_encoding::tuple::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
    pub struct State {
        pub root_key: Address,
        pub verifiers: Cid,
        pub verified_clients: Cid,
        /// Claims root of the power actor the registry was migrated against.
        pub power_claims: Cid,
    }
}
