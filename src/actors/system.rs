// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod v1 {
    use serde::{Deserialize, Serialize};

    /// The system actor carries no state in actors v1.
    #[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct State {}
}

pub mod v2 {
    use cid::Cid;
    use fvm_ipld_encoding::tuple::*;

    #[derive(Default, Debug, Clone, PartialEq, Eq, Serialize_tuple, Deserialize_tuple)]
    pub struct State {
        /// Actor list of the builtin actors this state was migrated to.
        pub builtin_actors: Cid,
    }
}
