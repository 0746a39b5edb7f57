// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::actors::miner::{
    v1::SectorOnChainInfo as SectorOnChainInfoV1, v2::SectorOnChainInfo as SectorOnChainInfoV2,
};
use fvm_ipld_blockstore::Blockstore;

use super::super::super::common::{TypeMigration, TypeMigrator};

impl TypeMigration<SectorOnChainInfoV1, SectorOnChainInfoV2> for TypeMigrator {
    fn migrate_type(
        from: SectorOnChainInfoV1,
        _: &impl Blockstore,
    ) -> anyhow::Result<SectorOnChainInfoV2> {
        // Sectors sealed before v2 never replaced another sector.
        let out_info = SectorOnChainInfoV2 {
            sector_number: from.sector_number,
            seal_proof: from.seal_proof,
            sealed_cid: from.sealed_cid,
            activation: from.activation,
            expiration: from.expiration,
            deal_weight: from.deal_weight,
            verified_deal_weight: from.verified_deal_weight,
            replaced_sector_age: 0,
            replaced_day_reward: Default::default(),
        };

        Ok(out_info)
    }
}
