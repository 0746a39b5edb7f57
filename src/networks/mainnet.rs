// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::shim::clock::ChainEpoch;

use super::{Height, HeightInfo};

const SMOKE_HEIGHT: ChainEpoch = 51000;

/// Height epochs.
pub const HEIGHT_INFOS: [HeightInfo; 7] = [
    HeightInfo {
        height: Height::Breeze,
        epoch: 41_280,
    },
    HeightInfo {
        height: Height::Smoke,
        epoch: SMOKE_HEIGHT,
    },
    HeightInfo {
        height: Height::Ignition,
        epoch: 94_000,
    },
    HeightInfo {
        height: Height::ActorsV2,
        epoch: 138_720,
    },
    HeightInfo {
        height: Height::Tape,
        epoch: 140_760,
    },
    HeightInfo {
        height: Height::Liftoff,
        epoch: 148_888,
    },
    HeightInfo {
        height: Height::Kumquat,
        epoch: 170_000,
    },
];
