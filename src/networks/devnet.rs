// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{Height, HeightInfo, get_upgrade_height_from_env};

/// Height epochs.
/// Environment variable names follow
/// <https://github.com/filecoin-project/lotus/blob/8f73f157933435f5020d7b8f23bee9e4ab71cb1c/build/params_2k.go#L108>
pub fn height_infos() -> Vec<HeightInfo> {
    [
        (Height::Breeze, "FOREST_BREEZE_HEIGHT", -50),
        (Height::Smoke, "FOREST_SMOKE_HEIGHT", -2),
        (Height::Ignition, "FOREST_IGNITION_HEIGHT", -3),
        (Height::ActorsV2, "FOREST_ACTORSV2_HEIGHT", -3),
        (Height::Tape, "FOREST_TAPE_HEIGHT", -4),
        (Height::Liftoff, "FOREST_LIFTOFF_HEIGHT", -6),
        (Height::Kumquat, "FOREST_KUMQUAT_HEIGHT", -7),
    ]
    .into_iter()
    .map(|(height, env, default)| HeightInfo {
        height,
        epoch: get_upgrade_height_from_env(env).unwrap_or(default),
    })
    .collect()
}
