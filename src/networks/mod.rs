// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::shim::clock::ChainEpoch;

pub mod devnet;
pub mod mainnet;

/// Forest builtin `filecoin` network chains. In general only `mainnet` and its
/// chain information should be considered stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "lowercase")]
pub enum NetworkChain {
    Mainnet,
    Devnet(String),
}

impl FromStr for NetworkChain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(NetworkChain::Mainnet),
            name => Ok(NetworkChain::Devnet(name.to_owned())),
        }
    }
}

impl Display for NetworkChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkChain::Mainnet => write!(f, "mainnet"),
            NetworkChain::Devnet(name) => write!(f, "{name}"),
        }
    }
}

/// Defines the meaningful heights of the protocol.
#[derive(Debug, Default, Display, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Height {
    #[default]
    Breeze,
    Smoke,
    Ignition,
    ActorsV2,
    Tape,
    Liftoff,
    Kumquat,
}

#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HeightInfo {
    pub height: Height,
    pub epoch: ChainEpoch,
}

pub fn sort_by_epoch(height_info_slice: &[HeightInfo]) -> Vec<HeightInfo> {
    let mut height_info_vec = height_info_slice.to_vec();
    height_info_vec.sort_by(|a, b| a.epoch.cmp(&b.epoch));
    height_info_vec
}

/// Defines the network configuration parameters the upgrade schedule needs.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
#[serde(default)]
pub struct ChainConfig {
    pub network: NetworkChain,
    pub height_infos: Vec<HeightInfo>,
}

impl ChainConfig {
    pub fn mainnet() -> Self {
        Self {
            network: NetworkChain::Mainnet,
            height_infos: mainnet::HEIGHT_INFOS.to_vec(),
        }
    }

    pub fn devnet() -> Self {
        Self {
            network: NetworkChain::Devnet("devnet".to_string()),
            height_infos: devnet::height_infos(),
        }
    }

    pub fn from_chain(network_chain: &NetworkChain) -> Self {
        match network_chain {
            NetworkChain::Mainnet => Self::mainnet(),
            NetworkChain::Devnet(name) => Self {
                network: NetworkChain::Devnet(name.clone()),
                ..Self::devnet()
            },
        }
    }

    /// Epoch at which `height` activates, if the network schedules it.
    pub fn epoch(&self, height: Height) -> Option<ChainEpoch> {
        sort_by_epoch(&self.height_infos)
            .iter()
            .find(|info| height == info.height)
            .map(|info| info.epoch)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig::mainnet()
    }
}

/// Reads an upgrade height override such as `FOREST_ACTORSV2_HEIGHT`.
fn get_upgrade_height_from_env(env_var_key: &str) -> Option<ChainEpoch> {
    if let Ok(value) = std::env::var(env_var_key) {
        if let Ok(epoch) = value.parse() {
            return Some(epoch);
        }
        tracing::warn!("Failed to parse {env_var_key}={value}, value must be a valid integer");
    }
    None
}
