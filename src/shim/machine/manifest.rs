// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::collections::BTreeMap;

use crate::utils::{cid::identity_raw_cid, db::CborStoreExt as _};
use anyhow::{Context as _, ensure};
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use itertools::Itertools as _;

/// Enumeration of the builtin actors that existed before actor bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
pub enum BuiltinActor {
    System,
    Init,
    Cron,
    Account,
    Power,
    Miner,
    Market,
    PaymentChannel,
    Multisig,
    Reward,
    VerifiedRegistry,
}

impl BuiltinActor {
    /// Name of the actor inside its code identifier and in actor lists.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Init => "init",
            Self::Cron => "cron",
            Self::Account => "account",
            Self::Power => "storagepower",
            Self::Miner => "storageminer",
            Self::Market => "storagemarket",
            Self::PaymentChannel => "paymentchannel",
            Self::Multisig => "multisig",
            Self::Reward => "reward",
            Self::VerifiedRegistry => "verifiedregistry",
        }
    }
}

/// Versions of the builtin actors whose code identifiers are inlined strings
/// of the form `fil/<version>/<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
pub enum ActorsVersion {
    #[strum(to_string = "v1")]
    V1,
    #[strum(to_string = "v2")]
    V2,
}

impl ActorsVersion {
    fn code_prefix(&self) -> &'static str {
        match self {
            Self::V1 => "fil/1/",
            Self::V2 => "fil/2/",
        }
    }
}

/// A list of [`BuiltinActor`]s to their CIDs
pub struct BuiltinActorManifest {
    builtin2cid: BTreeMap<BuiltinActor, Cid>,
}

impl BuiltinActorManifest {
    const MANDATORY_BUILTINS: &[BuiltinActor] = &[BuiltinActor::Init, BuiltinActor::System];

    /// Manifest of every builtin actor for the given version.
    pub fn builtin(version: ActorsVersion) -> anyhow::Result<Self> {
        let builtin2cid = ALL_BUILTINS
            .iter()
            .map(|builtin| {
                let code = format!("{}{}", version.code_prefix(), builtin.name());
                Ok((*builtin, identity_raw_cid(code.as_bytes())?))
            })
            .collect::<anyhow::Result<_>>()?;
        Ok(Self { builtin2cid })
    }

    pub fn load_v1_actor_list(b: impl Blockstore, actor_list_cid: &Cid) -> anyhow::Result<Self> {
        let mut actor_list = b
            .get_cbor_required::<Vec<(String, Cid)>>(actor_list_cid)
            .context("failed to load actor list")?;
        actor_list.sort();
        ensure!(
            actor_list.iter().map(|(name, _cid)| name).all_unique(),
            "duplicate actor name in actor list"
        );
        let mut name2cid = BTreeMap::from_iter(actor_list);
        let mut builtin2cid = BTreeMap::new();
        for builtin in ALL_BUILTINS {
            if let Some(cid) = name2cid.remove(builtin.name()) {
                builtin2cid.insert(*builtin, cid);
            }
        }
        for mandatory_builtin in Self::MANDATORY_BUILTINS {
            ensure!(
                builtin2cid.contains_key(mandatory_builtin),
                "actor list does not contain mandatory actor {}",
                mandatory_builtin.name()
            )
        }
        if !name2cid.is_empty() {
            tracing::warn!("unknown actors in list: [{}]", name2cid.keys().join(", "))
        }
        Ok(Self { builtin2cid })
    }

    /// Persists the `(name, code)` actor list and returns its CID.
    pub fn put_actor_list(&self, b: impl Blockstore) -> anyhow::Result<Cid> {
        let actor_list = self
            .builtin2cid
            .iter()
            .map(|(builtin, cid)| (builtin.name().to_owned(), *cid))
            .collect_vec();
        b.put_cbor_default(&actor_list)
    }

    // Return anyhow::Result instead of Option because we know our users are all at the root of an error chain
    pub fn get(&self, builtin: BuiltinActor) -> anyhow::Result<Cid> {
        self.builtin2cid
            .get(&builtin)
            .copied()
            .with_context(|| format!("builtin actor {} is not in the manifest", builtin.name()))
    }

    /// Reverse lookup of a code identifier.
    pub fn builtin_by_code(&self, code: &Cid) -> Option<BuiltinActor> {
        self.builtin2cid
            .iter()
            .find_map(|(builtin, cid)| (cid == code).then_some(*builtin))
    }

    pub fn builtin_actors(&self) -> impl ExactSizeIterator<Item = (BuiltinActor, Cid)> + '_ {
        self.builtin2cid.iter().map(|(k, v)| (*k, *v)) // std::iter::Copied doesn't play well with the tuple here
    }
}

macro_rules! exhaustive {
    ($vis:vis const $ident:ident: &[$ty:ty] = &[$($variant:path),* $(,)?];) => {
        $vis const $ident: &[$ty] = &[$($variant,)*];
        const _: () = {
            fn check_exhaustive(it: $ty) {
                match it {
                    $(
                        $variant => {},
                    )*
                }
            }
        };

    }
}

exhaustive! {
    const ALL_BUILTINS: &[BuiltinActor] = &[
        BuiltinActor::System,
        BuiltinActor::Init,
        BuiltinActor::Cron,
        BuiltinActor::Account,
        BuiltinActor::Power,
        BuiltinActor::Miner,
        BuiltinActor::Market,
        BuiltinActor::PaymentChannel,
        BuiltinActor::Multisig,
        BuiltinActor::Reward,
        BuiltinActor::VerifiedRegistry,
    ];
}
