// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! [`super::common::TypeMigration`] implementations for types shared by
//! several actor migrations.

mod miner;
