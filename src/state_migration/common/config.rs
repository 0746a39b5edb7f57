// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{num::NonZeroUsize, time::Duration};

use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};

/// Parameterizes a state tree migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Maximum number of actors migrated concurrently.
    pub max_workers: NonZeroUsize,
    /// When set, progress is logged at most this often.
    pub progress_log_period: Option<Duration>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            max_workers: nonzero!(16usize),
            progress_log_period: None,
        }
    }
}

impl MigrationConfig {
    pub fn new(max_workers: usize) -> anyhow::Result<Self> {
        let max_workers = NonZeroUsize::new(max_workers)
            .ok_or_else(|| anyhow::anyhow!("max_workers must be positive"))?;
        Ok(Self {
            max_workers,
            ..Default::default()
        })
    }

    pub fn with_progress_log_period(mut self, period: Duration) -> Self {
        self.progress_log_period = Some(period);
        self
    }
}
