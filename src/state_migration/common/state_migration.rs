// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use crate::shim::{address::Address, clock::ChainEpoch, econ::TokenAmount, state_tree::StateTree};
use crate::state_migration::balances::{TransferLedger, reconcile_burnt_funds};
use ahash::{HashMap, HashMapExt as _};
use anyhow::Context as _;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use tokio_util::sync::CancellationToken;

use super::{
    DeferredMigratorArc, MigrationCacheArc, MigrationConfig, MigrationError, Migrator,
    actors_out::ActorsOut,
    migration_job::{MigrationJob, MigrationJobOutput},
    migrators::DeferredMigrator,
    verifier::MigrationVerifier,
    worker_pool::WorkerPool,
};

/// Dispatch table entry: the code an actor is migrated to and how.
pub struct RegisteredMigrator<BS> {
    pub new_code: Cid,
    pub migrator: Migrator<BS>,
}

/// Actor migrated sequentially after every other actor.
struct DeferredStep<BS> {
    address: Address,
    old_code: Cid,
    new_code: Cid,
    migrator: DeferredMigratorArc<BS>,
}

/// Message from a migration task back to the coordinator. Sent only after the
/// task has returned its worker permit.
enum JobReport {
    Transfer(TokenAmount),
    Failed(MigrationError),
}

/// Migrates every actor of a state tree through a registry keyed by the
/// actor's current code:
/// - nil migrations, essentially mapping one Actor to another,
/// - migrations where state upgrade is required,
/// - deferred migrations that read the migrated state of the other actors.
///
/// All synchronization state (worker pool, output tree lock, result channel)
/// is created per call to [`StateMigration::migrate_state_tree`].
pub struct StateMigration<BS> {
    migrations: HashMap<Cid, RegisteredMigrator<BS>>,
    /// Checks the registry against the input tree before a run.
    verifier: Option<MigrationVerifier<BS>>,
    deferred: Vec<DeferredStep<BS>>,
}

impl<BS: Blockstore> StateMigration<BS> {
    pub fn new(verifier: Option<MigrationVerifier<BS>>) -> Self {
        Self {
            migrations: HashMap::new(),
            verifier,
            deferred: Vec::new(),
        }
    }

    /// Registers `migrator` for actors whose code is `old_code`.
    pub fn add_migrator(&mut self, old_code: Cid, new_code: Cid, migrator: Migrator<BS>) {
        self.migrations
            .insert(old_code, RegisteredMigrator { new_code, migrator });
    }

    /// Registers the actor at `address` to be migrated once all other actors
    /// are written. Its code is skipped by the concurrent pass.
    pub fn add_deferred_migrator(
        &mut self,
        address: Address,
        old_code: Cid,
        new_code: Cid,
        migrator: DeferredMigratorArc<BS>,
    ) {
        self.add_migrator(old_code, new_code, Arc::new(DeferredMigrator { address }));
        self.deferred.push(DeferredStep {
            address,
            old_code,
            new_code,
            migrator,
        });
    }
}

impl<BS: Blockstore + Send + Sync> StateMigration<BS> {
    /// Migrates the tree rooted at `actors_in_root` and returns the new root.
    pub fn migrate_state_tree(
        &self,
        store: &BS,
        prior_epoch: ChainEpoch,
        actors_in_root: &Cid,
        config: &MigrationConfig,
        cache: MigrationCacheArc,
        cancel: &CancellationToken,
    ) -> Result<Cid, MigrationError> {
        let actors_in =
            StateTree::new_from_root(store, actors_in_root).map_err(MigrationError::Store)?;

        // Checks if the registry is complete
        if let Some(verifier) = &self.verifier {
            verifier.verify_migration(store, &self.migrations, &actors_in)?;
        }

        let max_workers = config.max_workers;
        tracing::info!("Using {max_workers} workers for migration of {actors_in_root}");

        let pool = rayon::ThreadPoolBuilder::new()
            .thread_name(|id| format!("state migration thread: {id}"))
            .num_threads(max_workers.get())
            .build()?;

        let workers = WorkerPool::new(max_workers);
        let actors_out = ActorsOut::new(StateTree::new(store));
        let (report_tx, report_rx) = flume::unbounded();
        let halted = AtomicBool::new(false);
        let completed = AtomicUsize::new(0);
        let mut ledger = TransferLedger::default();
        let mut progress = ProgressLog::new(config.progress_log_period);

        let pass = pool.in_place_scope(|scope| {
            let mut latched = None;
            let mut dispatched = 0_usize;
            let scan = actors_in.for_each(|address, actor_state| {
                let mut dispatch = || -> Result<(), MigrationError> {
                    // Pick up failures early so no further work is dispatched.
                    drain_reports(&report_rx, &mut ledger)?;
                    let registered = self.migrations.get(&actor_state.code).ok_or(
                        MigrationError::UnknownActorCode {
                            address,
                            code: actor_state.code,
                        },
                    )?;
                    let permit = workers.acquire(cancel)?;
                    let job = MigrationJob {
                        address,
                        actor_state: actor_state.clone(),
                        new_code: registered.new_code,
                    };
                    let migrator = registered.migrator.clone();
                    let cache = cache.clone();
                    let report_tx = report_tx.clone();
                    let (actors_out, halted, completed) = (&actors_out, &halted, &completed);
                    scope.spawn(move |_| {
                        let report = run_job(
                            job,
                            &migrator,
                            store,
                            prior_epoch,
                            cache,
                            actors_out,
                            halted,
                        );
                        completed.fetch_add(1, Ordering::Relaxed);
                        drop(permit);
                        if let Some(report) = report {
                            // The receiver outlives the scope.
                            report_tx.send(report).ok();
                        }
                    });
                    dispatched += 1;
                    progress.tick(completed.load(Ordering::Relaxed));
                    Ok(())
                };
                dispatch().map_err(|e| {
                    latched = Some(e);
                    anyhow::anyhow!("state migration halted at actor {address}")
                })
            });

            let result = match (latched, scan) {
                (Some(err), _) => Err(err),
                (None, Err(e)) => Err(MigrationError::Store(
                    e.context("failed iterating over input state tree"),
                )),
                (None, Ok(())) => workers
                    .wait_idle(cancel, || progress.tick(completed.load(Ordering::Relaxed)))
                    .map(|()| dispatched),
            };
            if let Err(err) = &result {
                tracing::error!("State migration halted: {err}");
                halted.store(true, Ordering::Relaxed);
            }
            result
        });
        // Every task has finished and reported once the scope is left.
        drop(report_tx);
        let dispatched = pass?;
        drain_reports(&report_rx, &mut ledger)?;
        tracing::debug!(
            "Migrated {dispatched} actors concurrently, {} of them transferred funds",
            ledger.count()
        );

        let mut actors_out = actors_out.into_inner();
        for step in &self.deferred {
            if cancel.is_cancelled() {
                return Err(MigrationError::Cancelled);
            }
            let actor_state = actors_in
                .get_actor(&step.address)
                .map_err(MigrationError::Store)?
                .ok_or(MigrationError::MissingActor {
                    name: "deferred",
                    address: step.address,
                })?;
            let job = MigrationJob {
                address: step.address,
                actor_state,
                new_code: step.new_code,
            };
            if job.actor_state.code != step.old_code {
                return Err(job.failed(anyhow::anyhow!(
                    "expected code {}, found {}",
                    step.old_code,
                    job.actor_state.code
                )));
            }
            let MigrationJobOutput {
                address,
                actor_state,
                transfer,
            } = job.run_deferred(
                step.migrator.as_ref(),
                store,
                prior_epoch,
                cache.clone(),
                &actors_out,
            )?;
            actors_out
                .set_actor(&address, actor_state)
                .map_err(MigrationError::Store)?;
            ledger.add(transfer);
        }

        reconcile_burnt_funds(&mut actors_out, &ledger)?;

        actors_out
            .flush()
            .context("failed to flush migrated state tree")
            .map_err(MigrationError::Store)
    }
}

/// Body of one concurrent migration task. Returns what must be reported to
/// the coordinator, if anything.
fn run_job<BS: Blockstore>(
    job: MigrationJob,
    migrator: &Migrator<BS>,
    store: &BS,
    prior_epoch: ChainEpoch,
    cache: MigrationCacheArc,
    actors_out: &ActorsOut<&BS>,
    halted: &AtomicBool,
) -> Option<JobReport> {
    // Results are discarded once the run has failed.
    if halted.load(Ordering::Relaxed) {
        return None;
    }
    match job.run(migrator.as_ref(), store, prior_epoch, cache) {
        Ok(Some(MigrationJobOutput {
            address,
            actor_state,
            transfer,
        })) => match actors_out.set_actor(&address, actor_state) {
            Ok(()) if transfer.is_positive() => Some(JobReport::Transfer(transfer)),
            Ok(()) => None,
            Err(e) => Some(JobReport::Failed(MigrationError::Store(
                e.context(format!("failed setting new actor state at {address}")),
            ))),
        },
        Ok(None) => None,
        Err(e) => Some(JobReport::Failed(e)),
    }
}

/// Moves pending reports into the ledger, stopping at the first failure.
fn drain_reports(
    reports: &flume::Receiver<JobReport>,
    ledger: &mut TransferLedger,
) -> Result<(), MigrationError> {
    for report in reports.try_iter() {
        match report {
            JobReport::Transfer(transfer) => ledger.add(transfer),
            JobReport::Failed(err) => return Err(err),
        }
    }
    Ok(())
}

struct ProgressLog {
    period: Option<Duration>,
    last: Instant,
}

impl ProgressLog {
    fn new(period: Option<Duration>) -> Self {
        Self {
            period,
            last: Instant::now(),
        }
    }

    fn tick(&mut self, completed: usize) {
        let Some(period) = self.period else {
            return;
        };
        if self.last.elapsed() >= period {
            tracing::info!("Migrated {completed} actors");
            self.last = Instant::now();
        }
    }
}
