// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Engine level tests over a synthetic registry. Each worker actor's state is
//! a `(transfer, fail)` pair telling its migrator what to report.

use std::sync::Arc;
use std::time::Duration;

use crate::db::MemoryDB;
use crate::networks::{ChainConfig, Height, NetworkChain};
use crate::shim::{
    address::{
        Address, BURNT_FUNDS_ACTOR_ADDR, STORAGE_POWER_ACTOR_ADDR, SYSTEM_ACTOR_ADDR,
        VERIFIED_REGISTRY_ACTOR_ADDR,
    },
    econ::TokenAmount,
    state_tree::{ActorState, StateTree},
};
use crate::state_migration::{
    balances::{input_tree_balance, input_tree_burnt_funds},
    common::{
        ActorMigration, ActorMigrationInput, ActorMigrationOutput, DeferredActorMigration,
        MemoryMigrationCache, MigrationCacheArc, MigrationConfig, MigrationError,
        StateMigration, cache_key, migrators::nil_migrator,
    },
    run_state_migrations,
};
use crate::utils::{cid::identity_raw_cid, db::CborStoreExt as _};
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use pretty_assertions::assert_eq;
use quickcheck_macros::quickcheck;
use rstest::rstest;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn code(name: &str) -> Cid {
    identity_raw_cid(format!("test/{name}").as_bytes()).unwrap()
}

fn account_code() -> Cid {
    code("account/1")
}

fn worker_code() -> Cid {
    code("worker/1")
}

fn registry_code() -> Cid {
    code("registry/1")
}

/// Migrates `(transfer, fail)` states, memoizing the new head in the cache.
struct TransferMigrator;

impl<BS: Blockstore> ActorMigration<BS> for TransferMigrator {
    fn migrate_state(
        &self,
        store: &BS,
        input: ActorMigrationInput,
    ) -> anyhow::Result<Option<ActorMigrationOutput>> {
        let (transfer, fail): (i64, bool) = store.get_cbor_required(&input.head)?;
        anyhow::ensure!(!fail, "injected failure");
        let new_head = input
            .cache
            .load(&cache_key("test-transfer", &input.head), || {
                store.put_cbor_default(&(transfer, "migrated"))
            })?;
        Ok(Some(ActorMigrationOutput {
            new_head,
            transfer: TokenAmount::from_atto(transfer),
        }))
    }
}

/// Records the migrated head of `observed` as seen in the output tree.
struct ObservingMigrator {
    observed: Address,
}

impl<BS: Blockstore> DeferredActorMigration<BS> for ObservingMigrator {
    fn migrate_deferred(
        &self,
        store: &BS,
        _input: ActorMigrationInput,
        actors_out: &StateTree<&BS>,
    ) -> anyhow::Result<ActorMigrationOutput> {
        let observed = actors_out.get_required_actor(&self.observed)?;
        Ok(ActorMigrationOutput::new(
            store.put_cbor_default(&("observed", observed.state))?,
        ))
    }
}

/// Cancels the run from inside a migration, `delay` after it starts.
struct CancellingMigrator {
    cancel: CancellationToken,
    delay: Duration,
}

impl<BS: Blockstore> ActorMigration<BS> for CancellingMigrator {
    fn migrate_state(
        &self,
        _store: &BS,
        input: ActorMigrationInput,
    ) -> anyhow::Result<Option<ActorMigrationOutput>> {
        std::thread::sleep(self.delay);
        self.cancel.cancel();
        std::thread::sleep(Duration::from_millis(20));
        Ok(Some(ActorMigrationOutput::new(input.head)))
    }
}

fn registry(observed: Address) -> StateMigration<MemoryDB> {
    let mut migration = StateMigration::new(None);
    migration.add_migrator(account_code(), code("account/2"), nil_migrator());
    migration.add_migrator(worker_code(), code("worker/2"), Arc::new(TransferMigrator));
    migration.add_deferred_migrator(
        VERIFIED_REGISTRY_ACTOR_ADDR,
        registry_code(),
        code("registry/2"),
        Arc::new(ObservingMigrator { observed }),
    );
    migration
}

struct TestActor {
    address: Address,
    code: Cid,
    state: (i64, bool),
    balance: u64,
}

impl TestActor {
    fn account(address: Address, balance: u64) -> Self {
        Self {
            address,
            code: account_code(),
            state: (0, false),
            balance,
        }
    }

    fn worker(id: u64, transfer: i64, balance: u64) -> Self {
        Self {
            address: Address::new_id(id),
            code: worker_code(),
            state: (transfer, false),
            balance,
        }
    }

    fn registry() -> Self {
        Self {
            address: VERIFIED_REGISTRY_ACTOR_ADDR,
            code: registry_code(),
            state: (0, false),
            balance: 0,
        }
    }
}

fn build_tree(store: &MemoryDB, actors: impl IntoIterator<Item = TestActor>) -> Cid {
    let mut tree = StateTree::new(store);
    for actor in actors {
        let head = store.put_cbor_default(&actor.state).unwrap();
        tree.set_actor(
            &actor.address,
            ActorState::new(actor.code, head, TokenAmount::from_atto(actor.balance), 1),
        )
        .unwrap();
    }
    tree.flush().unwrap()
}

/// Burnt funds, the deferred registry and `n` workers each transferring `i % 4`.
fn standard_tree(store: &MemoryDB, n: u64) -> Cid {
    build_tree(
        store,
        (0..n)
            .map(|i| TestActor::worker(1000 + i, (i % 4) as i64, 10 * i))
            .chain([
                TestActor::account(BURNT_FUNDS_ACTOR_ADDR, 1_000_000),
                TestActor::registry(),
            ]),
    )
}

fn migrate(
    migration: &StateMigration<MemoryDB>,
    store: &MemoryDB,
    root: &Cid,
    max_workers: usize,
    cache: MigrationCacheArc,
) -> Result<Cid, MigrationError> {
    migration.migrate_state_tree(
        store,
        100,
        root,
        &MigrationConfig::new(max_workers).unwrap(),
        cache,
        &CancellationToken::new(),
    )
}

/// Shows engine logs when tests run with `RUST_LOG` set.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

fn fresh_cache() -> MigrationCacheArc {
    Arc::new(MemoryMigrationCache::default())
}

fn actors(store: &MemoryDB, root: &Cid) -> Vec<(Address, ActorState)> {
    let tree = StateTree::new_from_root(store, root).unwrap();
    let mut actors = vec![];
    tree.for_each(|addr, actor| {
        actors.push((addr, actor.clone()));
        Ok(())
    })
    .unwrap();
    actors.sort_by_key(|(addr, _)| addr.to_bytes());
    actors
}

#[test]
fn end_to_end_scenario() {
    init_logging();
    let store = MemoryDB::default();
    let system_code = code("system/1");
    let mut migration = registry(STORAGE_POWER_ACTOR_ADDR);
    migration.add_migrator(system_code, code("system/2"), Arc::new(TransferMigrator));
    migration.add_migrator(code("power/1"), code("power/2"), Arc::new(TransferMigrator));
    let root = build_tree(
        &store,
        [
            TestActor {
                address: SYSTEM_ACTOR_ADDR,
                code: system_code,
                state: (0, false),
                balance: 0,
            },
            TestActor {
                address: STORAGE_POWER_ACTOR_ADDR,
                code: code("power/1"),
                state: (5, false),
                balance: 100,
            },
            TestActor::registry(),
            TestActor::account(BURNT_FUNDS_ACTOR_ADDR, 50),
        ],
    );

    let new_root = migrate(&migration, &store, &root, 16, fresh_cache()).unwrap();
    let out = StateTree::new_from_root(&store, &new_root).unwrap();

    let burnt = out.get_required_actor(&BURNT_FUNDS_ACTOR_ADDR).unwrap();
    assert_eq!(burnt.balance, TokenAmount::from_atto(45));
    assert_eq!(burnt.code, code("account/2"));

    let power = out.get_required_actor(&STORAGE_POWER_ACTOR_ADDR).unwrap();
    assert_eq!(power.balance, TokenAmount::from_atto(105));
    assert_eq!(power.code, code("power/2"));
    assert_eq!(power.sequence, 1);

    let system = out.get_required_actor(&SYSTEM_ACTOR_ADDR).unwrap();
    assert_eq!(system.code, code("system/2"));
    assert_eq!(system.balance, TokenAmount::from_atto(0));

    let registry = out.get_required_actor(&VERIFIED_REGISTRY_ACTOR_ADDR).unwrap();
    assert_eq!(registry.code, code("registry/2"));
    let observed: (String, Cid) = store.get_cbor_required(&registry.state).unwrap();
    assert_eq!(observed, ("observed".to_owned(), power.state));

    assert_eq!(actors(&store, &new_root).len(), 4);
    assert_eq!(
        input_tree_balance(&store, &new_root).unwrap(),
        input_tree_balance(&store, &root).unwrap()
    );
}

#[test]
fn every_actor_is_migrated_once_under_its_new_code() {
    let store = MemoryDB::default();
    let root = standard_tree(&store, 300);
    let new_root = migrate(
        &registry(BURNT_FUNDS_ACTOR_ADDR),
        &store,
        &root,
        8,
        fresh_cache(),
    )
    .unwrap();

    let before = actors(&store, &root);
    let after = actors(&store, &new_root);
    assert_eq!(before.len(), after.len());
    for ((addr_in, actor_in), (addr_out, actor_out)) in before.iter().zip(&after) {
        assert_eq!(addr_in, addr_out);
        let expected = if actor_in.code == worker_code() {
            code("worker/2")
        } else if actor_in.code == account_code() {
            code("account/2")
        } else {
            code("registry/2")
        };
        assert_eq!(actor_out.code, expected);
        assert_eq!(actor_out.sequence, actor_in.sequence);
    }
}

#[test]
fn deferred_actor_observes_the_migrated_tree() {
    let store = MemoryDB::default();
    let root = build_tree(
        &store,
        [
            TestActor::worker(1000, 3, 10),
            TestActor::account(BURNT_FUNDS_ACTOR_ADDR, 10),
            TestActor::registry(),
        ],
    );
    let new_root = migrate(
        &registry(Address::new_id(1000)),
        &store,
        &root,
        4,
        fresh_cache(),
    )
    .unwrap();

    let actors_in = StateTree::new_from_root(&store, &root).unwrap();
    let actors_out = StateTree::new_from_root(&store, &new_root).unwrap();
    let worker_in = actors_in.get_required_actor(&Address::new_id(1000)).unwrap();
    let worker_out = actors_out.get_required_actor(&Address::new_id(1000)).unwrap();
    assert_ne!(worker_in.state, worker_out.state);

    let registry = actors_out
        .get_required_actor(&VERIFIED_REGISTRY_ACTOR_ADDR)
        .unwrap();
    let (_, seen): (String, Cid) = store.get_cbor_required(&registry.state).unwrap();
    assert_eq!(seen, worker_out.state);
}

#[test]
fn warm_cache_yields_identical_root() {
    let store = MemoryDB::default();
    let root = standard_tree(&store, 200);
    let migration = registry(BURNT_FUNDS_ACTOR_ADDR);

    let cache = MemoryMigrationCache::default();
    let cold = migrate(&migration, &store, &root, 16, Arc::new(cache.clone())).unwrap();
    assert!(!cache.is_empty());
    let warm = migrate(&migration, &store, &root, 16, Arc::new(cache.clone())).unwrap();
    let fresh = migrate(&migration, &store, &root, 16, fresh_cache()).unwrap();
    assert_eq!(cold, warm);
    assert_eq!(cold, fresh);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(7)]
#[case(16)]
fn root_is_independent_of_worker_count(#[case] max_workers: usize) {
    let store = MemoryDB::default();
    let root = standard_tree(&store, 150);
    let migration = registry(BURNT_FUNDS_ACTOR_ADDR);
    let reference = migrate(&migration, &store, &root, 4, fresh_cache()).unwrap();
    let new_root = migrate(&migration, &store, &root, max_workers, fresh_cache()).unwrap();
    assert_eq!(new_root, reference);
}

#[quickcheck]
fn total_balance_is_conserved(workers: Vec<(u32, u8)>) -> bool {
    let store = MemoryDB::default();
    let transfers: u64 = workers.iter().map(|(_, t)| u64::from(*t)).sum();
    let root = build_tree(
        &store,
        workers
            .iter()
            .zip(1000..)
            .map(|((balance, transfer), id)| {
                TestActor::worker(id, i64::from(*transfer), u64::from(*balance))
            })
            .chain([
                TestActor::account(BURNT_FUNDS_ACTOR_ADDR, transfers + 1),
                TestActor::registry(),
            ]),
    );
    let new_root = migrate(
        &registry(BURNT_FUNDS_ACTOR_ADDR),
        &store,
        &root,
        3,
        fresh_cache(),
    )
    .unwrap();

    input_tree_balance(&store, &new_root).unwrap() == input_tree_balance(&store, &root).unwrap()
        && input_tree_burnt_funds(&store, &new_root).unwrap() == TokenAmount::from_atto(1)
}

#[test]
fn transfers_above_burnt_funds_fail() {
    let store = MemoryDB::default();
    let root = build_tree(
        &store,
        [
            TestActor::worker(1000, 6, 0),
            TestActor::worker(1001, 6, 0),
            TestActor::account(BURNT_FUNDS_ACTOR_ADDR, 11),
            TestActor::registry(),
        ],
    );
    let err = migrate(
        &registry(BURNT_FUNDS_ACTOR_ADDR),
        &store,
        &root,
        2,
        fresh_cache(),
    )
    .unwrap_err();
    match err {
        MigrationError::NegativeBurntFunds { balance, transfers } => {
            assert_eq!(balance, TokenAmount::from_atto(11));
            assert_eq!(transfers, TokenAmount::from_atto(12));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn first_failure_is_reported_with_its_address() {
    let store = MemoryDB::default();
    let failing = Address::new_id(1123);
    let root = build_tree(
        &store,
        (0..500)
            .map(|i| {
                let mut actor = TestActor::worker(1000 + i, 1, 1);
                if actor.address == failing {
                    actor.state.1 = true;
                }
                actor
            })
            .chain([
                TestActor::account(BURNT_FUNDS_ACTOR_ADDR, 1_000),
                TestActor::registry(),
            ]),
    );
    let err = migrate(
        &registry(BURNT_FUNDS_ACTOR_ADDR),
        &store,
        &root,
        16,
        fresh_cache(),
    )
    .unwrap_err();
    match err {
        MigrationError::ActorMigration {
            address,
            code: new_code,
            source,
        } => {
            assert_eq!(address, failing);
            assert_eq!(new_code, code("worker/2"));
            assert!(source.to_string().contains("injected failure"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn negative_transfer_is_a_migrator_error() {
    let store = MemoryDB::default();
    let root = build_tree(
        &store,
        [
            TestActor::worker(1000, -1, 10),
            TestActor::account(BURNT_FUNDS_ACTOR_ADDR, 10),
            TestActor::registry(),
        ],
    );
    let err = migrate(
        &registry(BURNT_FUNDS_ACTOR_ADDR),
        &store,
        &root,
        1,
        fresh_cache(),
    )
    .unwrap_err();
    assert!(
        matches!(err, MigrationError::ActorMigration { address, .. } if address == Address::new_id(1000)),
        "{err}"
    );
}

#[test]
fn unknown_code_is_fatal() {
    let store = MemoryDB::default();
    let root = build_tree(
        &store,
        [
            TestActor::account(BURNT_FUNDS_ACTOR_ADDR, 10),
            TestActor::registry(),
            TestActor {
                address: Address::new_id(2000),
                code: code("mystery/1"),
                state: (0, false),
                balance: 0,
            },
        ],
    );
    let err = migrate(
        &registry(BURNT_FUNDS_ACTOR_ADDR),
        &store,
        &root,
        4,
        fresh_cache(),
    )
    .unwrap_err();
    match err {
        MigrationError::UnknownActorCode { address, code: unknown } => {
            assert_eq!(address, Address::new_id(2000));
            assert_eq!(unknown, code("mystery/1"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_deferred_actor_is_fatal() {
    let store = MemoryDB::default();
    let root = build_tree(&store, [TestActor::account(BURNT_FUNDS_ACTOR_ADDR, 10)]);
    let err = migrate(
        &registry(BURNT_FUNDS_ACTOR_ADDR),
        &store,
        &root,
        4,
        fresh_cache(),
    )
    .unwrap_err();
    assert!(
        matches!(err, MigrationError::MissingActor { address, .. } if address == VERIFIED_REGISTRY_ACTOR_ADDR),
        "{err}"
    );
}

#[test]
fn deferred_code_at_another_address_fails() {
    let store = MemoryDB::default();
    let stray = Address::new_id(777);
    let root = build_tree(
        &store,
        [
            TestActor::worker(1000, 1, 10),
            TestActor::account(BURNT_FUNDS_ACTOR_ADDR, 10),
            TestActor::registry(),
            TestActor {
                address: stray,
                ..TestActor::registry()
            },
        ],
    );
    let err = migrate(
        &registry(BURNT_FUNDS_ACTOR_ADDR),
        &store,
        &root,
        4,
        fresh_cache(),
    )
    .unwrap_err();
    match err {
        MigrationError::ActorMigration {
            address,
            code: new_code,
            source,
        } => {
            assert_eq!(address, stray);
            assert_eq!(new_code, code("registry/2"));
            assert!(format!("{source:#}").contains("expected only at f06"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn cancelled_before_start() {
    let store = MemoryDB::default();
    let root = standard_tree(&store, 10);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = registry(BURNT_FUNDS_ACTOR_ADDR)
        .migrate_state_tree(
            &store,
            0,
            &root,
            &MigrationConfig::default(),
            fresh_cache(),
            &cancel,
        )
        .unwrap_err();
    assert!(err.is_cancelled(), "{err}");
}

#[test]
fn cancelled_while_dispatching() {
    let store = MemoryDB::default();
    let root = standard_tree(&store, 50);
    let cancel = CancellationToken::new();
    let mut migration = registry(BURNT_FUNDS_ACTOR_ADDR);
    migration.add_migrator(
        worker_code(),
        code("worker/2"),
        Arc::new(CancellingMigrator {
            cancel: cancel.clone(),
            delay: Duration::ZERO,
        }),
    );
    let err = migration
        .migrate_state_tree(
            &store,
            0,
            &root,
            &MigrationConfig::new(1).unwrap(),
            fresh_cache(),
            &cancel,
        )
        .unwrap_err();
    assert!(err.is_cancelled(), "{err}");
}

#[test]
fn cancelled_while_waiting_for_the_last_worker() {
    let store = MemoryDB::default();
    // Everything is dispatched long before the only worker cancels, so the
    // cancellation is seen at the end of pass barrier.
    let root = build_tree(
        &store,
        [
            TestActor::worker(1000, 0, 10),
            TestActor::account(BURNT_FUNDS_ACTOR_ADDR, 10),
            TestActor::registry(),
        ],
    );
    let cancel = CancellationToken::new();
    let mut migration = registry(BURNT_FUNDS_ACTOR_ADDR);
    migration.add_migrator(
        worker_code(),
        code("worker/2"),
        Arc::new(CancellingMigrator {
            cancel: cancel.clone(),
            delay: Duration::from_millis(100),
        }),
    );
    let err = migration
        .migrate_state_tree(
            &store,
            0,
            &root,
            &MigrationConfig::new(4).unwrap(),
            fresh_cache(),
            &cancel,
        )
        .unwrap_err();
    assert!(err.is_cancelled(), "{err}");
}

#[test]
fn progress_logging_does_not_change_the_result() {
    init_logging();
    let store = MemoryDB::default();
    let root = standard_tree(&store, 100);
    let migration = registry(BURNT_FUNDS_ACTOR_ADDR);
    let config = MigrationConfig::new(4)
        .unwrap()
        .with_progress_log_period(Duration::ZERO);
    let logged = migration
        .migrate_state_tree(
            &store,
            0,
            &root,
            &config,
            fresh_cache(),
            &CancellationToken::new(),
        )
        .unwrap();
    assert_eq!(
        logged,
        migrate(&migration, &store, &root, 4, fresh_cache()).unwrap()
    );
}

#[test]
fn no_migration_scheduled_at_other_epochs() {
    let store = MemoryDB::default();
    let root = standard_tree(&store, 1);
    let chain_config = ChainConfig::mainnet();
    let epoch = chain_config.epoch(Height::ActorsV2).unwrap() + 1;
    let new_state = run_state_migrations(
        epoch,
        &chain_config,
        &store,
        &root,
        &MigrationConfig::default(),
        fresh_cache(),
        &CancellationToken::new(),
    )
    .unwrap();
    assert_eq!(new_state, None);
    assert_eq!(chain_config.network, NetworkChain::Mainnet);
}

#[test]
fn unscheduled_upgrade_never_runs() {
    let store = MemoryDB::default();
    let root = standard_tree(&store, 1);
    let chain_config = ChainConfig {
        height_infos: vec![],
        ..ChainConfig::mainnet()
    };
    for epoch in [0, 138_720] {
        let new_state = run_state_migrations(
            epoch,
            &chain_config,
            &store,
            &root,
            &MigrationConfig::default(),
            fresh_cache(),
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(new_state, None, "epoch {epoch}");
    }
}
