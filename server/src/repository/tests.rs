//! Repository Integration Tests
//!
//! Exercise the payment repository and the selection store against an
//! in-memory SQLite database, plus a scripted dataset for the concurrency
//! contract.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::domain::{
    DomainError, DomainResult, Mode, PaymentFilter, PaymentPage, PaymentStatus,
    SelectionDelta, SortDir, SortKey,
};
use crate::repository::{
    open_memory, seed_demo_payments, PaymentDataset, PaymentRepository, SelectionStore,
    StoreConfig,
};

fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid date")
}

async fn seeded_repo(count: u32) -> (Arc<PaymentRepository>, crate::repository::SharedConnection)
{
    let conn = open_memory().expect("open db");
    seed_demo_payments(&conn, count, date("2024-09-01"))
        .await
        .expect("seed");
    (Arc::new(PaymentRepository::new(conn.clone())), conn)
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_file_db_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("payselect.db");

    let conn = crate::repository::open_file(&path).expect("open");
    seed_demo_payments(&conn, 8, date("2024-09-01"))
        .await
        .expect("seed");
    drop(conn);

    // Reopening runs the migrations again and finds the same rows
    let conn = crate::repository::open_file(&path).expect("reopen");
    let repo = PaymentRepository::new(conn);
    let count = repo
        .universe_count(&PaymentFilter::default())
        .await
        .expect("count");
    assert_eq!(count, 8);
}

#[tokio::test]
async fn test_universe_count_follows_filter() {
    let (repo, _conn) = seeded_repo(100).await;

    let all = repo.universe_count(&PaymentFilter::default()).await.expect("count");
    assert_eq!(all, 100);

    let pending = repo
        .universe_count(&PaymentFilter {
            status: Some(PaymentStatus::Pending),
            due_before: None,
        })
        .await
        .expect("count");
    // 10 of 100 are PAID, 5 are CANCELLED in the seeded pattern
    assert_eq!(pending, 85);

    let bounded = repo
        .universe_count(&PaymentFilter {
            status: Some(PaymentStatus::Pending),
            due_before: Some(date("2024-09-05")),
        })
        .await
        .expect("count");
    assert!(bounded < pending);
}

#[tokio::test]
async fn test_page_is_ordered_and_totalled() {
    let (repo, _conn) = seeded_repo(25).await;

    let page = repo
        .page(&PaymentFilter::default(), 0, 10, SortKey::DueDate, SortDir::Asc)
        .await
        .expect("page");
    assert_eq!(page.content.len(), 10);
    assert_eq!(page.total_elements, 25);
    assert_eq!(page.total_pages, 3);
    let dates: Vec<_> = page.content.iter().map(|p| p.due_date).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);

    let last = repo
        .page(&PaymentFilter::default(), 2, 10, SortKey::DueDate, SortDir::Asc)
        .await
        .expect("page");
    assert_eq!(last.content.len(), 5);
}

#[tokio::test]
async fn test_store_create_update_count() {
    let (repo, _conn) = seeded_repo(20).await;
    let store = SelectionStore::new(repo, StoreConfig::default());

    let (id, count) = store
        .create(PaymentFilter::default(), Mode::None)
        .await
        .expect("create");
    assert_eq!(count, 0);

    let count = store
        .apply_update(
            id,
            &SelectionDelta {
                add_include: ids(&["item-1", "item-2", "item-9"]),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(count, 3);

    // Switch to ALL, then carve two exclusions
    let count = store
        .apply_update(
            id,
            &SelectionDelta {
                mode: Some(Mode::All),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(count, 20);

    let count = store
        .apply_update(
            id,
            &SelectionDelta {
                add_exclude: ids(&["item-3", "item-7"]),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(count, 18);
}

#[tokio::test]
async fn test_store_count_tracks_live_universe() {
    let (repo, conn) = seeded_repo(10).await;
    let store = SelectionStore::new(repo, StoreConfig::default());

    let (id, count) = store
        .create(PaymentFilter::default(), Mode::All)
        .await
        .expect("create");
    assert_eq!(count, 10);

    // The universe grows after creation; the next update sees it fresh
    seed_demo_payments(&conn, 15, date("2024-09-01"))
        .await
        .expect("reseed");
    let count = store
        .apply_update(id, &SelectionDelta::default())
        .await
        .expect("update");
    assert_eq!(count, 15);
}

#[tokio::test]
async fn test_bulk_pay_include_mode() {
    let (repo, _conn) = seeded_repo(20).await;
    let store = SelectionStore::new(repo.clone(), StoreConfig::default());

    let (id, _) = store
        .create(PaymentFilter::default(), Mode::None)
        .await
        .expect("create");
    store
        .apply_update(
            id,
            &SelectionDelta {
                add_include: ids(&["item-1", "item-2"]),
                ..Default::default()
            },
        )
        .await
        .expect("update");

    let affected = store
        .apply_action(id, "PAY", repo.as_ref())
        .await
        .expect("apply");
    assert_eq!(affected, 2);

    // The selection is gone afterwards
    let err = store
        .apply_update(id, &SelectionDelta::default())
        .await
        .expect_err("should be discarded");
    assert!(matches!(err, DomainError::NotFound(_)));

    let paid = repo
        .universe_count(&PaymentFilter {
            status: Some(PaymentStatus::Paid),
            due_before: None,
        })
        .await
        .expect("count");
    // 2 newly paid on top of the 2 seeded as PAID
    assert_eq!(paid, 4);
}

#[tokio::test]
async fn test_bulk_pay_all_mode_respects_exclusions() {
    let (repo, _conn) = seeded_repo(20).await;
    let store = SelectionStore::new(repo.clone(), StoreConfig::default());

    let filter = PaymentFilter {
        status: Some(PaymentStatus::Pending),
        due_before: None,
    };
    let (id, count) = store.create(filter.clone(), Mode::All).await.expect("create");
    assert_eq!(count, 17); // 20 minus 2 PAID minus 1 CANCELLED

    store
        .apply_update(
            id,
            &SelectionDelta {
                add_exclude: ids(&["item-1"]),
                ..Default::default()
            },
        )
        .await
        .expect("update");

    let affected = store
        .apply_action(id, "PAY", repo.as_ref())
        .await
        .expect("apply");
    assert_eq!(affected, 16);

    // The excluded payment is still pending
    let page = repo
        .page(&filter, 0, 20, SortKey::Id, SortDir::Asc)
        .await
        .expect("page");
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].id, "item-1");
}

#[tokio::test]
async fn test_unknown_action_is_rejected_and_keeps_selection() {
    let (repo, _conn) = seeded_repo(5).await;
    let store = SelectionStore::new(repo.clone(), StoreConfig::default());

    let (id, _) = store
        .create(PaymentFilter::default(), Mode::All)
        .await
        .expect("create");
    let err = store
        .apply_action(id, "SHRED", repo.as_ref())
        .await
        .expect_err("unknown action");
    assert!(matches!(err, DomainError::Rejected(_)));

    // Rejected applies keep the record alive for a retry
    let count = store
        .apply_update(id, &SelectionDelta::default())
        .await
        .expect("still live");
    assert_eq!(count, 5);
}

#[tokio::test]
async fn test_discard_is_idempotent() {
    let (repo, _conn) = seeded_repo(5).await;
    let store = SelectionStore::new(repo, StoreConfig::default());

    let (id, _) = store
        .create(PaymentFilter::default(), Mode::None)
        .await
        .expect("create");
    assert_eq!(store.len().await, 1);
    store.discard(id).await;
    store.discard(id).await;
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_expired_selection_is_not_found_and_purged() {
    let (repo, _conn) = seeded_repo(5).await;
    let store = SelectionStore::new(
        repo,
        StoreConfig {
            ttl: chrono::Duration::milliseconds(-1),
        },
    );

    let (id, _) = store
        .create(PaymentFilter::default(), Mode::None)
        .await
        .expect("create");
    let err = store
        .apply_update(id, &SelectionDelta::default())
        .await
        .expect_err("expired");
    assert!(matches!(err, DomainError::NotFound(_)));

    let (_id2, _) = store
        .create(PaymentFilter::default(), Mode::None)
        .await
        .expect("create");
    assert_eq!(store.purge_expired().await, 1);
    assert_eq!(store.len().await, 0);
}

/// Dataset that records when each count starts and ends, with a delay in
/// between, to observe (lack of) interleaving
struct ScriptedDataset {
    events: Mutex<Vec<String>>,
    calls: Mutex<u32>,
}

impl ScriptedDataset {
    fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl PaymentDataset for ScriptedDataset {
    async fn universe_count(&self, _filter: &PaymentFilter) -> DomainResult<u64> {
        let call = {
            let mut calls = self.calls.lock().await;
            *calls += 1;
            *calls
        };
        self.events.lock().await.push(format!("start-{}", call));
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
        self.events.lock().await.push(format!("end-{}", call));
        Ok(100)
    }

    async fn page(
        &self,
        _filter: &PaymentFilter,
        _page: u32,
        _size: u32,
        _sort: SortKey,
        _dir: SortDir,
    ) -> DomainResult<PaymentPage> {
        Err(DomainError::Internal("not used".to_string()))
    }
}

#[tokio::test]
async fn test_same_id_updates_never_interleave() {
    let dataset = Arc::new(ScriptedDataset::new());
    let store = Arc::new(SelectionStore::new(dataset.clone(), StoreConfig::default()));

    let (id, _) = store
        .create(PaymentFilter::default(), Mode::All)
        .await
        .expect("create");
    // Creation itself made one dataset call
    dataset.events.lock().await.clear();

    let a = {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .apply_update(
                    id,
                    &SelectionDelta {
                        add_exclude: vec!["item-1".to_string()],
                        ..Default::default()
                    },
                )
                .await
        })
    };
    let b = {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .apply_update(
                    id,
                    &SelectionDelta {
                        add_exclude: vec!["item-2".to_string()],
                        ..Default::default()
                    },
                )
                .await
        })
    };
    a.await.expect("join").expect("update a");
    b.await.expect("join").expect("update b");

    // Both updates ran, and whichever went second observed the first: the
    // recounts never overlap because the record lock spans apply+recount
    let events = dataset.events.lock().await.clone();
    assert_eq!(events.len(), 4);
    assert!(events[0].starts_with("start-"));
    assert!(events[1].starts_with("end-"));
    assert!(events[2].starts_with("start-"));
    assert!(events[3].starts_with("end-"));

    let count = store
        .apply_update(id, &SelectionDelta::default())
        .await
        .expect("count");
    assert_eq!(count, 98);
}

#[tokio::test]
async fn test_create_fails_closed_when_dataset_unavailable() {
    struct DownDataset;

    #[async_trait]
    impl PaymentDataset for DownDataset {
        async fn universe_count(&self, _filter: &PaymentFilter) -> DomainResult<u64> {
            Err(DomainError::Unavailable("dataset offline".to_string()))
        }
        async fn page(
            &self,
            _filter: &PaymentFilter,
            _page: u32,
            _size: u32,
            _sort: SortKey,
            _dir: SortDir,
        ) -> DomainResult<PaymentPage> {
            Err(DomainError::Unavailable("dataset offline".to_string()))
        }
    }

    let store = SelectionStore::new(Arc::new(DownDataset), StoreConfig::default());
    let err = store
        .create(PaymentFilter::default(), Mode::All)
        .await
        .expect_err("unavailable");
    assert!(matches!(err, DomainError::Unavailable(_)));
    assert_eq!(store.len().await, 0);
}
