//! Controller tests with in-process gateways.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lc_core::{AnnotationUpdate, CoreError, QueryParameters, ResponseShape, TransitionKind};
use lc_explorer::{Explorer, ExplorerError, ExplorerOptions};
use lc_store::ObjectStore;
use lc_tap::{QueryGateway, TapError};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Answers every query with the same payload and records what it was sent.
struct FixedGateway {
    payload: Value,
    calls: AtomicUsize,
    last_adql: Mutex<Option<String>>,
}

impl FixedGateway {
    fn new(payload: Value) -> Self {
        Self {
            payload,
            calls: AtomicUsize::new(0),
            last_adql: Mutex::new(None),
        }
    }
}

impl QueryGateway for FixedGateway {
    async fn run(&self, adql: &str) -> Result<Value, TapError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_adql.lock().unwrap() = Some(adql.to_string());
        Ok(self.payload.clone())
    }
}

struct SlowGateway;

impl QueryGateway for SlowGateway {
    async fn run(&self, _adql: &str) -> Result<Value, TapError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(json!([]))
    }
}

struct FailingGateway;

impl QueryGateway for FailingGateway {
    async fn run(&self, _adql: &str) -> Result<Value, TapError> {
        Err(TapError::Api {
            status: 401,
            message: "unauthorized".into(),
        })
    }
}

/// Two objects, rows out of time order, numeric identifiers.
fn columnar_payload() -> Value {
    json!({
        "fields": [
            {"name": "objectId"}, {"name": "ra"}, {"name": "dec"},
            {"name": "mjd"}, {"name": "mag"}, {"name": "magerr"}, {"name": "filter"}
        ],
        "data": [
            [1001, 150.01, 2.01, 59_600.5, 21.5, 0.1, "r"],
            [1002, 150.02, 2.02, 59_600.0, 20.0, 0.05, "g"],
            [1001, 150.01, 2.01, 59_599.5, 21.25, 0.1, "r"],
            [1003, 150.03, 2.03, 59_601.0, 19.0, null, "i"]
        ]
    })
}

fn options(timeout: Option<Duration>) -> ExplorerOptions {
    ExplorerOptions {
        table: "dp02_dc2_catalogs.ForcedSource".into(),
        timeout,
    }
}

fn open<G: QueryGateway>(dir: &TempDir, gateway: G) -> Explorer<G> {
    let store = ObjectStore::new(dir.path().join("state.json"));
    Explorer::open(gateway, store, options(Some(Duration::from_secs(5)))).unwrap()
}

fn params(limit: u32) -> QueryParameters {
    QueryParameters {
        object_limit: limit,
        ..QueryParameters::default()
    }
}

#[tokio::test]
async fn fetch_groups_sorts_and_persists() {
    let dir = TempDir::new().unwrap();
    let mut explorer = open(&dir, FixedGateway::new(columnar_payload()));

    let outcome = explorer.fetch_region(&params(20)).await.unwrap();
    assert_eq!(outcome.shape, ResponseShape::Columnar);
    assert_eq!(outcome.rows, 4);
    assert_eq!(outcome.objects, 3);

    let state = explorer.state();
    assert!(!state.is_loading());
    assert_eq!(state.current_index(), 0);
    let first = &state.objects()[0];
    assert_eq!(first.id, "1001");
    let times: Vec<f64> = first.measurements.iter().map(|m| m.time).collect();
    assert_eq!(times, vec![59_599.5, 59_600.5]);

    let adql = explorer.gateway().last_adql.lock().unwrap().clone().unwrap();
    assert!(adql.contains("CIRCLE('ICRS', 150.0, 2.0, 0.2)"));
    assert!(adql.contains("LIMIT 20000"));

    let saved = ObjectStore::new(dir.path().join("state.json")).load().unwrap();
    assert_eq!(saved, explorer.state().objects());
}

#[tokio::test]
async fn object_limit_truncates() {
    let dir = TempDir::new().unwrap();
    let mut explorer = open(&dir, FixedGateway::new(columnar_payload()));

    let outcome = explorer.fetch_region(&params(2)).await.unwrap();
    assert_eq!(outcome.objects, 2);
    let ids: Vec<&str> = explorer.state().objects().iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["1001", "1002"]);
}

#[tokio::test]
async fn requery_keeps_annotations_by_id() {
    let dir = TempDir::new().unwrap();
    let mut explorer = open(&dir, FixedGateway::new(columnar_payload()));
    explorer.fetch_region(&params(20)).await.unwrap();
    let before = explorer.state().objects().to_vec();

    explorer.select_id("1002").unwrap();
    explorer
        .annotate(AnnotationUpdate {
            name: Some("flare".into()),
            category: Some("transient".into()),
            note: None,
        })
        .unwrap();

    explorer.fetch_region(&params(20)).await.unwrap();
    let after = explorer.state().objects();
    assert_eq!(after.len(), before.len());
    assert_eq!(after[1].annotations.name, "flare");
    assert_eq!(after[1].annotations.category, "transient");
    assert_eq!(after[1].measurements, before[1].measurements);
    assert!(after[0].annotations.is_empty());
    assert_eq!(explorer.state().current_index(), 0);
}

#[tokio::test]
async fn timeout_fails_the_query_and_keeps_objects() {
    let dir = TempDir::new().unwrap();
    let store = ObjectStore::new(dir.path().join("state.json"));
    store
        .save(&[lc_core::ObservedObject::new("kept", None, None)])
        .unwrap();
    let mut explorer = Explorer::open(
        SlowGateway,
        store,
        options(Some(Duration::from_millis(50))),
    )
    .unwrap();

    let err = explorer.fetch_region(&params(20)).await.unwrap_err();
    assert!(matches!(err, ExplorerError::Timeout { .. }), "{err}");
    assert!(!explorer.state().is_loading());
    assert_eq!(explorer.state().objects()[0].id, "kept");
    assert_eq!(
        explorer.state().log().last().map(|r| r.kind),
        Some(TransitionKind::QueryFailed)
    );
}

#[tokio::test]
async fn cancel_clears_loading_and_allows_a_new_query() {
    let dir = TempDir::new().unwrap();
    let mut explorer = open(&dir, SlowGateway);

    let first = explorer.start_query(&params(20)).unwrap();
    assert!(explorer.state().is_loading());

    assert_eq!(explorer.cancel_query().unwrap(), first);
    assert!(!explorer.state().is_loading());
    assert!(matches!(
        explorer.finish_query().await,
        Err(ExplorerError::NoQueryInFlight)
    ));

    let second = explorer.start_query(&params(20)).unwrap();
    assert_ne!(first, second);
    explorer.cancel_query().unwrap();
}

#[tokio::test]
async fn abandoned_wait_leaves_query_cancellable() {
    let dir = TempDir::new().unwrap();
    let mut explorer = open(&dir, SlowGateway);
    let ticket = explorer.start_query(&params(20)).unwrap();

    let waited = tokio::time::timeout(Duration::from_millis(20), explorer.finish_query()).await;
    assert!(waited.is_err());
    assert!(explorer.state().is_loading());

    assert_eq!(explorer.cancel_query().unwrap(), ticket);
    assert!(!explorer.state().is_loading());
}

#[tokio::test]
async fn concurrent_query_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut explorer = open(&dir, SlowGateway);

    explorer.start_query(&params(20)).unwrap();
    let err = explorer.start_query(&params(20)).unwrap_err();
    assert!(matches!(
        err,
        ExplorerError::Core(CoreError::QueryInFlight { .. })
    ));
    explorer.cancel_query().unwrap();
}

#[tokio::test]
async fn gateway_failure_is_reported_and_cleared() {
    let dir = TempDir::new().unwrap();
    let mut explorer = open(&dir, FailingGateway);

    let err = explorer.fetch_region(&params(20)).await.unwrap_err();
    assert!(matches!(
        err,
        ExplorerError::Gateway(TapError::Api { status: 401, .. })
    ));
    assert!(!explorer.state().is_loading());
    assert!(explorer.state().objects().is_empty());
}

#[tokio::test]
async fn invalid_parameters_never_go_in_flight() {
    let dir = TempDir::new().unwrap();
    let gateway = FixedGateway::new(json!([]));
    let mut explorer = open(&dir, gateway);

    let bad = QueryParameters {
        radius_deg: 0.0,
        ..QueryParameters::default()
    };
    assert!(matches!(
        explorer.start_query(&bad),
        Err(ExplorerError::Core(CoreError::Validation(_)))
    ));
    assert!(!explorer.state().is_loading());
    assert_eq!(explorer.gateway().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn navigation_clamps_and_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut explorer = open(&dir, FixedGateway::new(columnar_payload()));
        explorer.fetch_region(&params(20)).await.unwrap();

        assert_eq!(explorer.prev().unwrap().id, "1001");
        assert_eq!(explorer.next().unwrap().id, "1002");
        assert_eq!(explorer.next().unwrap().id, "1003");
        assert_eq!(explorer.next().unwrap().id, "1003");
        assert!(matches!(
            explorer.select(7),
            Err(ExplorerError::Core(CoreError::IndexOutOfRange { index: 7, len: 3 }))
        ));
        explorer.select(1).unwrap();
    }

    let reopened = open(&dir, FixedGateway::new(json!([])));
    assert_eq!(reopened.state().current_index(), 1);
    assert_eq!(reopened.current().unwrap().id, "1002");
}

#[tokio::test]
async fn annotations_and_snapshots_persist_and_export() {
    let dir = TempDir::new().unwrap();
    {
        let mut explorer = open(&dir, FixedGateway::new(columnar_payload()));
        explorer.fetch_region(&params(20)).await.unwrap();
        explorer
            .annotate(AnnotationUpdate {
                name: Some("dip".into()),
                category: None,
                note: Some("line one\nline two".into()),
            })
            .unwrap();
        let image = explorer.capture_snapshot().unwrap();
        assert!(image.starts_with(lc_chart::SNAPSHOT_PREFIX));
    }

    let explorer = open(&dir, FixedGateway::new(json!([])));
    let current = explorer.current().unwrap();
    assert_eq!(current.annotations.name, "dip");
    assert!(current.snapshot.is_some());

    let csv = explorer.export_csv().unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("objectId,ra,dec,name,category,note,png"));
    let first = lines.next().unwrap();
    assert!(first.starts_with("\"1001\""));
    assert!(first.contains("\"line one line two\""));
    assert!(first.contains("data:image/svg+xml;base64,"));
}

#[tokio::test]
async fn empty_collection_has_nothing_to_navigate() {
    let dir = TempDir::new().unwrap();
    let mut explorer = open(&dir, FixedGateway::new(json!([])));

    assert!(matches!(
        explorer.next(),
        Err(ExplorerError::Core(CoreError::NoObjects))
    ));
    assert!(matches!(
        explorer.capture_snapshot(),
        Err(ExplorerError::Core(CoreError::NoObjects))
    ));
    assert!(explorer.export_csv().unwrap().starts_with("objectId,"));
}
