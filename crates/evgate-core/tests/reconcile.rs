use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use evgate_core::outputs::{ACCESS_KEY_OUTPUT, SECRET_KEY_OUTPUT};
use evgate_core::{
    EmitError, EventBinding, FunctionEventDeclaration, FunctionId, GatewayClient, GatewayConfig,
    GatewayError, MemoryStateStore, ProviderSpec, ReconcileError, ReconcileOptions, Reconciler,
    ReconciliationState, StateStore, StateStoreError, SubscriptionSpec, derive_function_id, emit,
};

const HELLO_ARN: &str = "arn:aws:lambda:us-east-1:123456789012:function:shop-dev-hello";
const SIGNUP_ARN: &str = "arn:aws:lambda:us-east-1:123456789012:function:shop-dev-signup";

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Register(String),
    Update(String),
    Delete(String),
    Subscribe(SubscriptionSpec),
    Unsubscribe(String),
    Emit(String, Value),
}

impl Call {
    fn is_teardown(&self) -> bool {
        matches!(self, Call::Delete(_) | Call::Unsubscribe(_))
    }
}

#[derive(Debug, Clone, Copy)]
enum Failure {
    NotFound,
    AlreadyExists,
    Server,
}

impl Failure {
    fn error(self) -> GatewayError {
        match self {
            Failure::NotFound => GatewayError::NotFound,
            Failure::AlreadyExists => GatewayError::AlreadyExists,
            Failure::Server => GatewayError::Http {
                status: 500,
                body: "boom".to_string(),
            },
        }
    }
}

/// Gateway double that records each call together with the state persisted at
/// the moment the call was issued.
///
/// A suspending gateway yields once inside every teardown call so that several
/// calls can be in flight together.
#[derive(Default)]
struct FakeGateway {
    calls: Mutex<Vec<(Call, ReconciliationState)>>,
    /// Finished teardown calls with the number of calls started at that moment.
    finished: Mutex<Vec<(Call, usize)>>,
    failures: Mutex<HashMap<String, Failure>>,
    store: Option<Arc<MemoryStateStore>>,
    next_subscription: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    upsert: bool,
    suspend: bool,
}

impl FakeGateway {
    fn new(store: Arc<MemoryStateStore>) -> Self {
        Self {
            store: Some(store),
            ..Default::default()
        }
    }

    fn upserting(mut self) -> Self {
        self.upsert = true;
        self
    }

    fn suspending(mut self) -> Self {
        self.suspend = true;
        self
    }

    /// Fail calls whose key (id, or `event path` for subscribe) matches.
    fn fail(self, key: &str, failure: Failure) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(key.to_string(), failure);
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    fn snapshots(&self) -> Vec<(Call, ReconciliationState)> {
        self.calls.lock().unwrap().clone()
    }

    fn finished(&self) -> Vec<(Call, usize)> {
        self.finished.lock().unwrap().clone()
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call, key: &str) -> Result<(), GatewayError> {
        let persisted = self
            .store
            .as_ref()
            .and_then(|s| s.current())
            .unwrap_or_default();
        self.calls.lock().unwrap().push((call, persisted));
        match self.failures.lock().unwrap().get(key) {
            Some(failure) => Err(failure.error()),
            None => Ok(()),
        }
    }

    async fn teardown_call(&self, call: Call, key: &str) -> Result<(), GatewayError> {
        let outcome = self.record(call.clone(), key);
        if self.suspend {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        let started = self.calls.lock().unwrap().len();
        self.finished.lock().unwrap().push((call, started));
        outcome
    }
}

#[async_trait]
impl GatewayClient for FakeGateway {
    async fn register_function(
        &self,
        id: &FunctionId,
        _provider: &ProviderSpec,
    ) -> Result<(), GatewayError> {
        self.record(Call::Register(id.to_string()), id.as_str())
    }

    async fn update_function(
        &self,
        id: &FunctionId,
        _provider: &ProviderSpec,
    ) -> Result<(), GatewayError> {
        self.record(Call::Update(id.to_string()), &format!("update {id}"))
    }

    async fn delete_function(&self, id: &FunctionId) -> Result<(), GatewayError> {
        self.teardown_call(Call::Delete(id.to_string()), id.as_str()).await
    }

    async fn subscribe(&self, spec: &SubscriptionSpec) -> Result<String, GatewayError> {
        self.record(
            Call::Subscribe(spec.clone()),
            &format!("{} {}", spec.event, spec.path),
        )?;
        let n = self.next_subscription.fetch_add(1, Ordering::SeqCst);
        Ok(format!("sub-{n}"))
    }

    async fn unsubscribe(&self, subscription_id: &str) -> Result<(), GatewayError> {
        self.teardown_call(Call::Unsubscribe(subscription_id.to_string()), subscription_id).await
    }

    async fn emit(&self, event: &str, data: &Value) -> Result<(), GatewayError> {
        self.record(Call::Emit(event.to_string(), data.clone()), event)
    }

    fn register_is_upsert(&self) -> bool {
        self.upsert
    }
}

fn config() -> GatewayConfig {
    GatewayConfig::hosted("acme", "api-key").expect("config")
}

fn outputs() -> evgate_core::DeploymentOutputs {
    evgate_core::DeploymentOutputs::new()
        .with(ACCESS_KEY_OUTPUT, "AKIA")
        .with(SECRET_KEY_OUTPUT, "secret")
        .with("HelloLambdaFunctionQualifiedArn", format!("{HELLO_ARN}:3"))
        .with("SignupLambdaFunctionQualifiedArn", format!("{SIGNUP_ARN}:9"))
}

fn declarations() -> Vec<FunctionEventDeclaration> {
    vec![
        FunctionEventDeclaration::new(
            "hello",
            vec![
                EventBinding::new("http").with_path("hello"),
                EventBinding::new("http")
                    .with_path("/hello")
                    .with_method("post")
                    .with_cors(true),
            ],
        ),
        FunctionEventDeclaration::new("signup", vec![EventBinding::new("user.created")]),
        FunctionEventDeclaration::new("quiet", vec![]),
    ]
}

fn prior() -> ReconciliationState {
    ReconciliationState {
        functions: vec![FunctionId::from("old-f1"), FunctionId::from("old-f2")],
        subscriptions: vec!["old-s1".to_string(), "old-s2".to_string(), "old-s3".to_string()],
    }
}

fn hello_id() -> FunctionId {
    derive_function_id(HELLO_ARN).unwrap()
}

fn signup_id() -> FunctionId {
    derive_function_id(SIGNUP_ARN).unwrap()
}

/// Store whose every save fails, counting the attempts.
#[derive(Default)]
struct FailingStore {
    saves: AtomicUsize,
}

#[async_trait]
impl StateStore for FailingStore {
    async fn load(&self) -> Result<ReconciliationState, StateStoreError> {
        Ok(ReconciliationState::default())
    }

    async fn save(&self, _state: &ReconciliationState) -> Result<(), StateStoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Err(StateStoreError::Io {
            path: PathBuf::from("state.json"),
            source: std::io::Error::other("disk full"),
        })
    }
}

fn setup(
    gateway: impl FnOnce(Arc<MemoryStateStore>) -> FakeGateway,
) -> (Arc<FakeGateway>, Arc<MemoryStateStore>, Reconciler) {
    let store = Arc::new(MemoryStateStore::new());
    let gateway = Arc::new(gateway(store.clone()));
    let reconciler = Reconciler::new(gateway.clone(), store.clone());
    (gateway, store, reconciler)
}

#[tokio::test]
async fn test_empty_state_skips_teardown() {
    let (gateway, store, reconciler) = setup(FakeGateway::new);

    let result = reconciler
        .reconcile(&config(), &outputs(), &declarations(), ReconciliationState::default())
        .await
        .expect("reconcile");

    let calls = gateway.calls();
    assert!(calls.iter().all(|c| !c.is_teardown()));
    assert_eq!(calls.len(), 5);
    assert_eq!(calls[0], Call::Register(hello_id().to_string()));
    assert_eq!(calls[3], Call::Register(signup_id().to_string()));

    assert_eq!(result.state.functions, vec![hello_id(), signup_id()]);
    assert_eq!(result.state.subscriptions, vec!["sub-0", "sub-1", "sub-2"]);
    assert_eq!(store.current(), Some(result.state.clone()));
}

#[tokio::test]
async fn test_run_loads_missing_state_as_empty() {
    let (gateway, _store, reconciler) = setup(FakeGateway::new);
    let result = reconciler
        .run(&config(), &outputs(), &declarations())
        .await
        .expect("run");
    assert!(result.removed_subscriptions.is_empty());
    assert!(result.removed_functions.is_empty());
    assert_eq!(gateway.calls().len(), 5);
}

#[tokio::test]
async fn test_subscription_requests_carry_paths_and_methods() {
    let (gateway, _store, reconciler) = setup(FakeGateway::new);
    reconciler
        .reconcile(&config(), &outputs(), &declarations(), ReconciliationState::default())
        .await
        .unwrap();

    let specs: Vec<SubscriptionSpec> = gateway
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Subscribe(spec) => Some(spec),
            _ => None,
        })
        .collect();

    assert_eq!(specs[0].path, "/acme/hello");
    assert_eq!(specs[0].method.as_deref(), Some("GET"));
    assert_eq!(specs[0].cors, None);
    assert_eq!(specs[1].path, "/acme/hello");
    assert_eq!(specs[1].method.as_deref(), Some("POST"));
    assert_eq!(specs[1].cors, Some(true));
    assert_eq!(specs[2].event, "user.created");
    assert_eq!(specs[2].path, "/acme/");
    assert_eq!(specs[2].method, None);
    assert_eq!(specs[2].function_id, signup_id());
}

#[tokio::test]
async fn test_teardown_runs_before_creation() {
    let (gateway, _store, reconciler) = setup(FakeGateway::new);
    let result = reconciler
        .reconcile(&config(), &outputs(), &declarations(), prior())
        .await
        .unwrap();

    let calls = gateway.calls();
    let expected_teardown = vec![
        Call::Unsubscribe("old-s1".into()),
        Call::Unsubscribe("old-s2".into()),
        Call::Unsubscribe("old-s3".into()),
        Call::Delete("old-f1".into()),
        Call::Delete("old-f2".into()),
    ];
    assert_eq!(calls[..5], expected_teardown[..]);
    assert!(calls[5..].iter().all(|c| !c.is_teardown()));

    assert_eq!(result.removed_subscriptions.len(), 3);
    assert_eq!(result.removed_functions.len(), 2);
    assert!(!result.state.functions.contains(&FunctionId::from("old-f1")));
}

#[tokio::test]
async fn test_each_removal_is_persisted_before_the_next_call() {
    let (gateway, store, reconciler) = setup(FakeGateway::new);
    reconciler
        .reconcile(&config(), &outputs(), &declarations(), prior())
        .await
        .unwrap();

    let snapshots = gateway.snapshots();
    // Call #2 (old-s2) sees old-s1 already gone from persisted state.
    assert_eq!(snapshots[1].0, Call::Unsubscribe("old-s2".into()));
    assert_eq!(snapshots[1].1.subscriptions, vec!["old-s2", "old-s3"]);
    // First delete sees no subscriptions left and both functions still tracked.
    assert_eq!(snapshots[3].0, Call::Delete("old-f1".into()));
    assert!(snapshots[3].1.subscriptions.is_empty());
    assert_eq!(snapshots[3].1.functions.len(), 2);
    assert_eq!(snapshots[4].1.functions, vec![FunctionId::from("old-f2")]);

    // One save per mutation: 5 removals + 2 registrations + 3 subscriptions.
    assert_eq!(store.history().len(), 10);
}

#[tokio::test]
async fn test_registration_is_persisted_before_subscribing() {
    let (gateway, _store, reconciler) = setup(FakeGateway::new);
    reconciler
        .reconcile(&config(), &outputs(), &declarations(), ReconciliationState::default())
        .await
        .unwrap();

    for (call, persisted) in gateway.snapshots() {
        if let Call::Subscribe(spec) = call {
            assert!(persisted.functions.contains(&spec.function_id));
        }
    }
}

#[tokio::test]
async fn test_missing_access_key_aborts_without_remote_calls() {
    let (gateway, store, reconciler) = setup(FakeGateway::new);
    let outputs = evgate_core::DeploymentOutputs::new()
        .with(SECRET_KEY_OUTPUT, "secret")
        .with("HelloLambdaFunctionQualifiedArn", format!("{HELLO_ARN}:3"));

    let err = reconciler
        .reconcile(&config(), &outputs, &declarations(), prior())
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::DeploymentData(_)));
    assert!(gateway.calls().is_empty());
    assert!(store.history().is_empty());
}

#[tokio::test]
async fn test_missing_function_arn_aborts_without_remote_calls() {
    let (gateway, _store, reconciler) = setup(FakeGateway::new);
    let outputs = evgate_core::DeploymentOutputs::new()
        .with(ACCESS_KEY_OUTPUT, "AKIA")
        .with(SECRET_KEY_OUTPUT, "secret");

    let err = reconciler
        .reconcile(&config(), &outputs, &declarations(), prior())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "deployment_data");
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_empty_api_key_is_a_configuration_error() {
    let (gateway, _store, reconciler) = setup(FakeGateway::new);
    let mut config = config();
    config.api_key.clear();

    let err = reconciler
        .reconcile(&config, &outputs(), &declarations(), prior())
        .await
        .unwrap_err();

    assert!(matches!(err, ReconcileError::Configuration(_)));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_not_found_during_teardown_is_forgotten() {
    let (gateway, store, reconciler) = setup(|store| {
        FakeGateway::new(store)
            .fail("old-s2", Failure::NotFound)
            .fail("old-f1", Failure::NotFound)
    });

    let result = reconciler
        .reconcile(&config(), &outputs(), &declarations(), prior())
        .await
        .expect("not found is benign");

    assert_eq!(result.removed_subscriptions.len(), 3);
    assert_eq!(result.removed_functions.len(), 2);
    let persisted = store.current().unwrap();
    assert!(!persisted.subscriptions.iter().any(|s| s.starts_with("old-")));
    assert_eq!(gateway.calls().len(), 10);
}

#[tokio::test]
async fn test_failed_unsubscribe_stops_the_run_and_keeps_progress() {
    let (gateway, store, reconciler) =
        setup(|store| FakeGateway::new(store).fail("old-s2", Failure::Server));

    let err = reconciler
        .reconcile(&config(), &outputs(), &declarations(), prior())
        .await
        .unwrap_err();

    match &err {
        ReconcileError::Remote { operation, id, .. } => {
            assert_eq!(*operation, "unsubscribe");
            assert_eq!(id, "old-s2");
        }
        other => panic!("unexpected error {other:?}"),
    }

    // No further teardown or creation after the failure.
    assert_eq!(
        gateway.calls(),
        vec![
            Call::Unsubscribe("old-s1".into()),
            Call::Unsubscribe("old-s2".into())
        ]
    );
    let persisted = store.current().unwrap();
    assert_eq!(persisted.subscriptions, vec!["old-s2", "old-s3"]);
    assert_eq!(persisted.functions.len(), 2);
}

#[tokio::test]
async fn test_failed_subscribe_keeps_completed_creations() {
    let (_gateway, store, reconciler) =
        setup(|store| FakeGateway::new(store).fail("http /acme/hello", Failure::Server));

    let err = reconciler
        .reconcile(&config(), &outputs(), &declarations(), ReconciliationState::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "remote_call");

    let persisted = store.current().unwrap();
    assert_eq!(persisted.functions, vec![hello_id()]);
    assert!(persisted.subscriptions.is_empty());
}

#[tokio::test]
async fn test_already_registered_function_is_updated() {
    let hello = hello_id().to_string();
    let (gateway, _store, reconciler) =
        setup(|store| FakeGateway::new(store).fail(&hello, Failure::AlreadyExists));

    let result = reconciler
        .reconcile(&config(), &outputs(), &declarations(), ReconciliationState::default())
        .await
        .expect("duplicate registration is tolerated");

    let calls = gateway.calls();
    assert_eq!(calls[0], Call::Register(hello.clone()));
    assert_eq!(calls[1], Call::Update(hello));
    assert_eq!(result.state.functions, vec![hello_id(), signup_id()]);
}

#[tokio::test]
async fn test_upserting_gateway_does_not_fall_back_to_update() {
    let hello = hello_id().to_string();
    let (gateway, store, reconciler) = setup(|store| {
        FakeGateway::new(store)
            .upserting()
            .fail(&hello, Failure::AlreadyExists)
    });

    let err = reconciler
        .reconcile(&config(), &outputs(), &declarations(), ReconciliationState::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReconcileError::Remote {
            operation: "register_function",
            ..
        }
    ));
    assert_eq!(gateway.calls().len(), 1);
    assert!(store.history().is_empty());
}

fn wide_prior() -> ReconciliationState {
    ReconciliationState {
        functions: (0..3).map(|i| FunctionId::from(format!("old-f{i}"))).collect(),
        subscriptions: (0..6).map(|i| format!("old-s{i}")).collect(),
    }
}

#[tokio::test]
async fn test_concurrent_teardown_linearizes_state_writes() {
    let store = Arc::new(MemoryStateStore::new());
    let gateway = Arc::new(FakeGateway::new(store.clone()).suspending());
    let reconciler = Reconciler::new(gateway.clone(), store.clone())
        .with_options(ReconcileOptions::default().with_teardown_concurrency(4));

    let result = reconciler
        .reconcile(&config(), &outputs(), &declarations(), wide_prior())
        .await
        .unwrap();

    assert_eq!(result.removed_subscriptions.len(), 6);
    assert_eq!(result.removed_functions.len(), 3);

    // Four unsubscribes were started before the first one answered.
    assert_eq!(gateway.max_in_flight(), 4);
    let finished = gateway.finished();
    assert_eq!(finished[0].1, 4);

    // Every save removes exactly one tracked object during teardown.
    let history = store.history();
    for pair in history[..9].windows(2) {
        let before = pair[0].subscriptions.len() + pair[0].functions.len();
        let after = pair[1].subscriptions.len() + pair[1].functions.len();
        assert_eq!(before, after + 1);
    }

    // All unsubscribes precede all deletes.
    let calls = gateway.calls();
    let last_unsubscribe = calls
        .iter()
        .rposition(|c| matches!(c, Call::Unsubscribe(_)))
        .unwrap();
    let first_delete = calls.iter().position(|c| matches!(c, Call::Delete(_))).unwrap();
    assert!(last_unsubscribe < first_delete);
}

#[tokio::test]
async fn test_concurrent_teardown_failure_drains_in_flight_calls() {
    let store = Arc::new(MemoryStateStore::new());
    let gateway = Arc::new(
        FakeGateway::new(store.clone())
            .suspending()
            .fail("old-s1", Failure::Server),
    );
    let reconciler = Reconciler::new(gateway.clone(), store.clone())
        .with_options(ReconcileOptions::default().with_teardown_concurrency(3));

    let err = reconciler
        .reconcile(&config(), &outputs(), &declarations(), wide_prior())
        .await
        .unwrap_err();

    match &err {
        ReconcileError::Remote { operation, id, .. } => {
            assert_eq!(*operation, "unsubscribe");
            assert_eq!(id, "old-s1");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(gateway.max_in_flight() > 1);

    // Nothing started once the failure came back.
    let started_at_failure = gateway
        .finished()
        .iter()
        .find(|(call, _)| *call == Call::Unsubscribe("old-s1".into()))
        .map(|(_, started)| *started)
        .unwrap();
    let calls = gateway.calls();
    assert_eq!(calls.len(), started_at_failure);
    assert!(calls.len() < 6);
    assert!(calls.iter().all(|c| matches!(c, Call::Unsubscribe(_))));

    // Every call that did finish was drained and persisted; the failed one stays.
    assert_eq!(gateway.finished().len(), calls.len());
    let removed: Vec<String> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Unsubscribe(id) if id != "old-s1" => Some(id.clone()),
            _ => None,
        })
        .collect();
    let expected: Vec<String> = wide_prior()
        .subscriptions
        .into_iter()
        .filter(|s| !removed.contains(s))
        .collect();
    let persisted = store.current().unwrap();
    assert_eq!(persisted.subscriptions, expected);
    assert!(persisted.subscriptions.contains(&"old-s1".to_string()));
    assert_eq!(persisted.functions, wide_prior().functions);
    assert_eq!(store.history().len(), removed.len());
}

#[tokio::test]
async fn test_failed_save_after_register_stops_creation() {
    let gateway = Arc::new(FakeGateway::default());
    let store = Arc::new(FailingStore::default());
    let reconciler = Reconciler::new(gateway.clone(), store.clone());

    let err = reconciler
        .reconcile(&config(), &outputs(), &declarations(), ReconciliationState::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "state_store");
    assert!(matches!(err, ReconcileError::StateStore(StateStoreError::Io { .. })));
    assert_eq!(gateway.calls(), vec![Call::Register(hello_id().to_string())]);
    assert_eq!(store.saves.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_save_during_teardown_stops_the_run() {
    let gateway = Arc::new(FakeGateway::default());
    let store = Arc::new(FailingStore::default());
    let reconciler = Reconciler::new(gateway.clone(), store.clone());

    let err = reconciler
        .reconcile(&config(), &outputs(), &declarations(), prior())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "state_store");
    assert_eq!(gateway.calls(), vec![Call::Unsubscribe("old-s1".into())]);
    assert_eq!(store.saves.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rerun_replaces_previous_objects_with_same_function_ids() {
    let (gateway, store, reconciler) = setup(FakeGateway::new);

    let first = reconciler
        .run(&config(), &outputs(), &declarations())
        .await
        .unwrap();
    let second = reconciler
        .run(&config(), &outputs(), &declarations())
        .await
        .unwrap();

    assert_eq!(first.state.functions, second.state.functions);
    assert_eq!(second.removed_subscriptions, first.state.subscriptions);
    assert_eq!(second.removed_functions, first.state.functions);
    assert_eq!(store.current().unwrap(), second.state);
    assert_eq!(gateway.calls().len(), 5 + 5 + 5);
}

#[tokio::test]
async fn test_emit_rejects_invalid_json() {
    let gateway = FakeGateway::default();
    let err = emit(&gateway, "user.created", "{not json").await.unwrap_err();
    assert!(matches!(err, EmitError::InvalidPayload(_)));
    assert!(gateway.calls().is_empty());

    let err = emit(&gateway, "  ", "{}").await.unwrap_err();
    assert!(matches!(err, EmitError::MissingEvent));
}

#[tokio::test]
async fn test_emit_passes_parsed_payload() {
    let gateway = FakeGateway::default();
    let data = emit(&gateway, "user.created", r#"{"id": 7}"#).await.unwrap();
    assert_eq!(data, serde_json::json!({"id": 7}));
    assert_eq!(
        gateway.calls(),
        vec![Call::Emit("user.created".into(), serde_json::json!({"id": 7}))]
    );

    let failing = FakeGateway::default().fail("order.placed", Failure::Server);
    let err = emit(&failing, "order.placed", "{}").await.unwrap_err();
    assert!(matches!(err, EmitError::Gateway(_)));
}

#[tokio::test]
async fn test_memory_store_starts_empty() {
    let store = MemoryStateStore::new();
    assert!(store.load().await.unwrap().is_empty());
}
