//! End-to-end lifecycle tests against the mock provider

use idebox_config::{GlobalConfig, IdeTypeConfig, RuntimeConfig};
use idebox_core::test_support::{MockCall, MockHandles, MockProvider};
use idebox_core::{
    cached_artifact_path, BuildOutcome, CoreError, IdeManager, LineageStore, StartOutcome,
    StopOutcome, ROOT_SNAPSHOT,
};
use std::path::Path;
use tempfile::TempDir;

struct Harness {
    manager: IdeManager,
    handles: MockHandles,
    // Keeps the state/cache dirs alive for the test's duration
    _dirs: (TempDir, TempDir),
}

fn harness(mock: MockProvider) -> Harness {
    let state = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();

    let mut config = GlobalConfig::default();
    config.defaults.state_root = Some(state.path().to_path_buf());
    config.defaults.cache_root = Some(cache.path().to_path_buf());

    let handles = mock.handles();
    Harness {
        manager: IdeManager::new(Box::new(mock), config),
        handles,
        _dirs: (state, cache),
    }
}

fn foo_descriptor() -> IdeTypeConfig {
    IdeTypeConfig {
        name: "foo".to_string(),
        download: "https://example.com/foo-ide.tar.xz".to_string(),
        base_image: "ubuntu:22.04".to_string(),
        install_command: None,
    }
}

/// Seed the artifact cache so build never touches the network
fn seed_artifact(cache_root: &Path, url: &str) {
    let path = cached_artifact_path(url, cache_root);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"fake-ide-archive").unwrap();
}

#[tokio::test]
async fn full_foo_scenario() {
    let h = harness(MockProvider::new());
    let ide = foo_descriptor();
    seed_artifact(h._dirs.1.path(), &ide.download);

    // build creates v0
    assert_eq!(h.manager.build(&ide).await.unwrap(), BuildOutcome::Built);
    assert_eq!(h.manager.list("foo").await.unwrap(), vec!["v0"]);

    // start on v0
    let runtime = RuntimeConfig::default();
    assert_eq!(
        h.manager.start("foo", ROOT_SNAPSHOT, &runtime).await.unwrap(),
        StartOutcome::Started
    );
    assert_eq!(h.manager.status("foo").await.unwrap().as_deref(), Some("v0"));

    // snapshot s1 with parent v0
    let parent = h.manager.take_snapshot("foo", "s1").await.unwrap();
    assert_eq!(parent, "v0");
    assert_eq!(h.manager.list("foo").await.unwrap(), vec!["s1", "v0"]);
    assert_eq!(
        h.manager.parent_of("foo", "s1").unwrap().as_deref(),
        Some("v0")
    );

    // stop
    assert_eq!(h.manager.stop("foo").await.unwrap(), StopOutcome::Stopped);
    assert_eq!(h.manager.status("foo").await.unwrap(), None);

    // revert to s1
    assert_eq!(
        h.manager.start("foo", "s1", &runtime).await.unwrap(),
        StartOutcome::Started
    );
    assert_eq!(h.manager.status("foo").await.unwrap().as_deref(), Some("s1"));

    // v0 stays removable only once nothing references it
    h.manager.stop("foo").await.unwrap();
    let err = h.manager.remove_snapshot("foo", "v0").await.unwrap_err();
    assert!(matches!(err, CoreError::SnapshotConflict(_)));

    h.manager.remove_snapshot("foo", "s1").await.unwrap();
    assert_eq!(h.manager.list("foo").await.unwrap(), vec!["v0"]);

    // root snapshot has no lineage entry; removal still succeeds
    h.manager.remove_snapshot("foo", "v0").await.unwrap();
    assert!(h.manager.list("foo").await.unwrap().is_empty());
}

#[tokio::test]
async fn build_is_idempotent() {
    let h = harness(MockProvider::with_tags(&["v0"]));
    let ide = foo_descriptor();

    assert_eq!(
        h.manager.build(&ide).await.unwrap(),
        BuildOutcome::AlreadyBuilt
    );
    assert!(!h
        .handles
        .calls()
        .iter()
        .any(|c| matches!(c, MockCall::Build { .. })));
}

#[tokio::test]
async fn start_is_idempotent() {
    let h = harness(MockProvider::with_tags(&["v0"]));
    let runtime = RuntimeConfig::default();

    assert_eq!(
        h.manager.start("foo", "v0", &runtime).await.unwrap(),
        StartOutcome::Started
    );
    assert_eq!(
        h.manager.start("foo", "v0", &runtime).await.unwrap(),
        StartOutcome::AlreadyRunning
    );
    // The second start never reached the runtime
    assert_eq!(h.handles.run_count(), 1);
}

#[tokio::test]
async fn start_over_other_snapshot_is_refused() {
    let h = harness(MockProvider::with_tags(&["v0", "s1"]));
    let runtime = RuntimeConfig::default();

    h.manager.start("foo", "v0", &runtime).await.unwrap();
    let err = h.manager.start("foo", "s1", &runtime).await.unwrap_err();
    assert!(matches!(err, CoreError::LifecycleConflict(_)));

    // Container untouched
    assert_eq!(h.handles.run_count(), 1);
    assert_eq!(
        h.handles.running_image().as_deref(),
        Some("idebox-foo:v0")
    );
}

#[tokio::test]
async fn start_of_unknown_snapshot_fails() {
    let h = harness(MockProvider::with_tags(&["v0"]));
    let runtime = RuntimeConfig::default();

    let err = h.manager.start("foo", "missing", &runtime).await.unwrap_err();
    assert!(matches!(err, CoreError::UnknownSnapshot(name) if name == "missing"));
    assert_eq!(h.handles.run_count(), 0);
}

#[tokio::test]
async fn invalid_mount_fails_before_any_runtime_call() {
    let h = harness(MockProvider::with_tags(&["v0"]));
    let runtime = RuntimeConfig {
        mount: Some("no-separator".to_string()),
        ..RuntimeConfig::default()
    };

    assert!(h.manager.start("foo", "v0", &runtime).await.is_err());
    assert!(h.handles.calls().is_empty());
}

#[tokio::test]
async fn snapshot_of_existing_name_is_refused() {
    let mock = MockProvider::with_tags(&["v0", "s1"]);
    mock.set_running("idebox-foo:v0");
    let h = harness(mock);

    let err = h.manager.take_snapshot("foo", "s1").await.unwrap_err();
    assert!(matches!(err, CoreError::SnapshotConflict(_)));
    assert!(!h
        .handles
        .calls()
        .iter()
        .any(|c| matches!(c, MockCall::Commit { .. })));
}

#[tokio::test]
async fn snapshot_requires_running_container() {
    let h = harness(MockProvider::with_tags(&["v0"]));

    let err = h.manager.take_snapshot("foo", "s1").await.unwrap_err();
    assert!(matches!(err, CoreError::SnapshotConflict(_)));
}

#[tokio::test]
async fn snapshot_names_are_validated() {
    let h = harness(MockProvider::with_tags(&["v0"]));

    let err = h.manager.take_snapshot("foo", ".bad").await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidSnapshotName(_)));
    // Rejected before any provider call
    assert!(h.handles.calls().is_empty());
}

#[tokio::test]
async fn remove_of_running_snapshot_is_refused() {
    let mock = MockProvider::with_tags(&["v0", "s1"]);
    mock.set_running("idebox-foo:s1");
    let h = harness(mock);

    let err = h.manager.remove_snapshot("foo", "s1").await.unwrap_err();
    assert!(matches!(err, CoreError::SnapshotConflict(_)));
    assert_eq!(h.handles.tags(), vec!["v0", "s1"]);
}

#[tokio::test]
async fn remove_of_referenced_parent_is_refused() {
    let mock = MockProvider::with_tags(&["v0", "s1"]);
    mock.set_running("idebox-foo:v0");
    let h = harness(mock);

    // Snapshot from a running v0, so the lineage records v0 as a parent
    h.manager.take_snapshot("foo", "s2").await.unwrap();
    h.manager.stop("foo").await.unwrap();

    let err = h.manager.remove_snapshot("foo", "v0").await.unwrap_err();
    assert!(matches!(err, CoreError::SnapshotConflict(_)));
    assert!(!h
        .handles
        .calls()
        .iter()
        .any(|c| matches!(c, MockCall::RemoveImage { .. })));
}

#[tokio::test]
async fn remove_unreferenced_snapshot_drops_image_and_entry() {
    let mock = MockProvider::with_tags(&["v0"]);
    mock.set_running("idebox-foo:v0");
    let h = harness(mock);

    h.manager.take_snapshot("foo", "s1").await.unwrap();
    h.manager.stop("foo").await.unwrap();

    h.manager.remove_snapshot("foo", "s1").await.unwrap();
    assert_eq!(h.handles.tags(), vec!["v0"]);
    assert_eq!(h.manager.parent_of("foo", "s1").unwrap(), None);
}

#[tokio::test]
async fn lineage_survives_reload() {
    let mock = MockProvider::with_tags(&["v0"]);
    mock.set_running("idebox-foo:v0");
    let h = harness(mock);

    h.manager.take_snapshot("foo", "s1").await.unwrap();

    let path = h._dirs.0.path().join("foo").join("lineage.json");
    let store = LineageStore::load_from(&path).unwrap();
    assert_eq!(store.parent_of("s1"), Some("v0"));
    assert_eq!(store.parent_of("v0"), None);
}
