//! Server state bootstrap against the on-disk database engine

use tempfile::TempDir;
use wfm_server::{Config, ServerState};

#[tokio::test]
async fn state_initializes_with_a_fresh_work_dir() {
    let dir = TempDir::new().expect("tempdir");
    let work_dir = dir.path().join("data");
    let config = Config::with_overrides(work_dir.to_string_lossy().into_owned(), 0);

    let state = ServerState::initialize(&config).await.expect("initialize");
    assert!(work_dir.exists());

    // The handle is live and the namespace is selected
    state.get_db().query("RETURN 1").await.expect("query");
}
