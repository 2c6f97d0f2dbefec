use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;
use tokio::sync::broadcast;

use card_backend::config::Config;
use card_backend::routes::build_router;
use card_backend::services::starter_catalog::StarterContent;
use card_backend::services::starter_content::StarterContentService;
use card_backend::state::AppState;
use card_backend::store::Store;
use card_backend::workers::session_reaper::SessionReaper;

pub const TEST_ADMIN_KEY: &str = "integration-test-admin-key";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub store: Arc<Store>,
    pub config: Config,
    _temp_dir: TempDir,
}

/// Reads nothing from the process environment, so parallel tests cannot
/// race on it. The reaper schedule stays off; tests trigger passes directly.
fn test_config(sled_path: String, admin_api_key: &str) -> Config {
    let admin_api_key = admin_api_key.to_string();
    Config::from_lookup(|key| match key {
        "SLED_PATH" => Some(sled_path.clone()),
        "ADMIN_API_KEY" => Some(admin_api_key.clone()),
        "SESSION_REAPER_ENABLED" => Some("false".to_string()),
        _ => None,
    })
}

pub async fn spawn_with(content: StarterContent, admin_api_key: &str) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("cards-test.sled");
    let config = test_config(sled_path.to_string_lossy().to_string(), admin_api_key);

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let starter = Arc::new(StarterContentService::new(store.clone(), Arc::new(content)));
    let reaper = Arc::new(SessionReaper::new(
        store.clone(),
        config.worker.session_reaper_interval(),
    ));
    let (shutdown_tx, _) = broadcast::channel::<()>(8);

    let state = AppState::new(store.clone(), starter, reaper, &config, shutdown_tx);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        store,
        config,
        _temp_dir: temp_dir,
    }
}

pub async fn spawn_test_app() -> TestApp {
    spawn_with(StarterContent::default(), TEST_ADMIN_KEY).await
}
