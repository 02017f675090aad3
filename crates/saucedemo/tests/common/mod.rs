// Shared helpers for scenario tests
//
// Each test binary starts its own site replica and browser session. Settings
// are resolved from a fixed map pointing at the replica; BROWSER and HEADLESS
// are passed through from the environment so runs can be watched locally.

#![allow(dead_code)]

use crate::site_server::{self, SiteServer};
use saucedemo_e2e::report::MemorySink;
use saucedemo_e2e::{Session, Settings, SettingsLoader};
use std::collections::HashMap;
use std::sync::Arc;

/// Installs a test-writer subscriber once per binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// Settings variables for a run against `base_url`
pub fn settings_vars(base_url: &str) -> HashMap<String, String> {
    let mut vars: HashMap<String, String> = [
        ("BASE_URL", base_url),
        ("STANDARD_USER", site_server::STANDARD_USER),
        ("STANDARD_PASSWORD", site_server::PASSWORD),
        ("LOCKED_OUT_USER", site_server::LOCKED_OUT_USER),
        ("LOCKED_OUT_PASSWORD", site_server::PASSWORD),
        ("PROBLEM_USER", site_server::PROBLEM_USER),
        ("TIMEOUT", "10000"),
        ("ACTION_TIMEOUT", "3000"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect();

    for key in ["BROWSER", "HEADLESS", "SLOWMO"] {
        if let Ok(value) = std::env::var(key) {
            vars.insert(key.to_string(), value);
        }
    }
    vars
}

pub fn settings_for(server: &SiteServer) -> Arc<Settings> {
    SettingsLoader::from_map(settings_vars(&server.url()))
        .load()
        .expect("Failed to resolve settings")
}

/// Replica, browser session and in-memory artifact sink for one test binary
pub struct Harness {
    pub server: SiteServer,
    pub session: Session,
    pub sink: Arc<MemorySink>,
}

impl Harness {
    pub async fn start() -> Self {
        init_tracing();
        let server = SiteServer::start().await;
        let settings = settings_for(&server);
        let sink = Arc::new(MemorySink::new());
        let session = Session::launch(settings, sink.clone())
            .await
            .expect("Failed to launch browser session");

        Harness {
            server,
            session,
            sink,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.session.settings()
    }

    pub async fn finish(self) {
        assert_eq!(self.session.live_contexts(), 0, "test contexts leaked");
        self.session
            .close()
            .await
            .expect("Failed to close browser session");
        self.server.shutdown();
    }
}
