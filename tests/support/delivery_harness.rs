#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Mutex;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use upgrade_herald::catalog::DialogProperties;
use upgrade_herald::config::Config;
use upgrade_herald::delivery::{DeliveryCoordinator, RunOptions, RunReport};
use upgrade_herald::ledger::AckLedger;
use upgrade_herald::prefs::{
    self, KEY_DISTRO_URL, KEY_LAST_COMMITTED_OS, MemoryPreferenceStore, PreferenceStore, Scope,
};
use upgrade_herald::presenter::Presenter;

pub const USER: &str = "alice";

pub const WELCOME_CATALOG: &str = r##"
- messageID: welcome
  messageVersion: 2
  osRequirements: ">=14.0"
  dialogProperties:
    title: "Welcome"
    message: "# Welcome to <<MSG>>"
"##;

pub const MIXED_CATALOG: &str = r#"
- messageID: welcome
  messageVersion: 2
  osRequirements: ">=14.0"
  dialogProperties:
    message: "Welcome"
- messageID: legacy
  messageVersion: 1
  osRequirements: "<13.0"
  dialogProperties:
    message: "Old systems only"
- messageID: policy
  messageVersion: 5
  alwaysRequired: true
  dialogProperties:
    message: "Acceptable use policy"
    timer: 600
"#;

/// How the fake presenter ends one dialog.
#[derive(Debug, Clone, Copy)]
pub enum Scripted {
    Exit(i32),
    Killed,
    SpawnFailure,
}

/// Presenter that replays scripted exits and records every payload.
/// Dialogs beyond the script exit 0.
#[derive(Default)]
pub struct ScriptedPresenter {
    script: Mutex<VecDeque<Scripted>>,
    shown: Mutex<Vec<DialogProperties>>,
}

impl ScriptedPresenter {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            shown: Mutex::default(),
        }
    }

    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<DialogProperties> {
        self.shown.lock().unwrap().clone()
    }
}

impl Presenter for ScriptedPresenter {
    fn present<'a>(
        &'a self,
        payload: &'a DialogProperties,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<i32>>> + Send + 'a>> {
        Box::pin(async move {
            self.shown.lock().unwrap().push(payload.clone());
            let next = self.script.lock().unwrap().pop_front();
            match next.unwrap_or(Scripted::Exit(0)) {
                Scripted::Exit(code) => Ok(Some(code)),
                Scripted::Killed => Ok(None),
                Scripted::SpawnFailure => anyhow::bail!("dialog binary not found"),
            }
        })
    }
}

/// Temp cache directory, in-memory preferences and a fast-failing config.
pub struct Harness {
    pub tmp: TempDir,
    pub config: Config,
    pub prefs: MemoryPreferenceStore,
}

impl Harness {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.network.wait_timeout_secs = 1;
        config.network.probe_timeout_secs = 1;
        config.network.retry_interval_ms = 50;
        config.network.request_timeout_secs = 5;
        Self {
            tmp: TempDir::new().unwrap(),
            config,
            prefs: MemoryPreferenceStore::new(),
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.tmp.path().join("cache")
    }

    pub fn set_managed<T: serde::Serialize>(&self, key: &str, value: &T) {
        prefs::set_typed(&self.prefs, key, value, Scope::Managed).unwrap();
    }

    pub fn set_last_committed(&self, version: &str) {
        prefs::set_typed(&self.prefs, KEY_LAST_COMMITTED_OS, &version, Scope::Host).unwrap();
    }

    pub fn last_committed(&self) -> Option<String> {
        prefs::get_typed(&self.prefs, KEY_LAST_COMMITTED_OS, Scope::Host).unwrap()
    }

    pub fn ledger(&self) -> AckLedger {
        AckLedger::load(&self.prefs).unwrap()
    }

    pub fn write_catalog(&self, yaml: &str) -> PathBuf {
        let path = self.tmp.path().join("local-messages.yaml");
        std::fs::write(&path, yaml).unwrap();
        path
    }

    /// Options for a run of `USER` on `os_version` with the cache in the temp dir.
    pub fn options(&self, os_version: &str) -> RunOptions {
        RunOptions {
            os_version_override: Some(os_version.to_string()),
            cache_dir_override: Some(self.cache_dir()),
            ..RunOptions::for_user(USER)
        }
    }

    /// Options that read `yaml` from a local file instead of the network.
    pub fn local_options(&self, os_version: &str, yaml: &str) -> RunOptions {
        RunOptions {
            catalog_override: Some(self.write_catalog(yaml)),
            ..self.options(os_version)
        }
    }

    pub async fn run(
        &self,
        presenter: &dyn Presenter,
        options: &RunOptions,
    ) -> upgrade_herald::Result<RunReport> {
        let prefs: &dyn PreferenceStore = &self.prefs;
        DeliveryCoordinator::new(&self.config, prefs, presenter)?
            .run(options)
            .await
    }
}

/// Origin serving `yaml` as `/messages.yaml` with a fixed `ETag`.
pub async fn catalog_origin(yaml: &str, etag: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/messages.yaml"))
        .respond_with(ResponseTemplate::new(200).insert_header("ETag", etag))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/messages.yaml"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", etag)
                .set_body_string(yaml),
        )
        .mount(&server)
        .await;
    server
}

pub fn point_at(harness: &Harness, server: &MockServer) {
    harness.set_managed(KEY_DISTRO_URL, &server.uri());
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
