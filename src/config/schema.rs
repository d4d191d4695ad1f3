use crate::error::ConfigError;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const SYSTEM_CONFIG_PATH: &str = "/etc/upgrade-herald/config.toml";

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was loaded from - computed, not serialized
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub preferences: PreferencesConfig,

    #[serde(default)]
    pub presenter: PresenterConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub versions: VersionsConfig,
}

// ── Preference store locations ───────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Administrator-managed settings (read-only)
    #[serde(default = "default_managed_path")]
    pub managed_path: PathBuf,
    /// Directory holding per-host mutable state
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

fn default_managed_path() -> PathBuf {
    PathBuf::from("/etc/upgrade-herald/managed.toml")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("/var/lib/upgrade-herald")
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            managed_path: default_managed_path(),
            state_dir: default_state_dir(),
        }
    }
}

// ── Dialog presenter ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenterConfig {
    /// Dialog binary invoked as `<binary> --jsonstring <payload>`
    #[serde(default = "default_dialog_binary")]
    pub binary: PathBuf,
    /// Auto-close timer when a message does not set one
    #[serde(default = "default_timer_secs")]
    pub default_timer_secs: u64,
}

fn default_dialog_binary() -> PathBuf {
    PathBuf::from("/usr/local/bin/dialog")
}

fn default_timer_secs() -> u64 {
    300
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            binary: default_dialog_binary(),
            default_timer_secs: default_timer_secs(),
        }
    }
}

// ── Network ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Overall bound on waiting for the distribution point
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
    /// Timeout of each reachability probe
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Pause between failed probes
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    /// Timeout of validator probes and downloads
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_wait_timeout_secs() -> u64 {
    30
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_retry_interval_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    20
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wait_timeout_secs: default_wait_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            retry_interval_ms: default_retry_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: None,
        }
    }
}

impl NetworkConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("upgrade-herald/{}", env!("CARGO_PKG_VERSION")))
    }
}

// ── Versions ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionsConfig {
    /// Assumed last committed OS version on first run
    #[serde(default = "default_floor_version")]
    pub floor: String,
}

fn default_floor_version() -> String {
    "12".into()
}

impl Default for VersionsConfig {
    fn default() -> Self {
        Self {
            floor: default_floor_version(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// Resolution order: explicit path, `UPGRADE_HERALD_CONFIG`, the system
    /// file, the per-user config directory, built-in defaults. An explicit
    /// path that does not exist is an error; the implicit locations are
    /// skipped when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match Self::resolve_path(explicit)? {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|error| ConfigError::Load {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        let mut config: Config = toml::from_str(&contents).map_err(|error| ConfigError::Load {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn resolve_path(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
        if let Some(path) = explicit {
            let expanded = expand_tilde(path);
            if !expanded.exists() {
                return Err(ConfigError::Load {
                    path: expanded,
                    message: "file does not exist".into(),
                });
            }
            return Ok(Some(expanded));
        }

        if let Ok(path) = std::env::var("UPGRADE_HERALD_CONFIG")
            && !path.is_empty()
        {
            return Ok(Some(expand_tilde(Path::new(&path))));
        }

        let system = PathBuf::from(SYSTEM_CONFIG_PATH);
        if system.exists() {
            return Ok(Some(system));
        }

        let user = ProjectDirs::from("com", "upgrade-herald", "upgrade-herald")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .filter(|path| path.exists());
        Ok(user)
    }

    pub fn apply_env_overrides(&mut self) {
        // Managed preferences file: UPGRADE_HERALD_MANAGED_PREFS
        if let Ok(path) = std::env::var("UPGRADE_HERALD_MANAGED_PREFS")
            && !path.is_empty()
        {
            self.preferences.managed_path = PathBuf::from(path);
        }

        // Host state directory: UPGRADE_HERALD_STATE_DIR
        if let Ok(dir) = std::env::var("UPGRADE_HERALD_STATE_DIR")
            && !dir.is_empty()
        {
            self.preferences.state_dir = PathBuf::from(dir);
        }

        // Dialog binary: UPGRADE_HERALD_DIALOG
        if let Ok(binary) = std::env::var("UPGRADE_HERALD_DIALOG")
            && !binary.is_empty()
        {
            self.presenter.binary = PathBuf::from(binary);
        }
    }

    fn expand_paths(&mut self) {
        self.preferences.managed_path = expand_tilde(&self.preferences.managed_path);
        self.preferences.state_dir = expand_tilde(&self.preferences.state_dir);
        self.presenter.binary = expand_tilde(&self.presenter.binary);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.wait_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "network.wait_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.network.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "network.request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.presenter.default_timer_secs == 0 {
            return Err(ConfigError::Validation(
                "presenter.default_timer_secs must be greater than zero".into(),
            ));
        }
        crate::version::OsVersion::parse(&self.versions.floor).map_err(|error| {
            ConfigError::Validation(format!("versions.floor: {error}"))
        })?;
        Ok(())
    }
}

pub(crate) fn expand_tilde(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
}
