use std::path::PathBuf;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `upgrade-herald`.
///
/// Every variant here is fatal to a delivery run. Per-message presentation
/// failures are not errors; they are reported as
/// [`DialogOutcome`](crate::presenter::DialogOutcome) values and only affect
/// the final commit decision.
#[derive(Debug, Error)]
pub enum HeraldError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Versions ─────────────────────────────────────────────────────────
    #[error("version: {0}")]
    Version(#[from] VersionError),

    // ── Preferences ──────────────────────────────────────────────────────
    #[error("preferences: {0}")]
    Preference(#[from] PreferenceError),

    // ── Ledger ───────────────────────────────────────────────────────────
    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    // ── Content cache ────────────────────────────────────────────────────
    #[error("cache: {0}")]
    Cache(#[from] CacheError),

    // ── Catalog ──────────────────────────────────────────────────────────
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),

    // ── Per-message content ──────────────────────────────────────────────
    #[error("content: {0}")]
    Content(#[from] ContentError),

    // ── Network ──────────────────────────────────────────────────────────
    #[error("network: {0}")]
    Network(#[from] NetworkError),

    // ── Platform discovery ───────────────────────────────────────────────
    #[error("platform: {0}")]
    Platform(#[from] PlatformError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    #[error("missing setting: {0}")]
    Missing(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Version errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version format: {0:?}")]
    InvalidFormat(String),

    #[error("invalid version specifier {clause:?}: {reason}")]
    InvalidSpecifier { clause: String, reason: String },
}

// ─── Preference store errors ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("scope {0} is read-only")]
    ReadOnly(crate::prefs::Scope),

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("key {key} has unexpected shape: {message}")]
    Decode { key: String, message: String },

    #[error("failed to encode {key}: {message}")]
    Encode { key: String, message: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Ledger errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("stored acknowledgments are unreadable: {0}")]
    Decode(String),

    #[error("store: {0}")]
    Store(#[from] PreferenceError),
}

// ─── Content cache errors ────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("remote unavailable while probing {url}: {message}")]
    RemoteUnavailable { url: String, message: String },

    #[error("download of {url} failed: {message}")]
    DownloadFailed { url: String, message: String },

    #[error("io on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

// ─── Catalog errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse catalog {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("failed to read catalog {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid distribution url {url}: {message}")]
    Url { url: String, message: String },

    #[error("no distribution url configured")]
    NoDistribution,

    #[error("cache: {0}")]
    Cache(#[from] CacheError),
}

// ─── Per-message content errors ──────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to write content for {message_id}: {source}")]
    Write {
        message_id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode version marker for {message_id}: {source}")]
    Marker {
        message_id: String,
        #[source]
        source: serde_json::Error,
    },
}

// ─── Network errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("network unavailable after {waited_secs}s probing {url}")]
    Unavailable { url: String, waited_secs: u64 },

    #[error("failed to build http client: {0}")]
    Client(String),
}

// ─── Platform discovery errors ───────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("could not determine the OS version: {0}")]
    OsVersion(String),

    #[error("requested user {requested:?} is not the console user {console:?}")]
    UserMismatch { requested: String, console: String },
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, HeraldError>;
