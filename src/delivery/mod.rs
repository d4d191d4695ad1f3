//! One notification pass for one user session.
//!
//! `Init → Gated | IgnoredUser | NetworkWait → CatalogLoad → Eligibility →
//! Presenting → Commit | PartialFailure`
//!
//! Fatal errors abort the pass with nothing committed. Presentation failures
//! are per message: the remaining messages are still shown, but the new OS
//! version is not committed so the next login tries again.

mod state;

pub use state::{MessageReport, Phase, RunOptions, RunReport, RunState};

use crate::cache::ContentCache;
use crate::catalog::{ASSET_DIR, CatalogLoader, DistributionPoint};
use crate::config::Config;
use crate::config::schema::expand_tilde;
use crate::eligibility::{EligibilityEngine, MessageContentStore};
use crate::error::{CacheError, ConfigError, HeraldError, Result};
use crate::ledger::AckLedger;
use crate::net::{self, WaitPolicy};
use crate::platform;
use crate::prefs::{
    self, KEY_CACHE_DIR, KEY_DISTRO_URL, KEY_IGNORED_USERS, KEY_LAST_COMMITTED_OS,
    PreferenceStore, Scope,
};
use crate::presenter::{DialogOutcome, InfoContext, Presenter, build_payload};
use crate::version::OsVersion;
use reqwest::Client;
use std::path::PathBuf;

pub struct DeliveryCoordinator<'a> {
    config: &'a Config,
    prefs: &'a dyn PreferenceStore,
    presenter: &'a dyn Presenter,
    client: Client,
}

impl<'a> DeliveryCoordinator<'a> {
    pub fn new(
        config: &'a Config,
        prefs: &'a dyn PreferenceStore,
        presenter: &'a dyn Presenter,
    ) -> Result<Self> {
        let client = net::build_client(&config.network)?;
        Ok(Self {
            config,
            prefs,
            presenter,
            client,
        })
    }

    pub async fn run(&self, options: &RunOptions) -> Result<RunReport> {
        enter(Phase::Init);
        let state = self.init(options)?;
        tracing::debug!(?state, "Run state");

        if !state.upgrade_detected {
            tracing::info!(
                current = %state.current_os,
                last = %state.last_committed_os,
                "System did not update, exiting"
            );
            enter(Phase::Gated);
            return Ok(RunReport::stopped(Phase::Gated));
        }

        let ignored: Vec<String> =
            prefs::get_typed(self.prefs, KEY_IGNORED_USERS, Scope::Managed)?.unwrap_or_default();
        if ignored.iter().any(|name| name == &state.user) {
            tracing::warn!(user = %state.user, ?ignored, "User is in ignore list");
            enter(Phase::IgnoredUser);
            return Ok(RunReport::stopped(Phase::IgnoredUser));
        }

        let cache_dir = self.prepare_cache_dir(options)?;
        let distribution = self.distribution(options)?;
        let cache = ContentCache::new(self.client.clone());

        if options.catalog_override.is_none()
            && let Some(point) = &distribution
        {
            enter(Phase::NetworkWait);
            net::wait_for_network(
                &self.client,
                &point.catalog_url(),
                WaitPolicy::from(&self.config.network),
            )
            .await?;
        }

        enter(Phase::CatalogLoad);
        let loader = CatalogLoader::new(&cache, &cache_dir, distribution);
        let catalog = loader.load(options.catalog_override.as_deref()).await?;

        enter(Phase::Eligibility);
        let mut ledger = AckLedger::load(self.prefs)?;
        let content = MessageContentStore::new(&cache_dir);
        let applicable = EligibilityEngine::new(&content).evaluate(
            catalog,
            &ledger,
            &state.user,
            &state.current_os,
        )?;
        tracing::info!(count = applicable.len(), "Applicable messages");

        enter(Phase::Presenting);
        let context = InfoContext {
            last_os: &state.last_committed_os,
            current_os: &state.current_os,
            default_timer_secs: self.config.presenter.default_timer_secs,
            debug: state.debug,
        };
        let mut messages = Vec::with_capacity(applicable.len());
        for entry in &applicable {
            tracing::info!(message_id = %entry.id, version = entry.version, "Displaying dialog");
            let payload = build_payload(entry, &context);
            let outcome = match self.presenter.present(&payload).await {
                Ok(status) => DialogOutcome::from_exit(status, entry.always_required),
                Err(error) => {
                    tracing::error!(message_id = %entry.id, "Presenter failed: {error:#}");
                    DialogOutcome::OtherFailure
                }
            };
            log_outcome(&entry.id, outcome);

            if outcome.acknowledges() {
                ledger.record_seen(self.prefs, &state.user, &entry.id, entry.version)?;
            }
            messages.push(MessageReport {
                message_id: entry.id.clone(),
                version: entry.version,
                outcome,
            });
        }
        tracing::debug!(?messages, "Message outcomes");

        if !messages.iter().all(|report| report.outcome.is_clean()) {
            tracing::error!(
                "Not every message displayed properly; OS version left uncommitted so the next login retries"
            );
            enter(Phase::PartialFailure);
            return Ok(RunReport {
                phase: Phase::PartialFailure,
                messages,
                committed: false,
            });
        }

        enter(Phase::Commit);
        if messages.is_empty() {
            tracing::info!("No messages displayed");
        }
        let committed = if options.force_upgrade {
            tracing::info!("Upgrade was forced, not committing the OS version");
            false
        } else {
            tracing::debug!(version = %state.current_os, "Committing last OS version");
            prefs::set_typed(
                self.prefs,
                KEY_LAST_COMMITTED_OS,
                &state.current_os.to_string(),
                Scope::Host,
            )?;
            true
        };

        Ok(RunReport {
            phase: Phase::Commit,
            messages,
            committed,
        })
    }

    fn init(&self, options: &RunOptions) -> Result<RunState> {
        let current_os = match &options.os_version_override {
            Some(raw) => OsVersion::parse(raw)?,
            None => platform::current_os_version()?,
        };
        let last_committed_os = self.last_committed_os()?;
        let upgrade_detected = current_os > last_committed_os || options.force_upgrade;

        Ok(RunState {
            current_os,
            last_committed_os,
            user: options.user.clone(),
            upgrade_detected,
            debug: options.is_debug(),
        })
    }

    /// Last committed OS version, or the configured floor on first run.
    pub fn last_committed_os(&self) -> Result<OsVersion> {
        let stored: Option<String> =
            prefs::get_typed(self.prefs, KEY_LAST_COMMITTED_OS, Scope::Host)?;
        let raw = stored.unwrap_or_else(|| self.config.versions.floor.clone());
        Ok(OsVersion::parse(&raw)?)
    }

    fn prepare_cache_dir(&self, options: &RunOptions) -> Result<PathBuf> {
        let cache_dir = match &options.cache_dir_override {
            Some(dir) => dir.clone(),
            None => prefs::get_typed::<String>(self.prefs, KEY_CACHE_DIR, Scope::Managed)?
                .map(PathBuf::from)
                .ok_or(ConfigError::Missing(KEY_CACHE_DIR))?,
        };
        let cache_dir = expand_tilde(&cache_dir);

        for dir in [cache_dir.clone(), cache_dir.join(ASSET_DIR)] {
            std::fs::create_dir_all(&dir).map_err(|source| {
                HeraldError::Cache(CacheError::Io {
                    path: dir.clone(),
                    source,
                })
            })?;
        }
        Ok(cache_dir)
    }

    fn distribution(&self, options: &RunOptions) -> Result<Option<DistributionPoint>> {
        let raw: Option<String> = prefs::get_typed(self.prefs, KEY_DISTRO_URL, Scope::Managed)?;
        match raw {
            Some(raw) => Ok(Some(DistributionPoint::parse(&raw)?)),
            None if options.catalog_override.is_some() => {
                tracing::warn!("No distribution url configured; assets:// links stay unresolved");
                Ok(None)
            }
            None => Err(ConfigError::Missing(KEY_DISTRO_URL).into()),
        }
    }
}

fn enter(phase: Phase) {
    tracing::debug!(%phase, "delivery.phase");
}

fn log_outcome(message_id: &str, outcome: DialogOutcome) {
    match outcome {
        DialogOutcome::Success => tracing::info!(message_id, "Displayed dialog"),
        DialogOutcome::AlwaysRequiredNoop => tracing::info!(
            message_id,
            "Message is always required, not recording acknowledgment"
        ),
        DialogOutcome::TimerExpired => tracing::error!(message_id, "Dialog reached timer"),
        DialogOutcome::UserQuit => tracing::error!(message_id, "Dialog was quit"),
        DialogOutcome::OtherFailure => tracing::error!(message_id, "Dialog failed to display"),
    }
}
