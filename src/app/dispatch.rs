use crate::cli::commands::Cli;
use anyhow::{Context, Result};
use tracing::info;
use upgrade_herald::Config;
use upgrade_herald::delivery::{DeliveryCoordinator, RunReport};
use upgrade_herald::platform;
use upgrade_herald::prefs::TomlPreferenceStore;
use upgrade_herald::presenter::DialogPresenter;

/// Run one delivery pass for the user named on the command line.
///
/// 1. Refuses users other than the console user.
/// 2. Opens the managed and host preference files.
/// 3. Runs the coordinator against the configured dialog binary.
pub async fn dispatch(cli: Cli, config: Config) -> Result<RunReport> {
    platform::ensure_console_user(&cli.user)?;

    let prefs = TomlPreferenceStore::for_current_host(
        &config.preferences.managed_path,
        &config.preferences.state_dir,
    );
    tracing::debug!(
        managed = %config.preferences.managed_path.display(),
        host = %prefs.host_path().display(),
        "Preference files"
    );
    let presenter = DialogPresenter::new(&config.presenter.binary);

    let coordinator = DeliveryCoordinator::new(&config, &prefs, &presenter)
        .context("Failed to set up delivery")?;
    let report = coordinator.run(&cli.run_options()).await?;

    info!(
        phase = %report.phase,
        shown = report.messages.len(),
        committed = report.committed,
        "Run finished"
    );
    Ok(report)
}
