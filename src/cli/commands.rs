use clap::Parser;
use std::path::PathBuf;
use upgrade_herald::delivery::RunOptions;

/// `upgrade-herald` - post-upgrade messages for the console user.
#[derive(Parser, Debug)]
#[command(name = "upgrade-herald")]
#[command(version)]
#[command(
    about = "Show catalog messages to the console user after an OS upgrade.",
    long_about = None
)]
pub struct Cli {
    /// Console user to show messages to
    pub user: String,

    /// Extra argument passed by some login hooks; ignored
    #[arg(hide = true)]
    pub extra: Option<String>,

    /// Read the catalog from this local file instead of downloading it
    #[arg(long, value_name = "PATH")]
    pub testfile: Option<PathBuf>,

    /// Pretend the OS is this version
    #[arg(long, value_name = "VERSION")]
    pub testosversion: Option<String>,

    /// Run as if the OS was just upgraded; the OS version is not committed
    #[arg(long)]
    pub ignoreupdated: bool,

    /// Cache directory (overrides the managed `cache_dir` preference)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            user: self.user.clone(),
            os_version_override: self.testosversion.clone(),
            catalog_override: self.testfile.clone(),
            force_upgrade: self.ignoreupdated,
            cache_dir_override: self.cache_dir.clone(),
        }
    }
}
