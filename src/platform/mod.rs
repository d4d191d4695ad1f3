//! Console user and OS version discovery.

use crate::error::PlatformError;
use crate::version::OsVersion;

/// Login-window pseudo users that never receive messages.
const NON_USERS: &[&str] = &["", "loginwindow", "root"];

/// The user owning the console session, if a real user is logged in.
pub fn console_user() -> Option<String> {
    let raw = console_owner().or_else(|| std::env::var("USER").ok())?;
    let user = raw.trim().to_string();
    if NON_USERS.contains(&user.as_str()) {
        None
    } else {
        Some(user)
    }
}

#[cfg(target_os = "macos")]
fn console_owner() -> Option<String> {
    let output = std::process::Command::new("stat")
        .args(["-f", "%Su", "/dev/console"])
        .output()
        .ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(not(target_os = "macos"))]
fn console_owner() -> Option<String> {
    None
}

/// Refuse to run on behalf of anyone but the console user.
pub fn ensure_console_user(requested: &str) -> Result<(), PlatformError> {
    let console = console_user().unwrap_or_default();
    if requested == console {
        Ok(())
    } else {
        Err(PlatformError::UserMismatch {
            requested: requested.to_string(),
            console,
        })
    }
}

/// The running OS product version.
pub fn current_os_version() -> Result<OsVersion, PlatformError> {
    let raw = read_os_version()?;
    OsVersion::parse(&raw).map_err(|error| PlatformError::OsVersion(error.to_string()))
}

#[cfg(target_os = "macos")]
fn read_os_version() -> Result<String, PlatformError> {
    let output = std::process::Command::new("sw_vers")
        .arg("-productVersion")
        .output()
        .map_err(|error| PlatformError::OsVersion(error.to_string()))?;
    if !output.status.success() {
        return Err(PlatformError::OsVersion(format!(
            "sw_vers exited with {}",
            output.status
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(not(target_os = "macos"))]
fn read_os_version() -> Result<String, PlatformError> {
    let release = std::fs::read_to_string("/etc/os-release")
        .map_err(|error| PlatformError::OsVersion(error.to_string()))?;
    os_release_version(&release)
        .ok_or_else(|| PlatformError::OsVersion("VERSION_ID missing from /etc/os-release".into()))
}

/// `VERSION_ID` from an os-release file.
#[cfg_attr(target_os = "macos", allow(dead_code))]
fn os_release_version(release: &str) -> Option<String> {
    release.lines().find_map(|line| {
        let value = line.trim().strip_prefix("VERSION_ID=")?;
        Some(value.trim_matches(['"', '\'']).to_string())
    })
}
