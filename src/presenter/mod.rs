//! Showing messages to the user through an external dialog tool.

mod dialog;
mod outcome;

pub use dialog::DialogPresenter;
pub use outcome::{DialogOutcome, EXIT_QUIT, EXIT_SUCCESS, EXIT_TIMER};

use crate::catalog::{DialogProperties, MessageEntry};
use crate::version::OsVersion;
use std::future::Future;
use std::pin::Pin;

/// Presents one payload and reports how the presenter exited.
///
/// `Ok(None)` means the presenter ran but did not exit with a status code.
/// Implementations never interpret the status; see [`DialogOutcome::from_exit`].
pub trait Presenter: Send + Sync {
    fn present<'a>(
        &'a self,
        payload: &'a DialogProperties,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Option<i32>>> + Send + 'a>>;
}

/// Context printed into each dialog's info box.
#[derive(Debug, Clone)]
pub struct InfoContext<'a> {
    pub last_os: &'a OsVersion,
    pub current_os: &'a OsVersion,
    pub default_timer_secs: u64,
    pub debug: bool,
}

/// Properties sent to the presenter for `entry`: the catalog properties with
/// `timer` defaulted and `infobox` filled in.
pub fn build_payload(entry: &MessageEntry, context: &InfoContext<'_>) -> DialogProperties {
    let mut payload = entry.properties.clone();
    let timer = *payload.timer.get_or_insert(context.default_timer_secs);

    let mut infobox = format!(
        "Last OS: {}\n\nCurrent OS: {}\n\nMessage Version: {}\n\n\
         This message will automatically close after {} minutes and will \
         display at next login if not acknowledged.",
        context.last_os,
        context.current_os,
        entry.version,
        timer / 60
    );
    if context.debug {
        infobox.push_str("\n\n**DEBUG MODE**");
    }
    payload.infobox = Some(infobox);
    payload
}
