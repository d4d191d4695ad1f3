/// Exit status the dialog tool uses when the user acknowledged.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status when the auto-close timer ran out.
pub const EXIT_TIMER: i32 = 4;
/// Exit status when the user quit the dialog.
pub const EXIT_QUIT: i32 = 10;

/// Result of showing one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DialogOutcome {
    Success,
    AlwaysRequiredNoop,
    TimerExpired,
    UserQuit,
    OtherFailure,
}

impl DialogOutcome {
    /// Map a presenter exit status. `None` means the presenter did not exit
    /// normally (spawn failure or killed by a signal).
    pub fn from_exit(status: Option<i32>, always_required: bool) -> Self {
        match status {
            // Only a clean exit is a no-op for always-required messages; a
            // timer, quit or failure still counts against the commit.
            Some(EXIT_SUCCESS) if always_required => Self::AlwaysRequiredNoop,
            Some(EXIT_SUCCESS) => Self::Success,
            Some(EXIT_TIMER) => Self::TimerExpired,
            Some(EXIT_QUIT) => Self::UserQuit,
            _ => Self::OtherFailure,
        }
    }

    /// Outcomes that still allow the run to commit the OS version.
    pub fn is_clean(self) -> bool {
        matches!(self, Self::Success | Self::AlwaysRequiredNoop)
    }

    /// Whether the acknowledgment ledger should record this presentation.
    pub fn acknowledges(self) -> bool {
        self == Self::Success
    }
}
