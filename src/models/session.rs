//! Session Value Types
//!
//! Explicit value types for the ephemeral, server-held state the request
//! flow carries: the per-browser login session and the single-use recovery
//! authorization. These are UX and capability carriers; all lockout truth
//! lives in the user row.

use uuid::Uuid;

/// Per-browser-session login bookkeeping.
///
/// Counts consecutive failures even when the identifier resolves to no
/// account, so the recovery affordance behaves the same either way. Not a
/// security boundary.
#[derive(Debug, Clone, Default)]
pub struct LoginSession {
    /// Consecutive failed attempts in this browser session
    pub consecutive_failures: u32,

    /// Identifier used on the most recent attempt
    pub last_attempted_identifier: Option<String>,

    /// Transient flag: show the "forgot password" link on the next render.
    /// Cleared once read so it does not persist across unrelated visits
    pub show_recovery_link: bool,
}

impl LoginSession {
    /// Records a failed attempt and raises the recovery-link flag once the
    /// threshold is reached.
    pub fn record_failure(&mut self, identifier: &str, link_threshold: u32) {
        self.consecutive_failures += 1;
        self.last_attempted_identifier = Some(identifier.to_string());
        self.show_recovery_link = self.consecutive_failures >= link_threshold;
    }

    /// Reads and clears the transient recovery-link flag.
    pub fn take_show_recovery_link(&mut self) -> bool {
        std::mem::take(&mut self.show_recovery_link)
    }
}

/// Single-use capability permitting a password change without the old
/// password. Created only by a fully successful recovery; consumed by value.
///
/// Deliberately not `Clone`: moving it into the password-set operation is
/// what makes "read once, then deleted" hold at the type level.
#[derive(Debug, PartialEq, Eq)]
pub struct RecoveryAuthorization {
    pub authorized_user_id: Uuid,
}

impl RecoveryAuthorization {
    pub fn new(authorized_user_id: Uuid) -> Self {
        Self { authorized_user_id }
    }
}

/// One server-held session: login bookkeeping plus at most one outstanding
/// recovery authorization.
#[derive(Debug, Default)]
pub struct Session {
    pub login: LoginSession,
    pub recovery: Option<RecoveryAuthorization>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}
