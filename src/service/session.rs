//! Session Store
//!
//! Server-held sessions keyed by opaque random ids. Each session carries the
//! per-browser login bookkeeping and at most one outstanding recovery
//! authorization. Sessions are private to one browser and need no
//! cross-session synchronization; a plain `RwLock` map suffices.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::{RecoveryAuthorization, Session};
use crate::utils::security::generate_session_token;

/// Snapshot handed back after recording a login failure.
#[derive(Debug, Clone, Copy)]
pub struct SessionFailure {
    pub consecutive_failures: u32,
    /// Transient: true exactly once per raise, cleared by this read
    pub show_recovery_link: bool,
}

/// In-memory session store.
pub struct SessionStore {
    recovery_link_threshold: u32,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(recovery_link_threshold: u32) -> Self {
        Self {
            recovery_link_threshold,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a live session id: the presented one if it is still known,
    /// otherwise a freshly created session.
    pub fn open(&self, existing: Option<&str>) -> String {
        let mut sessions = self.sessions.write().unwrap();
        if let Some(id) = existing {
            if sessions.contains_key(id) {
                return id.to_string();
            }
        }
        let id = generate_session_token();
        sessions.insert(id.clone(), Session::new());
        id
    }

    /// Drops a session entirely (successful login).
    pub fn destroy(&self, session_id: &str) {
        self.sessions.write().unwrap().remove(session_id);
    }

    /// Records a failed login attempt against the session and reads the
    /// transient recovery-link flag in the same step.
    pub fn record_login_failure(&self, session_id: &str, identifier: &str) -> SessionFailure {
        let mut sessions = self.sessions.write().unwrap();
        let session = sessions.entry(session_id.to_string()).or_default();
        session
            .login
            .record_failure(identifier, self.recovery_link_threshold);
        SessionFailure {
            consecutive_failures: session.login.consecutive_failures,
            show_recovery_link: session.login.take_show_recovery_link(),
        }
    }

    /// Whether this session has accumulated enough failures for the recovery
    /// affordance, without mutating anything.
    pub fn recovery_link_visible(&self, session_id: &str) -> bool {
        let sessions = self.sessions.read().unwrap();
        sessions
            .get(session_id)
            .map(|s| s.login.consecutive_failures >= self.recovery_link_threshold)
            .unwrap_or(false)
    }

    /// Stores a recovery authorization, replacing any prior one; at most a
    /// single authorization is outstanding per session.
    pub fn grant_recovery(&self, session_id: &str, authorization: RecoveryAuthorization) {
        let mut sessions = self.sessions.write().unwrap();
        let session = sessions.entry(session_id.to_string()).or_default();
        session.recovery = Some(authorization);
    }

    /// Removes and returns the session's recovery authorization. Read once:
    /// a second call returns `None` until a new recovery succeeds.
    pub fn take_recovery(&self, session_id: &str) -> Option<RecoveryAuthorization> {
        let mut sessions = self.sessions.write().unwrap();
        sessions.get_mut(session_id)?.recovery.take()
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_open_creates_and_reuses_sessions() {
        let store = SessionStore::new(2);

        let id = store.open(None);
        assert_eq!(store.session_count(), 1);

        // Known id is reused.
        assert_eq!(store.open(Some(&id)), id);
        assert_eq!(store.session_count(), 1);

        // Unknown id gets a fresh session.
        let other = store.open(Some("stale-token"));
        assert_ne!(other, "stale-token");
        assert_eq!(store.session_count(), 2);
    }

    #[test]
    fn test_recovery_link_appears_at_threshold() {
        let store = SessionStore::new(2);
        let id = store.open(None);

        let first = store.record_login_failure(&id, "juan");
        assert_eq!(first.consecutive_failures, 1);
        assert!(!first.show_recovery_link);

        let second = store.record_login_failure(&id, "juan");
        assert_eq!(second.consecutive_failures, 2);
        assert!(second.show_recovery_link);

        // Still visible as a derived state, even though the flag was taken.
        assert!(store.recovery_link_visible(&id));
    }

    #[test]
    fn test_destroy_forgets_failures() {
        let store = SessionStore::new(2);
        let id = store.open(None);
        store.record_login_failure(&id, "juan");
        store.record_login_failure(&id, "juan");

        store.destroy(&id);
        assert!(!store.recovery_link_visible(&id));
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_recovery_authorization_is_single_use() {
        let store = SessionStore::new(2);
        let id = store.open(None);
        let user_id = Uuid::new_v4();

        store.grant_recovery(&id, RecoveryAuthorization::new(user_id));

        let taken = store.take_recovery(&id).unwrap();
        assert_eq!(taken.authorized_user_id, user_id);

        // Consumed: a second take finds nothing.
        assert!(store.take_recovery(&id).is_none());
    }

    #[test]
    fn test_new_grant_replaces_prior_authorization() {
        let store = SessionStore::new(2);
        let id = store.open(None);
        let first_user = Uuid::new_v4();
        let second_user = Uuid::new_v4();

        store.grant_recovery(&id, RecoveryAuthorization::new(first_user));
        store.grant_recovery(&id, RecoveryAuthorization::new(second_user));

        let taken = store.take_recovery(&id).unwrap();
        assert_eq!(taken.authorized_user_id, second_user);
        assert!(store.take_recovery(&id).is_none());
    }
}
