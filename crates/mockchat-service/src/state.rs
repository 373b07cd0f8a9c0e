use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::error::ServiceError;

pub const SESSION_ID_KEY: &str = "sessionID";
pub const USERNAME_KEY: &str = "username";

pub type SharedState = Arc<SessionState>;

/// Per-session identity plus the id counter every server and channel in the
/// session draws from.
#[derive(Debug)]
pub struct SessionState {
    session_id: Mutex<String>,
    username: String,
    last_id: AtomicU32,
}

impl SessionState {
    /// An empty `session_id` gets a freshly minted one.
    pub fn new(username: impl Into<String>, session_id: impl Into<String>) -> Self {
        let mut session_id = session_id.into();
        if session_id.is_empty() {
            session_id = Uuid::new_v4().to_string();
        }

        Self {
            session_id: Mutex::new(session_id),
            username: username.into(),
            last_id: AtomicU32::new(0),
        }
    }

    /// Rebuild from the map produced by [`save`](Self::save).
    pub fn restore(store: &HashMap<String, String>) -> Result<Self, ServiceError> {
        let session_id = store
            .get(SESSION_ID_KEY)
            .ok_or(ServiceError::InvalidSession)?;
        let username = store.get(USERNAME_KEY).ok_or(ServiceError::InvalidSession)?;

        Ok(Self::new(username.as_str(), session_id.as_str()))
    }

    pub fn save(&self) -> HashMap<String, String> {
        HashMap::from([
            (SESSION_ID_KEY.to_string(), self.session_id()),
            (USERNAME_KEY.to_string(), self.username.clone()),
        ])
    }

    pub fn session_id(&self) -> String {
        self.session_id
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn clear_session_id(&self) {
        self.session_id
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn next_id(&self) -> u32 {
        self.last_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn reset_id(&self) {
        self.last_id.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_restore() {
        let state = SessionState::new("alice", "s-1");
        let saved = state.save();
        assert_eq!(saved[SESSION_ID_KEY], "s-1");
        assert_eq!(saved[USERNAME_KEY], "alice");

        let back = SessionState::restore(&saved).unwrap();
        assert_eq!(back.session_id(), "s-1");
        assert_eq!(back.username(), "alice");
    }

    #[test]
    fn restore_requires_both_keys() {
        let only_name = HashMap::from([(USERNAME_KEY.to_string(), "alice".to_string())]);
        assert!(matches!(
            SessionState::restore(&only_name),
            Err(ServiceError::InvalidSession)
        ));

        let only_id = HashMap::from([(SESSION_ID_KEY.to_string(), "s-1".to_string())]);
        assert!(matches!(
            SessionState::restore(&only_id),
            Err(ServiceError::InvalidSession)
        ));
    }

    #[test]
    fn empty_session_id_is_minted() {
        let state = SessionState::new("alice", "");
        assert!(Uuid::parse_str(&state.session_id()).is_ok());
    }

    #[test]
    fn ids_count_up_and_reset() {
        let state = SessionState::new("alice", "s");
        assert_eq!(state.next_id(), 1);
        assert_eq!(state.next_id(), 2);
        state.reset_id();
        assert_eq!(state.next_id(), 1);
    }
}
