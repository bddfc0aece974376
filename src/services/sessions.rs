//! Per-user game configuration sessions.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::database::models::RecordId;

/// How far a creator got in the setup wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SetupStep {
    AwaitingSport,
    AwaitingPrivacy,
    AwaitingParams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSession {
    /// `None` while the game for a freshly reserved session is still being created.
    pub game_id: Option<RecordId>,
    pub step: SetupStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// No session existed; a placeholder now holds the slot.
    Fresh,
    Existing(ConfigSession),
}

/// Telegram user id → the game that user is configuring.
///
/// The lock is only held for the map operation itself.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, ConfigSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, ConfigSession>> {
        // A panic while holding the lock cannot leave the map half-written
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Opens a session for `game_id`, replacing any previous one.
    pub fn begin(&self, user_id: i64, game_id: RecordId) {
        self.lock().insert(
            user_id,
            ConfigSession { game_id: Some(game_id), step: SetupStep::AwaitingSport },
        );
    }

    pub fn current(&self, user_id: i64) -> Option<ConfigSession> {
        self.lock().get(&user_id).copied()
    }

    /// Closes the session if there is one.
    pub fn end(&self, user_id: i64) -> Option<ConfigSession> {
        self.lock().remove(&user_id)
    }

    /// Returns the existing session, or claims the slot with a placeholder.
    pub fn reserve(&self, user_id: i64) -> Reservation {
        let mut sessions = self.lock();
        match sessions.get(&user_id) {
            Some(session) => Reservation::Existing(*session),
            None => {
                sessions.insert(user_id, ConfigSession { game_id: None, step: SetupStep::AwaitingSport });
                Reservation::Fresh
            }
        }
    }

    /// Attaches the created game to a reserved placeholder. Returns false,
    /// leaving the store untouched, when the placeholder is gone.
    pub fn fill(&self, user_id: i64, game_id: RecordId) -> bool {
        match self.lock().get_mut(&user_id) {
            Some(session) if session.game_id.is_none() => {
                session.game_id = Some(game_id);
                true
            }
            _ => false,
        }
    }

    /// Records the step reached. Returns false when there is no session.
    pub fn advance(&self, user_id: i64, step: SetupStep) -> bool {
        match self.lock().get_mut(&user_id) {
            Some(session) => {
                session.step = step;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
