//! Start-time reminders for private games.
//!
//! A reminder is armed once both teams of a private game are full and the
//! game starts more than an hour from now. It fires once, an hour before
//! the start, and mentions every member in the game's chat.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};

use crate::bot::views;
use crate::database::models::{Game, RecordId, Team, DEFAULT_UTC_OFFSET};
use crate::database::repository::Storage;
use crate::services::notifier::Notifier;
use crate::services::scheduler::{TaskHandle, TaskScheduler};
use crate::utils::datetime::start_instant;
use crate::utils::logging::log_reminder_event;

/// How long before the start the reminder goes out.
pub const REMINDER_LEAD_MINUTES: i64 = 60;

fn reminder_lead() -> Duration {
    Duration::minutes(REMINDER_LEAD_MINUTES)
}

#[derive(Clone)]
pub struct StartTimeNotifier {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    tasks: Arc<dyn TaskScheduler>,
    /// A slot is claimed with `None` before its task is scheduled.
    timers: Arc<Mutex<HashMap<RecordId, Option<TaskHandle>>>>,
}

impl StartTimeNotifier {
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>, tasks: Arc<dyn TaskScheduler>) -> Self {
        Self { storage, notifier, tasks, timers: Arc::new(Mutex::new(HashMap::new())) }
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<RecordId, Option<TaskHandle>>> {
        self.timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_armed(&self, game_id: RecordId) -> bool {
        self.timers().contains_key(&game_id)
    }

    pub fn armed_count(&self) -> usize {
        self.timers().len()
    }

    /// Arms the reminder for `game` if it qualifies. Returns whether a new
    /// reminder is left pending.
    pub async fn maybe_arm(&self, game: &Game, first: Option<&Team>, second: Option<&Team>) -> Result<bool> {
        if game.is_public || game.chat_id.is_none() || !game.accepts_players() || self.is_armed(game.id) {
            return Ok(false);
        }
        let (Some(first), Some(second)) = (first, second) else {
            return Ok(false);
        };
        if !first.is_full(game.players_per_team) || !second.is_full(game.players_per_team) {
            return Ok(false);
        }
        let Some(start) = game.start_time else {
            return Ok(false);
        };

        let offset = self
            .storage
            .players()
            .get(game.creator_id)
            .await?
            .map(|creator| creator.utc_offset_hours())
            .unwrap_or(DEFAULT_UTC_OFFSET);
        let until_start = start_instant(start, offset) - Utc::now();
        if until_start <= reminder_lead() {
            return Ok(false);
        }
        let delay = (until_start - reminder_lead())
            .to_std()
            .map_err(|e| anyhow!("reminder delay out of range: {e}"))?;

        let game_id = game.id;
        match self.timers().entry(game_id) {
            Entry::Occupied(_) => return Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(None);
            }
        }

        let this = self.clone();
        let handle = match self
            .tasks
            .schedule(delay, Box::pin(async move { this.fire(game_id).await }))
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                self.timers().remove(&game_id);
                return Err(e);
            }
        };
        let claimed = match self.timers().get_mut(&game_id) {
            Some(slot) => {
                *slot = Some(handle);
                true
            }
            None => false,
        };
        if !claimed {
            // Already fired or cancelled while being scheduled
            self.tasks.cancel(handle).await?;
            return Ok(false);
        }

        log_reminder_event("armed", &game_id.to_string(), Some(&format!("fires in {}s", delay.as_secs())));
        Ok(true)
    }

    /// Sends the reminder for `game_id` and forgets its timer, whether or not
    /// the message went out.
    pub async fn fire(&self, game_id: RecordId) {
        match self.deliver(game_id).await {
            Ok(true) => log_reminder_event("sent", &game_id.to_string(), None),
            Ok(false) => log_reminder_event("discarded", &game_id.to_string(), Some("nobody to remind")),
            Err(e) => tracing::error!("Failed to send start reminder for game {}: {}", game_id, e),
        }
        self.timers().remove(&game_id);
    }

    async fn deliver(&self, game_id: RecordId) -> Result<bool> {
        let Some(game) = self.storage.games().get(game_id).await? else {
            return Ok(false);
        };
        let Some(chat_id) = game.chat_id else {
            return Ok(false);
        };

        let mut mentions = Vec::new();
        for team_id in [game.first_team_id, game.second_team_id].into_iter().flatten() {
            let Some(team) = self.storage.teams().get(team_id).await? else {
                continue;
            };
            for member in &team.members {
                if let Some(player) = self.storage.players().get(*member).await? {
                    mentions.push(player.mention());
                }
            }
        }
        if mentions.is_empty() {
            return Ok(false);
        }

        self.notifier
            .send_message(chat_id, &views::reminder(&game, &mentions), None)
            .await?;
        Ok(true)
    }

    /// Drops the pending reminder of a game. Returns whether one existed.
    pub async fn cancel(&self, game_id: RecordId) -> Result<bool> {
        let Some(slot) = self.timers().remove(&game_id) else {
            return Ok(false);
        };
        if let Some(handle) = slot {
            self.tasks.cancel(handle).await?;
        }
        log_reminder_event("cancelled", &game_id.to_string(), None);
        Ok(true)
    }
}
