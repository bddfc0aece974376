//! Putting players into the two teams of a game.
//!
//! Every mutation of one game, together with the status re-render that
//! follows it, runs under that game's async lock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::bot::events::{ChatRef, MessageRef};
use crate::bot::views::{self, TeamRoster};
use crate::database::models::{Game, GamePatch, Player, RecordId, Team, TeamPatch, TeamSide};
use crate::database::repository::Storage;
use crate::error::{CommandError, HandlerResult};
use crate::services::notifier::Notifier;
use crate::services::reminder::StartTimeNotifier;
use crate::utils::feedback::{CommandFeedback, FeedbackType};
use crate::utils::validation::validate_telegram_chat_id;

/// Where a rendered status goes.
#[derive(Debug, Clone, Copy)]
enum StatusTarget {
    NewMessage,
    Edit(i32),
}

/// One async lock per game, kept only while someone holds or awaits it.
#[derive(Default)]
struct GameLocks {
    locks: DashMap<RecordId, Arc<Mutex<()>>>,
}

impl GameLocks {
    async fn acquire(&self, game_id: RecordId) -> GameLockGuard<'_> {
        let lock = self.locks.entry(game_id).or_default().clone();
        let guard = lock.lock_owned().await;
        GameLockGuard { locks: self, game_id, guard: Some(guard) }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

struct GameLockGuard<'a> {
    locks: &'a GameLocks,
    game_id: RecordId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for GameLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own reference left: nobody is waiting
        self.locks
            .locks
            .remove_if(&self.game_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

pub struct TeamAssignment {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    reminders: StartTimeNotifier,
    locks: GameLocks,
}

impl TeamAssignment {
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>, reminders: StartTimeNotifier) -> Self {
        Self { storage, notifier, reminders, locks: GameLocks::default() }
    }

    async fn load_game(&self, game_id: RecordId) -> HandlerResult<Game> {
        Ok(self
            .storage
            .games()
            .get(game_id)
            .await?
            .ok_or(CommandError::GameNotExist)?)
    }

    async fn load_team(&self, team_id: Option<RecordId>) -> HandlerResult<Option<Team>> {
        match team_id {
            Some(id) => Ok(self.storage.teams().get(id).await?),
            None => Ok(None),
        }
    }

    /// Posts the status of `game_id` into a group chat, binding a private
    /// game to that chat on first use.
    pub async fn add_game(&self, chat: &ChatRef, game_id: RecordId) -> HandlerResult {
        validate_telegram_chat_id(chat.id).map_err(|e| CommandError::bad_data(e.to_string()))?;

        let _guard = self.locks.acquire(game_id).await;

        let mut game = self.load_game(game_id).await?;
        if !game.is_public {
            match game.chat_id {
                None => {
                    let patch = GamePatch { chat_id: Some(Some(chat.id)), ..GamePatch::default() };
                    self.storage.games().update(game.id, patch).await?;
                    game.chat_id = Some(chat.id);
                    info!("Bound private game {} to chat {}", game.id, chat.id);
                }
                Some(bound) if bound != chat.id => {
                    return Err(CommandError::PrivateGameAlreadyBoundElsewhere.into());
                }
                Some(_) => {}
            }
        }

        self.render(chat, StatusTarget::NewMessage, &game).await
    }

    /// Moves `player` into the team on `side`, taking them out of the other one.
    pub async fn join(&self, message: &MessageRef, game_id: RecordId, side: TeamSide, player: &Player) -> HandlerResult {
        let _guard = self.locks.acquire(game_id).await;

        let mut game = self.load_game(game_id).await?;
        if !game.is_playable_in(message.chat.id) {
            return Err(CommandError::PrivateGameAlreadyBoundElsewhere.into());
        }
        if !game.accepts_players() {
            return Err(CommandError::GameNotConfigured.into());
        }

        let target = self.load_team(game.team_id(side)).await?;
        if let Some(team) = &target {
            if team.is_full(game.players_per_team) && !team.contains(player.id) {
                debug!("Team {} of game {} is full, ignoring join by {}", team.id, game.id, player.telegram_id);
                return Ok(());
            }
        }
        let other = self.load_team(game.team_id(side.other())).await?;

        let mut created = false;
        let mut target = match target {
            Some(team) => team,
            None => {
                created = true;
                self.create_team(&mut game, side).await?
            }
        };
        let mut other = match other {
            Some(team) => team,
            None => {
                created = true;
                self.create_team(&mut game, side.other()).await?
            }
        };
        if created {
            let patch = GamePatch {
                first_team_id: game.first_team_id,
                second_team_id: game.second_team_id,
                ..GamePatch::default()
            };
            self.storage.games().update(game.id, patch).await?;
        }

        if other.members.remove(&player.id) {
            self.save_members(&other).await?;
        }
        if target.members.insert(player.id) {
            self.save_members(&target).await?;
            info!("Player {} joined team {} of game {}", player.telegram_id, target.id, game.id);
        }

        self.render(&message.chat, StatusTarget::Edit(message.message_id), &game).await
    }

    /// Takes `player` out of whichever team of the game holds them.
    pub async fn decline(&self, message: &MessageRef, game_id: RecordId, player: &Player) -> HandlerResult {
        let _guard = self.locks.acquire(game_id).await;

        let game = self.load_game(game_id).await?;
        if !game.is_playable_in(message.chat.id) {
            return Err(CommandError::PrivateGameAlreadyBoundElsewhere.into());
        }
        for team_id in [game.first_team_id, game.second_team_id] {
            if let Some(mut team) = self.load_team(team_id).await? {
                if team.members.remove(&player.id) {
                    self.save_members(&team).await?;
                    info!("Player {} left team {} of game {}", player.telegram_id, team.id, game.id);
                }
            }
        }

        self.render(&message.chat, StatusTarget::Edit(message.message_id), &game).await
    }

    /// Deletes a game with its teams and pending reminder. Creator only.
    pub async fn delete_game(&self, message: &MessageRef, raw_game_id: &str, player: &Player) -> HandlerResult {
        let game_id: RecordId = raw_game_id.parse().map_err(|_| CommandError::BadGameId)?;

        {
            let _guard = self.locks.acquire(game_id).await;

            let game = self.load_game(game_id).await?;
            if game.creator_id != player.id {
                return Err(CommandError::NotCreatorTryDelete.into());
            }

            for team_id in [game.first_team_id, game.second_team_id].into_iter().flatten() {
                self.storage.teams().delete(team_id).await?;
            }
            self.reminders.cancel(game.id).await?;
            self.storage.games().delete(game.id).await?;
            info!("Game {} deleted by {}", game.id, player.telegram_id);
        }

        CommandFeedback::new(self.notifier.clone(), message.chat.id)
            .replace(message.message_id, FeedbackType::Success, "Game deleted")
            .await?;
        Ok(())
    }

    async fn create_team(&self, game: &mut Game, side: TeamSide) -> HandlerResult<Team> {
        let team = Team::new(String::new());
        self.storage.teams().add(team.clone()).await?;
        game.set_team_id(side, team.id);
        Ok(team)
    }

    async fn save_members(&self, team: &Team) -> HandlerResult {
        let patch = TeamPatch { members: Some(team.members.clone()), ..TeamPatch::default() };
        self.storage.teams().update(team.id, patch).await?;
        Ok(())
    }

    /// Drops members who are no longer in the chat. Returns whether any were dropped.
    async fn purge_departed(&self, chat_id: i64, team: &mut Team) -> HandlerResult<bool> {
        let mut departed = Vec::new();
        for member in &team.members {
            let Some(player) = self.storage.players().get(*member).await? else {
                continue;
            };
            match self.notifier.chat_member_status(chat_id, player.telegram_id).await {
                Ok(status) if !status.is_present() => departed.push(*member),
                Ok(_) => {}
                Err(e) => warn!("Could not check member {} of chat {}: {}", player.telegram_id, chat_id, e),
            }
        }

        for member in &departed {
            team.members.remove(member);
        }
        if departed.is_empty() {
            return Ok(false);
        }
        self.save_members(team).await?;
        info!("Removed {} departed member(s) from team {}", departed.len(), team.id);
        Ok(true)
    }

    async fn roster(&self, game: &Game, side: TeamSide, team: Option<&Team>) -> HandlerResult<TeamRoster> {
        let Some(team) = team else {
            return Ok(TeamRoster::empty(side));
        };
        let mut mentions = Vec::with_capacity(team.members.len());
        for member in &team.members {
            if let Some(player) = self.storage.players().get(*member).await? {
                mentions.push(player.mention());
            }
        }
        Ok(TeamRoster {
            name: team.display_name(side).to_string(),
            mentions,
            is_full: team.is_full(game.players_per_team),
        })
    }

    async fn render(&self, chat: &ChatRef, target: StatusTarget, game: &Game) -> HandlerResult {
        let mut first = self.load_team(game.first_team_id).await?;
        let mut second = self.load_team(game.second_team_id).await?;
        if !chat.is_private {
            for team in [first.as_mut(), second.as_mut()].into_iter().flatten() {
                self.purge_departed(chat.id, team).await?;
            }
        }

        let first_roster = self.roster(game, TeamSide::First, first.as_ref()).await?;
        let second_roster = self.roster(game, TeamSide::Second, second.as_ref()).await?;
        let (text, keyboard) = views::game_status(game, &first_roster, &second_roster);
        match target {
            StatusTarget::NewMessage => {
                self.notifier.send_message(chat.id, &text, Some(keyboard)).await?;
            }
            StatusTarget::Edit(message_id) => {
                self.notifier.edit_message(chat.id, message_id, &text, Some(keyboard)).await?;
            }
        }

        if let Err(e) = self.reminders.maybe_arm(game, first.as_ref(), second.as_ref()).await {
            warn!("Could not arm start reminder for game {}: {}", game.id, e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_idle_game_lock_is_dropped() {
        let locks = GameLocks::default();
        let game_id = RecordId::new();

        let guard = locks.acquire(game_id).await;
        assert_eq!(locks.len(), 1);
        drop(guard);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_awaited_game_lock_is_kept() {
        let locks = Arc::new(GameLocks::default());
        let game_id = RecordId::new();

        let guard = locks.acquire(game_id).await;
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(game_id).await;
            })
        };
        // Let the waiter clone the lock and park on it
        while Arc::strong_count(locks.locks.get(&game_id).unwrap().value()) < 3 {
            tokio::task::yield_now().await;
        }

        drop(guard);
        assert_eq!(locks.len(), 1, "the waiter still needs the lock");

        waiter.await.unwrap();
        assert_eq!(locks.len(), 0);
    }
}
