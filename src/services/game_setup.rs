//! The game creation and editing wizard.
//!
//! `ChooseKindOfSport → ChooseGamePrivacy → SetPrivacy → SubmitParams`, with
//! progress tracked per user in the [`SessionStore`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::bot::events::{ChatRef, MessageRef};
use crate::bot::views;
use crate::database::models::{Game, GamePatch, KindOfSport, Player, RecordId};
use crate::database::repository::Storage;
use crate::error::{CommandError, HandlerResult};
use crate::services::notifier::Notifier;
use crate::services::reminder::StartTimeNotifier;
use crate::services::sessions::{ConfigSession, Reservation, SessionStore, SetupStep};
use crate::utils::logging::log_validation_error;
use crate::utils::validation::parse_game_params;

pub struct GameSetup {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    sessions: Arc<SessionStore>,
    reminders: StartTimeNotifier,
}

impl GameSetup {
    pub fn new(
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
        sessions: Arc<SessionStore>,
        reminders: StartTimeNotifier,
    ) -> Self {
        Self { storage, notifier, sessions, reminders }
    }

    fn active_session(&self, player: &Player) -> Result<ConfigSession, CommandError> {
        self.sessions
            .current(player.telegram_id)
            .ok_or(CommandError::SessionNotActive)
    }

    /// The configured game must still exist in storage.
    async fn session_game(&self, session: &ConfigSession) -> HandlerResult<Game> {
        let game_id = session.game_id.ok_or(CommandError::BadGameId)?;
        Ok(self
            .storage
            .games()
            .get(game_id)
            .await?
            .ok_or(CommandError::BadGameId)?)
    }

    /// Starts creating a game, or editing `game_id`, and shows the sport menu.
    pub async fn choose_kind_of_sport(&self, player: &Player, message: &MessageRef, game_id: Option<RecordId>) -> HandlerResult {
        match game_id {
            Some(game_id) => {
                let game = self
                    .storage
                    .games()
                    .get(game_id)
                    .await?
                    .ok_or(CommandError::GameNotExist)?;
                if game.creator_id != player.id {
                    return Err(CommandError::NotCreatorTryEdit.into());
                }
                self.sessions.begin(player.telegram_id, game.id);
                info!("Player {} is editing game {}", player.telegram_id, game.id);
            }
            None => match self.sessions.reserve(player.telegram_id) {
                Reservation::Existing(session) => {
                    debug!("Player {} already configures {:?}", player.telegram_id, session.game_id);
                }
                Reservation::Fresh => {
                    let game = Game::new(player.id);
                    match self.storage.games().add(game).await {
                        Ok(id) if self.sessions.fill(player.telegram_id, id) => {
                            info!("Player {} started game {}", player.telegram_id, id);
                        }
                        Ok(id) => {
                            // The session was closed while the game was being stored
                            if let Err(e) = self.storage.games().delete(id).await {
                                warn!("Could not remove abandoned game {}: {}", id, e);
                            }
                            debug!("Player {} left the setup before game {} was created", player.telegram_id, id);
                            return Ok(());
                        }
                        Err(e) => {
                            self.sessions.end(player.telegram_id);
                            return Err(e.into());
                        }
                    }
                }
            },
        }

        let (text, keyboard) = views::sport_menu();
        self.notifier
            .edit_message(message.chat.id, message.message_id, &text, Some(keyboard))
            .await?;
        Ok(())
    }

    /// Stores the chosen sport and shows the privacy menu.
    pub async fn choose_game_privacy(&self, player: &Player, message: &MessageRef, raw_sport: &str) -> HandlerResult {
        let session = self.active_session(player)?;
        let game = self.session_game(&session).await?;

        let kind: KindOfSport = raw_sport.parse().map_err(CommandError::BadData)?;
        if kind == KindOfSport::Unset {
            return Err(CommandError::bad_data("choose a kind of sport").into());
        }

        let patch = GamePatch { kind_of_sport: Some(kind), ..GamePatch::default() };
        self.storage.games().update(game.id, patch).await?;
        self.sessions.advance(player.telegram_id, SetupStep::AwaitingPrivacy);

        let (text, keyboard) = views::privacy_menu(kind);
        self.notifier
            .edit_message(message.chat.id, message.message_id, &text, Some(keyboard))
            .await?;
        Ok(())
    }

    /// Stores the privacy level and asks for the remaining parameters.
    pub async fn set_privacy(&self, player: &Player, message: &MessageRef, is_public: bool) -> HandlerResult {
        let session = self.active_session(player)?;
        if session.step < SetupStep::AwaitingPrivacy {
            return Err(CommandError::StepOutOfOrder.into());
        }
        let game = self.session_game(&session).await?;

        let patch = GamePatch {
            is_public: Some(is_public),
            // A public game is never bound to a chat
            chat_id: is_public.then_some(None),
            ..GamePatch::default()
        };
        self.storage.games().update(game.id, patch).await?;
        self.sessions.advance(player.telegram_id, SetupStep::AwaitingParams);

        let (text, keyboard) = views::params_prompt();
        self.notifier
            .edit_message(message.chat.id, message.message_id, &text, Some(keyboard))
            .await?;
        Ok(())
    }

    /// Parses `<name>\n<players per team>\n<start time>`, saves the game and
    /// replies with its code. Invalid input keeps the session open.
    pub async fn submit_params(&self, player: &Player, chat: &ChatRef, text: &str) -> HandlerResult {
        let session = self.active_session(player)?;
        if session.step < SetupStep::AwaitingParams {
            return Err(CommandError::StepOutOfOrder.into());
        }
        let game = self.session_game(&session).await?;

        let params = parse_game_params(text).inspect_err(|e| {
            log_validation_error("submit_params", "game params", &e.to_string(), player.telegram_id);
        })?;

        let patch = GamePatch {
            name: Some(params.name),
            players_per_team: Some(params.players_per_team),
            start_time: Some(params.start_time),
            ..GamePatch::default()
        };
        self.storage.games().update(game.id, patch).await?;
        // The next status render arms it again for the new start time
        if self.reminders.cancel(game.id).await? {
            info!("Start reminder of game {} dropped after its params changed", game.id);
        }
        self.sessions.end(player.telegram_id);
        info!("Player {} finished configuring game {}", player.telegram_id, game.id);

        self.send_game_code(chat.id, game.id).await
    }

    /// Sends the instruction and the `/<id>` code that adds a game to a chat.
    pub async fn send_game_code(&self, chat_id: i64, game_id: RecordId) -> HandlerResult {
        self.notifier
            .send_message(chat_id, views::GAME_CODE_INSTRUCTION, None)
            .await?;
        self.notifier.send_message(chat_id, &format!("/{game_id}"), None).await?;
        Ok(())
    }

    /// Closes the session and removes the wizard message.
    pub async fn finish(&self, player: &Player, message: &MessageRef) -> HandlerResult {
        self.sessions.end(player.telegram_id);
        if let Err(e) = self.notifier.delete_message(message.chat.id, message.message_id).await {
            debug!("Could not delete setup message {}: {}", message.message_id, e);
        }
        Ok(())
    }

    /// Closes the session and shows the main menu, in place when `message` is given.
    pub async fn main_menu(&self, player: &Player, chat: &ChatRef, message: Option<&MessageRef>) -> HandlerResult {
        self.sessions.end(player.telegram_id);
        let (text, keyboard) = views::main_menu();
        match message {
            Some(message) => {
                self.notifier
                    .edit_message(message.chat.id, message.message_id, &text, Some(keyboard))
                    .await?
            }
            None => {
                self.notifier.send_message(chat.id, &text, Some(keyboard)).await?;
            }
        }
        Ok(())
    }
}
