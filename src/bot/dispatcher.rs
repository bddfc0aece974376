//! Routes inbound events to the services and reports failures to the chat.

use std::sync::Arc;

use crate::bot::commands::{CallbackCommand, CallbackData, Command};
use crate::bot::events::{ChatRef, Inbound, MessageRef, Sender};
use crate::bot::views;
use crate::database::models::{GameFilter, PageRequest, Player, PlayerPatch, RecordId, TeamSide};
use crate::database::repository::{find_player, Storage};
use crate::error::{CommandError, HandlerError, HandlerResult};
use crate::services::game_setup::GameSetup;
use crate::services::notifier::Notifier;
use crate::services::reminder::StartTimeNotifier;
use crate::services::scheduler::TaskScheduler;
use crate::services::sessions::SessionStore;
use crate::services::teams::TeamAssignment;
use crate::utils::feedback::CommandFeedback;
use crate::utils::logging::{log_command_error, log_command_rejected, log_command_start, log_command_success};

const GENERIC_FAILURE: &str = "Command execution failed. Please try again later.";

pub struct CommandRouter {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    sessions: Arc<SessionStore>,
    reminders: StartTimeNotifier,
    setup: GameSetup,
    teams: TeamAssignment,
}

impl CommandRouter {
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>, tasks: Arc<dyn TaskScheduler>) -> Self {
        let sessions = Arc::new(SessionStore::new());
        let reminders = StartTimeNotifier::new(storage.clone(), notifier.clone(), tasks);
        Self {
            setup: GameSetup::new(storage.clone(), notifier.clone(), sessions.clone(), reminders.clone()),
            teams: TeamAssignment::new(storage.clone(), notifier.clone(), reminders.clone()),
            storage,
            notifier,
            sessions,
            reminders,
        }
    }

    pub fn sessions(&self) -> Arc<SessionStore> {
        self.sessions.clone()
    }

    pub fn reminders(&self) -> &StartTimeNotifier {
        &self.reminders
    }

    /// Handles one event. Failures are logged and reported in the chat, never returned.
    pub async fn handle(&self, event: Inbound) {
        let sender = event.sender().clone();
        let chat = event.chat();
        let command = describe(&event);
        log_command_start(&command, sender.label(), sender.telegram_id, chat.id, None);

        let error = match self.route(event).await {
            Ok(()) => {
                log_command_success(&command, sender.label(), sender.telegram_id, chat.id);
                return;
            }
            Err(error) => error,
        };

        let reply = match &error {
            HandlerError::Command(e) => {
                log_command_rejected(&command, sender.label(), sender.telegram_id, chat.id, &e.to_string());
                e.to_string()
            }
            HandlerError::Internal(e) => {
                log_command_error(&command, sender.label(), sender.telegram_id, chat.id, &format!("{e:#}"));
                GENERIC_FAILURE.to_string()
            }
        };
        if let Err(e) = CommandFeedback::new(self.notifier.clone(), chat.id).error(&reply).await {
            tracing::error!("Failed to report error to chat {}: {}", chat.id, e);
        }
    }

    async fn route(&self, event: Inbound) -> HandlerResult {
        match event {
            Inbound::Text { sender, chat, text } => self.on_text(&sender, &chat, &text).await,
            Inbound::Callback { sender, message, data } => self.on_callback(&sender, &message, &data).await,
        }
    }

    async fn registered(&self, sender: &Sender) -> HandlerResult<Player> {
        Ok(find_player(self.storage.as_ref(), sender.telegram_id)
            .await?
            .ok_or(CommandError::NotRegistered)?)
    }

    async fn on_text(&self, sender: &Sender, chat: &ChatRef, text: &str) -> HandlerResult {
        match Command::parse_text(text) {
            Some(Command::Start) => return self.start(sender, chat).await,
            Some(command) => {
                let player = self.registered(sender).await?;
                return match command {
                    Command::Menu => self.setup.main_menu(&player, chat, None).await,
                    _ => {
                        self.notifier.send_message(chat.id, &views::faq(), None).await?;
                        Ok(())
                    }
                };
            }
            None => {}
        }

        if chat.is_private {
            let player = self.registered(sender).await?;
            return self.setup.submit_params(&player, chat, text).await;
        }

        // In groups only game codes are ours; other chatter is ignored
        let Some(game_id) = parse_game_code(text) else {
            return Ok(());
        };
        self.registered(sender).await?;
        self.teams.add_game(chat, game_id).await
    }

    async fn start(&self, sender: &Sender, chat: &ChatRef) -> HandlerResult {
        if !chat.is_private {
            CommandFeedback::new(self.notifier.clone(), chat.id)
                .info(&views::register_in_private_hint())
                .await?;
            return Ok(());
        }

        match find_player(self.storage.as_ref(), sender.telegram_id).await? {
            Some(player) => {
                let (menu, keyboard) = views::main_menu();
                let text = format!("{}, you are already registered.\n{}", player.name, menu);
                self.notifier.send_message(chat.id, &text, Some(keyboard)).await?;
            }
            None => {
                let (text, keyboard) = views::sign_in_prompt();
                self.notifier.send_message(chat.id, &text, Some(keyboard)).await?;
            }
        }
        Ok(())
    }

    async fn sign_in(&self, sender: &Sender, message: &MessageRef) -> HandlerResult {
        if !message.chat.is_private {
            return Err(CommandError::NotRegistered.into());
        }

        let player = match find_player(self.storage.as_ref(), sender.telegram_id).await? {
            Some(player) => player,
            None => {
                let player = Player {
                    surname: sender.last_name.clone(),
                    nickname: sender.username.clone(),
                    language_code: sender.language_code.clone(),
                    ..Player::new(sender.telegram_id, sender.first_name.clone())
                };
                self.storage.players().add(player.clone()).await?;
                tracing::info!("Registered player {} ({})", player.telegram_id, player.mention());
                player
            }
        };

        let (menu, keyboard) = views::main_menu();
        let text = format!("{}, you are registered.\n{}", player.name, menu);
        self.notifier
            .edit_message(message.chat.id, message.message_id, &text, Some(keyboard))
            .await?;
        Ok(())
    }

    async fn on_callback(&self, sender: &Sender, message: &MessageRef, raw: &str) -> HandlerResult {
        let data = CallbackData::parse(raw)?;
        if data.command == CallbackCommand::SignIn {
            return self.sign_in(sender, message).await;
        }
        let player = self.registered(sender).await?;

        match data.command {
            CallbackCommand::SignIn => Ok(()),
            CallbackCommand::Menu => self.setup.main_menu(&player, &message.chat, Some(message)).await,
            CallbackCommand::Finish => self.setup.finish(&player, message).await,
            CallbackCommand::TimeZone => self.time_zone_menu(&player, message).await,
            CallbackCommand::SetTimeZone => self.set_time_zone(&player, message, data.required(0)?).await,
            CallbackCommand::ChooseSport => {
                let game_id = data.param(0).map(parse_game_id).transpose()?;
                self.setup.choose_kind_of_sport(&player, message, game_id).await
            }
            CallbackCommand::FixGame => {
                let game_id = parse_game_id(data.required(0)?)?;
                self.setup.choose_kind_of_sport(&player, message, Some(game_id)).await
            }
            CallbackCommand::ChooseGamePrivacy => {
                self.setup.choose_game_privacy(&player, message, data.required(0)?).await
            }
            CallbackCommand::NewGame => {
                let raw = data.params.last().map(String::as_str).unwrap_or_default();
                self.setup.set_privacy(&player, message, parse_bool(raw)?).await
            }
            CallbackCommand::JoinFirst => {
                let game_id = parse_game_id(data.required(0)?)?;
                self.teams.join(message, game_id, TeamSide::First, &player).await
            }
            CallbackCommand::JoinSecond => {
                let game_id = parse_game_id(data.required(0)?)?;
                self.teams.join(message, game_id, TeamSide::Second, &player).await
            }
            CallbackCommand::Decline => {
                let game_id = parse_game_id(data.required(0)?)?;
                self.teams.decline(message, game_id, &player).await
            }
            CallbackCommand::GameCode => {
                let game_id = parse_game_id(data.required(0)?)?;
                if self.storage.games().get(game_id).await?.is_none() {
                    return Err(CommandError::GameNotExist.into());
                }
                self.setup.send_game_code(message.chat.id, game_id).await
            }
            CallbackCommand::DeleteGame => self.teams.delete_game(message, data.required(0)?, &player).await,
            CallbackCommand::MyGames | CallbackCommand::ToFirst => self.my_games(&player, message, Some(1)).await,
            CallbackCommand::Previous | CallbackCommand::Next => {
                let number = data
                    .required(0)?
                    .parse::<u32>()
                    .map_err(|_| CommandError::bad_data("invalid page number"))?;
                self.my_games(&player, message, Some(number)).await
            }
            CallbackCommand::ToLast => self.my_games(&player, message, None).await,
        }
    }

    /// Shows game number `number` (1-based) of the player's games, or the last one.
    async fn my_games(&self, player: &Player, message: &MessageRef, number: Option<u32>) -> HandlerResult {
        let filter = GameFilter::by_creator(player.id);
        let mut page = self
            .storage
            .games()
            .find(&filter, PageRequest::new(number.unwrap_or(1).max(1), 1))
            .await?;

        // Out of range (last page requested, or games were deleted meanwhile)
        if (number.is_none() || page.is_empty()) && page.pages_count > 0 && page.page != page.pages_count {
            page = self
                .storage
                .games()
                .find(&filter, PageRequest::new(page.pages_count, 1))
                .await?;
        }

        let (text, keyboard) = match page.first() {
            Some(game) => views::game_card(game, page.page, page.pages_count),
            None => views::no_games(),
        };
        self.notifier
            .edit_message(message.chat.id, message.message_id, &text, Some(keyboard))
            .await?;
        Ok(())
    }

    async fn time_zone_menu(&self, player: &Player, message: &MessageRef) -> HandlerResult {
        let (text, keyboard) = views::time_zone_menu(player.utc_offset_hours());
        self.notifier
            .edit_message(message.chat.id, message.message_id, &text, Some(keyboard))
            .await?;
        Ok(())
    }

    async fn set_time_zone(&self, player: &Player, message: &MessageRef, raw: &str) -> HandlerResult {
        let offset = raw
            .parse::<i32>()
            .ok()
            .filter(|offset| views::TIME_ZONES.iter().any(|(known, _)| known == offset))
            .ok_or_else(|| CommandError::bad_data(format!("unsupported time zone '{raw}'")))?;

        let patch = PlayerPatch { utc_offset: Some(offset), ..PlayerPatch::default() };
        self.storage.players().update(player.id, patch).await?;

        let (menu, keyboard) = views::main_menu();
        let text = format!("Time zone set to {}.\n{}", views::time_zone_label(offset), menu);
        self.notifier
            .edit_message(message.chat.id, message.message_id, &text, Some(keyboard))
            .await?;
        Ok(())
    }
}

fn describe(event: &Inbound) -> String {
    match event {
        Inbound::Text { text, .. } => match Command::parse_text(text) {
            Some(command) => command.token().to_string(),
            None => "text".to_string(),
        },
        Inbound::Callback { data, .. } => data.split_whitespace().next().unwrap_or("callback").to_string(),
    }
}

fn parse_game_id(raw: &str) -> Result<RecordId, CommandError> {
    raw.parse().map_err(|_| CommandError::BadGameId)
}

/// `/<game id>` as sent by a user pasting a game code.
fn parse_game_code(text: &str) -> Option<RecordId> {
    let code = text.trim().strip_prefix('/')?;
    // Codes may carry the bot's @username in groups
    let code = code.split('@').next().unwrap_or(code);
    code.parse().ok()
}

fn parse_bool(raw: &str) -> Result<bool, CommandError> {
    raw.trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| CommandError::bad_data(format!("expected true or false, got '{raw}'")))
}
