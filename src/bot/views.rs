//! Message texts and inline keyboards.

use crate::bot::commands::{CallbackCommand, Command};
use crate::database::models::{Game, KindOfSport, TeamSide};
use crate::services::notifier::{Button, Keyboard};
use crate::utils::datetime::format_start_time;

/// UTC offsets offered in the time zone menu.
pub const TIME_ZONES: [(i32, &str); 3] = [
    (2, "+2 Kaliningrad"),
    (3, "+3 Moscow"),
    (5, "+5 Yekaterinburg, Ufa"),
];

pub const GAME_CODE_INSTRUCTION: &str =
    "This is the command that adds the game to a chat. Copy the message below and send it to the target chat.";

pub fn time_zone_label(offset: i32) -> String {
    TIME_ZONES
        .iter()
        .find(|(known, _)| *known == offset)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| format!("{offset:+}"))
}

pub fn main_menu() -> (String, Keyboard) {
    let keyboard = Keyboard::new()
        .row(vec![
            Button::new("Create game", CallbackCommand::ChooseSport.token()),
            Button::new("My games", CallbackCommand::MyGames.token()),
        ])
        .single(Button::new("Time zone", CallbackCommand::TimeZone.token()));
    ("Choose an action:".to_string(), keyboard)
}

pub fn sign_in_prompt() -> (String, Keyboard) {
    (
        "You need to register before using the bot.".to_string(),
        Keyboard::new().single(Button::new("Sign in", CallbackCommand::SignIn.token())),
    )
}

pub fn register_in_private_hint() -> String {
    format!(
        "Register before using the bot: send {} to the bot in a private chat.",
        Command::Start.token()
    )
}

pub fn faq() -> String {
    format!(
        "How it works:\n\
         1. Open {menu} in a private chat with the bot and press \"Create game\".\n\
         2. Pick the sport and whether the game is private or public.\n\
         3. Send the name, players per team and start time on three lines:\n\
         Sunday match\n5\n20:00 06.10.2017\n\
         4. Forward the game code you get back to your group chat.\n\
         5. Players press the team buttons to join. A private game stays in the first chat it was added to.\n\
         An hour before a private game with full teams starts, everybody gets a reminder.\n\n{commands}",
        menu = Command::Menu.token(),
        commands = <Command as teloxide::utils::command::BotCommands>::descriptions(),
    )
}

pub fn sport_menu() -> (String, Keyboard) {
    let sports = KindOfSport::CHOICES
        .iter()
        .map(|kind| {
            Button::new(kind.description(), CallbackCommand::ChooseGamePrivacy.with_param(kind.key()))
        })
        .collect();
    let keyboard = Keyboard::new()
        .row(sports)
        .single(Button::new("Cancel", CallbackCommand::Menu.token()));
    ("Choose the kind of sport:".to_string(), keyboard)
}

pub fn privacy_menu(kind: KindOfSport) -> (String, Keyboard) {
    let keyboard = Keyboard::new()
        .row(vec![
            Button::new("Private", CallbackCommand::NewGame.with(&[kind.key(), "false"])),
            Button::new("Public", CallbackCommand::NewGame.with(&[kind.key(), "true"])),
        ])
        .single(Button::new("Cancel", CallbackCommand::Menu.token()));
    ("Choose who can join the game:".to_string(), keyboard)
}

pub fn params_prompt() -> (String, Keyboard) {
    (
        "The game is created. Send its name, the number of players per team and the start time \
         like in this example:\nSunday match\n5\n20:00 06.10.2017"
            .to_string(),
        Keyboard::new().single(Button::new("Finish", CallbackCommand::Finish.token())),
    )
}

pub fn privacy_label(is_public: bool) -> &'static str {
    if is_public {
        "Public"
    } else {
        "Private"
    }
}

fn game_info(game: &Game) -> String {
    let start = game
        .start_time
        .as_ref()
        .map(format_start_time)
        .unwrap_or_else(|| "not set".to_string());
    format!(
        "Name: {}\nSport: {}\nVisibility: {}\nPlayers per team: {}\nStart time: {}",
        game.name,
        game.kind_of_sport,
        privacy_label(game.is_public),
        game.players_per_team,
        start
    )
}

/// What the status message shows about one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRoster {
    pub name: String,
    pub mentions: Vec<String>,
    pub is_full: bool,
}

impl TeamRoster {
    /// A side whose team does not exist yet.
    pub fn empty(side: TeamSide) -> Self {
        Self { name: side.default_name().to_string(), mentions: Vec::new(), is_full: false }
    }
}

pub fn game_status(game: &Game, first: &TeamRoster, second: &TeamRoster) -> (String, Keyboard) {
    let mut text = game_info(game);
    for roster in [first, second] {
        text.push_str(&format!("\nTeam {}:\n{}", roster.name, roster.mentions.join(", ")));
    }

    let mut joins = Vec::new();
    if game.accepts_players() {
        if !first.is_full {
            joins.push(Button::new(format!("For {}", first.name), CallbackCommand::JoinFirst.with_param(game.id)));
        }
        if !second.is_full {
            joins.push(Button::new(format!("For {}", second.name), CallbackCommand::JoinSecond.with_param(game.id)));
        }
    }
    let keyboard = Keyboard::new()
        .row(joins)
        .single(Button::new("Decline", CallbackCommand::Decline.with_param(game.id)));

    (text, keyboard)
}

/// One game of the creator's list, with navigation to its neighbours.
pub fn game_card(game: &Game, number: u32, total: u32) -> (String, Keyboard) {
    let text = format!("{}.\n{}", number, game_info(game));

    let mut navigation = Vec::new();
    if number > 1 {
        navigation.push(Button::new("<<", CallbackCommand::ToFirst.token()));
        navigation.push(Button::new("<", CallbackCommand::Previous.with_param(number - 1)));
    }
    if number < total {
        navigation.push(Button::new(">", CallbackCommand::Next.with_param(number + 1)));
        navigation.push(Button::new(">>", CallbackCommand::ToLast.token()));
    }

    let keyboard = Keyboard::new()
        .single(Button::new("Get code", CallbackCommand::GameCode.with_param(game.id)))
        .single(Button::new("Edit", CallbackCommand::FixGame.with_param(game.id)))
        .single(Button::new("Delete", CallbackCommand::DeleteGame.with_param(game.id)))
        .row(navigation)
        .single(Button::new("Menu", CallbackCommand::Menu.token()));

    (text, keyboard)
}

pub fn no_games() -> (String, Keyboard) {
    (
        "You have no games yet.".to_string(),
        Keyboard::new().single(Button::new("Menu", CallbackCommand::Menu.token())),
    )
}

pub fn time_zone_menu(current: i32) -> (String, Keyboard) {
    let mut keyboard = Keyboard::new();
    for (offset, label) in TIME_ZONES {
        keyboard = keyboard.single(Button::new(label, CallbackCommand::SetTimeZone.with_param(offset)));
    }
    keyboard = keyboard.single(Button::new("Back", CallbackCommand::Menu.token()));
    (
        format!("Your time zone: {}\nChoose the time zone start times are given in:", time_zone_label(current)),
        keyboard,
    )
}

pub fn reminder(game: &Game, mentions: &[String]) -> String {
    let start = game
        .start_time
        .as_ref()
        .map(format_start_time)
        .unwrap_or_default();
    format!(
        "⏰ {} starts in an hour ({}).\n{}",
        game.name,
        start,
        mentions.join(", ")
    )
}
