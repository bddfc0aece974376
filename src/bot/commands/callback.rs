//! Callback payloads attached to inline buttons.
//!
//! A payload is `<token>` or `<token> <params>`, where params may be split
//! with `|`, e.g. `/newgame football|false`.

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackCommand {
    SignIn,
    Menu,
    Finish,
    TimeZone,
    SetTimeZone,
    ChooseSport,
    ChooseGamePrivacy,
    NewGame,
    JoinFirst,
    JoinSecond,
    Decline,
    GameCode,
    FixGame,
    DeleteGame,
    MyGames,
    ToFirst,
    Previous,
    Next,
    ToLast,
}

static CALLBACK_TOKENS: [(&str, CallbackCommand); 19] = [
    ("/signin", CallbackCommand::SignIn),
    ("/menu", CallbackCommand::Menu),
    ("/finish", CallbackCommand::Finish),
    ("/timezone", CallbackCommand::TimeZone),
    ("/settimezone", CallbackCommand::SetTimeZone),
    ("/choosesport", CallbackCommand::ChooseSport),
    ("/choosegameprivacy", CallbackCommand::ChooseGamePrivacy),
    ("/newgame", CallbackCommand::NewGame),
    ("joinfirst", CallbackCommand::JoinFirst),
    ("joinsecond", CallbackCommand::JoinSecond),
    ("decline", CallbackCommand::Decline),
    ("/gamecode", CallbackCommand::GameCode),
    ("/fixgame", CallbackCommand::FixGame),
    ("/deletegame", CallbackCommand::DeleteGame),
    ("/mygames", CallbackCommand::MyGames),
    ("/tofirst", CallbackCommand::ToFirst),
    ("/previous", CallbackCommand::Previous),
    ("/next", CallbackCommand::Next),
    ("/tolast", CallbackCommand::ToLast),
];

impl CallbackCommand {
    pub fn token(self) -> &'static str {
        CALLBACK_TOKENS
            .iter()
            .find(|(_, cmd)| *cmd == self)
            .map(|(token, _)| *token)
            .unwrap_or_default()
    }

    pub fn lookup(token: &str) -> Option<Self> {
        CALLBACK_TOKENS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(token))
            .map(|(_, cmd)| *cmd)
    }

    /// Payload for a button that carries `params`.
    pub fn with<P: AsRef<str>>(self, params: &[P]) -> String {
        if params.is_empty() {
            return self.token().to_string();
        }
        let joined: Vec<&str> = params.iter().map(AsRef::as_ref).collect();
        format!("{} {}", self.token(), joined.join("|"))
    }

    /// Payload for a button that carries one parameter.
    pub fn with_param(self, param: impl std::fmt::Display) -> String {
        format!("{} {}", self.token(), param)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackData {
    pub command: CallbackCommand,
    pub params: Vec<String>,
}

impl CallbackData {
    pub fn parse(raw: &str) -> Result<Self, CommandError> {
        let raw = raw.trim();
        let (token, rest) = raw.split_once(' ').unwrap_or((raw, ""));
        let command = CallbackCommand::lookup(token)
            .ok_or_else(|| CommandError::bad_data(format!("unknown action '{token}'")))?;

        let rest = rest.trim();
        let params = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('|').map(|p| p.trim().to_string()).collect()
        };

        Ok(Self { command, params })
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str).filter(|p| !p.is_empty())
    }

    pub fn required(&self, index: usize) -> Result<&str, CommandError> {
        self.param(index)
            .ok_or_else(|| CommandError::bad_data(format!("{} needs a parameter", self.command.token())))
    }
}
