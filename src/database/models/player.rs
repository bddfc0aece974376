use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use super::RecordId;
use crate::database::repository::Record;

/// UTC offset assumed for players who never picked a time zone (Moscow).
pub const DEFAULT_UTC_OFFSET: i32 = 3;

/// A registered bot user.
///
/// Two players are the same player when their Telegram ids match, whatever
/// their storage ids say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    #[serde(default)]
    pub id: RecordId,
    pub telegram_id: i64,
    pub name: String,
    pub surname: Option<String>,
    pub nickname: Option<String>,
    pub utc_offset: Option<i32>,
    pub language_code: Option<String>,
}

impl Player {
    pub fn new(telegram_id: i64, name: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            telegram_id,
            name: name.into(),
            surname: None,
            nickname: None,
            utc_offset: None,
            language_code: None,
        }
    }

    /// `@nickname` when the player has one, otherwise "name surname".
    pub fn mention(&self) -> String {
        match self.nickname.as_deref().filter(|n| !n.is_empty()) {
            Some(nickname) => format!("@{nickname}"),
            None => format!("{} {}", self.name, self.surname.as_deref().unwrap_or_default())
                .trim()
                .to_string(),
        }
    }

    pub fn utc_offset_hours(&self) -> i32 {
        self.utc_offset.unwrap_or(DEFAULT_UTC_OFFSET)
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.telegram_id == other.telegram_id
    }
}

impl Eq for Player {}

impl Hash for Player {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.telegram_id.hash(state);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerFilter {
    pub telegram_id: Option<i64>,
    pub nickname: Option<String>,
}

impl PlayerFilter {
    pub fn by_telegram_id(telegram_id: i64) -> Self {
        Self { telegram_id: Some(telegram_id), ..Self::default() }
    }
}

/// Partial update: only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub nickname: Option<String>,
    pub utc_offset: Option<i32>,
    pub language_code: Option<String>,
}

impl Record for Player {
    type Filter = PlayerFilter;
    type Patch = PlayerPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn matches(&self, filter: &PlayerFilter) -> bool {
        filter.telegram_id.map_or(true, |id| id == self.telegram_id)
            && filter
                .nickname
                .as_ref()
                .map_or(true, |nick| self.nickname.as_ref() == Some(nick))
    }

    fn apply(&mut self, patch: PlayerPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(surname) = patch.surname {
            self.surname = Some(surname);
        }
        if let Some(nickname) = patch.nickname {
            self.nickname = Some(nickname);
        }
        if let Some(offset) = patch.utc_offset {
            self.utc_offset = Some(offset);
        }
        if let Some(code) = patch.language_code {
            self.language_code = Some(code);
        }
    }
}
