use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::RecordId;
use crate::database::repository::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindOfSport {
    /// Not chosen yet; only valid while the game is being configured.
    #[default]
    Unset,
    Football,
    Futsal,
}

impl KindOfSport {
    /// Sports a creator can pick, in menu order.
    pub const CHOICES: [KindOfSport; 2] = [KindOfSport::Football, KindOfSport::Futsal];

    pub fn key(self) -> &'static str {
        match self {
            KindOfSport::Unset => "unset",
            KindOfSport::Football => "football",
            KindOfSport::Futsal => "futsal",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            KindOfSport::Unset => "Not set",
            KindOfSport::Football => "Football",
            KindOfSport::Futsal => "Futsal",
        }
    }
}

impl fmt::Display for KindOfSport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl FromStr for KindOfSport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [KindOfSport::Unset, KindOfSport::Football, KindOfSport::Futsal]
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(s) || kind.description().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown kind of sport '{s}'"))
    }
}

/// One of the two sides of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamSide {
    First,
    Second,
}

impl TeamSide {
    pub fn other(self) -> Self {
        match self {
            TeamSide::First => TeamSide::Second,
            TeamSide::Second => TeamSide::First,
        }
    }

    /// Name shown when the team was never given one.
    pub fn default_name(self) -> &'static str {
        match self {
            TeamSide::First => "А",
            TeamSide::Second => "Б",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    #[serde(default)]
    pub id: RecordId,
    /// Storage id of the creating [`super::Player`].
    pub creator_id: RecordId,
    pub kind_of_sport: KindOfSport,
    pub name: String,
    pub is_public: bool,
    /// Chat a private game is bound to. Always `None` for public games.
    pub chat_id: Option<i64>,
    /// Naive start time, in the creator's time zone.
    pub start_time: Option<NaiveDateTime>,
    pub players_per_team: u32,
    pub first_team_id: Option<RecordId>,
    pub second_team_id: Option<RecordId>,
}

impl Game {
    pub fn new(creator_id: RecordId) -> Self {
        Self {
            id: RecordId::new(),
            creator_id,
            kind_of_sport: KindOfSport::Unset,
            name: String::new(),
            is_public: false,
            chat_id: None,
            start_time: None,
            players_per_team: 0,
            first_team_id: None,
            second_team_id: None,
        }
    }

    /// Joins are only accepted once a team size has been set.
    pub fn accepts_players(&self) -> bool {
        self.players_per_team >= 1
    }

    pub fn team_id(&self, side: TeamSide) -> Option<RecordId> {
        match side {
            TeamSide::First => self.first_team_id,
            TeamSide::Second => self.second_team_id,
        }
    }

    pub fn set_team_id(&mut self, side: TeamSide, team_id: RecordId) {
        match side {
            TeamSide::First => self.first_team_id = Some(team_id),
            TeamSide::Second => self.second_team_id = Some(team_id),
        }
    }

    /// Whether a player in `chat_id` may interact with this game.
    pub fn is_playable_in(&self, chat_id: i64) -> bool {
        self.is_public || self.chat_id == Some(chat_id)
    }

    /// The shareable code users paste into a chat to add the game there.
    pub fn code(&self) -> String {
        format!("/{}", self.id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameFilter {
    pub creator_id: Option<RecordId>,
    pub kind_of_sport: Option<KindOfSport>,
    pub is_public: Option<bool>,
    pub chat_id: Option<i64>,
    pub players_per_team: Option<u32>,
}

impl GameFilter {
    pub fn by_creator(creator_id: RecordId) -> Self {
        Self { creator_id: Some(creator_id), ..Self::default() }
    }
}

/// Partial update: only the fields that are `Some` are written.
///
/// `chat_id: Some(None)` unbinds the game from its chat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamePatch {
    pub kind_of_sport: Option<KindOfSport>,
    pub name: Option<String>,
    pub is_public: Option<bool>,
    pub chat_id: Option<Option<i64>>,
    pub start_time: Option<NaiveDateTime>,
    pub players_per_team: Option<u32>,
    pub first_team_id: Option<RecordId>,
    pub second_team_id: Option<RecordId>,
}

impl GamePatch {
    pub fn is_empty(&self) -> bool {
        self.kind_of_sport.is_none()
            && self.name.is_none()
            && self.is_public.is_none()
            && self.chat_id.is_none()
            && self.start_time.is_none()
            && self.players_per_team.is_none()
            && self.first_team_id.is_none()
            && self.second_team_id.is_none()
    }
}

impl Record for Game {
    type Filter = GameFilter;
    type Patch = GamePatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn matches(&self, filter: &GameFilter) -> bool {
        filter.creator_id.map_or(true, |id| id == self.creator_id)
            && filter.kind_of_sport.map_or(true, |kind| kind == self.kind_of_sport)
            && filter.is_public.map_or(true, |public| public == self.is_public)
            && filter.chat_id.map_or(true, |chat| Some(chat) == self.chat_id)
            && filter.players_per_team.map_or(true, |n| n == self.players_per_team)
    }

    fn apply(&mut self, patch: GamePatch) {
        if let Some(kind) = patch.kind_of_sport {
            self.kind_of_sport = kind;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(public) = patch.is_public {
            self.is_public = public;
        }
        if let Some(chat_id) = patch.chat_id {
            self.chat_id = chat_id;
        }
        if let Some(start) = patch.start_time {
            self.start_time = Some(start);
        }
        if let Some(n) = patch.players_per_team {
            self.players_per_team = n;
        }
        if let Some(team) = patch.first_team_id {
            self.first_team_id = Some(team);
        }
        if let Some(team) = patch.second_team_id {
            self.second_team_id = Some(team);
        }
    }
}
