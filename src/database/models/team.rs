use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{RecordId, TeamSide};
use crate::database::repository::Record;

/// A named set of players on one side of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default)]
    pub id: RecordId,
    pub name: String,
    /// Storage ids of member players.
    pub members: BTreeSet<RecordId>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: RecordId::new(), name: name.into(), members: BTreeSet::new() }
    }

    pub fn display_name(&self, side: TeamSide) -> &str {
        if self.name.trim().is_empty() {
            side.default_name()
        } else {
            &self.name
        }
    }

    pub fn is_full(&self, capacity: u32) -> bool {
        self.members.len() >= capacity as usize
    }

    pub fn contains(&self, player_id: RecordId) -> bool {
        self.members.contains(&player_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamFilter {
    pub name: Option<String>,
    pub member: Option<RecordId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamPatch {
    pub name: Option<String>,
    pub members: Option<BTreeSet<RecordId>>,
}

impl Record for Team {
    type Filter = TeamFilter;
    type Patch = TeamPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn matches(&self, filter: &TeamFilter) -> bool {
        filter.name.as_ref().map_or(true, |name| *name == self.name)
            && filter.member.map_or(true, |member| self.members.contains(&member))
    }

    fn apply(&mut self, patch: TeamPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(members) = patch.members {
            self.members = members;
        }
    }
}
