use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;

use crate::error::CommandError;
use crate::utils::datetime::parse_start_time;

pub const MAX_GAME_NAME_LENGTH: usize = 100;
pub const MAX_PLAYERS_PER_TEAM: u32 = 50;

/// The three free-text lines a creator sends to finish a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameParams {
    pub name: String,
    pub players_per_team: u32,
    pub start_time: NaiveDateTime,
}

/// Parses `<name>\n<players per team>\n<H:mm d.MM.yyyy>`. Blank lines are skipped.
pub fn parse_game_params(text: &str) -> Result<GameParams, CommandError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let [name, players, start] = lines.as_slice() else {
        return Err(CommandError::bad_data(
            "send the name, players per team and start time on three separate lines",
        ));
    };

    validate_game_name(name).map_err(|e| CommandError::bad_data(e.to_string()))?;
    let players_per_team = validate_players_per_team(players).map_err(|e| CommandError::bad_data(e.to_string()))?;
    let start_time = parse_start_time(start).map_err(|e| CommandError::bad_data(e.to_string()))?;

    Ok(GameParams { name: name.to_string(), players_per_team, start_time })
}

pub fn validate_game_name(name: &str) -> Result<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(anyhow!("Game name cannot be empty"));
    }

    if name.chars().count() > MAX_GAME_NAME_LENGTH {
        return Err(anyhow!("Game name cannot be longer than {} characters", MAX_GAME_NAME_LENGTH));
    }

    Ok(())
}

pub fn validate_players_per_team(raw: &str) -> Result<u32> {
    let count: i64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow!("'{}' is not a number of players", raw.trim()))?;

    if count < 1 {
        return Err(anyhow!("A team needs at least 1 player"));
    }

    if count > i64::from(MAX_PLAYERS_PER_TEAM) {
        return Err(anyhow!("A team cannot have more than {} players", MAX_PLAYERS_PER_TEAM));
    }

    Ok(count as u32)
}

pub fn validate_telegram_chat_id(chat_id: i64) -> Result<()> {
    // Telegram chat IDs should be non-zero
    if chat_id == 0 {
        return Err(anyhow!("Chat ID cannot be zero"));
    }

    // Supergroups use large negative ids around -100xxxxxxxxxx
    if chat_id < -2000000000000 {
        return Err(anyhow!("Chat ID out of valid range"));
    }

    Ok(())
}
