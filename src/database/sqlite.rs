//! SQLite implementation of the repository port.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeSet;

use super::connection::DatabaseManager;
use super::models::*;
use super::repository::{Repository, Storage};
use crate::utils::logging::{log_database_error, log_database_operation};

fn parse_id(raw: &str) -> Result<RecordId> {
    raw.parse().map_err(|e| anyhow!("corrupt record id '{raw}': {e}"))
}

fn parse_optional_id(raw: Option<String>) -> Result<Option<RecordId>> {
    raw.as_deref().map(parse_id).transpose()
}

#[derive(Debug, FromRow)]
struct PlayerRow {
    id: String,
    telegram_id: i64,
    name: String,
    surname: Option<String>,
    nickname: Option<String>,
    utc_offset: Option<i32>,
    language_code: Option<String>,
}

impl TryFrom<PlayerRow> for Player {
    type Error = anyhow::Error;

    fn try_from(row: PlayerRow) -> Result<Self> {
        Ok(Player {
            id: parse_id(&row.id)?,
            telegram_id: row.telegram_id,
            name: row.name,
            surname: row.surname,
            nickname: row.nickname,
            utc_offset: row.utc_offset,
            language_code: row.language_code,
        })
    }
}

#[derive(Debug, FromRow)]
struct GameRow {
    id: String,
    creator_id: String,
    kind_of_sport: String,
    name: String,
    is_public: bool,
    chat_id: Option<i64>,
    start_time: Option<NaiveDateTime>,
    players_per_team: i64,
    first_team_id: Option<String>,
    second_team_id: Option<String>,
}

impl TryFrom<GameRow> for Game {
    type Error = anyhow::Error;

    fn try_from(row: GameRow) -> Result<Self> {
        Ok(Game {
            id: parse_id(&row.id)?,
            creator_id: parse_id(&row.creator_id)?,
            kind_of_sport: row.kind_of_sport.parse().map_err(|e: String| anyhow!(e))?,
            name: row.name,
            is_public: row.is_public,
            chat_id: row.chat_id,
            start_time: row.start_time,
            players_per_team: u32::try_from(row.players_per_team)?,
            first_team_id: parse_optional_id(row.first_team_id)?,
            second_team_id: parse_optional_id(row.second_team_id)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct TeamRow {
    id: String,
    name: String,
}

const PLAYER_COLUMNS: &str = "id, telegram_id, name, surname, nickname, utc_offset, language_code";
const GAME_COLUMNS: &str = "id, creator_id, kind_of_sport, name, is_public, chat_id, start_time, \
                            players_per_team, first_team_id, second_team_id";

pub struct SqlitePlayers {
    pool: SqlitePool,
}

#[async_trait]
impl Repository<Player> for SqlitePlayers {
    async fn get(&self, id: RecordId) -> Result<Option<Player>> {
        let row = sqlx::query_as::<_, PlayerRow>(&format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Player::try_from).transpose()
    }

    async fn find(&self, filter: &PlayerFilter, page: PageRequest) -> Result<PagedList<Player>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {PLAYER_COLUMNS} FROM players WHERE 1 = 1"));
        if let Some(telegram_id) = filter.telegram_id {
            query.push(" AND telegram_id = ").push_bind(telegram_id);
        }
        if let Some(nickname) = &filter.nickname {
            query.push(" AND nickname = ").push_bind(nickname.clone());
        }
        query.push(" ORDER BY rowid");

        let rows = query.build_query_as::<PlayerRow>().fetch_all(&self.pool).await?;
        let players = rows.into_iter().map(Player::try_from).collect::<Result<Vec<_>>>()?;
        Ok(PagedList::from_all(players, page))
    }

    async fn add(&self, player: Player) -> Result<RecordId> {
        log_database_operation("INSERT", "players", Some(&format!("telegram_id={}", player.telegram_id)));
        sqlx::query(
            "INSERT INTO players (id, telegram_id, name, surname, nickname, utc_offset, language_code)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(player.id.to_string())
        .bind(player.telegram_id)
        .bind(&player.name)
        .bind(&player.surname)
        .bind(&player.nickname)
        .bind(player.utc_offset)
        .bind(&player.language_code)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            log_database_error("INSERT", "players", &e.to_string(), None);
            e
        })?;
        Ok(player.id)
    }

    async fn update(&self, id: RecordId, patch: PlayerPatch) -> Result<()> {
        let mut query = QueryBuilder::<Sqlite>::new("UPDATE players SET ");
        let mut changed = false;
        {
            let mut fields = query.separated(", ");
            if let Some(name) = patch.name {
                fields.push("name = ").push_bind_unseparated(name);
                changed = true;
            }
            if let Some(surname) = patch.surname {
                fields.push("surname = ").push_bind_unseparated(surname);
                changed = true;
            }
            if let Some(nickname) = patch.nickname {
                fields.push("nickname = ").push_bind_unseparated(nickname);
                changed = true;
            }
            if let Some(offset) = patch.utc_offset {
                fields.push("utc_offset = ").push_bind_unseparated(offset);
                changed = true;
            }
            if let Some(code) = patch.language_code {
                fields.push("language_code = ").push_bind_unseparated(code);
                changed = true;
            }
        }
        if !changed {
            return Ok(());
        }
        query.push(" WHERE id = ").push_bind(id.to_string());
        log_database_operation("UPDATE", "players", Some(&id.to_string()));
        query.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn replace(&self, player: &Player) -> Result<()> {
        log_database_operation("REPLACE", "players", Some(&player.id.to_string()));
        sqlx::query(
            "INSERT OR REPLACE INTO players (id, telegram_id, name, surname, nickname, utc_offset, language_code)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(player.id.to_string())
        .bind(player.telegram_id)
        .bind(&player.name)
        .bind(&player.surname)
        .bind(&player.nickname)
        .bind(player.utc_offset)
        .bind(&player.language_code)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        log_database_operation("DELETE", "players", Some(&id.to_string()));
        sqlx::query("DELETE FROM players WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct SqliteGames {
    pool: SqlitePool,
}

#[async_trait]
impl Repository<Game> for SqliteGames {
    async fn get(&self, id: RecordId) -> Result<Option<Game>> {
        let row = sqlx::query_as::<_, GameRow>(&format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Game::try_from).transpose()
    }

    async fn find(&self, filter: &GameFilter, page: PageRequest) -> Result<PagedList<Game>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {GAME_COLUMNS} FROM games WHERE 1 = 1"));
        if let Some(creator) = filter.creator_id {
            query.push(" AND creator_id = ").push_bind(creator.to_string());
        }
        if let Some(kind) = filter.kind_of_sport {
            query.push(" AND kind_of_sport = ").push_bind(kind.key());
        }
        if let Some(public) = filter.is_public {
            query.push(" AND is_public = ").push_bind(public);
        }
        if let Some(chat_id) = filter.chat_id {
            query.push(" AND chat_id = ").push_bind(chat_id);
        }
        if let Some(n) = filter.players_per_team {
            query.push(" AND players_per_team = ").push_bind(i64::from(n));
        }
        query.push(" ORDER BY rowid");

        let rows = query.build_query_as::<GameRow>().fetch_all(&self.pool).await?;
        let games = rows.into_iter().map(Game::try_from).collect::<Result<Vec<_>>>()?;
        Ok(PagedList::from_all(games, page))
    }

    async fn add(&self, game: Game) -> Result<RecordId> {
        log_database_operation("INSERT", "games", Some(&game.id.to_string()));
        insert_game(&self.pool, &game, "INSERT").await?;
        Ok(game.id)
    }

    async fn update(&self, id: RecordId, patch: GamePatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let mut query = QueryBuilder::<Sqlite>::new("UPDATE games SET ");
        {
            let mut fields = query.separated(", ");
            if let Some(kind) = patch.kind_of_sport {
                fields.push("kind_of_sport = ").push_bind_unseparated(kind.key());
            }
            if let Some(name) = patch.name {
                fields.push("name = ").push_bind_unseparated(name);
            }
            if let Some(public) = patch.is_public {
                fields.push("is_public = ").push_bind_unseparated(public);
            }
            if let Some(chat_id) = patch.chat_id {
                fields.push("chat_id = ").push_bind_unseparated(chat_id);
            }
            if let Some(start) = patch.start_time {
                fields.push("start_time = ").push_bind_unseparated(start);
            }
            if let Some(n) = patch.players_per_team {
                fields.push("players_per_team = ").push_bind_unseparated(i64::from(n));
            }
            if let Some(team) = patch.first_team_id {
                fields.push("first_team_id = ").push_bind_unseparated(team.to_string());
            }
            if let Some(team) = patch.second_team_id {
                fields.push("second_team_id = ").push_bind_unseparated(team.to_string());
            }
        }
        query.push(" WHERE id = ").push_bind(id.to_string());
        log_database_operation("UPDATE", "games", Some(&id.to_string()));
        query.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn replace(&self, game: &Game) -> Result<()> {
        log_database_operation("REPLACE", "games", Some(&game.id.to_string()));
        insert_game(&self.pool, game, "INSERT OR REPLACE").await
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        log_database_operation("DELETE", "games", Some(&id.to_string()));
        sqlx::query("DELETE FROM games WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

async fn insert_game(pool: &SqlitePool, game: &Game, verb: &str) -> Result<()> {
    sqlx::query(&format!(
        "{verb} INTO games ({GAME_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(game.id.to_string())
    .bind(game.creator_id.to_string())
    .bind(game.kind_of_sport.key())
    .bind(&game.name)
    .bind(game.is_public)
    .bind(game.chat_id)
    .bind(game.start_time)
    .bind(i64::from(game.players_per_team))
    .bind(game.first_team_id.map(|id| id.to_string()))
    .bind(game.second_team_id.map(|id| id.to_string()))
    .execute(pool)
    .await
    .map_err(|e| {
        log_database_error(verb, "games", &e.to_string(), Some(&game.id.to_string()));
        e
    })?;
    Ok(())
}

pub struct SqliteTeams {
    pool: SqlitePool,
}

impl SqliteTeams {
    async fn members(&self, team_id: &str) -> Result<BTreeSet<RecordId>> {
        let rows: Vec<String> = sqlx::query_scalar("SELECT player_id FROM team_members WHERE team_id = ?")
            .bind(team_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|raw| parse_id(raw)).collect()
    }

    async fn hydrate(&self, row: TeamRow) -> Result<Team> {
        let members = self.members(&row.id).await?;
        Ok(Team { id: parse_id(&row.id)?, name: row.name, members })
    }

    async fn write_members(&self, team_id: RecordId, members: &BTreeSet<RecordId>) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM team_members WHERE team_id = ?")
            .bind(team_id.to_string())
            .execute(&mut *tx)
            .await?;
        for member in members {
            sqlx::query("INSERT INTO team_members (team_id, player_id) VALUES (?, ?)")
                .bind(team_id.to_string())
                .bind(member.to_string())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Repository<Team> for SqliteTeams {
    async fn get(&self, id: RecordId) -> Result<Option<Team>> {
        let row = sqlx::query_as::<_, TeamRow>("SELECT id, name FROM teams WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find(&self, filter: &TeamFilter, page: PageRequest) -> Result<PagedList<Team>> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT id, name FROM teams WHERE 1 = 1");
        if let Some(name) = &filter.name {
            query.push(" AND name = ").push_bind(name.clone());
        }
        if let Some(member) = filter.member {
            query
                .push(" AND id IN (SELECT team_id FROM team_members WHERE player_id = ")
                .push_bind(member.to_string())
                .push(")");
        }
        query.push(" ORDER BY rowid");

        let rows = query.build_query_as::<TeamRow>().fetch_all(&self.pool).await?;
        let mut teams = Vec::with_capacity(rows.len());
        for row in rows {
            teams.push(self.hydrate(row).await?);
        }
        Ok(PagedList::from_all(teams, page))
    }

    async fn add(&self, team: Team) -> Result<RecordId> {
        log_database_operation("INSERT", "teams", Some(&team.id.to_string()));
        sqlx::query("INSERT INTO teams (id, name) VALUES (?, ?)")
            .bind(team.id.to_string())
            .bind(&team.name)
            .execute(&self.pool)
            .await?;
        self.write_members(team.id, &team.members).await?;
        Ok(team.id)
    }

    async fn update(&self, id: RecordId, patch: TeamPatch) -> Result<()> {
        log_database_operation("UPDATE", "teams", Some(&id.to_string()));
        if let Some(name) = patch.name {
            sqlx::query("UPDATE teams SET name = ? WHERE id = ?")
                .bind(name)
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;
        }
        if let Some(members) = patch.members {
            self.write_members(id, &members).await?;
        }
        Ok(())
    }

    async fn replace(&self, team: &Team) -> Result<()> {
        log_database_operation("REPLACE", "teams", Some(&team.id.to_string()));
        sqlx::query("INSERT INTO teams (id, name) VALUES (?, ?) ON CONFLICT(id) DO UPDATE SET name = excluded.name")
            .bind(team.id.to_string())
            .bind(&team.name)
            .execute(&self.pool)
            .await?;
        self.write_members(team.id, &team.members).await
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        log_database_operation("DELETE", "teams", Some(&id.to_string()));
        sqlx::query("DELETE FROM team_members WHERE team_id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Repository port backed by the bot's SQLite database.
pub struct SqliteStorage {
    players: SqlitePlayers,
    games: SqliteGames,
    teams: SqliteTeams,
}

impl SqliteStorage {
    pub fn new(db: &DatabaseManager) -> Self {
        Self {
            players: SqlitePlayers { pool: db.pool.clone() },
            games: SqliteGames { pool: db.pool.clone() },
            teams: SqliteTeams { pool: db.pool.clone() },
        }
    }
}

impl Storage for SqliteStorage {
    fn players(&self) -> &dyn Repository<Player> {
        &self.players
    }

    fn games(&self) -> &dyn Repository<Game> {
        &self.games
    }

    fn teams(&self) -> &dyn Repository<Team> {
        &self.teams
    }
}
