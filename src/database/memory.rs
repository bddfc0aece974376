//! In-process storage backend.
//!
//! Keeps records in insertion order and counts writes, which lets tests assert
//! that an operation left storage untouched.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::models::{Game, PageRequest, PagedList, Player, RecordId, Team};
use super::repository::{Record, Repository, Storage};
use crate::utils::logging::log_database_operation;

pub struct MemoryRepository<R> {
    records: RwLock<Vec<R>>,
    writes: AtomicUsize,
}

impl<R: Record> MemoryRepository<R> {
    pub fn new() -> Self {
        Self { records: RwLock::new(Vec::new()), writes: AtomicUsize::new(0) }
    }

    /// Number of add/update/replace/delete calls served so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn record_write(&self, operation: &str) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        log_database_operation(operation, std::any::type_name::<R>(), None);
    }
}

impl<R: Record> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> Repository<R> for MemoryRepository<R> {
    async fn get(&self, id: RecordId) -> Result<Option<R>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    async fn find(&self, filter: &R::Filter, page: PageRequest) -> Result<PagedList<R>> {
        let records = self.records.read().await;
        let matching = records.iter().filter(|r| r.matches(filter)).cloned().collect();
        Ok(PagedList::from_all(matching, page))
    }

    async fn add(&self, record: R) -> Result<RecordId> {
        let id = record.id();
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id() == id) {
            anyhow::bail!("record {id} already exists");
        }
        records.push(record);
        self.record_write("INSERT");
        Ok(id)
    }

    async fn update(&self, id: RecordId, patch: R::Patch) -> Result<()> {
        let mut records = self.records.write().await;
        if let Some(record) = records.iter_mut().find(|r| r.id() == id) {
            record.apply(patch);
        }
        self.record_write("UPDATE");
        Ok(())
    }

    async fn replace(&self, record: &R) -> Result<()> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.record_write("REPLACE");
        Ok(())
    }

    async fn delete(&self, id: RecordId) -> Result<()> {
        self.records.write().await.retain(|r| r.id() != id);
        self.record_write("DELETE");
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    pub players: MemoryRepository<Player>,
    pub games: MemoryRepository<Game>,
    pub teams: MemoryRepository<Team>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes across all three repositories.
    pub fn writes(&self) -> usize {
        self.players.writes() + self.games.writes() + self.teams.writes()
    }
}

impl Storage for MemoryStorage {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{GameFilter, GamePatch, KindOfSport};

    #[tokio::test]
    async fn test_add_get_update_delete() {
        let repo = MemoryRepository::<Game>::new();
        let creator = RecordId::new();
        let id = repo.add(Game::new(creator)).await.unwrap();

        repo.update(id, GamePatch { kind_of_sport: Some(KindOfSport::Futsal), ..GamePatch::default() })
            .await
            .unwrap();
        let game = repo.get(id).await.unwrap().unwrap();
        assert_eq!(game.kind_of_sport, KindOfSport::Futsal);
        assert_eq!(game.creator_id, creator);

        repo.delete(id).await.unwrap();
        assert!(repo.get(id).await.unwrap().is_none());
        assert_eq!(repo.writes(), 3);
    }

    #[tokio::test]
    async fn test_find_keeps_insertion_order() {
        let repo = MemoryRepository::<Game>::new();
        let creator = RecordId::new();
        let first = repo.add(Game::new(creator)).await.unwrap();
        repo.add(Game::new(RecordId::new())).await.unwrap();
        let third = repo.add(Game::new(creator)).await.unwrap();

        let page = repo.find(&GameFilter::by_creator(creator), PageRequest::all()).await.unwrap();
        let ids: Vec<_> = page.items.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![first, third]);
    }

    #[tokio::test]
    async fn test_duplicate_add_is_rejected() {
        let repo = MemoryRepository::<Game>::new();
        let game = Game::new(RecordId::new());
        repo.add(game.clone()).await.unwrap();
        assert!(repo.add(game).await.is_err());
    }

    #[tokio::test]
    async fn test_replace_upserts() {
        let repo = MemoryRepository::<Game>::new();
        let mut game = Game::new(RecordId::new());
        repo.replace(&game).await.unwrap();
        game.name = "Evening match".to_string();
        repo.replace(&game).await.unwrap();
        assert_eq!(repo.len().await, 1);
        assert_eq!(repo.get(game.id).await.unwrap().unwrap().name, "Evening match");
    }
}
