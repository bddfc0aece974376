//! Persistence port consumed by the bot and the HTTP API.
//!
//! Every record type gets the same six operations; [`Storage`] bundles one
//! repository per record type so services can hold a single handle.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{Game, PageRequest, PagedList, Player, PlayerFilter, RecordId, Team};

/// A persisted record with its own filter and partial-update types.
pub trait Record: Clone + Send + Sync + 'static {
    type Filter: Default + Send + Sync;
    type Patch: Default + Send + Sync;

    fn id(&self) -> RecordId;

    /// In-memory evaluation of a filter; storage backends may translate it instead.
    fn matches(&self, filter: &Self::Filter) -> bool;

    fn apply(&mut self, patch: Self::Patch);
}

#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    async fn get(&self, id: RecordId) -> Result<Option<R>>;

    /// Records matching `filter`, oldest first.
    async fn find(&self, filter: &R::Filter, page: PageRequest) -> Result<PagedList<R>>;

    async fn add(&self, record: R) -> Result<RecordId>;

    /// Writes only the fields set in `patch`.
    async fn update(&self, id: RecordId, patch: R::Patch) -> Result<()>;

    /// Full upsert.
    async fn replace(&self, record: &R) -> Result<()>;

    async fn delete(&self, id: RecordId) -> Result<()>;
}

pub trait Storage: Send + Sync {
    fn players(&self) -> &dyn Repository<Player>;
    fn games(&self) -> &dyn Repository<Game>;
    fn teams(&self) -> &dyn Repository<Team>;
}

/// Looks a player up by their Telegram user id.
pub async fn find_player(storage: &dyn Storage, telegram_id: i64) -> Result<Option<Player>> {
    let page = storage
        .players()
        .find(&PlayerFilter::by_telegram_id(telegram_id), PageRequest::new(1, 1))
        .await?;
    Ok(page.items.into_iter().next())
}
