#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use sports_games_bot::bot::dispatcher::CommandRouter;
use sports_games_bot::bot::events::{ChatRef, Inbound, MessageRef, Sender};
use sports_games_bot::database::memory::MemoryStorage;
use sports_games_bot::database::models::{Game, GameFilter, KindOfSport, PageRequest, Player};
use sports_games_bot::database::repository::Repository;
use sports_games_bot::services::notifier::{Keyboard, MemberStatus, Notifier};
use sports_games_bot::services::scheduler::{Task, TaskHandle, TaskScheduler};
use sports_games_bot::utils::datetime::{local_time, START_TIME_INPUT_FORMAT};

/// Everything the fake transport was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message { chat_id: i64, message_id: i32, text: String, keyboard: Option<Keyboard> },
    Edit { chat_id: i64, message_id: i32, text: String, keyboard: Option<Keyboard> },
    Delete { chat_id: i64, message_id: i32 },
}

impl Sent {
    pub fn text(&self) -> Option<&str> {
        match self {
            Sent::Message { text, .. } | Sent::Edit { text, .. } => Some(text),
            Sent::Delete { .. } => None,
        }
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        match self {
            Sent::Message { keyboard, .. } | Sent::Edit { keyboard, .. } => keyboard.as_ref(),
            Sent::Delete { .. } => None,
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    log: Mutex<Vec<Sent>>,
    next_message_id: AtomicI32,
    statuses: Mutex<HashMap<(i64, i64), MemberStatus>>,
    fail_deletes: AtomicBool,
    fail_sends: AtomicBool,
    fail_edits: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Sent> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn last(&self) -> Option<Sent> {
        self.log.lock().unwrap().last().cloned()
    }

    pub fn last_text(&self) -> Option<String> {
        self.last().and_then(|s| s.text().map(str::to_string))
    }

    /// Texts of new messages sent to `chat_id`.
    pub fn messages_to(&self, chat_id: i64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message { chat_id: c, text, .. } if c == chat_id => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Id of the most recent new message in `chat_id`.
    pub fn last_message_id(&self, chat_id: i64) -> Option<i32> {
        self.sent().into_iter().rev().find_map(|s| match s {
            Sent::Message { chat_id: c, message_id, .. } if c == chat_id => Some(message_id),
            _ => None,
        })
    }

    pub fn set_status(&self, chat_id: i64, user_id: i64, status: MemberStatus) {
        self.statuses.lock().unwrap().insert((chat_id, user_id), status);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    pub fn fail_edits(&self) {
        self.fail_edits.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) -> Result<i32> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(anyhow!("network down"));
        }
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst) + 100;
        self.log.lock().unwrap().push(Sent::Message { chat_id, message_id, text: text.to_string(), keyboard });
        Ok(message_id)
    }

    async fn edit_message(&self, chat_id: i64, message_id: i32, text: &str, keyboard: Option<Keyboard>) -> Result<()> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(anyhow!("message to edit not found"));
        }
        self.log.lock().unwrap().push(Sent::Edit { chat_id, message_id, text: text.to_string(), keyboard });
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(anyhow!("message can't be deleted"));
        }
        self.log.lock().unwrap().push(Sent::Delete { chat_id, message_id });
        Ok(())
    }

    async fn chat_member_status(&self, chat_id: i64, user_id: i64) -> Result<MemberStatus> {
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(&(chat_id, user_id))
            .copied()
            .unwrap_or(MemberStatus::Member))
    }
}

/// A task queue that only runs tasks when the test says so.
#[derive(Default)]
pub struct ManualTaskScheduler {
    pending: Mutex<Vec<(TaskHandle, Duration, Task)>>,
    cancelled: Mutex<Vec<TaskHandle>>,
    immediate: AtomicBool,
}

impl ManualTaskScheduler {
    /// From now on tasks run inside `schedule`, before it returns.
    pub fn run_immediately(&self) {
        self.immediate.store(true, Ordering::SeqCst);
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.pending.lock().unwrap().iter().map(|(_, delay, _)| *delay).collect()
    }

    pub fn cancelled(&self) -> Vec<TaskHandle> {
        self.cancelled.lock().unwrap().clone()
    }

    /// Runs every pending task as if its delay had elapsed. Returns how many ran.
    pub async fn run_all(&self) -> usize {
        let tasks: Vec<_> = self.pending.lock().unwrap().drain(..).collect();
        let count = tasks.len();
        for (_, _, task) in tasks {
            task.await;
        }
        count
    }
}

#[async_trait]
impl TaskScheduler for ManualTaskScheduler {
    async fn schedule(&self, delay: Duration, task: Task) -> Result<TaskHandle> {
        let handle = TaskHandle(Uuid::new_v4());
        if self.immediate.load(Ordering::SeqCst) {
            task.await;
        } else {
            self.pending.lock().unwrap().push((handle, delay, task));
        }
        Ok(handle)
    }

    async fn cancel(&self, handle: TaskHandle) -> Result<()> {
        self.pending.lock().unwrap().retain(|(h, _, _)| *h != handle);
        self.cancelled.lock().unwrap().push(handle);
        Ok(())
    }
}

pub const GROUP_CHAT: i64 = -1001234567890;
pub const OTHER_GROUP_CHAT: i64 = -1009876543210;

pub struct Harness {
    pub storage: Arc<MemoryStorage>,
    pub notifier: Arc<RecordingNotifier>,
    pub tasks: Arc<ManualTaskScheduler>,
    pub router: CommandRouter,
}

impl Harness {
    pub fn new() -> Self {
        let storage = Arc::new(MemoryStorage::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let tasks = Arc::new(ManualTaskScheduler::default());
        let router = CommandRouter::new(storage.clone(), notifier.clone(), tasks.clone());
        Self { storage, notifier, tasks, router }
    }

    pub fn sender(telegram_id: i64) -> Sender {
        Sender {
            telegram_id,
            first_name: format!("Player{telegram_id}"),
            last_name: None,
            username: Some(format!("player{telegram_id}")),
            language_code: Some("en".to_string()),
        }
    }

    /// Stores a player directly, skipping the sign-in dialog.
    pub async fn register(&self, telegram_id: i64) -> Player {
        let mut player = Player::new(telegram_id, format!("Player{telegram_id}"));
        player.nickname = Some(format!("player{telegram_id}"));
        self.storage.players.add(player.clone()).await.unwrap();
        player
    }

    pub async fn text(&self, from: i64, chat: ChatRef, text: &str) {
        self.router
            .handle(Inbound::Text { sender: Self::sender(from), chat, text: text.to_string() })
            .await;
    }

    pub async fn press(&self, from: i64, chat: ChatRef, message_id: i32, data: &str) {
        let message = MessageRef { chat, message_id };
        self.router
            .handle(Inbound::Callback { sender: Self::sender(from), message, data: data.to_string() })
            .await;
    }

    pub async fn games_of(&self, creator: &Player) -> Vec<Game> {
        self.storage
            .games
            .find(&GameFilter::by_creator(creator.id), PageRequest::all())
            .await
            .unwrap()
            .items
    }

    pub async fn game(&self, game: &Game) -> Game {
        self.storage.games.get(game.id).await.unwrap().expect("game exists")
    }

    /// Runs the whole setup wizard in the creator's private chat.
    pub async fn create_game(&self, creator: &Player, kind: KindOfSport, is_public: bool, params: &str) -> Game {
        let chat = ChatRef::private(creator.telegram_id);
        self.press(creator.telegram_id, chat, 1, "/choosesport").await;
        self.press(creator.telegram_id, chat, 1, &format!("/choosegameprivacy {}", kind.key())).await;
        self.press(creator.telegram_id, chat, 1, &format!("/newgame {}|{}", kind.key(), is_public)).await;
        self.text(creator.telegram_id, chat, params).await;
        self.games_of(creator).await.pop().expect("game was created")
    }

    /// Creates a game that starts `hours_ahead` hours from now in the creator's zone.
    pub async fn create_game_starting_in(&self, creator: &Player, players_per_team: u32, hours_ahead: i64, is_public: bool) -> Game {
        let local = local_time(Utc::now() + chrono::Duration::hours(hours_ahead), creator.utc_offset_hours());
        let params = format!("Evening match\n{}\n{}", players_per_team, local.format(START_TIME_INPUT_FORMAT));
        self.create_game(creator, KindOfSport::Football, is_public, &params).await
    }

    /// Posts the game code into `chat_id` and returns the status message id.
    pub async fn add_to_chat(&self, sender: &Player, game: &Game, chat_id: i64) -> i32 {
        self.text(sender.telegram_id, ChatRef::group(chat_id), &game.code()).await;
        self.notifier.last_message_id(chat_id).expect("status message posted")
    }

    pub async fn join_first(&self, player: &Player, game: &Game, chat_id: i64, message_id: i32) {
        self.press(player.telegram_id, ChatRef::group(chat_id), message_id, &format!("joinfirst {}", game.id)).await;
    }

    pub async fn join_second(&self, player: &Player, game: &Game, chat_id: i64, message_id: i32) {
        self.press(player.telegram_id, ChatRef::group(chat_id), message_id, &format!("joinsecond {}", game.id)).await;
    }
}
