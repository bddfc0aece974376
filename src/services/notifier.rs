//! Chat transport port.
//!
//! Services talk to chats only through [`Notifier`]; [`TelegramNotifier`] is
//! the production implementation on top of a teloxide [`Bot`].

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberKind, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, UserId};
use teloxide::{ApiError, RequestError};

/// One inline button: a label and the callback payload it sends back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self { label: label.into(), data: data.into() }
    }
}

/// Rows of inline buttons attached under a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, row: Vec<Button>) -> Self {
        if !row.is_empty() {
            self.rows.push(row);
        }
        self
    }

    pub fn single(self, button: Button) -> Self {
        self.row(vec![button])
    }

    /// Every button, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    pub fn find(&self, data: &str) -> Option<&Button> {
        self.buttons().find(|b| b.data == data)
    }
}

impl From<Keyboard> for InlineKeyboardMarkup {
    fn from(keyboard: Keyboard) -> Self {
        InlineKeyboardMarkup::new(keyboard.rows.into_iter().map(|row| {
            row.into_iter()
                .map(|b| InlineKeyboardButton::callback(b.label, b.data))
                .collect::<Vec<_>>()
        }))
    }
}

/// Where a user stands in a chat, reduced to what team bookkeeping needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Member,
    Left,
    Kicked,
    Restricted,
}

impl MemberStatus {
    /// Whether the user still counts as a participant of the chat.
    pub fn is_present(self) -> bool {
        self == MemberStatus::Member
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a new message and returns its id.
    async fn send_message(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) -> Result<i32>;

    async fn edit_message(&self, chat_id: i64, message_id: i32, text: &str, keyboard: Option<Keyboard>) -> Result<()>;

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()>;

    async fn chat_member_status(&self, chat_id: i64, user_id: i64) -> Result<MemberStatus>;
}

pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) -> Result<i32> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(InlineKeyboardMarkup::from(keyboard));
        }
        let message = request.await?;
        Ok(message.id.0)
    }

    async fn edit_message(&self, chat_id: i64, message_id: i32, text: &str, keyboard: Option<Keyboard>) -> Result<()> {
        let mut request = self.bot.edit_message_text(ChatId(chat_id), MessageId(message_id), text);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(InlineKeyboardMarkup::from(keyboard));
        }
        match request.await {
            Ok(_) => Ok(()),
            // Re-rendering an unchanged status is not a failure
            Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> Result<()> {
        self.bot.delete_message(ChatId(chat_id), MessageId(message_id)).await?;
        Ok(())
    }

    async fn chat_member_status(&self, chat_id: i64, user_id: i64) -> Result<MemberStatus> {
        let member = self.bot.get_chat_member(ChatId(chat_id), UserId(user_id as u64)).await?;
        Ok(match member.kind {
            ChatMemberKind::Left => MemberStatus::Left,
            ChatMemberKind::Banned(_) => MemberStatus::Kicked,
            ChatMemberKind::Restricted(_) => MemberStatus::Restricted,
            _ => MemberStatus::Member,
        })
    }
}
