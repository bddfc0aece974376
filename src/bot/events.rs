//! Transport-neutral inbound events.
//!
//! The teloxide handlers convert updates into these so the router and its
//! tests never need a live `Bot`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub telegram_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

impl Sender {
    /// Name used in log lines.
    pub fn label(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.first_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatRef {
    pub id: i64,
    pub is_private: bool,
}

impl ChatRef {
    pub fn private(id: i64) -> Self {
        Self { id, is_private: true }
    }

    pub fn group(id: i64) -> Self {
        Self { id, is_private: false }
    }
}

/// A message the bot can edit or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat: ChatRef,
    pub message_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text {
        sender: Sender,
        chat: ChatRef,
        text: String,
    },
    /// An inline button press on one of the bot's own messages.
    Callback {
        sender: Sender,
        message: MessageRef,
        data: String,
    },
}

impl Inbound {
    pub fn sender(&self) -> &Sender {
        match self {
            Inbound::Text { sender, .. } | Inbound::Callback { sender, .. } => sender,
        }
    }

    pub fn chat(&self) -> ChatRef {
        match self {
            Inbound::Text { chat, .. } => *chat,
            Inbound::Callback { message, .. } => message.chat,
        }
    }
}
