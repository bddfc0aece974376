use std::sync::Arc;

use anyhow::Result;

use crate::services::notifier::Notifier;

/// Feedback types for different command outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackType {
    Success,
    Error,
    Info,
}

impl FeedbackType {
    fn emoji(&self) -> &'static str {
        match self {
            FeedbackType::Success => "✅",
            FeedbackType::Error => "❌",
            FeedbackType::Info => "ℹ️",
        }
    }

    pub fn format(&self, message: &str) -> String {
        format!("{} {}", self.emoji(), message)
    }
}

/// Short status replies to one chat.
pub struct CommandFeedback {
    notifier: Arc<dyn Notifier>,
    chat_id: i64,
}

impl CommandFeedback {
    pub fn new(notifier: Arc<dyn Notifier>, chat_id: i64) -> Self {
        Self { notifier, chat_id }
    }

    pub async fn send(&self, feedback_type: FeedbackType, message: &str) -> Result<i32> {
        self.notifier
            .send_message(self.chat_id, &feedback_type.format(message), None)
            .await
    }

    /// Replaces an existing message with feedback, dropping its buttons.
    pub async fn replace(&self, message_id: i32, feedback_type: FeedbackType, message: &str) -> Result<()> {
        self.notifier
            .edit_message(self.chat_id, message_id, &feedback_type.format(message), None)
            .await
    }

    pub async fn error(&self, message: &str) -> Result<i32> {
        self.send(FeedbackType::Error, message).await
    }

    pub async fn info(&self, message: &str) -> Result<i32> {
        self.send(FeedbackType::Info, message).await
    }
}
