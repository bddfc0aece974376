pub mod callback;
pub mod message;

use std::sync::Arc;

use teloxide::{dispatching::UpdateHandler, prelude::*, types::{Chat, User}};

use crate::bot::dispatcher::CommandRouter;
use crate::bot::events::{ChatRef, Sender};

pub type HandlerOutcome = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

pub struct BotHandler {
    pub router: Arc<CommandRouter>,
}

impl BotHandler {
    pub fn new(router: Arc<CommandRouter>) -> Self {
        Self { router }
    }

    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        let router = self.router.clone();
        let router_callback = self.router.clone();

        dptree::entry()
            .branch(Update::filter_message().endpoint(move |msg: Message| {
                let router = router.clone();
                async move { message::message_handler(msg, router).await }
            }))
            .branch(Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                let router = router_callback.clone();
                async move { callback::callback_handler(bot, q, router).await }
            }))
    }
}

pub(crate) fn sender_of(user: &User) -> Sender {
    Sender {
        telegram_id: user.id.0 as i64,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        language_code: user.language_code.clone(),
    }
}

pub(crate) fn chat_of(chat: &Chat) -> ChatRef {
    ChatRef { id: chat.id.0, is_private: chat.is_private() }
}
