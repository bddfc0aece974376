use std::sync::Arc;

use teloxide::prelude::*;

use super::{chat_of, sender_of, HandlerOutcome};
use crate::bot::dispatcher::CommandRouter;
use crate::bot::events::{Inbound, MessageRef};

pub async fn callback_handler(bot: Bot, q: CallbackQuery, router: Arc<CommandRouter>) -> HandlerOutcome {
    // Stop the button's loading spinner before doing the work
    bot.answer_callback_query(q.id.clone()).await?;

    let (Some(data), Some(message)) = (q.data.clone(), q.message.as_ref()) else {
        tracing::warn!("Callback {} from user {} without data or message", q.id, q.from.id);
        return Ok(());
    };

    let event = Inbound::Callback {
        sender: sender_of(&q.from),
        message: MessageRef { chat: chat_of(&message.chat), message_id: message.id.0 },
        data,
    };
    router.handle(event).await;
    Ok(())
}
