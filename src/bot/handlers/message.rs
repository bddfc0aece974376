use std::sync::Arc;

use teloxide::prelude::*;

use super::{chat_of, sender_of, HandlerOutcome};
use crate::bot::dispatcher::CommandRouter;
use crate::bot::events::Inbound;

pub async fn message_handler(msg: Message, router: Arc<CommandRouter>) -> HandlerOutcome {
    // Stickers, photos, service messages and channel posts carry nothing for us
    let (Some(text), Some(user)) = (msg.text(), msg.from()) else {
        return Ok(());
    };
    if user.is_bot {
        return Ok(());
    }

    let event = Inbound::Text {
        sender: sender_of(user),
        chat: chat_of(&msg.chat),
        text: text.to_string(),
    };
    router.handle(event).await;
    Ok(())
}
