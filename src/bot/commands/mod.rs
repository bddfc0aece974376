pub mod callback;

pub use callback::{CallbackCommand, CallbackData};

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Sports games bot commands:")]
pub enum Command {
    #[command(description = "Register and get started")]
    Start,
    #[command(description = "Open the main menu")]
    Menu,
    #[command(description = "How to use the bot")]
    Faq,
    #[command(description = "Same as /faq")]
    Guide,
}

impl Command {
    const ALL: [Command; 4] = [Command::Start, Command::Menu, Command::Faq, Command::Guide];

    pub fn token(self) -> &'static str {
        match self {
            Command::Start => "/start",
            Command::Menu => "/menu",
            Command::Faq => "/faq",
            Command::Guide => "/guide",
        }
    }

    /// Matches a text message by case-insensitive command prefix, so
    /// `/MENU` and `/menu@SomeBot` both resolve to [`Command::Menu`].
    pub fn parse_text(text: &str) -> Option<Self> {
        let text = text.trim_start();
        Self::ALL.into_iter().find(|cmd| {
            let token = cmd.token();
            text.get(..token.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(token))
        })
    }
}
