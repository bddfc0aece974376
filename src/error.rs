//! Error types crossing the dispatcher boundary.

use thiserror::Error;

/// Failures caused by what the user asked for. Their text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Invalid data: {0}")]
    BadData(String),

    #[error("Invalid game id")]
    BadGameId,

    #[error("Game does not exist")]
    GameNotExist,

    #[error("Only the creator of the game can delete it")]
    NotCreatorTryDelete,

    #[error("Only the creator of the game can edit it")]
    NotCreatorTryEdit,

    #[error("This private game is already added to another chat")]
    PrivateGameAlreadyBoundElsewhere,

    #[error("No game is being configured right now. Open /menu to create one")]
    SessionNotActive,

    #[error("Finish the previous step of the game setup first")]
    StepOutOfOrder,

    #[error("The game has no team size yet, so nobody can join")]
    GameNotConfigured,

    #[error("You are not registered. Send /start to the bot in a private chat to register")]
    NotRegistered,
}

impl CommandError {
    pub fn bad_data(detail: impl Into<String>) -> Self {
        CommandError::BadData(detail.into())
    }
}

/// Everything a command handler can fail with.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    /// The domain error, if this is one.
    pub fn as_command(&self) -> Option<&CommandError> {
        match self {
            HandlerError::Command(e) => Some(e),
            HandlerError::Internal(_) => None,
        }
    }
}

pub type HandlerResult<T = ()> = Result<T, HandlerError>;
