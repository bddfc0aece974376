pub mod api;
pub mod game_setup;
pub mod health;
pub mod notifier;
pub mod reminder;
pub mod scheduler;
pub mod sessions;
pub mod teams;
