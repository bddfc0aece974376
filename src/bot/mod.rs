pub mod commands;
pub mod dispatcher;
pub mod events;
pub mod handlers;
pub mod views;
