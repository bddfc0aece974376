//! # Sports Games Bot
//!
//! A Telegram bot for organising informal team sports games.
//!
//! ## Features
//! - Step-by-step game setup in a private chat (sport, privacy, name, team size, start time)
//! - Shareable game codes that post a live team sheet into group chats
//! - Two capacity-bounded teams per game, joined with inline buttons
//! - A reminder to every player an hour before a private game starts
//! - HTTP CRUD access to players, games and teams
//! - Persistent storage with SQLite

/// Bot command parsing, event routing and message rendering
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, repository port and its SQLite and in-memory backends
pub mod database;
/// Domain errors and the dispatcher-facing error type
pub mod error;
/// Game setup, team assignment, reminders, chat transport and HTTP services
pub mod services;
/// Utility functions for datetime, validation, feedback and logging
pub mod utils;
