pub mod connection;
pub mod memory;
pub mod models;
pub mod repository;
pub mod sqlite;
