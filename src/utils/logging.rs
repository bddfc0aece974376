use tracing::{debug, error, info, warn};

/// Logs command start with consistent format
pub fn log_command_start(command: &str, user: &str, user_id: i64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("CMD_START: {} by {}({}) in chat {} - {}", command, user, user_id, chat_id, d),
        None => info!("CMD_START: {} by {}({}) in chat {}", command, user, user_id, chat_id),
    }
}

/// Logs command completion with consistent format
pub fn log_command_success(command: &str, user: &str, user_id: i64, chat_id: i64) {
    info!("CMD_SUCCESS: {} by {}({}) in chat {}", command, user, user_id, chat_id);
}

/// Logs a command rejected because of what the user asked for
pub fn log_command_rejected(command: &str, user: &str, user_id: i64, chat_id: i64, reason: &str) {
    warn!("CMD_REJECTED: {} by {}({}) in chat {} - {}", command, user, user_id, chat_id, reason);
}

/// Logs command errors with consistent format
pub fn log_command_error(command: &str, user: &str, user_id: i64, chat_id: i64, error: &str) {
    error!("CMD_ERROR: {} by {}({}) in chat {} - {}", command, user, user_id, chat_id, error);
}

/// Logs validation errors with consistent format
pub fn log_validation_error(command: &str, field: &str, error: &str, user_id: i64) {
    warn!("VALIDATION_ERROR: {} - field '{}' invalid: {} - user {}", command, field, error, user_id);
}

/// Logs database operations with consistent format
pub fn log_database_operation(operation: &str, table: &str, details: Option<&str>) {
    match details {
        Some(d) => debug!("DB_OP: {} on {} - {}", operation, table, d),
        None => debug!("DB_OP: {} on {}", operation, table),
    }
}

/// Logs database errors with consistent format
pub fn log_database_error(operation: &str, table: &str, error: &str, details: Option<&str>) {
    match details {
        Some(d) => error!("DB_ERROR: {} on {} failed: {} - {}", operation, table, error, d),
        None => error!("DB_ERROR: {} on {} failed: {}", operation, table, error),
    }
}

/// Logs start-time reminder lifecycle events
pub fn log_reminder_event(event: &str, game_id: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("REMINDER: {} for game {} - {}", event, game_id, d),
        None => info!("REMINDER: {} for game {}", event, game_id),
    }
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
