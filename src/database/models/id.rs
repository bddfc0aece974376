use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Storage identifier shared by every persisted record.
///
/// Rendered as 32 lowercase hex characters, which is also the text of the
/// shareable game code (`/<id>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_simple_hex() {
        let id = RecordId::new();
        let text = id.to_string();
        assert_eq!(text.len(), 32);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_parse_accepts_both_uuid_forms() {
        let id = RecordId::new();
        let simple: RecordId = id.to_string().parse().unwrap();
        let hyphenated: RecordId = id.0.hyphenated().to_string().parse().unwrap();
        assert_eq!(simple, id);
        assert_eq!(hyphenated, id);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-a-game".parse::<RecordId>().is_err());
        assert!("".parse::<RecordId>().is_err());
    }
}
