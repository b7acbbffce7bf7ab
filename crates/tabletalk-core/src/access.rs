//! Chat allow-list enforcement.
//!
//! The policy is a pure predicate over a set of chat ids loaded from
//! configuration at startup. An empty set means the bot serves every chat
//! it is added to; a non-empty set restricts both command handling and
//! message recording to the listed chats.

use std::collections::HashSet;

use tabletalk_types::config::AccessConfig;

/// Decides which chats the bot is willing to serve.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    allowed: HashSet<i64>,
}

impl AccessPolicy {
    pub fn new(allowed_chats: &[i64]) -> Self {
        Self {
            allowed: allowed_chats.iter().copied().collect(),
        }
    }

    pub fn from_config(config: &AccessConfig) -> Self {
        Self::new(&config.allowed_chats)
    }

    /// True when no allow-list was configured at all.
    pub fn is_unrestricted(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Whether the bot should serve this chat.
    pub fn allows(&self, chat_id: i64) -> bool {
        self.allowed.is_empty() || self.allowed.contains(&chat_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allow_list_serves_everyone() {
        let policy = AccessPolicy::new(&[]);
        assert!(policy.is_unrestricted());
        assert!(policy.allows(1));
        assert!(policy.allows(-100_200_300));
    }

    #[test]
    fn listed_chats_are_allowed() {
        let policy = AccessPolicy::new(&[-100_200_300, 42]);
        assert!(!policy.is_unrestricted());
        assert!(policy.allows(-100_200_300));
        assert!(policy.allows(42));
    }

    #[test]
    fn unlisted_chats_are_denied() {
        let policy = AccessPolicy::new(&[-100_200_300]);
        assert!(!policy.allows(-100_200_301));
        assert!(!policy.allows(0));
    }

    #[test]
    fn builds_from_config() {
        let config = AccessConfig {
            allowed_chats: vec![7],
        };
        let policy = AccessPolicy::from_config(&config);
        assert!(policy.allows(7));
        assert!(!policy.allows(8));
    }
}
