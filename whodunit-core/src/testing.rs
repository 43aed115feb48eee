//! Testing utilities for the deduction game.
//!
//! This module provides tools for integration testing:
//! - `ScriptedResponder` for deterministic dialogue without API calls
//! - `offline_config` for seeded, fully scripted game setups

use crate::game::GameConfig;
use crate::responder::{Responder, ResponderError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A responder that returns scripted replies in order.
///
/// Use this for deterministic tests without API calls. Once the queue runs
/// dry every call fails, which exercises the callers' scripted fallbacks.
pub struct ScriptedResponder {
    /// Replies to return, front first.
    replies: Mutex<VecDeque<String>>,
    /// What `available()` reports.
    available: bool,
    /// Fail every call regardless of the queue.
    always_fail: bool,
}

impl ScriptedResponder {
    /// Create a responder with a queue of scripted replies.
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            available: true,
            always_fail: false,
        }
    }

    /// A responder that reports itself unavailable. Agents refuse to bind
    /// it and stay fully scripted.
    pub fn unavailable() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            available: false,
            always_fail: false,
        }
    }

    /// An available responder whose every call fails, for exercising
    /// fallback paths.
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            available: true,
            always_fail: true,
        }
    }

    /// Add a reply to the back of the queue.
    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.lock_replies().push_back(reply.into());
    }

    /// Number of replies still queued.
    pub fn remaining(&self) -> usize {
        self.lock_replies().len()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        self.replies.lock().expect("scripted reply queue poisoned")
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    fn available(&self) -> bool {
        self.available
    }

    async fn generate(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<String, ResponderError> {
        if !self.available {
            return Err(ResponderError::Unavailable);
        }
        if self.always_fail {
            return Err(ResponderError::Failed("scripted failure".to_string()));
        }
        self.lock_replies()
            .pop_front()
            .ok_or_else(|| ResponderError::Failed("no more scripted replies".to_string()))
    }
}

/// Config for a seeded, fully scripted offline game.
pub fn offline_config(seed: u64) -> GameConfig {
    GameConfig::new().with_seed(seed).with_offline(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let responder = ScriptedResponder::new(vec!["one".to_string(), "two".to_string()]);
        assert!(responder.available());
        assert_eq!(responder.remaining(), 2);

        assert_eq!(responder.generate("s", "u").await.unwrap(), "one");
        assert_eq!(responder.generate("s", "u").await.unwrap(), "two");

        // Exhausted queue turns into failures.
        let error = responder.generate("s", "u").await.unwrap_err();
        assert!(matches!(error, ResponderError::Failed(_)));
    }

    #[tokio::test]
    async fn test_queue_reply_appends() {
        let responder = ScriptedResponder::new(vec!["one".to_string()]);
        responder.queue_reply("two");

        assert_eq!(responder.generate("s", "u").await.unwrap(), "one");
        assert_eq!(responder.generate("s", "u").await.unwrap(), "two");
    }

    #[tokio::test]
    async fn test_unavailable_responder() {
        let responder = ScriptedResponder::unavailable();
        assert!(!responder.available());

        let error = responder.generate("s", "u").await.unwrap_err();
        assert!(matches!(error, ResponderError::Unavailable));
    }

    #[tokio::test]
    async fn test_failing_responder() {
        let responder = ScriptedResponder::failing();
        assert!(responder.available());

        let error = responder.generate("s", "u").await.unwrap_err();
        assert!(matches!(error, ResponderError::Failed(_)));
    }

    #[test]
    fn test_offline_config_shape() {
        let config = offline_config(42);
        assert_eq!(config.seed, Some(42));
        assert!(config.offline);
    }
}
