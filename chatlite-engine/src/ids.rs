//! Client-side id generation

use chatlite_core::MessageId;
use chrono::{SecondsFormat, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Issues provisional message ids and new-session tokens
///
/// Provisional ids are unique for the lifetime of the process, not just
/// within one session, because concurrent sends resolve by id.
#[derive(Debug, Default)]
pub struct IdGenerator {
    sequence: AtomicU64,
    last_session_ms: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids for the provisional user message and assistant placeholder of one send
    pub fn provisional_pair(&self) -> (MessageId, MessageId) {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let stamp = Utc::now().timestamp_micros();
        (
            MessageId::provisional(format!("temp-user-{stamp}-{seq}")),
            MessageId::provisional(format!("temp-bot-{stamp}-{seq}")),
        )
    }

    /// A timestamp token for a session that does not exist remotely yet
    ///
    /// Tokens are strictly increasing: two calls within the same
    /// millisecond get consecutive milliseconds.
    pub fn session_token(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_session_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        let millis = now.max(previous + 1);

        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
