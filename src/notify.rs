//! Real-time push to connected users.
//!
//! Delivery is fire-and-forget: nothing is acknowledged, retried, or queued
//! for users who are not listening at the time.

use log::{debug, warn};
use serde_json::Value;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

/// Pushes a payload to one user.
pub trait NotificationSender: Send + Sync {
    fn deliver(&self, user_id: Uuid, payload: Value);
}

#[derive(Debug, Clone)]
struct Push {
    user_id: Uuid,
    payload: Value,
}

/// In-process fan-out over a broadcast channel.
///
/// Each [`Subscription`] sees only the payloads addressed to its own user.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    sender: broadcast::Sender<Push>,
}

impl NotificationHub {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Starts receiving pushes addressed to `user_id`.
    pub fn subscribe(&self, user_id: Uuid) -> Subscription {
        Subscription {
            user_id,
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl NotificationSender for NotificationHub {
    fn deliver(&self, user_id: Uuid, payload: Value) {
        match self.sender.send(Push { user_id, payload }) {
            Ok(listeners) => debug!("pushed notification for {} to {} listeners", user_id, listeners),
            // No subscribers at all; the push is dropped.
            Err(_) => debug!("no listeners for notification to {}", user_id),
        }
    }
}

pub struct Subscription {
    user_id: Uuid,
    receiver: broadcast::Receiver<Push>,
}

impl Subscription {
    /// Waits for the next payload for this user.
    ///
    /// Returns `None` once the hub is gone. Payloads missed because the
    /// subscriber fell behind are skipped.
    pub async fn recv(&mut self) -> Option<Value> {
        loop {
            match self.receiver.recv().await {
                Ok(push) if push.user_id == self.user_id => return Some(push.payload),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("subscriber {} lagged, skipped {} pushes", self.user_id, skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
