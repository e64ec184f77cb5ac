//! Change notification feed.
//!
//! Managers publish a [`ChangeEvent`] after each successful mutation so a
//! caching layer can invalidate the state it mirrors. The feed is purely
//! advisory; the state machines never read from it.

use crossbeam::channel::{unbounded, Receiver, Sender};
use std::sync::Mutex;
use uuid::Uuid;

/// A domain mutation that invalidates cached state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A membership was created, removed, or had its role changed.
    MembershipChanged { club_id: Uuid, cook_id: Uuid },
    /// A join request was approved or rejected.
    RequestDecided {
        club_id: Uuid,
        cook_id: Uuid,
        approved: bool,
    },
    /// A club was deleted along with everything attached to it.
    ClubDeleted { club_id: Uuid },
    /// A chat message was posted.
    MessagePosted { club_id: Uuid },
    /// A challenge entry was created or changed status.
    ParticipationChanged { challenge_id: Uuid, cook_id: Uuid },
    /// A club registration for a challenge was added or removed.
    ClubRegistrationChanged { challenge_id: Uuid, club_id: Uuid },
    /// Experience was credited to a cook.
    ExperienceGranted { cook_id: Uuid, amount: u32 },
}

/// Fan-out feed of change events.
pub struct ChangeFeed {
    subscribers: Mutex<Vec<Sender<ChangeEvent>>>,
}

impl ChangeFeed {
    /// Create a new feed with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe to the feed. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        let (tx, rx) = unbounded();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    /// Publish an event to all live subscribers.
    pub fn publish(&self, event: ChangeEvent) {
        let Ok(mut subscribers) = self.subscribers.lock() else {
            return;
        };
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}
