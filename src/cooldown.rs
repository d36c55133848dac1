//! Per-key announcement cooldowns.
//!
//! Keys are namespaced by producer so an event can never suppress a
//! countdown milestone (or the other way round) by sharing a name.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::countdown::{Milestone, Objective};
use crate::event::EventKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooldownKey {
    Event(EventKind),
    Milestone(Objective, Milestone),
}

/// Maps each key to the instant before which it stays silent.
///
/// Entries are overwritten on every accepted check and never removed; an
/// expired entry behaves exactly like an absent one.
#[derive(Debug, Default)]
pub struct CooldownTable {
    until: HashMap<CooldownKey, Instant>,
}

impl CooldownTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_say(&mut self, key: CooldownKey, duration: Duration) -> bool {
        self.can_say_at(key, duration, Instant::now())
    }

    /// Accepts and reserves `key` for `duration` unless it is still cooling
    /// down at `now`. A rejected check leaves the table untouched.
    pub fn can_say_at(&mut self, key: CooldownKey, duration: Duration, now: Instant) -> bool {
        if let Some(until) = self.until.get(&key) {
            if now < *until {
                return false;
            }
        }
        self.until.insert(key, now + duration);
        true
    }

    pub fn len(&self) -> usize {
        self.until.len()
    }

    pub fn is_empty(&self) -> bool {
        self.until.is_empty()
    }
}

/// The cooldown table shared by the event gate and scheduled milestones.
#[derive(Debug, Clone, Default)]
pub struct SharedCooldowns {
    inner: Arc<Mutex<CooldownTable>>,
}

impl SharedCooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_say(&self, key: CooldownKey, duration: Duration) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .can_say(key, duration)
    }
}
