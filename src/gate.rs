use tracing::debug;

use crate::cooldown::{CooldownKey, SharedCooldowns};
use crate::event::EventKind;
use crate::queue::AnnouncementQueue;
use crate::settings::SettingsHandle;

/// What happened to an incoming event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Queued(EventKind),
    Unknown,
    Disabled(EventKind),
    CoolingDown(EventKind),
    Muted(EventKind),
}

/// Turns named game events into announcements, subject to the category
/// toggles and per-event cooldowns.
#[derive(Debug, Clone)]
pub struct EventGate {
    settings: SettingsHandle,
    cooldowns: SharedCooldowns,
    queue: AnnouncementQueue,
}

impl EventGate {
    pub fn new(
        settings: SettingsHandle,
        cooldowns: SharedCooldowns,
        queue: AnnouncementQueue,
    ) -> Self {
        Self {
            settings,
            cooldowns,
            queue,
        }
    }

    pub fn handle(&self, event_name: &str) -> GateOutcome {
        let Some(kind) = EventKind::from_name(event_name) else {
            debug!(event = event_name, "ignoring unknown event");
            return GateOutcome::Unknown;
        };

        let rule = kind.rule();
        let outcome = if !self.settings.allows(rule.category) {
            GateOutcome::Disabled(kind)
        } else if !self.cooldowns.can_say(CooldownKey::Event(kind), rule.cooldown) {
            GateOutcome::CoolingDown(kind)
        } else if self.queue.enqueue(rule.phrase) {
            GateOutcome::Queued(kind)
        } else {
            GateOutcome::Muted(kind)
        };
        debug!(event = event_name, ?outcome, "event handled");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::testing::RecordingBackend;

    fn gate_with(backend: &RecordingBackend) -> (EventGate, AnnouncementQueue, SettingsHandle) {
        let settings = SettingsHandle::default();
        let queue = AnnouncementQueue::spawn(settings.clone(), Arc::new(backend.clone()));
        let gate = EventGate::new(settings.clone(), SharedCooldowns::new(), queue.clone());
        (gate, queue, settings)
    }

    #[tokio::test(start_paused = true)]
    async fn every_known_event_is_announced() {
        let backend = RecordingBackend::default();
        let (gate, queue, _) = gate_with(&backend);

        for kind in EventKind::ALL {
            assert_eq!(gate.handle(kind.name()), GateOutcome::Queued(kind));
        }
        queue.wait_idle().await;
        assert_eq!(
            backend.phrases(),
            vec![
                "You got a kill",
                "Assist",
                "You died",
                "You are back",
                "Dragon taken",
                "Baron taken",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_are_suppressed_until_cooldown_expires() {
        let backend = RecordingBackend::default();
        let (gate, queue, _) = gate_with(&backend);

        assert_eq!(gate.handle("kill"), GateOutcome::Queued(EventKind::Kill));
        assert_eq!(gate.handle("kill"), GateOutcome::CoolingDown(EventKind::Kill));
        assert_eq!(gate.handle("assist"), GateOutcome::Queued(EventKind::Assist));

        tokio::time::advance(Duration::from_millis(1_500)).await;
        assert_eq!(gate.handle("kill"), GateOutcome::Queued(EventKind::Kill));

        queue.wait_idle().await;
        assert_eq!(backend.phrases(), vec!["You got a kill", "Assist", "You got a kill"]);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_and_disabled_events_are_silent() {
        let backend = RecordingBackend::default();
        let (gate, queue, settings) = gate_with(&backend);

        settings.update(|s| s.speak_objectives = false);
        assert_eq!(gate.handle("minions"), GateOutcome::Unknown);
        assert_eq!(gate.handle("dragonKill"), GateOutcome::Disabled(EventKind::DragonKill));
        assert_eq!(gate.handle("death"), GateOutcome::Queued(EventKind::Death));

        queue.wait_idle().await;
        assert_eq!(backend.phrases(), vec!["You died"]);
    }

    #[tokio::test(start_paused = true)]
    async fn muted_event_still_reserves_its_cooldown() {
        let backend = RecordingBackend::default();
        let (gate, _, settings) = gate_with(&backend);

        settings.update(|s| s.muted = true);
        assert_eq!(gate.handle("kill"), GateOutcome::Muted(EventKind::Kill));
        settings.update(|s| s.muted = false);
        assert_eq!(gate.handle("kill"), GateOutcome::CoolingDown(EventKind::Kill));
    }
}
