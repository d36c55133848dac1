use std::sync::Arc;
use std::time::Duration;

use crate::cooldown::SharedCooldowns;
use crate::countdown::{CountdownPlanner, Objective};
use crate::gate::{EventGate, GateOutcome};
use crate::queue::AnnouncementQueue;
use crate::settings::SettingsHandle;
use crate::speech::SpeechBackend;

pub const TEST_PHRASE: &str = "MapSense ready";

/// One announcement session: the event gate and the countdown planner
/// feeding a single speech queue, sharing one cooldown table.
///
/// Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct Announcer {
    settings: SettingsHandle,
    queue: AnnouncementQueue,
    gate: EventGate,
    planner: CountdownPlanner,
}

impl Announcer {
    pub fn new(settings: SettingsHandle, backend: Arc<dyn SpeechBackend>) -> Self {
        let cooldowns = SharedCooldowns::new();
        let queue = AnnouncementQueue::spawn(settings.clone(), backend);
        let gate = EventGate::new(settings.clone(), cooldowns.clone(), queue.clone());
        let planner = CountdownPlanner::new(settings.clone(), cooldowns, queue.clone());
        Self {
            settings,
            queue,
            gate,
            planner,
        }
    }

    pub fn settings(&self) -> &SettingsHandle {
        &self.settings
    }

    pub fn handle_event(&self, event_name: &str) -> GateOutcome {
        self.gate.handle(event_name)
    }

    /// Queues a phrase directly, bypassing toggles and cooldowns but not mute.
    pub fn say(&self, phrase: impl Into<String>) -> bool {
        self.queue.enqueue(phrase)
    }

    pub fn speak_test(&self) -> bool {
        self.say(TEST_PHRASE)
    }

    pub fn start_objective(&mut self, objective: Objective, spawn_in: Duration) -> usize {
        self.planner.start_objective(objective, spawn_in)
    }

    pub fn clear_objectives(&mut self) {
        self.planner.clear_objectives();
    }

    pub fn countdown_active(&self) -> Option<Objective> {
        self.planner.active_objective()
    }

    pub async fn wait_countdown(&mut self) {
        self.planner.wait_finished().await;
    }

    pub async fn wait_idle(&self) {
        self.queue.wait_idle().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBackend;

    #[tokio::test(start_paused = true)]
    async fn events_and_countdowns_share_one_channel() {
        let backend = RecordingBackend::with_utterance(Duration::from_secs(2));
        let mut announcer = Announcer::new(SettingsHandle::default(), Arc::new(backend.clone()));

        announcer.start_objective(Objective::Dragon, Duration::from_secs(1));
        assert!(announcer.speak_test());
        assert_eq!(
            announcer.handle_event("kill"),
            GateOutcome::Queued(crate::event::EventKind::Kill)
        );

        announcer.wait_countdown().await;
        announcer.wait_idle().await;
        assert_eq!(
            backend.phrases(),
            vec![TEST_PHRASE, "You got a kill", "Dragon is up"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn independent_instances_do_not_share_cooldowns() {
        let backend = RecordingBackend::default();
        let first = Announcer::new(SettingsHandle::default(), Arc::new(backend.clone()));
        let second = Announcer::new(SettingsHandle::default(), Arc::new(backend.clone()));

        assert!(matches!(first.handle_event("baronKill"), GateOutcome::Queued(_)));
        assert!(matches!(second.handle_event("baronKill"), GateOutcome::Queued(_)));
        assert!(matches!(first.handle_event("baronKill"), GateOutcome::CoolingDown(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn clear_without_plan_is_a_no_op() {
        let backend = Arc::new(RecordingBackend::default());
        let mut announcer = Announcer::new(SettingsHandle::default(), backend);
        announcer.clear_objectives();
        assert_eq!(announcer.countdown_active(), None);
    }
}
