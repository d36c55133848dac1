//! Objective countdowns.
//!
//! A plan is the set of milestones ("in one minute" .. "is up") leading to
//! an objective spawn. Starting a plan replaces the previous one; only
//! milestones still in the future are scheduled.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cooldown::{CooldownKey, SharedCooldowns};
use crate::queue::AnnouncementQueue;
use crate::settings::{Category, SettingsHandle};

pub const MILESTONE_COOLDOWN: Duration = Duration::from_secs(6);

/// Latest deadline a milestone is ever scheduled for.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Objective {
    Dragon,
    Baron,
}

impl Objective {
    pub fn display_name(self) -> &'static str {
        match self {
            Objective::Dragon => "Dragon",
            Objective::Baron => "Baron",
        }
    }

    /// Spawn delay used when a countdown is started without an explicit time.
    pub fn default_spawn(self) -> Duration {
        match self {
            Objective::Dragon => Duration::from_secs(5 * 60),
            Objective::Baron => Duration::from_secs(20 * 60),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dragon" | "drake" => Some(Objective::Dragon),
            "baron" => Some(Objective::Baron),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Milestone {
    OneMinute,
    ThirtySeconds,
    FifteenSeconds,
    Up,
}

impl Milestone {
    pub const ALL: [Milestone; 4] = [
        Milestone::OneMinute,
        Milestone::ThirtySeconds,
        Milestone::FifteenSeconds,
        Milestone::Up,
    ];

    /// How long before the spawn this milestone is announced.
    pub fn lead(self) -> Duration {
        match self {
            Milestone::OneMinute => Duration::from_secs(60),
            Milestone::ThirtySeconds => Duration::from_secs(30),
            Milestone::FifteenSeconds => Duration::from_secs(15),
            Milestone::Up => Duration::ZERO,
        }
    }

    pub fn phrase(self, objective: Objective) -> String {
        let name = objective.display_name();
        match self {
            Milestone::OneMinute => format!("{name} in one minute"),
            Milestone::ThirtySeconds => format!("{name} in thirty seconds"),
            Milestone::FifteenSeconds => format!("{name} in fifteen seconds"),
            Milestone::Up => format!("{name} is up"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMilestone {
    pub offset: Duration,
    pub milestone: Milestone,
    pub phrase: String,
    pub key: CooldownKey,
}

/// Milestones for an objective spawning `spawn_in` from now, in firing order.
///
/// Milestones whose lead exceeds `spawn_in` are already past and left out.
pub fn plan(objective: Objective, spawn_in: Duration) -> Vec<PlannedMilestone> {
    Milestone::ALL
        .into_iter()
        .filter_map(|milestone| {
            let offset = spawn_in.checked_sub(milestone.lead())?;
            Some(PlannedMilestone {
                offset,
                milestone,
                phrase: milestone.phrase(objective),
                key: CooldownKey::Milestone(objective, milestone),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneOutcome {
    Queued,
    Disabled,
    CoolingDown,
    Muted,
}

#[derive(Debug)]
struct ActivePlan {
    objective: Objective,
    task: JoinHandle<()>,
}

/// Schedules at most one countdown plan at a time.
#[derive(Debug)]
pub struct CountdownPlanner {
    settings: SettingsHandle,
    cooldowns: SharedCooldowns,
    queue: AnnouncementQueue,
    active: Option<ActivePlan>,
}

impl CountdownPlanner {
    pub fn new(
        settings: SettingsHandle,
        cooldowns: SharedCooldowns,
        queue: AnnouncementQueue,
    ) -> Self {
        Self {
            settings,
            cooldowns,
            queue,
            active: None,
        }
    }

    /// Replaces any running plan with a countdown to `objective` spawning in
    /// `spawn_in`. Returns the number of milestones scheduled.
    pub fn start_objective(&mut self, objective: Objective, spawn_in: Duration) -> usize {
        self.clear_objectives();

        let milestones = plan(objective, spawn_in);
        info!(
            objective = objective.display_name(),
            spawn_in_secs = spawn_in.as_secs(),
            milestones = milestones.len(),
            "starting objective countdown"
        );
        if milestones.is_empty() {
            return 0;
        }

        let scheduled = milestones.len();
        let start = Instant::now();
        let settings = self.settings.clone();
        let cooldowns = self.cooldowns.clone();
        let queue = self.queue.clone();
        let task = tokio::spawn(async move {
            for planned in milestones {
                tokio::time::sleep_until(deadline(start, planned.offset)).await;
                let outcome = fire(&planned, &settings, &cooldowns, &queue);
                debug!(phrase = %planned.phrase, ?outcome, "milestone fired");
            }
        });
        self.active = Some(ActivePlan { objective, task });
        scheduled
    }

    /// Cancels the running plan, if any. None of its remaining milestones fire.
    pub fn clear_objectives(&mut self) {
        if let Some(active) = self.active.take() {
            active.task.abort();
            info!(objective = active.objective.display_name(), "objective timers cleared");
        }
    }

    /// True while a plan still has milestones left to fire.
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.task.is_finished())
    }

    pub fn active_objective(&self) -> Option<Objective> {
        self.active
            .as_ref()
            .filter(|active| !active.task.is_finished())
            .map(|active| active.objective)
    }

    /// Resolves when the running plan has fired its last milestone, or
    /// immediately when idle.
    pub async fn wait_finished(&mut self) {
        if let Some(active) = self.active.as_mut() {
            if let Err(error) = (&mut active.task).await {
                if error.is_panic() {
                    warn!(objective = active.objective.display_name(), "countdown task panicked");
                }
            }
        }
        self.active = None;
    }
}

impl Drop for CountdownPlanner {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.task.abort();
        }
    }
}

/// `start + offset`, capped at [`FAR_FUTURE`] so huge spawn times cannot
/// overflow the clock.
fn deadline(start: Instant, offset: Duration) -> Instant {
    start
        .checked_add(offset.min(FAR_FUTURE))
        .unwrap_or(start)
}

fn fire(
    planned: &PlannedMilestone,
    settings: &SettingsHandle,
    cooldowns: &SharedCooldowns,
    queue: &AnnouncementQueue,
) -> MilestoneOutcome {
    if !settings.allows(Category::Objectives) {
        return MilestoneOutcome::Disabled;
    }
    if !cooldowns.can_say(planned.key, MILESTONE_COOLDOWN) {
        return MilestoneOutcome::CoolingDown;
    }
    if queue.enqueue(planned.phrase.clone()) {
        MilestoneOutcome::Queued
    } else {
        MilestoneOutcome::Muted
    }
}
