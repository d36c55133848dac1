use serde_json::Value;
use std::time::Duration;

use crate::settings::Category;

const COMBAT_COOLDOWN: Duration = Duration::from_millis(1_500);
const OBJECTIVE_COOLDOWN: Duration = Duration::from_millis(4_000);

/// Game events that have a spoken announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Kill,
    Assist,
    Death,
    Respawn,
    DragonKill,
    BaronKill,
}

/// One row of the event table: which toggle applies, how long to stay quiet
/// afterwards and what to say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRule {
    pub category: Category,
    pub cooldown: Duration,
    pub phrase: &'static str,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::Kill,
        EventKind::Assist,
        EventKind::Death,
        EventKind::Respawn,
        EventKind::DragonKill,
        EventKind::BaronKill,
    ];

    /// Wire name as delivered by the game event feed.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Kill => "kill",
            EventKind::Assist => "assist",
            EventKind::Death => "death",
            EventKind::Respawn => "respawn",
            EventKind::DragonKill => "dragonKill",
            EventKind::BaronKill => "baronKill",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn rule(self) -> EventRule {
        let (category, cooldown, phrase) = match self {
            EventKind::Kill => (Category::Kills, COMBAT_COOLDOWN, "You got a kill"),
            EventKind::Assist => (Category::Kills, COMBAT_COOLDOWN, "Assist"),
            EventKind::Death => (Category::Kills, COMBAT_COOLDOWN, "You died"),
            EventKind::Respawn => (Category::Kills, COMBAT_COOLDOWN, "You are back"),
            EventKind::DragonKill => (Category::Objectives, OBJECTIVE_COOLDOWN, "Dragon taken"),
            EventKind::BaronKill => (Category::Objectives, OBJECTIVE_COOLDOWN, "Baron taken"),
        };
        EventRule {
            category,
            cooldown,
            phrase,
        }
    }
}

/// Collects event names from a game event message.
///
/// Accepts `{"events":[{"name":..}]}`, a bare `{"name":..}` event, or an array
/// of either. Anything else yields no names.
pub fn event_names(message: &Value) -> Vec<String> {
    let mut names = Vec::new();
    collect_names(message, &mut names);
    names
}

fn collect_names(message: &Value, names: &mut Vec<String>) {
    match message {
        Value::Array(items) => {
            for item in items {
                collect_names(item, names);
            }
        }
        Value::Object(object) => {
            if let Some(events) = object.get("events").and_then(Value::as_array) {
                names.extend(
                    events
                        .iter()
                        .filter_map(|event| event.get("name").and_then(Value::as_str))
                        .map(ToOwned::to_owned),
                );
            } else if let Some(name) = object.get("name").and_then(Value::as_str) {
                names.push(name.to_string());
            }
        }
        _ => {}
    }
}
