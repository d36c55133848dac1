//! Line protocol for the interactive `run` session.
//!
//! A line starting with `{` or `[` is a game event message; anything else is
//! a control command such as `dragon 90s`, `mute` or `rate 1.3`.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::time::Duration;

use crate::countdown::Objective;
use crate::event::event_names;
use crate::settings::{validate_rate, Category};

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Events(Vec<String>),
    Command(ControlCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    Test,
    StartObjective {
        objective: Objective,
        spawn_in: Duration,
    },
    ClearObjectives,
    Mute,
    Unmute,
    Rate(f64),
    Toggle {
        category: Category,
        enabled: bool,
    },
    Event(String),
    Quit,
}

impl ControlCommand {
    /// Whether applying this command changes persisted settings.
    pub fn changes_settings(&self) -> bool {
        matches!(
            self,
            ControlCommand::Mute
                | ControlCommand::Unmute
                | ControlCommand::Rate(_)
                | ControlCommand::Toggle { .. }
        )
    }
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Input>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if line.starts_with('{') || line.starts_with('[') {
        let message =
            serde_json::from_str::<Value>(line).context("invalid game event message")?;
        return Ok(Some(Input::Events(event_names(&message))));
    }

    parse_command(line).map(|command| Some(Input::Command(command)))
}

fn parse_command(line: &str) -> Result<ControlCommand> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        bail!("empty command");
    };
    let argument = words.next();
    if words.next().is_some() {
        bail!("too many arguments to {verb}");
    }

    let verb = verb.to_ascii_lowercase();
    let command = match (verb.as_str(), argument) {
        ("test" | "t", None) => ControlCommand::Test,
        ("clear", None) => ControlCommand::ClearObjectives,
        ("mute", None) => ControlCommand::Mute,
        ("unmute", None) => ControlCommand::Unmute,
        ("quit" | "exit", None) => ControlCommand::Quit,
        ("rate", Some(value)) => {
            let rate = value
                .parse::<f64>()
                .with_context(|| format!("invalid rate {value:?}"))?;
            ControlCommand::Rate(validate_rate(rate)?)
        }
        ("event", Some(name)) => ControlCommand::Event(name.to_string()),
        ("kills", Some(value)) => toggle(Category::Kills, value)?,
        ("objectives", Some(value)) => toggle(Category::Objectives, value)?,
        ("mia", Some(value)) => toggle(Category::Mia, value)?,
        (name, spawn) => match Objective::from_name(name) {
            Some(objective) => ControlCommand::StartObjective {
                objective,
                spawn_in: match spawn {
                    Some(value) => humantime::parse_duration(value)
                        .with_context(|| format!("invalid spawn time {value:?}"))?,
                    None => objective.default_spawn(),
                },
            },
            None => bail!("unknown command {line:?}"),
        },
    };
    Ok(command)
}

fn toggle(category: Category, value: &str) -> Result<ControlCommand> {
    let enabled = match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => true,
        "off" | "false" | "no" => false,
        other => bail!("expected on or off, got {other:?}"),
    };
    Ok(ControlCommand::Toggle { category, enabled })
}
