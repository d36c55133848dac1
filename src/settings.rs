use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

pub const DEFAULT_RATE: f64 = 1.1;

/// Which toggle in [`Settings`] governs an announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Kills,
    Objectives,
    Mia,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub speak_kills: bool,
    pub speak_objectives: bool,
    pub speak_mia: bool,
    pub rate: f64,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speak_kills: true,
            speak_objectives: true,
            speak_mia: true,
            rate: DEFAULT_RATE,
            muted: false,
        }
    }
}

impl Settings {
    pub fn allows(&self, category: Category) -> bool {
        match category {
            Category::Kills => self.speak_kills,
            Category::Objectives => self.speak_objectives,
            Category::Mia => self.speak_mia,
        }
    }

    pub fn set_category(&mut self, category: Category, enabled: bool) {
        match category {
            Category::Kills => self.speak_kills = enabled,
            Category::Objectives => self.speak_objectives = enabled,
            Category::Mia => self.speak_mia = enabled,
        }
    }
}

pub fn validate_rate(rate: f64) -> Result<f64> {
    if !rate.is_finite() || rate <= 0.0 {
        bail!("speech rate must be a positive number, got {rate}");
    }
    Ok(rate)
}

pub fn load(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(Settings::default());
    }

    let settings = toml::from_str::<Settings>(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    validate_rate(settings.rate).with_context(|| format!("invalid {}", path.display()))?;
    Ok(settings)
}

pub fn save(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let raw = toml::to_string_pretty(settings).context("failed to serialize settings")?;
    fs::write(path, format!("{raw}\n"))
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Live settings shared by the queue, the gate and scheduled milestones.
///
/// Readers always observe the latest value; nothing is captured ahead of use.
#[derive(Debug, Clone)]
pub struct SettingsHandle {
    inner: Arc<watch::Sender<Settings>>,
}

impl SettingsHandle {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(watch::Sender::new(settings)),
        }
    }

    pub fn snapshot(&self) -> Settings {
        self.inner.borrow().clone()
    }

    pub fn rate(&self) -> f64 {
        self.inner.borrow().rate
    }

    pub fn muted(&self) -> bool {
        self.inner.borrow().muted
    }

    pub fn allows(&self, category: Category) -> bool {
        self.inner.borrow().allows(category)
    }

    pub fn update(&self, apply: impl FnOnce(&mut Settings)) {
        self.inner.send_modify(apply);
    }
}

impl Default for SettingsHandle {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
