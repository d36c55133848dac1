use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::ValueEnum;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::Command;

/// Renders one utterance.
///
/// `speak` resolves once the utterance has finished playing. Any failure,
/// including a backend that refuses the request outright, is an `Err`.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn speak(&self, text: &str, rate: f64) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum BackendKind {
    #[default]
    SpdSay,
    Console,
}

pub fn spd_say_path() -> Option<PathBuf> {
    which::which("spd-say").ok()
}

pub fn build_backend(kind: BackendKind) -> Result<Arc<dyn SpeechBackend>> {
    match kind {
        BackendKind::SpdSay => Ok(Arc::new(SpdSayBackend::locate()?)),
        BackendKind::Console => Ok(Arc::new(ConsoleBackend)),
    }
}

/// Maps a playback rate multiplier onto speech-dispatcher's -100..=100 scale.
pub fn spd_rate(rate: f64) -> i32 {
    ((rate - 1.0) * 100.0).round().clamp(-100.0, 100.0) as i32
}

/// Arguments for one blocking `spd-say` call. `--` keeps phrases that start
/// with `-` from being read as options.
pub fn spd_say_args(text: &str, rate: f64) -> Vec<String> {
    vec![
        "--wait".to_string(),
        "--rate".to_string(),
        spd_rate(rate).to_string(),
        "--".to_string(),
        text.to_string(),
    ]
}

#[derive(Debug, Clone)]
pub struct SpdSayBackend {
    program: PathBuf,
}

impl SpdSayBackend {
    pub fn locate() -> Result<Self> {
        let program =
            spd_say_path().context("spd-say not found in PATH; install speech-dispatcher")?;
        Ok(Self { program })
    }
}

#[async_trait]
impl SpeechBackend for SpdSayBackend {
    async fn speak(&self, text: &str, rate: f64) -> Result<()> {
        let status = Command::new(&self.program)
            .args(spd_say_args(text, rate))
            .status()
            .await
            .with_context(|| format!("failed to execute {}", self.program.display()))?;
        if !status.success() {
            bail!("spd-say exited with {}", status);
        }

        Ok(())
    }
}

/// Prints phrases instead of speaking them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleBackend;

#[async_trait]
impl SpeechBackend for ConsoleBackend {
    async fn speak(&self, text: &str, rate: f64) -> Result<()> {
        tracing::trace!(rate, "console backend");
        println!("say: {text}");
        Ok(())
    }
}
