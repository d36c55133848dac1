use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

use mapsense::countdown::Objective;
use mapsense::speech::BackendKind;

#[derive(Debug, Parser)]
#[command(
    name = "mapsense",
    version,
    about = "Spoken game event and objective timer announcer"
)]
pub struct Cli {
    /// Settings file (defaults to ~/.config/mapsense/settings.toml)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value_t = BackendKind::SpdSay)]
    pub backend: BackendKind,
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Read game event messages and control commands from stdin
    Run,
    /// Speak a single phrase
    Say { text: String },
    /// Run one objective countdown in the foreground
    Countdown {
        #[arg(value_enum)]
        objective: Objective,
        #[arg(long, value_parser = humantime::parse_duration)]
        spawn_in: Option<Duration>,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    Doctor,
    Completions {
        #[arg(long, value_enum)]
        shell: ShellArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ShellArg {
    Bash,
    Zsh,
    Fish,
    Elvish,
    Powershell,
}

impl From<ShellArg> for Shell {
    fn from(shell: ShellArg) -> Self {
        match shell {
            ShellArg::Bash => Shell::Bash,
            ShellArg::Zsh => Shell::Zsh,
            ShellArg::Fish => Shell::Fish,
            ShellArg::Elvish => Shell::Elvish,
            ShellArg::Powershell => Shell::PowerShell,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    Show,
    Set(SetArgs),
    Reset,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[arg(long, action = clap::ArgAction::Set)]
    pub kills: Option<bool>,
    #[arg(long, action = clap::ArgAction::Set)]
    pub objectives: Option<bool>,
    #[arg(long, action = clap::ArgAction::Set)]
    pub mia: Option<bool>,
    #[arg(long)]
    pub rate: Option<f64>,
    #[arg(long, action = clap::ArgAction::Set)]
    pub muted: Option<bool>,
}
