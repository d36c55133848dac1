mod cli;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use mapsense::announcer::Announcer;
use mapsense::control::{parse_line, ControlCommand, Input};
use mapsense::countdown::Objective;
use mapsense::settings::{self, Settings, SettingsHandle};
use mapsense::{logging, paths, speech};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::cli::{Cli, Commands, ConfigCommand, SetArgs};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let settings_path = match cli.settings {
        Some(path) => path,
        None => paths::settings_path()?,
    };

    match cli.command {
        Commands::Run => run_session(&settings_path, cli.backend).await,
        Commands::Say { text } => say(&settings_path, cli.backend, text).await,
        Commands::Countdown {
            objective,
            spawn_in,
        } => countdown(&settings_path, cli.backend, objective, spawn_in).await,
        Commands::Config { command } => config(&settings_path, command),
        Commands::Doctor => doctor(&settings_path),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(Shell::from(shell), &mut command, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

fn announcer(settings_path: &Path, backend: speech::BackendKind) -> Result<Announcer> {
    let settings = SettingsHandle::new(settings::load(settings_path)?);
    let backend = speech::build_backend(backend)?;
    Ok(Announcer::new(settings, backend))
}

async fn say(settings_path: &Path, backend: speech::BackendKind, text: String) -> Result<()> {
    let announcer = announcer(settings_path, backend)?;
    if !announcer.say(text) {
        println!("muted; nothing spoken");
    }
    announcer.wait_idle().await;
    Ok(())
}

async fn countdown(
    settings_path: &Path,
    backend: speech::BackendKind,
    objective: Objective,
    spawn_in: Option<Duration>,
) -> Result<()> {
    let mut announcer = announcer(settings_path, backend)?;
    let spawn_in = spawn_in.unwrap_or_else(|| objective.default_spawn());
    let scheduled = announcer.start_objective(objective, spawn_in);
    if scheduled == 0 {
        println!("{}: no milestones left to announce", objective.display_name());
        return Ok(());
    }

    let interrupted = tokio::select! {
        _ = announcer.wait_countdown() => false,
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        announcer.clear_objectives();
        info!("countdown interrupted");
    }
    announcer.wait_idle().await;
    Ok(())
}

async fn run_session(settings_path: &Path, backend: speech::BackendKind) -> Result<()> {
    let mut announcer = announcer(settings_path, backend)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!(settings = %settings_path.display(), "session started");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => Ok(None),
        };
        let Some(line) = line.context("failed to read stdin")? else {
            break;
        };

        let input = match parse_line(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(error) => {
                warn!("skipping input: {error:#}");
                continue;
            }
        };

        match input {
            Input::Events(names) => {
                for name in names {
                    announcer.handle_event(&name);
                }
            }
            Input::Command(ControlCommand::Quit) => break,
            Input::Command(command) => {
                let persist = command.changes_settings();
                apply_command(&mut announcer, command);
                if persist {
                    let current = announcer.settings().snapshot();
                    if let Err(error) = settings::save(settings_path, &current) {
                        warn!("failed to persist settings: {error:#}");
                    }
                }
            }
        }
    }

    announcer.clear_objectives();
    announcer.wait_idle().await;
    info!("session ended");
    Ok(())
}

fn apply_command(announcer: &mut Announcer, command: ControlCommand) {
    match command {
        ControlCommand::Test => {
            announcer.speak_test();
        }
        ControlCommand::StartObjective {
            objective,
            spawn_in,
        } => {
            announcer.start_objective(objective, spawn_in);
        }
        ControlCommand::ClearObjectives => announcer.clear_objectives(),
        ControlCommand::Mute => {
            announcer.settings().update(|s| s.muted = true);
            info!("muted");
        }
        ControlCommand::Unmute => {
            announcer.settings().update(|s| s.muted = false);
            info!("unmuted");
        }
        ControlCommand::Rate(rate) => {
            announcer.settings().update(|s| s.rate = rate);
            info!(rate, "speech rate changed");
        }
        ControlCommand::Toggle { category, enabled } => {
            announcer
                .settings()
                .update(|s| s.set_category(category, enabled));
            info!(?category, enabled, "category toggled");
        }
        ControlCommand::Event(name) => {
            announcer.handle_event(&name);
        }
        ControlCommand::Quit => {}
    }
}

fn config(settings_path: &Path, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let current = settings::load(settings_path)?;
            print!("{}", render_settings(&current)?);
        }
        ConfigCommand::Set(args) => {
            let mut current = settings::load(settings_path)?;
            apply_set(&mut current, args)?;
            settings::save(settings_path, &current)?;
            println!("Settings saved to {}", settings_path.display());
        }
        ConfigCommand::Reset => {
            settings::save(settings_path, &Settings::default())?;
            println!("Settings reset in {}", settings_path.display());
        }
    }
    Ok(())
}

fn apply_set(current: &mut Settings, args: SetArgs) -> Result<()> {
    if let Some(kills) = args.kills {
        current.speak_kills = kills;
    }
    if let Some(objectives) = args.objectives {
        current.speak_objectives = objectives;
    }
    if let Some(mia) = args.mia {
        current.speak_mia = mia;
    }
    if let Some(rate) = args.rate {
        current.rate = settings::validate_rate(rate)?;
    }
    if let Some(muted) = args.muted {
        current.muted = muted;
    }
    Ok(())
}

fn render_settings(current: &Settings) -> Result<String> {
    toml::to_string_pretty(current).context("failed to serialize settings")
}

fn doctor(settings_path: &Path) -> Result<()> {
    let mut has_errors = false;

    match speech::spd_say_path() {
        Some(path) => println!(
            "[ok] speech-dispatcher: found spd-say at {}",
            path.display()
        ),
        None => {
            println!("[error] speech-dispatcher: spd-say not found in PATH");
            has_errors = true;
        }
    }

    match settings::load(settings_path) {
        Ok(_) if settings_path.exists() => {
            println!("[ok] settings: {}", settings_path.display())
        }
        Ok(_) => println!(
            "[info] settings: {} not found, using defaults",
            settings_path.display()
        ),
        Err(error) => {
            println!("[error] settings: {error:#}");
            has_errors = true;
        }
    }

    if has_errors {
        bail!("doctor found critical issues");
    }

    Ok(())
}
