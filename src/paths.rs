use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not resolve home directory")
}

pub fn settings_path() -> Result<PathBuf> {
    Ok(home_dir()?
        .join(".config")
        .join("mapsense")
        .join("settings.toml"))
}
