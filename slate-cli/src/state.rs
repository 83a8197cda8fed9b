use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn slate_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".slate"))
}

pub fn ensure_slate_home() -> Result<PathBuf> {
    let dir = slate_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_db_path() -> Result<PathBuf> {
    Ok(ensure_slate_home()?.join("tasks.db"))
}
