use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_slate_home;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub reminders: RemindersSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreSection {
    /// Database path. Defaults to ~/.slate/tasks.db when unset.
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemindersSection {
    /// Where reminder emails go. Required before `slate watch` will run.
    pub recipient: Option<String>,

    /// Seconds between evaluation cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// External delivery command; recipient, subject, and body are appended
    /// as three arguments. Example: ["mail-sender", "--account", "school"].
    pub notify_command: Option<Vec<String>>,
}

fn default_interval_secs() -> u64 {
    60
}

impl Default for RemindersSection {
    fn default() -> Self {
        Self {
            recipient: None,
            interval_secs: default_interval_secs(),
            notify_command: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_slate_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn config_check() -> Result<()> {
    let cfg = load_config()?;

    println!("Slate config:\n");
    println!(
        "- store.db_path: {}",
        cfg.store
            .db_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<default ~/.slate/tasks.db>".to_string())
    );
    println!(
        "- reminders.recipient: {}",
        cfg.reminders.recipient.as_deref().unwrap_or("<not set>")
    );
    println!("- reminders.interval_secs: {}", cfg.reminders.interval_secs);
    println!(
        "- reminders.notify_command: {}",
        cfg.reminders
            .notify_command
            .as_ref()
            .map(|c| c.join(" "))
            .unwrap_or_else(|| "<not set, watch requires --dry-run>".to_string())
    );

    if cfg.reminders.recipient.is_none() {
        println!("\nWhat to configure next in ~/.slate/config.toml:");
        println!("[reminders]");
        println!("recipient = \"you@example.com\"");
        println!("interval_secs = 60");
        println!("notify_command = [\"mail-sender\"]");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_gets_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.reminders.interval_secs, 60);
        assert!(cfg.reminders.recipient.is_none());
        assert!(cfg.store.db_path.is_none());
    }

    #[test]
    fn partial_reminders_section_parses() {
        let cfg: Config = toml::from_str("[reminders]\nrecipient = \"me@school.edu\"\n").unwrap();
        assert_eq!(cfg.reminders.recipient.as_deref(), Some("me@school.edu"));
        assert_eq!(cfg.reminders.interval_secs, 60);
    }
}
