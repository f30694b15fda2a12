//! Provides a ConfigManager to read and refresh the target table from files.
//!

use color_eyre::Result;
use config;
use log::*;
use notify::{RecommendedWatcher, Watcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedSender;

use crate::event::{AppEvent, Event};

pub const DEFAULT_FILE: &str = "promon.toml";

/// One monitorable entry in the picker. `image` is the executable name to
/// look for in the live process table; leaving it out makes the entry sample
/// the whole system instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub label: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromonConfig {
    #[serde(default = "default_targets")]
    pub targets: Vec<Target>,
    /// Used whenever the duration entry is blank or not a positive number.
    #[serde(default = "default_duration_secs")]
    pub default_duration: u32,
}

impl Default for PromonConfig {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            default_duration: default_duration_secs(),
        }
    }
}

fn default_duration_secs() -> u32 {
    30
}

fn default_targets() -> Vec<Target> {
    [
        ("System", None),
        ("Visual Studio Code", Some("Code.exe")),
        ("Google Chrome", Some("chrome.exe")),
        ("Discord", Some("Discord.exe")),
        ("WhatsApp", Some("WhatsApp.exe")),
    ]
    .into_iter()
    .map(|(label, image)| Target {
        label: label.to_string(),
        image: image.map(str::to_string),
    })
    .collect()
}

/// Read the config file (optional) with `PROMON_` environment overrides.
pub fn load(file_path: &Path) -> Result<PromonConfig> {
    let raw = config::Config::builder()
        .add_source(config::File::from(file_path.to_path_buf()).required(false))
        .add_source(config::Environment::with_prefix("PROMON_"))
        .build()?;
    Ok(raw.try_deserialize()?)
}

#[derive(Debug)]
pub struct ConfigManager {
    pub file_path: PathBuf,
    config: PromonConfig,
    _watcher: Option<RecommendedWatcher>,
}

impl ConfigManager {
    pub fn new(file_path: PathBuf, sender: UnboundedSender<Event>) -> Result<ConfigManager> {
        let captured = sender.clone();
        let mut watcher = notify::recommended_watcher(move |_| {
            let _ = captured.send(Event::App(AppEvent::Reload));
        })?;
        let watcher = if file_path.exists() {
            info!(target: "Config", "Watching file {:?}", file_path);
            watcher.watch(&file_path, notify::RecursiveMode::NonRecursive)?;
            Some(watcher)
        } else {
            debug!(target: "Config", "No file at {:?}, using built-in targets", file_path);
            None
        };
        Ok(ConfigManager {
            file_path: file_path.clone(),
            config: load(&file_path)?,
            _watcher: watcher,
        })
    }

    pub fn current(&self) -> PromonConfig {
        self.config.clone()
    }

    pub fn reload(&mut self) -> Result<PromonConfig> {
        self.config = load(&self.file_path)?;
        Ok(self.current())
    }
}
