use navigation::NavigationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub control: ControlConfig,
}

/// Where detector lines come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSource {
    #[default]
    Stdin,
    Tcp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub source: LinkSource,
    pub bind: String,
    pub greeting: String,
    /// Stop the motors and exit once the line source closes.
    pub exit_on_disconnect: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            source: LinkSource::Stdin,
            bind: "0.0.0.0:8080".to_string(),
            greeting: "dockbot ready".to_string(),
            exit_on_disconnect: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub tick_ms: u64,
    /// Log telemetry every this many ticks, 0 to disable.
    pub telemetry_every: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        ControlConfig {
            tick_ms: 50,
            telemetry_every: 20,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        // Try external file first
        if Path::new("config.toml").exists() {
            let config_content = fs::read_to_string("config.toml")?;
            let config = Config::from_toml(&config_content)?;
            log::info!("Loaded configuration from file");
            Ok(config)
        } else {
            // Fallback to embedded defaults
            let config = Config::from_toml(include_str!("../config.toml.example"))?;
            log::warn!("Using embedded default configuration");
            Ok(config)
        }
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.navigation.validate()?;
        if config.control.tick_ms == 0 {
            anyhow::bail!("control.tick_ms must be positive");
        }
        Ok(config)
    }
}

// Helper functions for easy access
impl Config {
    pub fn get_tick_period(&self) -> Duration {
        Duration::from_millis(self.control.tick_ms)
    }

    pub fn get_telemetry_every(&self) -> u64 {
        self.control.telemetry_every
    }

    pub fn get_link_source(&self) -> LinkSource {
        self.link.source
    }

    pub fn get_bind_address(&self) -> &str {
        &self.link.bind
    }

    pub fn get_greeting(&self) -> &str {
        &self.link.greeting
    }

    pub fn get_docking_face(&self) -> &str {
        &self.navigation.docking_face
    }
}
