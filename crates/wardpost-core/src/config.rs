//! Wardpost configuration system.
//!
//! Everything the original operators tuned by editing constants lives here
//! as an injected value: the database path, the group identity, the
//! recipient directory, the schedule table, and the channel timing knobs.
//! Loaded once at startup; never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, WardpostError};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardpostConfig {
    /// Path to the portal SQLite database (written by the dashboard).
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Addressable identity of the ward announcement group.
    #[serde(default)]
    pub group_id: String,
    /// Recipient directory: UPPERCASE name → addressable identity.
    #[serde(default)]
    pub directory: BTreeMap<String, String>,
    /// Schedule table: when each job fires.
    #[serde(default = "default_schedule")]
    pub schedule: Vec<ScheduleEntry>,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
}

fn default_db_path() -> String {
    "igreja.db".into()
}

fn default_schedule() -> Vec<ScheduleEntry> {
    vec![
        ScheduleEntry {
            time: "13:00".into(),
            job: "group_announcement".into(),
        },
        ScheduleEntry {
            time: "13:01".into(),
            job: "task_reminders".into(),
        },
    ]
}

impl Default for WardpostConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            group_id: String::new(),
            directory: BTreeMap::new(),
            schedule: default_schedule(),
            scheduler: SchedulerConfig::default(),
            dispatch: DispatchConfig::default(),
            whatsapp: WhatsAppConfig::default(),
        }
    }
}

impl WardpostConfig {
    /// Load config from the default path (~/.wardpost/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WardpostError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| WardpostError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Startup validation. Malformed entries are fatal: the loop must not
    /// start with a directory or schedule it cannot honor.
    pub fn validate(&self) -> Result<()> {
        for (name, identity) in &self.directory {
            if name.trim().is_empty() {
                return Err(WardpostError::Config(
                    "directory entry with empty name".into(),
                ));
            }
            if identity.trim().is_empty() {
                return Err(WardpostError::Config(format!(
                    "directory entry '{name}' has an empty identity"
                )));
            }
        }
        for entry in &self.schedule {
            entry.validate()?;
        }
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the wardpost home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".wardpost")
    }
}

/// One schedule binding: a 24h wall-clock time and the job it fires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Time of day, 24h "HH:MM".
    pub time: String,
    /// Job identifier: "group_announcement" or "task_reminders".
    pub job: String,
}

impl ScheduleEntry {
    pub fn validate(&self) -> Result<()> {
        chrono::NaiveTime::parse_from_str(&self.time, "%H:%M").map_err(|_| {
            WardpostError::Config(format!(
                "schedule time '{}' is not 24h HH:MM",
                self.time
            ))
        })?;
        match self.job.as_str() {
            "group_announcement" | "task_reminders" => Ok(()),
            other => Err(WardpostError::Config(format!(
                "unknown job '{other}' in schedule"
            ))),
        }
    }
}

/// Scheduler loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Poll granularity in seconds.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

fn default_tick_secs() -> u64 {
    30
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
        }
    }
}

/// Dispatch pacing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// End-of-turn pause between recipients, in milliseconds. Keeps sends
    /// from interleaving before the surface has processed the prior one.
    #[serde(default = "default_recipient_pause_ms")]
    pub recipient_pause_ms: u64,
}

fn default_recipient_pause_ms() -> u64 {
    5000
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            recipient_pause_ms: default_recipient_pause_ms(),
        }
    }
}

/// WhatsApp channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    /// Facebook Graph API access token.
    #[serde(default)]
    pub access_token: String,
    /// WhatsApp Phone Number ID.
    #[serde(default)]
    pub phone_number_id: String,
    /// Wait before interacting with the surface, in milliseconds.
    #[serde(default = "default_settle_before_ms")]
    pub settle_before_ms: u64,
    /// Pause after a send completes, in milliseconds.
    #[serde(default = "default_settle_after_ms")]
    pub settle_after_ms: u64,
}

fn default_settle_before_ms() -> u64 {
    50_000
}

fn default_settle_after_ms() -> u64 {
    3_000
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            phone_number_id: String::new(),
            settle_before_ms: default_settle_before_ms(),
            settle_after_ms: default_settle_after_ms(),
        }
    }
}
