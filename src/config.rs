use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Tunables for the inspector session. All intervals are milliseconds; the
/// defaults match the cadences the panels were built around.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectorConfig {
    #[serde(default = "InspectorConfig::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "InspectorConfig::default_reply_timeout_ms")]
    pub reply_timeout_ms: u64,
    #[serde(default = "InspectorConfig::default_perf_interval_ms")]
    pub perf_interval_ms: u64,
    #[serde(default = "InspectorConfig::default_engine_wait_retries")]
    pub engine_wait_retries: u32,
}

#[derive(Debug, Clone, Default)]
pub struct InspectorConfigOverrides {
    pub poll_interval_ms: Option<u64>,
    pub reply_timeout_ms: Option<u64>,
}

impl InspectorConfig {
    const fn default_poll_interval_ms() -> u64 {
        500
    }

    const fn default_reply_timeout_ms() -> u64 {
        200
    }

    const fn default_perf_interval_ms() -> u64 {
        500
    }

    const fn default_engine_wait_retries() -> u32 {
        100
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn reply_window(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }

    pub fn perf_interval(&self) -> Duration {
        Duration::from_millis(self.perf_interval_ms)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &InspectorConfigOverrides) {
        if let Some(interval) = overrides.poll_interval_ms {
            self.poll_interval_ms = interval;
        }
        if let Some(timeout) = overrides.reply_timeout_ms {
            self.reply_timeout_ms = timeout;
        }
    }
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: Self::default_poll_interval_ms(),
            reply_timeout_ms: Self::default_reply_timeout_ms(),
            perf_interval_ms: Self::default_perf_interval_ms(),
            engine_wait_retries: Self::default_engine_wait_retries(),
        }
    }
}

impl InspectorConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.poll_interval_ms.is_none() && self.reply_timeout_ms.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.poll_interval_ms.is_some() {
            fields.push("poll_interval_ms");
        }
        if self.reply_timeout_ms.is_some() {
            fields.push("reply_timeout_ms");
        }
        fields
    }
}
