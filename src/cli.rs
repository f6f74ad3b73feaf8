use crate::adapter::VersionFamily;
use crate::config::InspectorConfigOverrides;
use anyhow::{anyhow, bail, Context, Result};
use std::env;

/// Command-line switches for the session binary. Interval and timeout override
/// the config file; ticks and family are session arguments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliArgs {
    interval: Option<u64>,
    timeout: Option<u64>,
    ticks: Option<u32>,
    family: Option<VersionFamily>,
}

impl CliArgs {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = CliArgs::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            if !flag.starts_with("--") {
                bail!("Unexpected argument '{flag}'. Use --interval/--timeout/--ticks/--family with values.");
            }
            let key = &flag[2..];
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "interval" => {
                    parsed.interval = Some(
                        value.parse::<u64>().with_context(|| format!("Invalid interval '{value}'"))?,
                    );
                }
                "timeout" => {
                    parsed.timeout = Some(
                        value.parse::<u64>().with_context(|| format!("Invalid timeout '{value}'"))?,
                    );
                }
                "ticks" => {
                    parsed.ticks =
                        Some(value.parse::<u32>().with_context(|| format!("Invalid ticks '{value}'"))?);
                }
                "family" => {
                    parsed.family = Some(parse_family(&value)?);
                }
                _ => bail!("Unknown flag '{flag}'. Supported flags: --interval, --timeout, --ticks, --family."),
            }
        }
        Ok(parsed)
    }

    pub fn config_overrides(&self) -> InspectorConfigOverrides {
        InspectorConfigOverrides { poll_interval_ms: self.interval, reply_timeout_ms: self.timeout }
    }

    pub fn ticks(&self) -> Option<u32> {
        self.ticks
    }

    pub fn family(&self) -> Option<VersionFamily> {
        self.family
    }

    #[cfg(test)]
    pub fn as_tuple(&self) -> (Option<u64>, Option<u64>, Option<u32>, Option<VersionFamily>) {
        (self.interval, self.timeout, self.ticks, self.family)
    }
}

fn parse_family(value: &str) -> Result<VersionFamily> {
    match value.to_ascii_lowercase().as_str() {
        "v2" | "2" => Ok(VersionFamily::V2),
        "v3" | "3" => Ok(VersionFamily::V3),
        other => bail!("Invalid family '{other}'. Use v2 or v3."),
    }
}
