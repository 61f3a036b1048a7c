use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use dayflow_core::PlanningConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::{ensure_dayflow_home, model_path};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralSection,
    pub planning: PlanningConfig,
    pub model: ModelSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSection {
    /// IANA name, used to decide what "today" is.
    pub timezone: String,
    /// Default filter when RUST_LOG is unset.
    pub log_level: String,
    /// Plan into 09:00-18:00 on days with no availability configured.
    pub fallback_window: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    /// When false, recommendations stay heuristic-only and `train` is refused.
    pub enabled: bool,
    /// Defaults to ~/.dayflow/models/focus.json
    pub path: Option<PathBuf>,
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            log_level: "warn".to_string(),
            fallback_window: true,
        }
    }
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        self.general
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("invalid timezone {:?} in config: {e}", self.general.timezone))
    }

    pub fn today(&self) -> Result<NaiveDate> {
        Ok(self.now()?.date())
    }

    /// Wall-clock time in the configured timezone.
    pub fn now(&self) -> Result<NaiveDateTime> {
        Ok(Utc::now().with_timezone(&self.timezone()?).naive_local())
    }

    pub fn model_path(&self) -> Result<PathBuf> {
        match &self.model.path {
            Some(p) => Ok(p.clone()),
            None => model_path(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_dayflow_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// Write the default config unless one exists. Returns the path and whether it was created.
pub fn init_config() -> Result<(PathBuf, bool)> {
    let p = config_path()?;
    if p.exists() {
        return Ok((p, false));
    }
    save_config(&Config::default())?;
    Ok((p, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [general]
            timezone = "Europe/Paris"

            [planning]
            break_minutes = 15
            "#,
        )
        .unwrap();
        assert_eq!(cfg.general.timezone, "Europe/Paris");
        assert!(cfg.general.fallback_window);
        assert_eq!(cfg.planning.break_minutes, 15);
        assert_eq!(cfg.planning.break_after_minutes, 90);
        assert!(cfg.model.enabled);
        assert_eq!(cfg.timezone().unwrap(), chrono_tz::Europe::Paris);
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(toml::from_str::<Config>(&s).unwrap(), cfg);
    }

    #[test]
    fn test_bad_timezone_is_an_error() {
        let mut cfg = Config::default();
        cfg.general.timezone = "Mars/Olympus".to_string();
        assert!(cfg.timezone().is_err());
        assert!(cfg.today().is_err());
        assert!(cfg.now().is_err());
    }
}
