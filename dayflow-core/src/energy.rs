//! Energy periods and the per-user energy profile.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Level assumed for any period the user never rated.
pub const DEFAULT_ENERGY_LEVEL: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyPeriod {
    /// 06:00-12:00
    Morning,
    /// 12:00-18:00
    Afternoon,
    /// 18:00-22:00
    Evening,
    /// 22:00-06:00
    Night,
}

impl EnergyPeriod {
    pub const ALL: [EnergyPeriod; 4] = [
        EnergyPeriod::Morning,
        EnergyPeriod::Afternoon,
        EnergyPeriod::Evening,
        EnergyPeriod::Night,
    ];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => EnergyPeriod::Morning,
            12..=17 => EnergyPeriod::Afternoon,
            18..=21 => EnergyPeriod::Evening,
            _ => EnergyPeriod::Night,
        }
    }
}

/// How much energy a task needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyRequired {
    Low,
    Medium,
    High,
}

impl EnergyRequired {
    /// Minimum period level at which the task counts as energy-aligned.
    pub fn threshold(self) -> u8 {
        match self {
            EnergyRequired::Low => 1,
            EnergyRequired::Medium => 4,
            EnergyRequired::High => 7,
        }
    }

    pub fn is_met_by(self, level: u8) -> bool {
        level >= self.threshold()
    }

    /// 1-based ordinal used as a model feature.
    pub fn ordinal(self) -> u8 {
        match self {
            EnergyRequired::Low => 1,
            EnergyRequired::Medium => 2,
            EnergyRequired::High => 3,
        }
    }
}

/// One self-reported level per period. Setting a period again replaces the old value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnergyProfile {
    levels: BTreeMap<EnergyPeriod, u8>,
}

impl EnergyProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw (period, level) entries; later entries win.
    pub fn from_entries(entries: impl IntoIterator<Item = (EnergyPeriod, u8)>) -> Self {
        let mut profile = Self::new();
        for (period, level) in entries {
            profile.set(period, level);
        }
        profile
    }

    /// Upsert a level, returning the one it replaced.
    pub fn set(&mut self, period: EnergyPeriod, level: u8) -> Option<u8> {
        self.levels.insert(period, level)
    }

    pub fn get(&self, period: EnergyPeriod) -> Option<u8> {
        self.levels.get(&period).copied()
    }

    pub fn level(&self, period: EnergyPeriod) -> u8 {
        self.get(period).unwrap_or(DEFAULT_ENERGY_LEVEL)
    }

    pub fn level_at(&self, at: NaiveDateTime) -> u8 {
        self.level(EnergyPeriod::from_hour(at.hour()))
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (EnergyPeriod, u8)> + '_ {
        self.levels.iter().map(|(p, l)| (*p, *l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_period_boundaries() {
        assert_eq!(EnergyPeriod::from_hour(5), EnergyPeriod::Night);
        assert_eq!(EnergyPeriod::from_hour(6), EnergyPeriod::Morning);
        assert_eq!(EnergyPeriod::from_hour(11), EnergyPeriod::Morning);
        assert_eq!(EnergyPeriod::from_hour(12), EnergyPeriod::Afternoon);
        assert_eq!(EnergyPeriod::from_hour(18), EnergyPeriod::Evening);
        assert_eq!(EnergyPeriod::from_hour(21), EnergyPeriod::Evening);
        assert_eq!(EnergyPeriod::from_hour(22), EnergyPeriod::Night);
        assert_eq!(EnergyPeriod::from_hour(0), EnergyPeriod::Night);
    }

    #[test]
    fn test_upsert_replaces() {
        let mut profile = EnergyProfile::new();
        assert_eq!(profile.set(EnergyPeriod::Morning, 8), None);
        assert_eq!(profile.set(EnergyPeriod::Morning, 3), Some(8));
        assert_eq!(profile.entries().count(), 1);
        assert_eq!(profile.level(EnergyPeriod::Morning), 3);
    }

    #[test]
    fn test_missing_period_defaults_to_five() {
        let profile = EnergyProfile::from_entries([(EnergyPeriod::Morning, 9)]);
        let evening = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(19, 30, 0)
            .unwrap();
        assert_eq!(profile.level_at(evening), DEFAULT_ENERGY_LEVEL);
        assert_eq!(profile.level(EnergyPeriod::Morning), 9);
    }

    #[test]
    fn test_thresholds() {
        assert!(EnergyRequired::High.is_met_by(7));
        assert!(!EnergyRequired::High.is_met_by(6));
        assert!(EnergyRequired::Medium.is_met_by(4));
        assert!(!EnergyRequired::Medium.is_met_by(3));
        assert!(EnergyRequired::Low.is_met_by(1));
    }

    #[test]
    fn test_profile_serializes_as_map() {
        let profile = EnergyProfile::from_entries([(EnergyPeriod::Evening, 4)]);
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(json, r#"{"evening":4}"#);
    }
}
