use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_CRON_EXPRESSION: &str = "0 */6 * * *";

/// A five-field cron expression (`min hour day month weekday`).
///
/// Only the field count is checked; the task scheduler owns the
/// interpretation of each field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CronSchedule(String);

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self, String> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.is_empty() {
            return Err("Cron expression is required".to_string());
        }
        if fields.len() != 5 {
            return Err(format!(
                "Invalid cron format (need 5 fields, got {}): '{}'",
                fields.len(),
                expression.trim()
            ));
        }
        Ok(Self(fields.join(" ")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn preset(&self) -> Option<CronPreset> {
        CronPreset::ALL
            .iter()
            .copied()
            .find(|p| p.expression() == self.0)
    }
}

impl Default for CronSchedule {
    fn default() -> Self {
        Self(DEFAULT_CRON_EXPRESSION.to_string())
    }
}

impl FromStr for CronSchedule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CronSchedule {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CronSchedule> for String {
    fn from(value: CronSchedule) -> Self {
        value.0
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CronPreset {
    Every30Minutes,
    Hourly,
    Every6Hours,
    Every12Hours,
    DailyAt4,
}

impl CronPreset {
    pub const ALL: [CronPreset; 5] = [
        CronPreset::Every30Minutes,
        CronPreset::Hourly,
        CronPreset::Every6Hours,
        CronPreset::Every12Hours,
        CronPreset::DailyAt4,
    ];

    pub fn expression(&self) -> &'static str {
        match self {
            CronPreset::Every30Minutes => "*/30 * * * *",
            CronPreset::Hourly => "0 * * * *",
            CronPreset::Every6Hours => "0 */6 * * *",
            CronPreset::Every12Hours => "0 */12 * * *",
            CronPreset::DailyAt4 => "0 4 * * *",
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            CronPreset::Every30Minutes => "every-30-minutes",
            CronPreset::Hourly => "hourly",
            CronPreset::Every6Hours => "every-6-hours",
            CronPreset::Every12Hours => "every-12-hours",
            CronPreset::DailyAt4 => "daily-at-4",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CronPreset::Every30Minutes => "Every 30 minutes",
            CronPreset::Hourly => "Every 1 hour",
            CronPreset::Every6Hours => "Every 6 hours",
            CronPreset::Every12Hours => "Every 12 hours",
            CronPreset::DailyAt4 => "Every day at 4:00",
        }
    }

    pub fn schedule(&self) -> CronSchedule {
        CronSchedule(self.expression().to_string())
    }
}

/// Accepts either the preset name or its literal expression.
impl FromStr for CronPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.to_str() == s || p.expression() == s)
            .ok_or_else(|| format!("Unknown schedule preset '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_whitespace() {
        let s = CronSchedule::parse("  */30   *  * * *  ").unwrap();
        assert_eq!(s.as_str(), "*/30 * * * *");
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        assert!(CronSchedule::parse("").is_err());
        assert!(CronSchedule::parse("* * * *").is_err());
        assert!(CronSchedule::parse("0 0 * * * *").is_err());
    }

    #[test]
    fn test_preset_round_trip_through_expression() {
        for preset in CronPreset::ALL {
            assert_eq!(preset.schedule().preset(), Some(preset));
            assert_eq!(preset.to_str().parse::<CronPreset>(), Ok(preset));
            assert_eq!(preset.expression().parse::<CronPreset>(), Ok(preset));
        }
        assert_eq!(CronSchedule::parse("5 4 * * 1").unwrap().preset(), None);
    }

    #[test]
    fn test_default_is_every_six_hours() {
        assert_eq!(CronSchedule::default().preset(), Some(CronPreset::Every6Hours));
    }
}
