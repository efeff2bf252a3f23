// Cache expiry policy.
// Converts a configured duration value and unit into a freshness window.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const SECOND: f64 = 1.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;

/// Unit for the configured cache duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    /// Approximated as 30 days.
    Months,
    /// Approximated as 365 days.
    Years,
}

impl CacheUnit {
    /// Length of one unit in seconds.
    fn seconds(&self) -> f64 {
        match self {
            CacheUnit::Seconds => SECOND,
            CacheUnit::Minutes => MINUTE,
            CacheUnit::Hours => HOUR,
            CacheUnit::Days => DAY,
            CacheUnit::Weeks => 7.0 * DAY,
            CacheUnit::Months => 30.0 * DAY,
            CacheUnit::Years => 365.0 * DAY,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheUnit::Seconds => "seconds",
            CacheUnit::Minutes => "minutes",
            CacheUnit::Hours => "hours",
            CacheUnit::Days => "days",
            CacheUnit::Weeks => "weeks",
            CacheUnit::Months => "months",
            CacheUnit::Years => "years",
        }
    }
}

impl fmt::Display for CacheUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seconds" => Ok(CacheUnit::Seconds),
            "minutes" => Ok(CacheUnit::Minutes),
            "hours" => Ok(CacheUnit::Hours),
            "days" => Ok(CacheUnit::Days),
            "weeks" => Ok(CacheUnit::Weeks),
            "months" => Ok(CacheUnit::Months),
            "years" => Ok(CacheUnit::Years),
            other => Err(format!("unknown cache unit: {}", other)),
        }
    }
}

/// How long cached responses stay fresh.
///
/// A unit of `None` stands for an unrecognized unit and disables caching,
/// as does a duration that is zero, negative or not finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachePolicy {
    pub duration: f64,
    pub unit: Option<CacheUnit>,
}

impl CachePolicy {
    pub fn new(duration: f64, unit: CacheUnit) -> Self {
        Self {
            duration,
            unit: Some(unit),
        }
    }

    /// A policy under which every lookup misses.
    pub fn disabled() -> Self {
        Self {
            duration: 0.0,
            unit: None,
        }
    }

    /// Build a policy from a raw unit string; unknown units disable caching.
    pub fn parse(duration: f64, unit: &str) -> Self {
        Self {
            duration,
            unit: unit.parse().ok(),
        }
    }

    /// Freshness window. `Duration::ZERO` means caching is disabled.
    pub fn window(&self) -> Duration {
        let Some(unit) = self.unit else {
            return Duration::ZERO;
        };
        let seconds = self.duration * unit.seconds();
        if !seconds.is_finite() || seconds <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }

    /// Freshness window in whole milliseconds.
    pub fn window_ms(&self) -> i64 {
        i64::try_from(self.window().as_millis()).unwrap_or(i64::MAX)
    }

    pub fn is_enabled(&self) -> bool {
        !self.window().is_zero()
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(1.0, CacheUnit::Hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_per_unit() {
        let cases = [
            (CacheUnit::Seconds, 1_000),
            (CacheUnit::Minutes, 60_000),
            (CacheUnit::Hours, 3_600_000),
            (CacheUnit::Days, 86_400_000),
            (CacheUnit::Weeks, 604_800_000),
            (CacheUnit::Months, 2_592_000_000),
            (CacheUnit::Years, 31_536_000_000),
        ];
        for (unit, expected_ms) in cases {
            assert_eq!(CachePolicy::new(1.0, unit).window_ms(), expected_ms, "{unit}");
        }
    }

    #[test]
    fn test_fractional_duration() {
        assert_eq!(CachePolicy::new(1.5, CacheUnit::Seconds).window_ms(), 1_500);
    }

    #[test]
    fn test_disabled_policies() {
        assert!(!CachePolicy::new(0.0, CacheUnit::Hours).is_enabled());
        assert!(!CachePolicy::new(-3.0, CacheUnit::Hours).is_enabled());
        assert!(!CachePolicy::new(f64::NAN, CacheUnit::Hours).is_enabled());
        assert!(!CachePolicy::parse(5.0, "fortnights").is_enabled());
        assert!(!CachePolicy::disabled().is_enabled());
        assert_eq!(CachePolicy::disabled().window(), Duration::ZERO);
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!("weeks".parse::<CacheUnit>(), Ok(CacheUnit::Weeks));
        assert!("Weeks".parse::<CacheUnit>().is_err());
        assert_eq!(CachePolicy::parse(2.0, "days"), CachePolicy::new(2.0, CacheUnit::Days));
    }

    #[test]
    fn test_default_is_one_hour() {
        assert_eq!(CachePolicy::default().window(), Duration::from_secs(3600));
    }
}
