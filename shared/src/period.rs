//! Analysis period keyword
//!
//! The public API accepts four period values. `month` and `all` are
//! recognized but locked behind the PRO tier; only `today` and `week` are
//! forwarded to the analysis core.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Requested analysis period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Single day anchored at the newest date in the dataset
    Today,
    /// Trailing 7 days ending at the anchor date
    Week,
    /// Trailing 30 days (locked)
    Month,
    /// Whole dataset (locked)
    All,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::All => "all",
        }
    }

    /// Whether this period is locked behind the PRO tier
    pub fn is_locked(&self) -> bool {
        matches!(self, Period::Month | Period::All)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown period keyword
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("period must be one of: today, week, month, all")]
pub struct PeriodParseError;

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "all" => Ok(Period::All),
            _ => Err(PeriodParseError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("Today".parse::<Period>().unwrap(), Period::Today);
        assert_eq!(" WEEK ".parse::<Period>().unwrap(), Period::Week);
    }

    #[test]
    fn test_parse_unknown() {
        assert!("year".parse::<Period>().is_err());
        assert!("".parse::<Period>().is_err());
    }

    #[test]
    fn test_locked_periods() {
        assert!(!Period::Today.is_locked());
        assert!(!Period::Week.is_locked());
        assert!(Period::Month.is_locked());
        assert!(Period::All.is_locked());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Period::Week).unwrap(), "\"week\"");
    }
}
