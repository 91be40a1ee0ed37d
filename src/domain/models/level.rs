//! Severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::LogError;

/// Severity of a log record.
///
/// Levels are ordered from most verbose (Debug) to most severe (Error), so a
/// minimum level admits every level that compares greater than or equal to it.
///
/// # Examples
///
/// ```
/// use fanlog::Level;
///
/// assert!(Level::Error > Level::Info);
/// assert!(Level::Warn.admits(Level::Error));
/// assert!(!Level::Warn.admits(Level::Info));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    /// Debug information useful during development
    Debug,
    /// Informational messages about normal operations
    Info,
    /// Potentially problematic situations
    Warn,
    /// Failure conditions
    Error,
}

impl Level {
    /// All levels, least severe first.
    pub const ALL: [Self; 4] = [Self::Debug, Self::Info, Self::Warn, Self::Error];

    /// Capitalized name written into encoded records.
    ///
    /// ```
    /// use fanlog::Level;
    ///
    /// assert_eq!(Level::Info.as_str(), "INFO");
    /// assert_eq!(Level::Error.as_str(), "ERROR");
    /// ```
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    /// Configuration name of the level (`debug`, `info`, `warn`, `err`).
    pub const fn config_name(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "err",
        }
    }

    /// Whether a record at `level` passes a gate configured at `self`.
    pub fn admits(self, level: Self) -> bool {
        level >= self
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.config_name() == s)
            .ok_or_else(|| LogError::InvalidLevel(s.to_string()))
    }
}

impl TryFrom<String> for Level {
    type Error = LogError;

    fn try_from(value: String) -> Result<Self, LogError> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.config_name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_names() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("info".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("warn".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("err".parse::<Level>().unwrap(), Level::Error);
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert!("error".parse::<Level>().is_err());
        assert!("INFO".parse::<Level>().is_err());
        assert!("".parse::<Level>().is_err());
    }

    #[test]
    fn test_try_from_string() {
        assert_eq!(Level::try_from("err".to_string()).unwrap(), Level::Error);
        assert!(matches!(
            Level::try_from("fatal".to_string()),
            Err(LogError::InvalidLevel(name)) if name == "fatal"
        ));
    }

    #[test]
    fn test_admits_is_ordering() {
        for gate in Level::ALL {
            for call in Level::ALL {
                assert_eq!(gate.admits(call), call >= gate, "{gate} / {call}");
            }
        }
    }

    #[test]
    fn test_serde_uses_config_names() {
        let yaml = serde_yaml::to_string(&Level::Error).unwrap();
        assert_eq!(yaml.trim(), "err");
        let parsed: Level = serde_yaml::from_str("warn").unwrap();
        assert_eq!(parsed, Level::Warn);
    }
}
