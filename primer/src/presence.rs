use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A user's availability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Presence {
  Active,
  Away,
  #[default]
  Offline,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown presence: {0:?}")]
pub struct ParsePresenceError(pub String);

impl Presence {
  pub const ALL: [Presence; 3] = [Presence::Active, Presence::Away, Presence::Offline];

  pub fn as_str(self) -> &'static str {
    match self {
      Presence::Active => "active",
      Presence::Away => "away",
      Presence::Offline => "offline",
    }
  }
}

impl fmt::Display for Presence {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Presence {
  type Err = ParsePresenceError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Presence::ALL
      .into_iter()
      .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| ParsePresenceError(s.to_string()))
  }
}
