//! [`RankingWindow`] — the time horizon used to rank "top" posts.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The window within which the source ranks posts by "top".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingWindow {
  Hour,
  #[default]
  Day,
  Week,
  Month,
  Year,
  All,
}

impl RankingWindow {
  /// The token the upstream listing API expects in its `t` parameter.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Hour => "hour",
      Self::Day => "day",
      Self::Week => "week",
      Self::Month => "month",
      Self::Year => "year",
      Self::All => "all",
    }
  }
}

impl fmt::Display for RankingWindow {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RankingWindow {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "hour" => Ok(Self::Hour),
      "day" => Ok(Self::Day),
      "week" => Ok(Self::Week),
      "month" => Ok(Self::Month),
      "year" => Ok(Self::Year),
      "all" => Ok(Self::All),
      other => Err(Error::UnknownWindow(other.to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_roundtrip() {
    for window in [
      RankingWindow::Hour,
      RankingWindow::Day,
      RankingWindow::Week,
      RankingWindow::Month,
      RankingWindow::Year,
      RankingWindow::All,
    ] {
      assert_eq!(window.as_str().parse::<RankingWindow>().unwrap(), window);
    }
  }

  #[test]
  fn parse_rejects_unknown() {
    assert!(matches!(
      "fortnight".parse::<RankingWindow>(),
      Err(Error::UnknownWindow(_))
    ));
  }
}
