use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Command;
use std::str::FromStr;
use tracing::debug;

const TVSERVICE_COMMAND: &str = "tvservice.current";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
  pub width: u32,
  pub height: u32,
}

impl fmt::Display for Resolution {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}x{}", self.width, self.height)
  }
}

impl FromStr for Resolution {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (w, h) = s
      .trim()
      .split_once(|c: char| c == 'x' || c == 'X')
      .ok_or_else(|| ConfigError::Parse(format!("Invalid resolution: {}", s)))?;
    let parse = |v: &str| {
      v.trim()
        .parse::<u32>()
        .map_err(|e| ConfigError::Parse(format!("Invalid resolution {}: {}", s, e)))
    };
    Ok(Resolution {
      width: parse(w)?,
      height: parse(h)?,
    })
  }
}

/// Source of the resolution the frontend will render at.
pub trait DisplayQuery {
  fn current_resolution(&self) -> Result<Resolution, ConfigError>;
}

/// Asks the `tvservice.current` helper for the active video mode.
#[derive(Debug, Clone)]
pub struct TvServiceQuery {
  command: String,
}

impl Default for TvServiceQuery {
  fn default() -> Self {
    Self::new(TVSERVICE_COMMAND)
  }
}

impl TvServiceQuery {
  pub fn new(command: &str) -> Self {
    Self {
      command: command.to_string(),
    }
  }
}

impl DisplayQuery for TvServiceQuery {
  fn current_resolution(&self) -> Result<Resolution, ConfigError> {
    debug!(command = %self.command, "querying current display mode");
    let output = Command::new("sh")
      .args(["-c", &self.command])
      .output()
      .map_err(|e| ConfigError::Display(format!("Failed to run {}: {}", self.command, e)))?;
    if !output.status.success() {
      return Err(ConfigError::Display(format!(
        "{} exited with {}",
        self.command, output.status
      )));
    }
    parse_modes(&output.stdout)
  }
}

/// Picks the first mode out of a JSON array of `{width, height, ...}` objects.
pub fn parse_modes(raw: &[u8]) -> Result<Resolution, ConfigError> {
  let modes: Vec<Resolution> = serde_json::from_slice(raw)
    .map_err(|e| ConfigError::Display(format!("Unreadable display modes: {}", e)))?;
  modes
    .into_iter()
    .next()
    .ok_or_else(|| ConfigError::Display("No current resolution found".to_string()))
}

#[derive(Debug, Clone, Copy)]
pub struct FixedResolution(pub Resolution);

impl DisplayQuery for FixedResolution {
  fn current_resolution(&self) -> Result<Resolution, ConfigError> {
    Ok(self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_modes_takes_first_entry_and_ignores_extra_fields() {
    let raw = br#"[{"width": 1920, "height": 1080, "rate": 60}, {"width": 640, "height": 480}]"#;
    let res = parse_modes(raw).unwrap();
    assert_eq!(res, Resolution { width: 1920, height: 1080 });
  }

  #[test]
  fn parse_modes_fails_when_no_mode_reported() {
    let err = parse_modes(b"[]").unwrap_err();
    assert!(matches!(err, ConfigError::Display(_)));
    assert!(matches!(parse_modes(b"garbage"), Err(ConfigError::Display(_))));
  }

  #[test]
  fn resolution_parses_from_cli_form() {
    let res: Resolution = "1280x720".parse().unwrap();
    assert_eq!(res, Resolution { width: 1280, height: 720 });
    assert_eq!(res.to_string(), "1280x720");
    assert!("1280".parse::<Resolution>().is_err());
    assert!("axb".parse::<Resolution>().is_err());
  }

  #[cfg(unix)]
  #[test]
  fn tvservice_query_reads_command_output() {
    let query = TvServiceQuery::new(r#"echo '[{"width": 1024, "height": 768}]'"#);
    assert_eq!(
      query.current_resolution().unwrap(),
      Resolution { width: 1024, height: 768 }
    );
  }

  #[cfg(unix)]
  #[test]
  fn tvservice_query_reports_failing_command() {
    let query = TvServiceQuery::new("exit 3");
    assert!(matches!(query.current_resolution(), Err(ConfigError::Display(_))));
  }
}
