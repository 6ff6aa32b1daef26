use super::{is_defined, is_enabled};
use crate::error::ConfigError;
use configparser::ini::Ini;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const GLOBAL_SCOPE: &str = "global";

/// One emulated system as selected for a launch, with its flattened options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemDescriptor {
  pub name: String,
  #[serde(default)]
  pub config: HashMap<String, String>,
}

impl SystemDescriptor {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      config: HashMap::new(),
    }
  }

  pub fn with(mut self, key: &str, value: &str) -> Self {
    self.config.insert(key.to_string(), value.to_string());
    self
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.config.get(key).map(|v| v.as_str())
  }

  /// Like [`get`](Self::get), but an empty value counts as unset.
  pub fn get_defined(&self, key: &str) -> Option<&str> {
    self.get(key).filter(|v| is_defined(v))
  }

  pub fn enabled(&self, key: &str) -> bool {
    self.get(key).map_or(false, is_enabled)
  }

  pub fn value_or(&self, key: &str, default: &str) -> String {
    self.get(key).unwrap_or(default).to_string()
  }

  pub fn core(&self) -> Option<&str> {
    self.get("core")
  }

  /// Builds a descriptor from a flat `scope.key=value` file.
  ///
  /// `global.*` entries apply to every system, `<name>.*` entries override them.
  /// Empty values are treated as unset. Only whole lines starting with `#` or
  /// `;` are comments; the same characters inside a value are kept.
  pub fn from_conf(name: &str, content: &str) -> Result<Self, ConfigError> {
    let body: String = content
      .lines()
      .filter(|line| !line.trim_start().starts_with(['#', ';']))
      .map(|line| format!("{}\n", line))
      .collect();

    let mut parser = Ini::new_cs();
    parser.set_comment_symbols(&[]);
    parser.read(body).map_err(ConfigError::Parse)?;

    let mut global = Vec::new();
    let mut scoped = Vec::new();
    let system_prefix = format!("{}.", name);
    let global_prefix = format!("{}.", GLOBAL_SCOPE);

    if let Some(map) = parser.get_map() {
      for section in map.values() {
        for (key, value) in section {
          let value = match value {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => continue,
          };
          if let Some(option) = key.strip_prefix(&system_prefix) {
            scoped.push((option.to_string(), value));
          } else if let Some(option) = key.strip_prefix(&global_prefix) {
            global.push((option.to_string(), value));
          }
        }
      }
    }

    let mut descriptor = Self::new(name);
    descriptor.config.extend(global);
    descriptor.config.extend(scoped);
    Ok(descriptor)
  }

  pub fn load_conf(name: &str, path: &Path) -> Result<Self, ConfigError> {
    if !path.exists() {
      return Err(ConfigError::NotFound(format!("System config {}", path.display())));
    }
    let content = fs::read_to_string(path)?;
    Self::from_conf(name, &content)
  }
}

/// A connected pad. Only the number of pads influences the generated settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controller {
  pub player: u32,
  #[serde(default)]
  pub name: String,
}

impl Controller {
  pub fn players(count: usize) -> Vec<Controller> {
    (1..=count as u32)
      .map(|player| Controller {
        player,
        name: format!("Player {}", player),
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const CONF: &str = "\
global.smooth=1
global.ratio=auto
global.retroachievements.username=alice
snes.ratio=16/9
snes.core=snes9x_next
snes.showFPS=true
nes.core=fceumm
global.shaders=
";

  #[test]
  fn system_scope_overrides_global() {
    let system = SystemDescriptor::from_conf("snes", CONF).unwrap();
    assert_eq!(system.get("ratio"), Some("16/9"));
    assert_eq!(system.get("smooth"), Some("1"));
    assert_eq!(system.core(), Some("snes9x_next"));
    assert_eq!(system.get("retroachievements.username"), Some("alice"));
  }

  #[test]
  fn other_systems_and_empty_values_are_ignored() {
    let system = SystemDescriptor::from_conf("snes", CONF).unwrap();
    assert!(!system.config.values().any(|v| v == "fceumm"));
    assert_eq!(system.get("shaders"), None);
    assert_eq!(SystemDescriptor::new("snes").with("shaders", "").get_defined("shaders"), None);
  }

  #[test]
  fn keys_keep_their_case() {
    let system = SystemDescriptor::from_conf("snes", CONF).unwrap();
    assert!(system.enabled("showFPS"));
  }

  #[test]
  fn values_keep_hash_and_semicolon() {
    let conf = "\
# global.retroachievements.password=commented
; snes.netplay.nick=commented
global.retroachievements.password=hunter#2
snes.netplay.nick=a;b
snes.netplay.server.ip=10.0.0.2 # lan
";
    let system = SystemDescriptor::from_conf("snes", conf).unwrap();
    assert_eq!(system.get("retroachievements.password"), Some("hunter#2"));
    assert_eq!(system.get("netplay.nick"), Some("a;b"));
    assert_eq!(system.get("netplay.server.ip"), Some("10.0.0.2 # lan"));
    assert_eq!(system.config.len(), 3);
  }

  #[test]
  fn enabled_accepts_only_one_and_true() {
    let system = SystemDescriptor::new("nes")
      .with("a", "1")
      .with("b", "true")
      .with("c", "yes")
      .with("d", "0");
    assert!(system.enabled("a"));
    assert!(system.enabled("b"));
    assert!(!system.enabled("c"));
    assert!(!system.enabled("d"));
    assert!(!system.enabled("missing"));
  }

  #[test]
  fn players_are_numbered_from_one() {
    let pads = Controller::players(3);
    assert_eq!(pads.len(), 3);
    assert_eq!(pads[0].player, 1);
    assert_eq!(pads[2].player, 3);
  }
}
