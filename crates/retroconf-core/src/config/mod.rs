use crate::error::ConfigError;
use indexmap::IndexMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub mod paths;
pub mod settings;
pub mod system;
pub mod tables;

pub use paths::Paths;
pub use settings::{OutputSettings, SettingValue};
pub use system::{Controller, SystemDescriptor};

/// Boolean options are stored as the literal strings `1` or `true`.
pub(crate) fn is_enabled(val: &str) -> bool {
  val == "1" || val == "true"
}

pub(crate) fn is_defined(val: &str) -> bool {
  !val.is_empty()
}

/// Destination for derived `key = value` settings.
pub trait SettingsStore {
  fn save(&mut self, key: &str, value: &str);

  fn flush(&mut self) -> Result<(), ConfigError> {
    Ok(())
  }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  values: IndexMap<String, String>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self.values.get(key).map(|v| v.as_str())
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.values.keys().map(|k| k.as_str())
  }

  /// Saved values as `key = value` lines, in first-save order.
  pub fn render(&self) -> String {
    self
      .values
      .iter()
      .map(|(k, v)| format!("{} = {}\n", k, v))
      .collect()
  }
}

impl SettingsStore for MemoryStore {
  fn save(&mut self, key: &str, value: &str) {
    self.values.insert(key.to_string(), value.to_string());
  }
}

/// Line-preserving editor for a flat `key = value` file.
///
/// Unknown lines and comments are kept as-is; a key that only exists commented
/// out is uncommented in place rather than appended.
#[derive(Debug, Clone)]
pub struct SettingsFile {
  path: PathBuf,
  separator: String,
  lines: Vec<String>,
}

impl SettingsFile {
  pub fn open(path: &Path) -> Result<Self, ConfigError> {
    let content = if path.exists() {
      fs::read_to_string(path)?
    } else {
      String::new()
    };
    Ok(Self::from_content(path, &content))
  }

  pub fn from_content(path: &Path, content: &str) -> Self {
    Self {
      path: path.to_path_buf(),
      separator: " ".to_string(),
      lines: content.lines().map(|s| s.to_string()).collect(),
    }
  }

  fn find_key_line(&self, key: &str) -> Option<usize> {
    let mut commented = None;
    for (i, line) in self.lines.iter().enumerate() {
      if let Some((k, is_commented)) = parse_line_key(line) {
        if k != key {
          continue;
        }
        if !is_commented {
          return Some(i);
        }
        commented.get_or_insert(i);
      }
    }
    commented
  }

  fn format_line(&self, key: &str, value: &str) -> String {
    format!("{}{}={}{}", key, self.separator, self.separator, value)
  }

  pub fn set(&mut self, key: &str, value: &str) {
    let line = self.format_line(key, value);
    match self.find_key_line(key) {
      Some(idx) => self.lines[idx] = line,
      None => self.lines.push(line),
    }
  }

  pub fn render(&self) -> String {
    let mut out = self.lines.join("\n");
    if !out.is_empty() {
      out.push('\n');
    }
    out
  }
}

impl SettingsStore for SettingsFile {
  fn save(&mut self, key: &str, value: &str) {
    self.set(key, value);
  }

  fn flush(&mut self) -> Result<(), ConfigError> {
    write_atomic(&self.path, &self.render())
  }
}

fn parse_line_key(line: &str) -> Option<(String, bool)> {
  let trimmed = line.trim();
  if trimmed.is_empty() {
    return None;
  }

  let mut is_commented = false;
  let mut content = trimmed;

  if let Some(rest) = content.strip_prefix('#').or_else(|| content.strip_prefix(';')) {
    is_commented = true;
    content = rest.trim();
  }

  if let Some(idx) = content.find('=') {
    let key = content[..idx].trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
      return None;
    }
    return Some((key.to_string(), is_commented));
  }
  None
}

/// Replaces `path` with `content` through a sibling temp file.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), ConfigError> {
  let dir = match path.parent() {
    Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
    _ => PathBuf::from("."),
  };
  fs::create_dir_all(&dir)?;
  let mut tmp = NamedTempFile::new_in(&dir)?;
  tmp.write_all(content.as_bytes())?;
  tmp.flush()?;
  tmp.persist(path).map_err(|e| ConfigError::Io(e.error))?;
  Ok(())
}
