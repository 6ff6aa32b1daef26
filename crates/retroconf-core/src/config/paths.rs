use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

const ROOT_ENV: &str = "RETROCONF_ROOT";

/// Filesystem layout the generator reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Paths {
  pub saves_dir: PathBuf,
  pub retroarch_custom: PathBuf,
  pub retroarch_core_custom: PathBuf,
  pub overlay_user: PathBuf,
  pub overlay_system: PathBuf,
  pub overlay_config_file: PathBuf,
}

impl Default for Paths {
  fn default() -> Self {
    Self {
      saves_dir: PathBuf::from("/recalbox/share/saves"),
      retroarch_custom: PathBuf::from("/recalbox/share/system/configs/retroarch/retroarchcustom.cfg"),
      retroarch_core_custom: PathBuf::from("/recalbox/share/system/configs/retroarch/cores/retroarch-core-options.cfg"),
      overlay_user: PathBuf::from("/recalbox/share/overlays"),
      overlay_system: PathBuf::from("/recalbox/share_init/overlays"),
      overlay_config_file: PathBuf::from("/tmp/bezel.cfg"),
    }
  }
}

fn reroot(root: &Path, path: &Path) -> PathBuf {
  let relative: PathBuf = path
    .components()
    .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
    .collect();
  root.join(relative)
}

impl Paths {
  /// Default layout moved under `root`, e.g. for a chroot or a test sandbox.
  pub fn rooted(root: &Path) -> Self {
    let d = Self::default();
    Self {
      saves_dir: reroot(root, &d.saves_dir),
      retroarch_custom: reroot(root, &d.retroarch_custom),
      retroarch_core_custom: reroot(root, &d.retroarch_core_custom),
      overlay_user: reroot(root, &d.overlay_user),
      overlay_system: reroot(root, &d.overlay_system),
      overlay_config_file: reroot(root, &d.overlay_config_file),
    }
  }

  pub fn from_env() -> Self {
    match env::var(ROOT_ENV) {
      Ok(root) if !root.trim().is_empty() => Self::rooted(Path::new(root.trim())),
      _ => Self::default(),
    }
  }

  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    if !path.exists() {
      return Err(ConfigError::NotFound(format!("Paths file {}", path.display())));
    }
    let data = fs::read_to_string(path)?;
    if data.trim().is_empty() {
      return Ok(Self::default());
    }
    let paths: Paths = serde_json::from_str(&data)?;
    Ok(paths)
  }

  pub fn saves_dir_for(&self, system: &str) -> PathBuf {
    self.saves_dir.join(system)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rooted_keeps_layout_under_root() {
    let paths = Paths::rooted(Path::new("/sandbox"));
    assert_eq!(paths.saves_dir, PathBuf::from("/sandbox/recalbox/share/saves"));
    assert_eq!(paths.overlay_config_file, PathBuf::from("/sandbox/tmp/bezel.cfg"));
    assert_eq!(
      paths.saves_dir_for("snes"),
      PathBuf::from("/sandbox/recalbox/share/saves/snes")
    );
  }

  #[test]
  fn load_fills_missing_fields_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("paths.json");
    fs::write(&file, r#"{ "savesDir": "/data/saves" }"#).unwrap();

    let paths = Paths::load(&file).unwrap();
    assert_eq!(paths.saves_dir, PathBuf::from("/data/saves"));
    assert_eq!(paths.overlay_user, Paths::default().overlay_user);
  }

  #[test]
  fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Paths::load(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
  }
}
