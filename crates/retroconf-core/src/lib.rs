//! Builds RetroArch configuration files from a per-system emulator setup.

pub mod config;
pub mod display;
pub mod error;
pub mod libretro;

pub use config::{Controller, OutputSettings, Paths, SettingValue, SystemDescriptor};
pub use display::{DisplayQuery, FixedResolution, Resolution, TvServiceQuery};
pub use error::ConfigError;
pub use libretro::{save_settings, translate, write_libretro_config, LaunchRequest, OverlayOutcome, Translation};
