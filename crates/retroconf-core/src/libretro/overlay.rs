//! Bezel lookup and the overlay settings derived from it.

use crate::config::tables::OVERLAY_ASPECT_RATIO_INDEX;
use crate::config::{OutputSettings, Paths, SettingValue};
use crate::display::{DisplayQuery, Resolution};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const DEFAULT_MESSAGE_POS: f64 = 0.05;

/// Geometry of one bezel image, read from its `.info` companion.
///
/// Numbers keep their JSON form so integer geometry is written back as integers
/// and fractional geometry as floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayInfo {
    pub width: Number,
    pub height: Number,
    pub opacity: Number,
    pub left: Number,
    pub right: Number,
    pub top: Number,
    pub bottom: Number,
    pub messagex: Number,
    pub messagey: Number,
}

fn to_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or_default()
}

fn remainder(total: &Number, a: &Number, b: &Number) -> SettingValue {
    match (total.as_i64(), a.as_i64(), b.as_i64()) {
        (Some(total), Some(a), Some(b)) => SettingValue::Int(total - a - b),
        _ => SettingValue::Float(to_f64(total) - to_f64(a) - to_f64(b)),
    }
}

impl OverlayInfo {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        let info: OverlayInfo = serde_json::from_str(&data)?;
        Ok(info)
    }

    /// Accepts the bezel unless neither dimension matches the screen.
    pub fn fits(&self, res: Resolution) -> bool {
        let width_differs = to_f64(&self.width) != f64::from(res.width);
        let height_differs = to_f64(&self.height) != f64::from(res.height);
        !(width_differs && height_differs)
    }

    pub fn viewport_width(&self) -> SettingValue {
        remainder(&self.width, &self.left, &self.right)
    }

    pub fn viewport_height(&self) -> SettingValue {
        remainder(&self.height, &self.top, &self.bottom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayCandidate {
    pub info: PathBuf,
    pub image: PathBuf,
}

impl OverlayCandidate {
    fn at(dir: PathBuf, stem: &str) -> Self {
        Self {
            info: dir.join(format!("{}.info", stem)),
            image: dir.join(format!("{}.png", stem)),
        }
    }

    pub fn exists(&self) -> bool {
        self.info.is_file() && self.image.is_file()
    }
}

/// The overlay config file RetroArch loads through `input_overlay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLayout {
    pub image: PathBuf,
    pub full_screen: bool,
    pub descs: u32,
}

impl OverlayLayout {
    pub fn full_screen(image: &Path) -> Self {
        Self {
            image: image.to_path_buf(),
            full_screen: true,
            descs: 0,
        }
    }

    pub fn render(&self) -> String {
        format!(
            "overlays = 1\noverlay0_overlay = {}\noverlay0_full_screen = {}\noverlay0_descs = {}\n",
            self.image.display(),
            self.full_screen,
            self.descs
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledReason {
    NoBezel,
    NotFound,
    ResolutionMismatch,
    InvalidDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayOutcome {
    Resolved(OverlayLayout),
    Disabled(DisabledReason),
    /// The display mode could not be queried; overlays stay off.
    ResolutionUnavailable(String),
}

impl OverlayOutcome {
    pub fn layout(&self) -> Option<&OverlayLayout> {
        match self {
            OverlayOutcome::Resolved(layout) => Some(layout),
            _ => None,
        }
    }
}

/// Lookup order, most specific first. Game entries are keyed by the ROM file
/// name including its extension (`mario.zip.png`).
pub fn candidates(bezel: &str, system: &str, rom: &Path, paths: &Paths) -> Vec<OverlayCandidate> {
    let user = paths.overlay_user.join(bezel);
    let shipped = paths.overlay_system.join(bezel);
    let mut out = Vec::with_capacity(6);

    if let Some(rom_name) = rom.file_name().map(|n| n.to_string_lossy().to_string()) {
        out.push(OverlayCandidate::at(user.join("games"), &rom_name));
        out.push(OverlayCandidate::at(shipped.join("games"), &rom_name));
    }
    out.push(OverlayCandidate::at(user.join("system"), system));
    out.push(OverlayCandidate::at(shipped.join("system"), system));
    out.push(OverlayCandidate::at(user, "default"));
    out.push(OverlayCandidate::at(shipped, "default"));
    out
}

pub fn find_overlay(bezel: &str, system: &str, rom: &Path, paths: &Paths) -> Option<OverlayCandidate> {
    candidates(bezel, system, rom, paths).into_iter().find(|c| {
        let found = c.exists();
        debug!(info = %c.info.display(), found, "bezel candidate");
        found
    })
}

fn apply_defaults(settings: &mut OutputSettings) {
    settings.set("input_overlay_hide_in_menu", false);
    settings.set("input_overlay_enable", false);
    settings.set("video_message_pos_x", DEFAULT_MESSAGE_POS);
    settings.set("video_message_pos_y", DEFAULT_MESSAGE_POS);
}

fn apply_overlay(settings: &mut OutputSettings, info: &OverlayInfo, cfg_file: &Path) {
    settings.set("input_overlay_enable", true);
    settings.set("input_overlay_scale", "1.0");
    settings.set("input_overlay", cfg_file.to_string_lossy().to_string());
    settings.set("input_overlay_hide_in_menu", true);
    settings.set("input_overlay_opacity", &info.opacity);
    settings.set("custom_viewport_x", &info.left);
    settings.set("custom_viewport_y", &info.top);
    settings.set("custom_viewport_width", info.viewport_width());
    settings.set("custom_viewport_height", info.viewport_height());
    settings.set("aspect_ratio_index", OVERLAY_ASPECT_RATIO_INDEX);
    settings.set("video_message_pos_x", &info.messagex);
    settings.set("video_message_pos_y", &info.messagey);
}

/// Sets overlay keys on `settings`. Overlays are disabled up front, so every
/// non-resolved outcome leaves them off.
///
/// Only a failing display query is reported as an error.
pub fn resolve_overlay(
    bezel: Option<&str>,
    system: &str,
    rom: &Path,
    paths: &Paths,
    display: &dyn DisplayQuery,
    settings: &mut OutputSettings,
) -> Result<OverlayOutcome, ConfigError> {
    apply_defaults(settings);

    let Some(bezel) = bezel.filter(|b| !b.is_empty()) else {
        return Ok(OverlayOutcome::Disabled(DisabledReason::NoBezel));
    };

    let Some(candidate) = find_overlay(bezel, system, rom, paths) else {
        info!(bezel, system, "no bezel found, overlays disabled");
        return Ok(OverlayOutcome::Disabled(DisabledReason::NotFound));
    };

    let info = match OverlayInfo::load(&candidate.info) {
        Ok(info) => info,
        Err(e) => {
            warn!(path = %candidate.info.display(), error = %e, "unreadable bezel descriptor");
            return Ok(OverlayOutcome::Disabled(DisabledReason::InvalidDescriptor));
        }
    };

    let res = display.current_resolution()?;
    if !info.fits(res) {
        info!(
            bezel_width = %info.width,
            bezel_height = %info.height,
            screen = %res,
            "bezel does not match screen resolution, overlays disabled"
        );
        return Ok(OverlayOutcome::Disabled(DisabledReason::ResolutionMismatch));
    }

    apply_overlay(settings, &info, &paths.overlay_config_file);
    info!(image = %candidate.image.display(), "bezel enabled");
    Ok(OverlayOutcome::Resolved(OverlayLayout::full_screen(&candidate.image)))
}
