use crate::config::{write_atomic, Controller, OutputSettings, Paths, SettingsFile, SettingsStore, SystemDescriptor};
use crate::display::DisplayQuery;
use crate::error::ConfigError;
use std::path::Path;
use tracing::{info, warn};

pub mod overlay;
pub mod rules;

pub use overlay::{DisabledReason, OverlayLayout, OverlayOutcome};
pub use rules::MappedSettings;

/// Everything known about one launch.
#[derive(Debug, Clone, Copy)]
pub struct LaunchRequest<'a> {
    pub system: &'a SystemDescriptor,
    pub controllers: &'a [Controller],
    pub rom: &'a Path,
    pub bezel: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub settings: OutputSettings,
    pub core_options: OutputSettings,
    pub overlay: OverlayOutcome,
}

/// Derives the RetroArch settings for a launch.
///
/// Never fails: a display query error is kept in [`Translation::overlay`] and
/// the base settings are returned with overlays disabled.
pub fn translate(request: &LaunchRequest, paths: &Paths, display: &dyn DisplayQuery) -> Translation {
    let ctx = rules::RuleContext {
        system: request.system,
        controller_count: request.controllers.len(),
        paths,
    };
    let MappedSettings {
        mut settings,
        core_options,
    } = rules::map_core_settings(&ctx);

    let overlay = match overlay::resolve_overlay(
        request.bezel,
        &request.system.name,
        request.rom,
        paths,
        display,
        &mut settings,
    ) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = %e, "display resolution unavailable, overlays disabled");
            OverlayOutcome::ResolutionUnavailable(e.to_string())
        }
    };

    Translation {
        settings,
        core_options,
        overlay,
    }
}

/// Saves settings and core options, in mapping order, and flushes the stores.
/// The core store is left alone when there are no core options.
pub fn save_settings(
    translation: &Translation,
    settings_store: &mut dyn SettingsStore,
    core_store: &mut dyn SettingsStore,
) -> Result<(), ConfigError> {
    for (key, value) in translation.settings.iter() {
        settings_store.save(key, &value.to_string());
    }
    settings_store.flush()?;

    if !translation.core_options.is_empty() {
        for (key, value) in translation.core_options.iter() {
            core_store.save(key, &value.to_string());
        }
        core_store.flush()?;
    }
    Ok(())
}

/// Saves a translation through the given stores and writes the overlay layout
/// next to it when a bezel was resolved.
pub fn write_translation(
    translation: &Translation,
    settings_store: &mut dyn SettingsStore,
    core_store: &mut dyn SettingsStore,
    overlay_config_file: &Path,
) -> Result<(), ConfigError> {
    save_settings(translation, settings_store, core_store)?;

    if let Some(layout) = translation.overlay.layout() {
        write_atomic(overlay_config_file, &layout.render())?;
    }
    Ok(())
}

/// Writes a translation to the files named by `paths`.
pub fn write_libretro_config(translation: &Translation, paths: &Paths) -> Result<(), ConfigError> {
    let mut settings = SettingsFile::open(&paths.retroarch_custom)?;
    let mut core = SettingsFile::open(&paths.retroarch_core_custom)?;
    write_translation(translation, &mut settings, &mut core, &paths.overlay_config_file)?;
    info!(
        path = %paths.retroarch_custom.display(),
        keys = translation.settings.len(),
        "wrote retroarch settings"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryStore;
    use crate::display::{FixedResolution, Resolution};

    struct BrokenDisplay;

    impl DisplayQuery for BrokenDisplay {
        fn current_resolution(&self) -> Result<Resolution, ConfigError> {
            Err(ConfigError::Display("No current resolution found".to_string()))
        }
    }

    fn hd() -> FixedResolution {
        FixedResolution(Resolution { width: 1920, height: 1080 })
    }

    #[test]
    fn translate_runs_mapper_then_overlay_defaults() {
        let system = SystemDescriptor::new("snes").with("ratio", "16/9");
        let pads = Controller::players(2);
        let request = LaunchRequest {
            system: &system,
            controllers: &pads,
            rom: Path::new("/roms/snes/mario.smc"),
            bezel: None,
        };
        let out = translate(&request, &Paths::rooted(Path::new("/x")), &hd());
        assert_eq!(out.overlay, OverlayOutcome::Disabled(DisabledReason::NoBezel));
        assert_eq!(out.settings.get_string("aspect_ratio_index").as_deref(), Some("1"));
        assert_eq!(out.settings.get_string("input_overlay_enable").as_deref(), Some("false"));
    }

    #[test]
    fn translate_keeps_base_settings_when_display_fails() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::rooted(dir.path());
        let bezel = paths.overlay_user.join("recalbox");
        std::fs::create_dir_all(&bezel).unwrap();
        std::fs::write(
            bezel.join("default.info"),
            r#"{"width":1920,"height":1080,"opacity":1,"left":0,"right":0,"top":0,"bottom":0,"messagex":0.1,"messagey":0.1}"#,
        )
        .unwrap();
        std::fs::write(bezel.join("default.png"), b"png").unwrap();

        let system = SystemDescriptor::new("nes").with("rewind", "1");
        let request = LaunchRequest {
            system: &system,
            controllers: &[],
            rom: Path::new("zelda.nes"),
            bezel: Some("recalbox"),
        };
        let out = translate(&request, &paths, &BrokenDisplay);
        assert!(matches!(out.overlay, OverlayOutcome::ResolutionUnavailable(_)));
        assert_eq!(out.settings.get_string("rewind_enable").as_deref(), Some("true"));
        assert_eq!(out.settings.get_string("input_overlay_enable").as_deref(), Some("false"));
    }

    #[test]
    fn write_translation_skips_core_store_when_unused() {
        let system = SystemDescriptor::new("nes");
        let request = LaunchRequest {
            system: &system,
            controllers: &[],
            rom: Path::new("zelda.nes"),
            bezel: None,
        };
        let out = translate(&request, &Paths::default(), &hd());

        let dir = tempfile::tempdir().unwrap();
        let overlay_cfg = dir.path().join("bezel.cfg");
        let mut settings = MemoryStore::new();
        let mut core = MemoryStore::new();
        write_translation(&out, &mut settings, &mut core, &overlay_cfg).unwrap();

        assert_eq!(settings.len(), out.settings.len());
        assert_eq!(settings.get("video_message_pos_x"), Some("0.05"));
        assert!(core.is_empty());
        assert!(!overlay_cfg.exists());
    }

    #[test]
    fn write_translation_saves_keys_in_mapping_order() {
        let system = SystemDescriptor::new("msx1").with("core", "bluemsx");
        let request = LaunchRequest {
            system: &system,
            controllers: &[],
            rom: Path::new("game.rom"),
            bezel: None,
        };
        let out = translate(&request, &Paths::default(), &hd());

        let dir = tempfile::tempdir().unwrap();
        let mut settings = MemoryStore::new();
        let mut core = MemoryStore::new();
        write_translation(&out, &mut settings, &mut core, &dir.path().join("bezel.cfg")).unwrap();

        let saved: Vec<&str> = settings.keys().collect();
        let mapped: Vec<&str> = out.settings.iter().map(|(k, _)| k).collect();
        assert_eq!(saved, mapped);
        assert_eq!(core.get("bluemsx_msxtype"), Some("\"MSX2\""));
    }

    #[test]
    fn save_settings_renders_without_touching_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::rooted(dir.path());
        let system = SystemDescriptor::new("colecovision").with("core", "bluemsx");
        let request = LaunchRequest {
            system: &system,
            controllers: &[],
            rom: Path::new("game.col"),
            bezel: None,
        };
        let out = translate(&request, &paths, &hd());

        let mut settings = MemoryStore::new();
        let mut core = MemoryStore::new();
        save_settings(&out, &mut settings, &mut core).unwrap();

        assert!(settings.render().starts_with("video_smooth = false\n"));
        assert_eq!(core.render(), "bluemsx_msxtype = \"COL - ColecoVision\"\n");
        assert!(!paths.retroarch_custom.exists());
        assert!(!paths.retroarch_core_custom.exists());
    }
}
