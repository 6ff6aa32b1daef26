//! Core settings mapper.
//!
//! Each rule is a pure transform over [`MappedSettings`]. Rules run in the
//! order of [`RULES`]; a later rule may overwrite a key set by an earlier one.

use crate::config::tables::{self, NetplayMode};
use crate::config::{OutputSettings, Paths, SystemDescriptor};
use tracing::debug;

pub struct RuleContext<'a> {
    pub system: &'a SystemDescriptor,
    pub controller_count: usize,
    pub paths: &'a Paths,
}

/// Result of the mapper: frontend settings plus options destined for the
/// per-core options file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedSettings {
    pub settings: OutputSettings,
    pub core_options: OutputSettings,
}

pub type Rule = fn(&RuleContext, &mut MappedSettings);

pub const RULES: &[(&str, Rule)] = &[
    ("smoothing", smoothing),
    ("shader", shader),
    ("aspect_ratio", aspect_ratio),
    ("rewind", rewind),
    ("autosave", autosave),
    ("input_driver", input_driver),
    ("directories", directories),
    ("controller_devices", controller_devices),
    ("retroachievements", retroachievements),
    ("integer_scale", integer_scale),
    ("core_variant", core_variant),
    ("netplay", netplay),
    ("show_fps", show_fps),
];

pub fn map_core_settings(ctx: &RuleContext) -> MappedSettings {
    let mut out = MappedSettings::default();
    for (name, rule) in RULES {
        rule(ctx, &mut out);
        debug!(rule = *name, "applied settings rule");
    }
    out
}

fn smoothing(ctx: &RuleContext, out: &mut MappedSettings) {
    out.settings.set("video_smooth", ctx.system.enabled("smooth"));
}

fn shader(ctx: &RuleContext, out: &mut MappedSettings) {
    match ctx.system.get_defined("shaders") {
        Some(path) => {
            out.settings.set("video_shader", path);
            out.settings.set("video_shader_enable", true);
            // Shaders do their own filtering.
            out.settings.set("video_smooth", false);
        }
        None => out.settings.set("video_shader_enable", false),
    }
}

fn aspect_ratio(ctx: &RuleContext, out: &mut MappedSettings) {
    out.settings.set("aspect_ratio_index", "");
    let ratio = ctx.system.get("ratio").unwrap_or_default();
    if let Some(index) = tables::ratio_index(ratio) {
        out.settings.set("aspect_ratio_index", index);
        out.settings.set("video_aspect_ratio_auto", false);
    } else if ratio == tables::CUSTOM_RATIO {
        out.settings.set("video_aspect_ratio_auto", false);
    } else {
        out.settings.set("video_aspect_ratio_auto", true);
    }
}

fn rewind(ctx: &RuleContext, out: &mut MappedSettings) {
    let requested = ctx.system.enabled("rewind");
    let allowed = tables::supports_rewind(&ctx.system.name);
    if requested && !allowed {
        debug!(system = %ctx.system.name, "rewind is not supported, leaving it off");
    }
    out.settings.set("rewind_enable", requested && allowed);
}

fn autosave(ctx: &RuleContext, out: &mut MappedSettings) {
    let enabled = ctx.system.enabled("autosave");
    out.settings.set("savestate_auto_save", enabled);
    out.settings.set("savestate_auto_load", enabled);
}

fn input_driver(ctx: &RuleContext, out: &mut MappedSettings) {
    let driver = ctx
        .system
        .get_defined("inputdriver")
        .unwrap_or(tables::DEFAULT_INPUT_DRIVER);
    out.settings.set("input_joypad_driver", driver);
}

fn directories(ctx: &RuleContext, out: &mut MappedSettings) {
    let dir = ctx
        .paths
        .saves_dir_for(&ctx.system.name)
        .to_string_lossy()
        .to_string();
    out.settings.set("savestate_directory", dir.clone());
    out.settings.set("savefile_directory", dir);
}

fn controller_devices(ctx: &RuleContext, out: &mut MappedSettings) {
    let core = ctx.system.core().unwrap_or_default();
    let p1 = tables::core_p1_device(core).unwrap_or(tables::DEFAULT_DEVICE);
    let mut p2 = tables::core_p2_device(core).unwrap_or(tables::DEFAULT_DEVICE);
    if ctx.controller_count > 2 && core == tables::MULTITAP_CORE {
        p2 = tables::MULTITAP_P2_DEVICE;
    }
    out.settings.set("input_libretro_device_p1", p1);
    out.settings.set("input_libretro_device_p2", p2);
}

fn retroachievements(ctx: &RuleContext, out: &mut MappedSettings) {
    out.settings.set("cheevos_enable", false);
    out.settings.set("cheevos_hardcore_mode_enable", false);

    if !ctx.system.enabled("retroachievements") {
        return;
    }
    if !tables::supports_retroachievements(&ctx.system.name) {
        debug!(system = %ctx.system.name, "retroachievements not available for system");
        return;
    }

    out.settings.set("cheevos_enable", true);
    out.settings.set(
        "cheevos_username",
        ctx.system.value_or("retroachievements.username", ""),
    );
    out.settings.set(
        "cheevos_password",
        ctx.system.value_or("retroachievements.password", ""),
    );
    out.settings.set(
        "cheevos_hardcore_mode_enable",
        ctx.system.enabled("retroachievements.hardcore"),
    );
}

fn integer_scale(ctx: &RuleContext, out: &mut MappedSettings) {
    out.settings
        .set("video_scale_integer", ctx.system.enabled("integerscale"));
}

fn core_variant(ctx: &RuleContext, out: &mut MappedSettings) {
    let Some(variant) = tables::bluemsx_variant(&ctx.system.name) else {
        return;
    };
    if ctx.system.core() != Some(tables::BLUEMSX_CORE) {
        return;
    }
    out.core_options
        .set(tables::BLUEMSX_TYPE_OPTION, variant.msx_type);
    out.settings.set("input_libretro_device_p1", variant.p1_device);
    out.settings.set("input_libretro_device_p2", variant.p2_device);
}

fn netplay(ctx: &RuleContext, out: &mut MappedSettings) {
    let Some(mode) = ctx.system.get("netplaymode").and_then(NetplayMode::parse) else {
        return;
    };

    // Hardcore mode forbids save states, which netplay relies on.
    if out.settings.get_string("cheevos_hardcore_mode_enable").as_deref() == Some("true") {
        debug!("netplay requested, dropping retroachievements hardcore mode");
    }
    out.settings.set("cheevos_hardcore_mode_enable", false);

    // RetroArch expects netplay_mode=false for a host started from the command line.
    out.settings.set("netplay_mode", false);
    out.settings.set(
        "netplay_ip_port",
        ctx.system.value_or("netplay.server.port", ""),
    );
    out.settings.set(
        "netplay_delay_frames",
        ctx.system.value_or("netplay.frames", ""),
    );
    out.settings
        .set("netplay_nickname", ctx.system.value_or("netplay.nick", ""));
    out.settings.set("netplay_client_swap_input", false);

    if mode == NetplayMode::Client {
        out.settings.set("netplay_mode", true);
        out.settings.set(
            "netplay_ip_address",
            ctx.system.value_or("netplay.server.ip", ""),
        );
        out.settings.set("netplay_client_swap_input", true);
    }
}

fn show_fps(ctx: &RuleContext, out: &mut MappedSettings) {
    out.settings.set("fps_show", ctx.system.enabled("showFPS"));
}
