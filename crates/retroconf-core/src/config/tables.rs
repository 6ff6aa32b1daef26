//! Static capability tables shared by the settings rules.
//!
//! The ratio list is positional: RetroArch stores `aspect_ratio_index` as an
//! offset into its own enumeration, so entries must never be reordered.

pub const RATIO_INDEXES: &[&str] = &[
    "4/3",
    "16/9",
    "16/10",
    "16/15",
    "1/1",
    "2/1",
    "3/2",
    "3/4",
    "4/1",
    "4/4",
    "5/4",
    "6/5",
    "7/9",
    "8/3",
    "8/7",
    "19/12",
    "19/14",
    "30/17",
    "32/9",
    "config",
    "squarepixel",
];

/// RetroArch's "custom viewport" slot, used when a bezel drives the geometry.
pub const OVERLAY_ASPECT_RATIO_INDEX: i64 = 22;

pub const CUSTOM_RATIO: &str = "custom";
pub const DEFAULT_DEVICE: &str = "1";
pub const DEFAULT_INPUT_DRIVER: &str = "udev";

/// Core that needs a multitap on port 2 once more than two pads are plugged in.
pub const MULTITAP_CORE: &str = "snes9x_next";
pub const MULTITAP_P2_DEVICE: &str = "257";

pub const BLUEMSX_CORE: &str = "bluemsx";
pub const BLUEMSX_TYPE_OPTION: &str = "bluemsx_msxtype";

pub fn ratio_index(ratio: &str) -> Option<usize> {
    RATIO_INDEXES.iter().position(|r| *r == ratio)
}

pub fn core_p1_device(core: &str) -> Option<&'static str> {
    match core {
        "cap32" => Some("513"),
        "81" => Some("257"),
        "fuse" => Some("513"),
        _ => None,
    }
}

pub fn core_p2_device(core: &str) -> Option<&'static str> {
    match core {
        "fuse" => Some("513"),
        _ => None,
    }
}

pub fn supports_retroachievements(system: &str) -> bool {
    matches!(
        system,
        "snes" | "nes" | "gba" | "gb" | "gbc" | "megadrive" | "pcengine"
    )
}

pub fn supports_rewind(system: &str) -> bool {
    !matches!(
        system,
        "sega32x" | "psx" | "zxspectrum" | "odyssey2" | "mame" | "n64"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetplayMode {
    Host,
    Client,
}

impl NetplayMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "host" => Some(NetplayMode::Host),
            "client" => Some(NetplayMode::Client),
            _ => None,
        }
    }
}

/// Machine type and pad wiring forced on systems emulated through blueMSX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BluemsxVariant {
    pub msx_type: &'static str,
    pub p1_device: &'static str,
    pub p2_device: &'static str,
}

pub fn bluemsx_variant(system: &str) -> Option<BluemsxVariant> {
    match system {
        "msx" | "msx1" | "msx2" => Some(BluemsxVariant {
            msx_type: "\"MSX2\"",
            p1_device: "257",
            p2_device: "257",
        }),
        "colecovision" => Some(BluemsxVariant {
            msx_type: "\"COL - ColecoVision\"",
            p1_device: "513",
            p2_device: "513",
        }),
        _ => None,
    }
}
