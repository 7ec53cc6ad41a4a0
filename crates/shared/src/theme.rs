//! Light and dark color palettes.
//!
//! Colors are plain RGB triples so this crate stays free of any UI toolkit;
//! the app converts them to `egui::Color32`.

use crate::status::ServerStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(value: u32) -> Self {
        Self((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub card: Rgb,
    pub text: Rgb,
    pub border: Rgb,
    pub input_background: Rgb,
    pub input_text: Rgb,
    pub button: Rgb,
    pub log_text: Rgb,
}

pub const LIGHT: Palette = Palette {
    background: Rgb::hex(0xF0F0F0),
    card: Rgb::hex(0xFFFFFF),
    text: Rgb::hex(0x333333),
    border: Rgb::hex(0xEEEEEE),
    input_background: Rgb::hex(0xF9F9F9),
    input_text: Rgb::hex(0x333333),
    button: Rgb::hex(0x6200EE),
    log_text: Rgb::hex(0x444444),
};

pub const DARK: Palette = Palette {
    background: Rgb::hex(0x181818),
    card: Rgb::hex(0x222222),
    text: Rgb::hex(0xFFFFFF),
    border: Rgb::hex(0x333333),
    input_background: Rgb::hex(0x222222),
    input_text: Rgb::hex(0xFFFFFF),
    button: Rgb::hex(0xBB86FC),
    log_text: Rgb::hex(0xCCCCCC),
};

pub fn palette(dark_mode: bool) -> &'static Palette {
    if dark_mode {
        &DARK
    } else {
        &LIGHT
    }
}

/// Status bar color: green online, red offline, orange while checking.
pub fn status_color(status: ServerStatus) -> Rgb {
    match status {
        ServerStatus::Online => Rgb(0, 128, 0),
        ServerStatus::Offline => Rgb(255, 0, 0),
        ServerStatus::Checking => Rgb(255, 165, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_unpacks_channels() {
        assert_eq!(Rgb::hex(0x6200EE), Rgb(0x62, 0x00, 0xEE));
    }

    #[test]
    fn test_palette_selection() {
        assert_eq!(palette(true).background, Rgb::hex(0x181818));
        assert_eq!(palette(false).button, Rgb::hex(0x6200EE));
    }
}
