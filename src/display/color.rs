/*
 *  display/color.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Colour policy: contrast selection, cyclic palette, theme colours
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

use crate::constants::PALETTE;
use super::error::WidgetError;

/// Black or white, whichever reads better on top of `fill`.
///
/// Black when the mean of the three channels is at least 128.
pub fn contrast_color(fill: Rgb888) -> Rgb888 {
    let sum = fill.r() as u16 + fill.g() as u16 + fill.b() as u16;
    if sum >= 3 * 128 {
        Rgb888::BLACK
    } else {
        Rgb888::WHITE
    }
}

/// Parse `#rrggbb` (leading `#` optional).
pub fn parse_hex(text: &str) -> Result<Rgb888, WidgetError> {
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WidgetError::config(format!("bad colour '{text}', expected #rrggbb")));
    }
    let v = u32::from_str_radix(hex, 16).map_err(|e| WidgetError::config(e.to_string()))?;
    Ok(Rgb888::new((v >> 16) as u8, (v >> 8) as u8, v as u8))
}

/// Colour with coverage. Composited against a known background before
/// drawing since the target has no alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub rgb: Rgb888,
    pub alpha: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, alpha: u8) -> Self {
        Self { rgb: Rgb888::new(r, g, b), alpha }
    }

    pub const fn opaque(rgb: Rgb888) -> Self {
        Self { rgb, alpha: 255 }
    }

    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self { rgb: self.rgb, alpha }
    }

    /// Source-over composite onto `bg`.
    pub fn over(self, bg: Rgb888) -> Rgb888 {
        let a = self.alpha as u16;
        let mix = |fg: u8, bg: u8| ((fg as u16 * a + bg as u16 * (255 - a) + 127) / 255) as u8;
        Rgb888::new(
            mix(self.rgb.r(), bg.r()),
            mix(self.rgb.g(), bg.g()),
            mix(self.rgb.b(), bg.b()),
        )
    }

    /// Brighten by `percent` (120 = 20% brighter), keeping hue. Once the
    /// brightest channel saturates the colour washes toward white instead.
    pub fn lighter(self, percent: u16) -> Self {
        let (r, g, b) = (self.rgb.r() as u32, self.rgb.g() as u32, self.rgb.b() as u32);
        let v = r.max(g).max(b);
        if v == 0 {
            return self;
        }
        let target = v * percent as u32 / 100;
        let scale = |c: u32| -> u8 {
            if target <= 255 {
                (c * target / v) as u8
            } else {
                (c * 255 / v + (target - 255)).min(255) as u8
            }
        };
        Self { rgb: Rgb888::new(scale(r), scale(g), scale(b)), alpha: self.alpha }
    }
}

impl From<Rgb888> for Rgba {
    fn from(rgb: Rgb888) -> Self {
        Rgba::opaque(rgb)
    }
}

/// Stateful allocator over the fixed 10-entry palette.
///
/// Each instance keeps its own cursor; two cycles are not kept in step.
#[derive(Debug, Clone, Default)]
pub struct PaletteCycle {
    cursor: usize,
}

impl PaletteCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the entry the next call hands out.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Undo the last allocation; no-op at the start of the cycle.
    pub fn step_back(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub const fn len(&self) -> usize {
        PALETTE.len()
    }

    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl Iterator for PaletteCycle {
    type Item = Rgb888;

    /// Current entry, then advance with wrap-around. Never ends.
    fn next(&mut self) -> Option<Rgb888> {
        let color = PALETTE[self.cursor];
        self.cursor = (self.cursor + 1) % PALETTE.len();
        Some(color)
    }
}

/// Colours for one theme mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    /// Panel behind the widgets
    pub window: Rgb888,
    /// Widget face
    pub background: Rgb888,
    pub foreground: Rgb888,
    /// Scale lines, secondary text
    pub scale: Rgb888,
    /// Diagram axes and titles
    pub axis: Rgb888,
    pub muted: Rgb888,
    pub ok: Rgb888,
    pub idle: Rgb888,
    pub alert: Rgb888,
    pub needle: Rgb888,
    pub second_needle: Rgb888,
    pub bar: Rgba,
    pub reference: Rgb888,
    pub timer_ok: Rgb888,
    pub timer_warn: Rgb888,
    pub caption: Rgb888,
    pub legend_panel: Rgba,
}

impl ThemeColors {
    pub const LIGHT: ThemeColors = ThemeColors {
        window: Rgb888::new(240, 240, 240),
        background: Rgb888::new(255, 255, 255),
        foreground: Rgb888::new(0, 0, 0),
        scale: Rgb888::new(0, 0, 0),
        axis: Rgb888::new(0, 0, 0),
        muted: Rgb888::new(128, 128, 128),
        ok: Rgb888::new(0, 176, 0),
        idle: Rgb888::new(230, 230, 0),
        alert: Rgb888::new(255, 0, 0),
        needle: Rgb888::new(255, 0, 0),
        second_needle: Rgb888::new(0, 0, 255),
        bar: Rgba::new(45, 154, 254, 200),
        reference: Rgb888::new(6, 214, 160),
        timer_ok: Rgb888::new(0, 100, 50),
        timer_warn: Rgb888::new(230, 0, 0),
        caption: Rgb888::new(0, 0, 100),
        legend_panel: Rgba::new(200, 200, 200, 100),
    };

    pub const DARK: ThemeColors = ThemeColors {
        window: Rgb888::new(32, 36, 44),
        background: Rgb888::new(45, 52, 65),
        foreground: Rgb888::new(255, 255, 255),
        scale: Rgb888::new(128, 128, 128),
        axis: Rgb888::new(210, 210, 210),
        muted: Rgb888::new(128, 128, 128),
        ok: Rgb888::new(6, 214, 160),
        idle: Rgb888::new(255, 209, 108),
        alert: Rgb888::new(229, 89, 52),
        needle: Rgb888::new(233, 96, 79),
        second_needle: Rgb888::new(86, 114, 179),
        bar: Rgba::new(86, 114, 179, 250),
        reference: Rgb888::new(6, 214, 160),
        timer_ok: Rgb888::new(6, 214, 160),
        timer_warn: Rgb888::new(229, 89, 52),
        caption: Rgb888::new(210, 210, 210),
        legend_panel: Rgba::new(200, 200, 200, 100),
    };

    pub const fn for_mode(dark: bool) -> &'static ThemeColors {
        if dark { &Self::DARK } else { &Self::LIGHT }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contrast_extremes() {
        assert_eq!(contrast_color(Rgb888::new(0, 0, 0)), Rgb888::WHITE);
        assert_eq!(contrast_color(Rgb888::new(255, 255, 255)), Rgb888::BLACK);
    }

    #[test]
    fn test_contrast_boundary() {
        // mean 127.67 stays white, mean exactly 128 flips to black
        assert_eq!(contrast_color(Rgb888::new(128, 128, 127)), Rgb888::WHITE);
        assert_eq!(contrast_color(Rgb888::new(128, 128, 128)), Rgb888::BLACK);
        assert_eq!(contrast_color(Rgb888::new(255, 129, 0)), Rgb888::BLACK);
    }

    #[test]
    fn test_palette_wraps_after_ten() {
        let mut cycle = PaletteCycle::new();
        let first: Vec<Rgb888> = cycle.by_ref().take(11).collect();
        assert_eq!(first[0], PALETTE[0]);
        assert_eq!(first[10], PALETTE[0]);
        assert_eq!(first[9], PALETTE[9]);
        assert_eq!(cycle.cursor(), 1);
    }

    #[test]
    fn test_palette_step_back_and_reset() {
        let mut cycle = PaletteCycle::new();
        cycle.step_back();
        assert_eq!(cycle.cursor(), 0);

        cycle.next();
        cycle.next();
        cycle.step_back();
        assert_eq!(cycle.next(), Some(PALETTE[1]));

        for _ in 0..7 {
            cycle.next();
        }
        cycle.reset();
        assert_eq!(cycle.next(), Some(PALETTE[0]));
    }

    #[test]
    fn test_independent_cycles() {
        let mut a = PaletteCycle::new();
        let mut b = PaletteCycle::new();
        a.next();
        assert_eq!(b.next(), Some(PALETTE[0]));
        assert_eq!(a.next(), Some(PALETTE[1]));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#1f77b4").unwrap(), Rgb888::new(0x1f, 0x77, 0xb4));
        assert_eq!(parse_hex("FF0000").unwrap(), Rgb888::new(255, 0, 0));
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#zz0000").is_err());
    }

    #[test]
    fn test_alpha_composite() {
        let half = Rgba::new(255, 255, 255, 128);
        let out = half.over(Rgb888::BLACK);
        assert_eq!(out, Rgb888::new(128, 128, 128));
        assert_eq!(Rgba::opaque(Rgb888::RED).over(Rgb888::BLUE), Rgb888::RED);
        assert_eq!(Rgba::new(0, 255, 0, 0).over(Rgb888::BLUE), Rgb888::BLUE);
    }

    #[test]
    fn test_lighter() {
        let c = Rgba::new(100, 50, 0, 255).lighter(120);
        assert_eq!(c.rgb, Rgb888::new(120, 60, 0));
        let sat = Rgba::new(250, 10, 10, 90).lighter(120);
        assert_eq!(sat.rgb.r(), 255);
        assert!(sat.rgb.g() > 10);
        assert_eq!(sat.alpha, 90);
        assert_eq!(Rgba::new(0, 0, 0, 255).lighter(150).rgb, Rgb888::BLACK);
    }
}
