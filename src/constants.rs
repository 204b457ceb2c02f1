//! This module contains global constants shared by the panel widgets.

use embedded_graphics::pixelcolor::Rgb888;

/// Default repaint cadence for value widgets (ms).
pub const DEFAULT_REDRAW_PERIOD_MS: u64 = 20;
/// Pointer gauges and diagrams repaint a little faster.
pub const GAUGE_REDRAW_PERIOD_MS: u64 = 15;
/// Timer displays poll their controlled value on this cadence.
pub const TIMER_REDRAW_PERIOD_MS: u64 = 5;
/// Fault lamps only ever poll the theme.
pub const LAMP_REDRAW_PERIOD_MS: u64 = 100;

/// Readout shown in place of a number when the value is outside the scale.
pub const DEFAULT_FAULT_TOKEN: &str = "Error";
/// Time unit appended to the elapsed readout of a timer.
pub const SECONDS_SUFFIX: &str = "s";

/// Fixed categorical palette used when series colours are handed out.
pub const PALETTE: [Rgb888; 10] = [
    Rgb888::new(0x1f, 0x77, 0xb4),
    Rgb888::new(0xff, 0x7f, 0x0e),
    Rgb888::new(0x2c, 0xa0, 0x2c),
    Rgb888::new(0xd6, 0x27, 0x28),
    Rgb888::new(0x94, 0x67, 0xbd),
    Rgb888::new(0x8c, 0x56, 0x4b),
    Rgb888::new(0xe3, 0x77, 0xc2),
    Rgb888::new(0x7f, 0x7f, 0x7f),
    Rgb888::new(0xbc, 0xbd, 0x22),
    Rgb888::new(0x17, 0xbe, 0xcf),
];

// Pointer gauge
/// Room around the dial reserved for tick labels (px).
pub const GAUGE_PADDING: u32 = 40;
/// Default dial sweep start, degrees counter-clockwise from 3 o'clock.
pub const GAUGE_START_ANGLE_DEG: f64 = 225.0;
/// Default dial sweep stop.
pub const GAUGE_STOP_ANGLE_DEG: f64 = -45.0;
/// Default digits after the point when the scale span is below 10.
pub const GAUGE_DEFAULT_DIGITS: usize = 3;
/// Upper bound on generated ticks, guards against runaway step configs.
pub const GAUGE_MAX_TICKS: usize = 2000;
/// Blink period of the fault readout (ms).
pub const GAUGE_FAULT_BLINK_MS: u64 = 500;

// Value bar
/// Height taken by the caption strip under a horizontal bar.
pub const BAR_CAPTION_HEIGHT: u32 = 22;
/// Initial top/bottom margin of a value bar.
pub const BAR_MARGIN_TOP: u32 = 10;

// Diagram
/// Gap between bars and around sections (px).
pub const DIAGRAM_BAR_GAP: f32 = 5.0;
/// Room left of the plot for the value axis.
pub const DIAGRAM_MARGIN_X: u32 = 50;
/// Room above and below the plot for the title and section names.
pub const DIAGRAM_MARGIN_Y: u32 = 25;
/// Legend swatch edge (px).
pub const LEGEND_SWATCH: u32 = 13;
/// Legend row padding (px).
pub const LEGEND_PADDING: u32 = 5;

// Selector
/// Angular spacing between selector positions (deg).
pub const SELECTOR_STEP_DEG: f32 = 40.0 / 3.0;
/// Blink period of the handle while the position is unknown (ms).
pub const SELECTOR_BLINK_MS: u64 = 250;
