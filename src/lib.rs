//! Indicator widgets for SCADA-style monitoring panels.
//!
//! Widgets consume externally pushed scalar/boolean values and repaint
//! themselves through any `embedded-graphics` [`DrawTarget`] with
//! [`Rgb888`] pixels. Setters only mark a widget dirty; the host drives
//! repainting by calling [`Panel::tick_at`] on its own cadence.
//!
//! [`DrawTarget`]: embedded_graphics::draw_target::DrawTarget
//! [`Rgb888`]: embedded_graphics::pixelcolor::Rgb888

pub mod config;
pub mod constants;
pub mod display;
pub mod draw;
pub mod pacer;
pub mod vframebuf;

pub use display::{
    Panel, PanelWidget, PointerEvent, Renderable, RenderState, ThemeSource, TickReport,
    WidgetError, WidgetId,
};
pub use pacer::PeriodicTimer;
pub use vframebuf::VarFrameBuf;
