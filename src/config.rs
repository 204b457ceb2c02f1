//! YAML panel descriptions.
//!
//! ```yaml
//! dark: false
//! widgets:
//!   - type: gauge
//!     name: boiler
//!     x: 40
//!     y: 40
//!     diameter: 200
//!     min: 0
//!     max: 16
//!     units: bar
//! ```

use embedded_graphics::prelude::{Point, Size};
use log::info;
use serde::Deserialize;
use std::{collections::HashSet, fs, path::Path};
use thiserror::Error;

use crate::constants::{DEFAULT_FAULT_TOKEN, GAUGE_DEFAULT_DIGITS};
use crate::display::color::{parse_hex, PaletteCycle};
use crate::display::components::{
    Diagram, FaultLamp, PointerGauge, Relay, Selector, StateLabel, TimerDisplay, Valve, ValueBar,
};
use crate::display::error::WidgetError;
use crate::display::linear::Orientation;
use crate::display::panel::{Panel, PanelWidget};
use crate::display::stopwatch::ThresholdWindow;
use crate::display::traits::Renderable;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Widget error: {0}")]
    Widget(#[from] WidgetError),
}

/// One screen of widgets.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PanelConfig {
    /// Initial theme; the host theme takes over on the first tick
    #[serde(default)]
    pub dark: bool,
    /// Overrides every widget's own redraw period
    pub redraw_period_ms: Option<u64>,
    /// Readout text for out-of-range values
    pub fault_token: Option<String>,
    #[serde(default)]
    pub widgets: Vec<WidgetConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WidgetConfig {
    Gauge(GaugeConfig),
    Bar(BarConfig),
    Diagram(DiagramConfig),
    Relay(RelayConfig),
    Valve(ValveConfig),
    Timer(TimerConfig),
    State(StateConfig),
    Lamp(LampConfig),
    Selector(SelectorConfig),
}

#[derive(Debug, Clone, Deserialize)]
pub struct GaugeConfig {
    pub name: Option<String>,
    pub x: i32,
    pub y: i32,
    pub diameter: u32,
    pub min: f64,
    pub max: f64,
    pub major_step: Option<f64>,
    pub minor_step: Option<f64>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub units: String,
    pub digits: Option<usize>,
    #[serde(default)]
    pub secondary_needle: bool,
    #[serde(default)]
    pub frame: bool,
    #[serde(default)]
    pub arc: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BarConfig {
    pub name: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub scheme_number: String,
    /// `#rrggbb`
    pub color: Option<String>,
    #[serde(default)]
    pub ticks: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagramConfig {
    pub name: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub min: f64,
    #[serde(default = "default_diagram_max")]
    pub max: f64,
    #[serde(default = "default_count")]
    pub items: usize,
    #[serde(default = "default_count")]
    pub sections: usize,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub section_names: Vec<String>,
    /// Per-series `#rrggbb` overrides, in series order
    #[serde(default)]
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub name: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub controllable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValveConfig {
    pub name: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub controllable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimerConfig {
    pub name: Option<String>,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub title: String,
    pub units: Option<String>,
    /// Threshold pair; both or neither
    pub begin: Option<f64>,
    pub end: Option<f64>,
    #[serde(default)]
    pub normal_min: f64,
    #[serde(default = "default_normal_max")]
    pub normal_max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateEntry {
    pub value: i32,
    pub name: String,
    /// `#rrggbb`
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    pub name: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub states: Vec<StateEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LampConfig {
    pub name: Option<String>,
    pub x: i32,
    pub y: i32,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    pub name: Option<String>,
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_selector_scale")]
    pub scale: f32,
}

fn default_diagram_max() -> f64 { 1.0 }
fn default_count() -> usize { 1 }
fn default_normal_max() -> f64 { 100.0 }
fn default_selector_scale() -> f32 { 0.25 }

impl WidgetConfig {
    pub fn name(&self) -> Option<&str> {
        match self {
            WidgetConfig::Gauge(c) => c.name.as_deref(),
            WidgetConfig::Bar(c) => c.name.as_deref(),
            WidgetConfig::Diagram(c) => c.name.as_deref(),
            WidgetConfig::Relay(c) => c.name.as_deref(),
            WidgetConfig::Valve(c) => c.name.as_deref(),
            WidgetConfig::Timer(c) => c.name.as_deref(),
            WidgetConfig::State(c) => c.name.as_deref(),
            WidgetConfig::Lamp(c) => c.name.as_deref(),
            WidgetConfig::Selector(c) => c.name.as_deref(),
        }
    }

    fn build(&self, fault_token: &str, palette: &mut PaletteCycle) -> Result<PanelWidget, ConfigError> {
        let widget = match self {
            WidgetConfig::Gauge(c) => {
                let mut g = PointerGauge::new(Point::new(c.x, c.y), c.diameter, c.min, c.max)?
                    .with_label(c.label.as_str())
                    .with_units(c.units.as_str());
                if c.secondary_needle {
                    g = g.with_secondary_needle();
                }
                match (c.major_step, c.minor_step) {
                    (Some(major), Some(minor)) => g.set_steps(major, minor)?,
                    (Some(major), None) => g.set_major_step(major)?,
                    (None, Some(minor)) => g.set_minor_step(minor)?,
                    (None, None) => {}
                }
                g.set_n_digits(c.digits.unwrap_or(GAUGE_DEFAULT_DIGITS));
                g.draw_frame(c.frame);
                g.draw_arc(c.arc);
                g.set_fault_token(fault_token);
                PanelWidget::Gauge(g)
            }
            WidgetConfig::Bar(c) => {
                let mut b = ValueBar::new(Point::new(c.x, c.y), Size::new(c.width, c.height), c.min, c.max)?;
                b.set_orientation(c.orientation);
                b.set_label(&c.label);
                b.set_units(&c.units);
                b.set_scheme_number(&c.scheme_number);
                if let Some(color) = c.color.as_deref() {
                    b.set_color(parse_hex(color)?);
                }
                b.set_draw_ticks(c.ticks);
                b.set_fault_token(fault_token);
                PanelWidget::Bar(b)
            }
            WidgetConfig::Diagram(c) => {
                let mut d = Diagram::new(Point::new(c.x, c.y), Size::new(c.width, c.height), palette)?;
                d.set_range(c.min, c.max)?;
                d.set_number_of_values(c.items)?;
                d.set_number_of_sections(c.sections)?;
                d.set_title(&c.title);
                d.set_labels(&c.labels);
                d.set_section_names(&c.section_names);
                for (i, color) in c.colors.iter().enumerate() {
                    d.set_color(i, parse_hex(color)?);
                }
                PanelWidget::Diagram(d)
            }
            WidgetConfig::Relay(c) => {
                let size = Size::new(
                    c.width.unwrap_or(Relay::DEFAULT_SIZE.width),
                    c.height.unwrap_or(Relay::DEFAULT_SIZE.height),
                );
                let mut r = Relay::new(Point::new(c.x, c.y), c.label.as_str()).with_size(size);
                if c.controllable {
                    r = r.controllable();
                }
                PanelWidget::Relay(r)
            }
            WidgetConfig::Valve(c) => {
                let size = Size::new(
                    c.width.unwrap_or(Valve::DEFAULT_SIZE.width),
                    c.height.unwrap_or(Valve::DEFAULT_SIZE.height),
                );
                let mut v = Valve::new(Point::new(c.x, c.y), c.label.as_str()).with_size(size);
                if c.controllable {
                    v = v.controllable();
                }
                PanelWidget::Valve(v)
            }
            WidgetConfig::Timer(c) => {
                let window = match (c.begin, c.end) {
                    (Some(b), Some(e)) => Some(ThresholdWindow::new(b, e)?),
                    (None, None) => None,
                    _ => {
                        return Err(ConfigError::Validation(format!(
                            "timer '{}' needs both begin and end, or neither",
                            c.title
                        )));
                    }
                };
                let mut t = TimerDisplay::new(Point::new(c.x, c.y), c.title.as_str(), window, c.normal_min, c.normal_max)?;
                if let Some(units) = c.units.as_deref() {
                    t = t.with_units(units);
                }
                PanelWidget::Timer(t)
            }
            WidgetConfig::State(c) => {
                let mut s = StateLabel::new(Point::new(c.x, c.y), Size::new(c.width, c.height));
                for entry in &c.states {
                    s.register(entry.value, entry.name.as_str(), parse_hex(&entry.color)?);
                }
                PanelWidget::State(s)
            }
            WidgetConfig::Lamp(c) => PanelWidget::Lamp(FaultLamp::new(Point::new(c.x, c.y), c.text.as_str())),
            WidgetConfig::Selector(c) => PanelWidget::Selector(Selector::new(Point::new(c.x, c.y), c.scale)?),
        };
        Ok(widget)
    }
}

impl PanelConfig {
    /// Construct every widget. Diagrams draw their series colours from `palette`.
    pub fn build(&self, palette: &mut PaletteCycle) -> Result<Panel, ConfigError> {
        validate(self)?;
        let fault_token = self.fault_token.as_deref().unwrap_or(DEFAULT_FAULT_TOKEN);
        let mut panel = Panel::new();
        for wc in &self.widgets {
            let mut widget = wc.build(fault_token, palette)?;
            widget.set_dark(self.dark);
            if let Some(period) = self.redraw_period_ms {
                widget.render_state_mut().set_redraw_period(period);
            }
            match wc.name() {
                Some(name) => panel.add_named(name, widget),
                None => panel.add(widget),
            };
        }
        info!("panel built with {} widgets (dark={})", panel.len(), self.dark);
        Ok(panel)
    }
}

/// Read and validate a panel description.
pub fn load(path: impl AsRef<Path>) -> Result<PanelConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::Validation(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    let s = fs::read_to_string(path)?;
    let cfg = from_yaml_str(&s)?;
    info!("loaded panel config {} ({} widgets)", path.display(), cfg.widgets.len());
    Ok(cfg)
}

pub fn from_yaml_str(s: &str) -> Result<PanelConfig, ConfigError> {
    let cfg: PanelConfig = serde_yaml::from_str(s)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Checks that do not need a widget instance; value ranges are checked
/// by the widget constructors in `build`.
pub fn validate(cfg: &PanelConfig) -> Result<(), ConfigError> {
    if cfg.redraw_period_ms == Some(0) {
        return Err(ConfigError::Validation("redraw_period_ms must be > 0".into()));
    }
    let mut names = HashSet::new();
    for wc in &cfg.widgets {
        if let Some(name) = wc.name() {
            if !names.insert(name) {
                return Err(ConfigError::Validation(format!("duplicate widget name '{name}'")));
            }
        }
        match wc {
            WidgetConfig::Gauge(c) if c.diameter == 0 => {
                return Err(ConfigError::Validation("gauge diameter must be > 0".into()));
            }
            WidgetConfig::Bar(c) if c.width == 0 || c.height == 0 => {
                return Err(ConfigError::Validation("bar size must be > 0".into()));
            }
            WidgetConfig::State(c) if c.states.is_empty() => {
                return Err(ConfigError::Validation("state label needs at least one state".into()));
            }
            _ => {}
        }
    }
    Ok(())
}
