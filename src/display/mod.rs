/*
 *  display/mod.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Widget core: theme, geometry engines, state machines and the panel
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod color;
pub mod render_state;

// Geometry engines
pub mod gauge;
pub mod linear;

// State machines
pub mod interaction;
pub mod stopwatch;

// UI components
pub mod components;

// Widget container
pub mod panel;

// Re-exports for convenience
pub use traits::{PointerEvent, Renderable, ThemeSource};
pub use error::WidgetError;
pub use color::{contrast_color, parse_hex, PaletteCycle, Rgba, ThemeColors};
pub use render_state::RenderState;
pub use gauge::{GaugeConfig, Tick};
pub use linear::{LinearScale, Orientation};
pub use interaction::{InteractionState, TriggerMode};
pub use stopwatch::{Stopwatch, ThresholdWindow, TimerPhase};
pub use components::{
    Diagram, FaultLamp, PointerGauge, Relay, RelayState, Selector, StateLabel, TimerButton,
    TimerDisplay, Valve, ValveState, ValueBar,
};
pub use panel::{Panel, PanelWidget, TickReport, WidgetId};
