/*
 *  display/components/mod.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Indicator widgets
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

pub mod pointer_gauge;
pub mod value_bar;
pub mod diagram;
pub mod relay;
pub mod valve;
pub mod timer_display;
pub mod state_label;
pub mod fault_lamp;
pub mod selector;

// Re-exports
pub use pointer_gauge::PointerGauge;
pub use value_bar::ValueBar;
pub use diagram::Diagram;
pub use relay::{Relay, RelayState};
pub use valve::{Valve, ValveState};
pub use timer_display::{TimerButton, TimerDisplay};
pub use state_label::StateLabel;
pub use fault_lamp::FaultLamp;
pub use selector::Selector;
