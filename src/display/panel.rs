/*
 *  display/panel.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Widget container: tick scheduling, repaint and pointer routing
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

use std::fmt;
use std::time::Instant;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::{trace, warn};

use crate::display::components::{
    Diagram, FaultLamp, PointerGauge, Relay, Selector, StateLabel, TimerDisplay, Valve, ValueBar,
};
use crate::display::render_state::RenderState;
use crate::display::traits::{PointerEvent, Renderable, ThemeSource};
use crate::draw::fill_rect;

/// Handle returned by [`Panel::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(usize);

impl WidgetId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Every widget kind a panel can hold.
#[derive(Debug)]
pub enum PanelWidget {
    Gauge(PointerGauge),
    Bar(ValueBar),
    Diagram(Diagram),
    Relay(Relay),
    Valve(Valve),
    Timer(TimerDisplay),
    State(StateLabel),
    Lamp(FaultLamp),
    Selector(Selector),
}

macro_rules! each_widget {
    ($value:expr, $w:ident => $body:expr) => {
        match $value {
            PanelWidget::Gauge($w) => $body,
            PanelWidget::Bar($w) => $body,
            PanelWidget::Diagram($w) => $body,
            PanelWidget::Relay($w) => $body,
            PanelWidget::Valve($w) => $body,
            PanelWidget::Timer($w) => $body,
            PanelWidget::State($w) => $body,
            PanelWidget::Lamp($w) => $body,
            PanelWidget::Selector($w) => $body,
        }
    };
}

macro_rules! widget_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for PanelWidget {
                fn from(w: $ty) -> Self {
                    PanelWidget::$variant(w)
                }
            }
        )*
    };
}

widget_from!(
    Gauge(PointerGauge),
    Bar(ValueBar),
    Diagram(Diagram),
    Relay(Relay),
    Valve(Valve),
    Timer(TimerDisplay),
    State(StateLabel),
    Lamp(FaultLamp),
    Selector(Selector),
);

impl PanelWidget {
    pub fn kind(&self) -> &'static str {
        match self {
            PanelWidget::Gauge(_) => "gauge",
            PanelWidget::Bar(_) => "bar",
            PanelWidget::Diagram(_) => "diagram",
            PanelWidget::Relay(_) => "relay",
            PanelWidget::Valve(_) => "valve",
            PanelWidget::Timer(_) => "timer",
            PanelWidget::State(_) => "state",
            PanelWidget::Lamp(_) => "lamp",
            PanelWidget::Selector(_) => "selector",
        }
    }
}

impl Renderable for PanelWidget {
    fn render_state(&self) -> &RenderState {
        each_widget!(self, w => w.render_state())
    }

    fn render_state_mut(&mut self) -> &mut RenderState {
        each_widget!(self, w => w.render_state_mut())
    }

    fn bounds(&self) -> Rectangle {
        each_widget!(self, w => w.bounds())
    }

    fn handle_pointer_event(&mut self, event: PointerEvent, now: Instant) -> bool {
        each_widget!(self, w => w.handle_pointer_event(event, now))
    }

    fn advance(&mut self, now: Instant) {
        each_widget!(self, w => w.advance(now))
    }

    fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        each_widget!(self, w => w.render(target))
    }
}

/// Outcome of one [`Panel::tick_at`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub repainted: usize,
    pub failed: usize,
}

#[derive(Debug)]
struct Slot {
    name: Option<String>,
    widget: PanelWidget,
}

/// Owns the widgets of one screen and drives them from the host loop.
#[derive(Debug, Default)]
pub struct Panel {
    slots: Vec<Slot>,
    pressed: Option<WidgetId>,
    hovered: Option<WidgetId>,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, widget: impl Into<PanelWidget>) -> WidgetId {
        self.slots.push(Slot { name: None, widget: widget.into() });
        WidgetId(self.slots.len() - 1)
    }

    /// Add a widget that can later be found by `name`.
    pub fn add_named(&mut self, name: impl Into<String>, widget: impl Into<PanelWidget>) -> WidgetId {
        let id = self.add(widget);
        self.slots[id.0].name = Some(name.into());
        id
    }

    pub fn find(&self, name: &str) -> Option<WidgetId> {
        self.slots
            .iter()
            .position(|s| s.name.as_deref() == Some(name))
            .map(WidgetId)
    }

    pub fn get(&self, id: WidgetId) -> Option<&PanelWidget> {
        self.slots.get(id.0).map(|s| &s.widget)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut PanelWidget> {
        self.slots.get_mut(id.0).map(|s| &mut s.widget)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WidgetId, &PanelWidget)> {
        self.slots.iter().enumerate().map(|(i, s)| (WidgetId(i), &s.widget))
    }

    /// Mark every widget dirty, e.g. after the host cleared the screen.
    pub fn invalidate(&mut self) {
        for slot in &mut self.slots {
            slot.widget.request_repaint();
        }
    }

    /// One host tick. Widgets whose redraw period elapsed adopt the host
    /// theme, run their state machines and, when dirty and visible, are
    /// repainted over a cleared background. A failed repaint leaves the
    /// widget dirty for the next tick.
    pub fn tick_at<D, T>(&mut self, now: Instant, target: &mut D, theme: &T) -> TickReport
    where
        D: DrawTarget<Color = Rgb888>,
        D::Error: fmt::Debug,
        T: ThemeSource + ?Sized,
    {
        let dark = theme.is_dark();
        let mut report = TickReport::default();

        for (i, slot) in self.slots.iter_mut().enumerate() {
            let widget = &mut slot.widget;
            if !widget.render_state_mut().due_at(now) {
                continue;
            }
            widget.set_dark(dark);
            widget.advance(now);
            if !widget.render_state().needs_repaint() {
                continue;
            }

            let background = widget.render_state().colors().window;
            let result = fill_rect(target, widget.bounds(), background).and_then(|_| widget.render(target));
            match result {
                Ok(()) => {
                    widget.render_state_mut().complete_repaint();
                    report.repainted += 1;
                }
                Err(e) => {
                    warn!("repaint of {} {} failed: {:?}", widget.kind(), WidgetId(i), e);
                    report.failed += 1;
                }
            }
        }
        if report.repainted > 0 || report.failed > 0 {
            trace!("tick: {} repainted, {} failed", report.repainted, report.failed);
        }
        report
    }

    /// Route a host pointer event. Presses and moves go to the topmost
    /// visible widget under the pointer; a release goes to the widget that
    /// took the press. Returns true when a widget consumed the event.
    pub fn dispatch_pointer(&mut self, event: PointerEvent, now: Instant) -> bool {
        match event {
            PointerEvent::Enter => false,
            PointerEvent::Leave => self.set_hovered(None, now),
            PointerEvent::Move(p) => {
                let under = self.widget_at(p);
                let mut consumed = self.set_hovered(under, now);
                if let Some(id) = under {
                    consumed |= self.deliver(id, event, now);
                }
                consumed
            }
            PointerEvent::Press(p) => {
                let Some(id) = self.widget_at(p) else {
                    return false;
                };
                self.pressed = Some(id);
                self.deliver(id, event, now)
            }
            PointerEvent::Release(p) => match self.pressed.take().or_else(|| self.widget_at(p)) {
                Some(id) => self.deliver(id, event, now),
                None => false,
            },
        }
    }

    fn widget_at(&self, p: Point) -> Option<WidgetId> {
        self.slots
            .iter()
            .rposition(|s| s.widget.is_visible() && s.widget.bounds().contains(p))
            .map(WidgetId)
    }

    fn set_hovered(&mut self, under: Option<WidgetId>, now: Instant) -> bool {
        if self.hovered == under {
            return false;
        }
        let mut consumed = false;
        if let Some(old) = self.hovered.take() {
            consumed |= self.deliver(old, PointerEvent::Leave, now);
        }
        if let Some(new) = under {
            consumed |= self.deliver(new, PointerEvent::Enter, now);
        }
        self.hovered = under;
        consumed
    }

    fn deliver(&mut self, id: WidgetId, event: PointerEvent, now: Instant) -> bool {
        match self.slots.get_mut(id.0) {
            Some(slot) => slot.widget.handle_pointer_event(event, now),
            None => false,
        }
    }
}
