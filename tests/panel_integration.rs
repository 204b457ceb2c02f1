/*
 *  tests/panel_integration.rs
 *
 *  Integration tests for the widget panel
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 */

use std::cell::Cell;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use value_widgets::config;
use value_widgets::display::{
    Diagram, PaletteCycle, PanelWidget, PointerGauge, Relay, StateLabel, ThemeColors,
    ThresholdWindow, TimerDisplay, TimerPhase, ValueBar, WidgetError,
};
use value_widgets::{Panel, PointerEvent, Renderable, TickReport, VarFrameBuf};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// First instant at which freshly built widgets are all due.
fn start() -> Instant {
    Instant::now() + Duration::from_secs(1)
}

fn gauge_panel() -> (Panel, value_widgets::WidgetId) {
    let mut panel = Panel::new();
    let gauge = PointerGauge::new(Point::new(60, 60), 200, 0.0, 10.0)
        .unwrap()
        .with_units("bar")
        .with_label("Boiler");
    let id = panel.add(gauge);
    (panel, id)
}

fn gauge_mut(panel: &mut Panel, id: value_widgets::WidgetId) -> &mut PointerGauge {
    match panel.get_mut(id) {
        Some(PanelWidget::Gauge(g)) => g,
        other => panic!("expected gauge, got {other:?}"),
    }
}

#[test]
fn test_set_value_twice_marks_dirty_once() {
    init_logger();
    let (mut panel, id) = gauge_panel();
    let mut fb = VarFrameBuf::new(400, 400, Rgb888::BLACK);
    let t = start();

    assert_eq!(panel.tick_at(t, &mut fb, &false).repainted, 1);
    gauge_mut(&mut panel, id).set_value(5.0);
    assert!(gauge_mut(&mut panel, id).render_state().dirty());
    assert_eq!(panel.tick_at(t + ms(20), &mut fb, &false).repainted, 1);

    gauge_mut(&mut panel, id).set_value(5.0);
    assert!(!gauge_mut(&mut panel, id).render_state().dirty());
    assert_eq!(panel.tick_at(t + ms(40), &mut fb, &false).repainted, 0);
}

#[test]
fn test_redraw_is_idempotent() {
    init_logger();
    let t = start();
    let mut frames = Vec::new();
    for _ in 0..2 {
        let (mut panel, id) = gauge_panel();
        gauge_mut(&mut panel, id).set_value(7.25);
        let mut fb = VarFrameBuf::new(400, 400, Rgb888::BLACK);
        panel.tick_at(t, &mut fb, &false);
        frames.push(fb);
    }
    assert_eq!(frames[0], frames[1]);

    // repainting an unchanged widget again gives the same pixels
    let (mut panel, id) = gauge_panel();
    gauge_mut(&mut panel, id).set_value(7.25);
    let mut fb = VarFrameBuf::new(400, 400, Rgb888::BLACK);
    panel.tick_at(t, &mut fb, &false);
    panel.invalidate();
    panel.tick_at(t + ms(20), &mut fb, &false);
    assert_eq!(fb, frames[0]);
}

#[test]
fn test_out_of_range_clamps_needle_and_reports_fault() {
    let (mut panel, id) = gauge_panel();
    let gauge = gauge_mut(&mut panel, id);
    gauge.set_value(11.0);

    let cfg = gauge.config();
    assert_eq!(cfg.needle_angle(11.0), cfg.value_to_angle(10.0));
    assert_eq!(gauge.readout(), "Error");
}

#[test]
fn test_hidden_widget_is_not_painted() {
    let (mut panel, id) = gauge_panel();
    let mut fb = VarFrameBuf::new(400, 400, Rgb888::BLACK);
    let t = start();
    panel.get_mut(id).unwrap().set_visible(false);

    assert_eq!(panel.tick_at(t, &mut fb, &false), TickReport::default());
    assert_eq!(fb.count(Rgb888::BLACK), 400 * 400);

    panel.get_mut(id).unwrap().set_visible(true);
    assert_eq!(panel.tick_at(t + ms(20), &mut fb, &false).repainted, 1);
}

#[test]
fn test_host_theme_switch_repaints_everything() {
    let mut panel = Panel::new();
    panel.add(ValueBar::new(Point::new(20, 20), Size::new(200, 60), 0.0, 100.0).unwrap());
    panel.add(Relay::new(Point::new(20, 150), "K1"));
    let mut fb = VarFrameBuf::new(300, 300, Rgb888::BLACK);
    let t = start();

    let dark = Cell::new(false);
    let theme = || dark.get();
    assert_eq!(panel.tick_at(t, &mut fb, &theme).repainted, 2);
    assert_eq!(panel.tick_at(t + ms(20), &mut fb, &theme).repainted, 0);

    dark.set(true);
    assert_eq!(panel.tick_at(t + ms(40), &mut fb, &theme).repainted, 2);
    assert!(panel.iter().all(|(_, w)| w.render_state().dark()));
    assert!(fb.count(ThemeColors::DARK.window) > 0);
}

#[test]
fn test_diagram_resize_discards_values() {
    let mut palette = PaletteCycle::new();
    let mut diagram = Diagram::new(Point::new(60, 40), Size::new(300, 150), &mut palette).unwrap();
    diagram.set_number_of_values(2).unwrap();
    diagram.set_number_of_sections(2).unwrap();
    diagram.set_values(vec![vec![0.3, 0.6], vec![0.9, 0.1]]).unwrap();

    diagram.set_number_of_sections(3).unwrap();
    assert_eq!(diagram.values().len(), 3);
    assert!(diagram.values().iter().all(|row| row == &vec![0.0, 0.0]));
}

#[test]
fn test_unknown_state_keeps_text() {
    let mut label = StateLabel::new(Point::zero(), Size::new(100, 30));
    label.register(0, "Off", Rgb888::new(128, 128, 128));
    label.register(1, "On", Rgb888::new(0, 176, 0));

    assert_eq!(label.set_state(99), Err(WidgetError::UnknownState(99)));
    assert_eq!(label.text(), Some("Off"));
}

#[test]
fn test_timer_auto_stop_through_panel() {
    init_logger();
    let t = start();
    let window = ThresholdWindow::new(0.0, 10.0).unwrap();
    let timer = TimerDisplay::starting_at(Point::zero(), "Fill", Some(window), 0.0, 100.0, t).unwrap();
    let mut panel = Panel::new();
    let id = panel.add(timer);
    let mut fb = VarFrameBuf::new(260, 100, Rgb888::BLACK);

    let feed = |panel: &mut Panel, v: f64| {
        if let Some(PanelWidget::Timer(timer)) = panel.get_mut(id) {
            timer.set_controlled_value(v);
        }
    };
    let phase = |panel: &Panel| match panel.get(id) {
        Some(PanelWidget::Timer(timer)) => (timer.phase(), timer.elapsed()),
        other => panic!("expected timer, got {other:?}"),
    };

    if let Some(PanelWidget::Timer(timer)) = panel.get_mut(id) {
        timer.start_at(t);
    }
    let steps = [(-1.0, TimerPhase::Armed), (0.5, TimerPhase::Running), (5.0, TimerPhase::Running),
        (9.9, TimerPhase::Running), (10.0, TimerPhase::Idle), (10.0, TimerPhase::Idle)];
    let mut stopped_at = None;
    for (i, (v, expected)) in steps.into_iter().enumerate() {
        feed(&mut panel, v);
        panel.tick_at(t + ms(500 * (i as u64 + 1)), &mut fb, &false);
        let (p, elapsed) = phase(&panel);
        assert_eq!(p, expected, "step {i}");
        if p == TimerPhase::Idle {
            assert_eq!(*stopped_at.get_or_insert(elapsed), elapsed);
        }
    }
    // ran from the 0.5 sample to the 9.9 sample
    assert_eq!(stopped_at, Some(1.0));
}

#[test]
fn test_controllable_relay_via_panel() {
    let now = Instant::now();
    let mut panel = Panel::new();
    let id = panel.add(Relay::new(Point::new(10, 10), "K1").controllable());
    panel.dispatch_pointer(PointerEvent::Move(Point::new(15, 15)), now);
    panel.dispatch_pointer(PointerEvent::Press(Point::new(15, 15)), now);
    panel.dispatch_pointer(PointerEvent::Release(Point::new(15, 15)), now);
    match panel.get(id) {
        Some(PanelWidget::Relay(relay)) => assert!(relay.toggle_state()),
        other => panic!("expected relay, got {other:?}"),
    }
}

#[test]
fn test_config_panel_renders() {
    init_logger();
    let yaml = r##"
widgets:
  - { type: gauge, name: p1, x: 50, y: 50, diameter: 120, min: 0, max: 10, units: bar }
  - { type: bar, name: level, x: 260, y: 40, width: 120, height: 50, min: 0, max: 100, color: "#ff0000" }
  - { type: valve, x: 260, y: 120, label: V1 }
  - { type: lamp, x: 10, y: 230, text: Overheat }
"##;
    let cfg = config::from_yaml_str(yaml).unwrap();
    let mut panel = cfg.build(&mut PaletteCycle::new()).unwrap();
    let mut fb = VarFrameBuf::new(420, 260, Rgb888::BLACK);
    let report = panel.tick_at(start(), &mut fb, &false);
    assert_eq!(report, TickReport { repainted: 4, failed: 0 });
    assert!(panel.find("level").is_some());
}
