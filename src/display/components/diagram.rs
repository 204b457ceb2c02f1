/*
 *  display/components/diagram.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Grouped multi-series bar diagram with legend
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

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_9X15};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Alignment, Baseline};
use log::{debug, warn};

use crate::constants::{
    DIAGRAM_MARGIN_X, DIAGRAM_MARGIN_Y, GAUGE_REDRAW_PERIOD_MS, LEGEND_PADDING, LEGEND_SWATCH, PALETTE,
};
use crate::display::color::{contrast_color, PaletteCycle};
use crate::display::error::WidgetError;
use crate::display::linear::{grouped_bar_width, grouped_bar_x, label_needs_rotation, LinearScale};
use crate::display::render_state::RenderState;
use crate::display::traits::Renderable;
use crate::draw::{
    draw_dotted_vline, draw_line, draw_rounded_rect, draw_text, draw_text_in_box, draw_text_rotated,
    fill_rect, rect_from_corners, text_size,
};

/// `n_sections` groups of `n_items` bars sharing one value axis.
///
/// Resizing either dimension discards every stored value.
#[derive(Debug)]
pub struct Diagram {
    state: RenderState,
    origin: Point,
    size: Size,
    scale: LinearScale,
    n_items: usize,
    n_sections: usize,
    values: Vec<Vec<f64>>,
    base_colors: Vec<Rgb888>,
    colors: Vec<Rgb888>,
    title: String,
    legend: Vec<String>,
    section_names: Vec<String>,
}

impl Diagram {
    /// Plot area at `origin`/`size`; series colours are drawn from `palette`.
    pub fn new(origin: Point, size: Size, palette: &mut PaletteCycle) -> Result<Self, WidgetError> {
        if size.width == 0 || size.height == 0 {
            return Err(WidgetError::config("diagram size must be positive"));
        }
        let base_colors: Vec<Rgb888> = palette.take(PALETTE.len()).collect();
        Ok(Self {
            state: RenderState::new(GAUGE_REDRAW_PERIOD_MS),
            origin,
            size,
            scale: LinearScale::new(0.0, 1.0)?,
            n_items: 1,
            n_sections: 1,
            values: vec![vec![0.0; 1]; 1],
            colors: base_colors.clone(),
            base_colors,
            title: String::new(),
            legend: Vec::new(),
            section_names: Vec::new(),
        })
    }

    pub fn n_items(&self) -> usize { self.n_items }
    pub fn n_sections(&self) -> usize { self.n_sections }
    pub fn scale(&self) -> &LinearScale { &self.scale }

    /// Stored matrix, one row per section.
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn color(&self, item: usize) -> Option<Rgb888> {
        (item < self.n_items).then(|| self.colors[item])
    }

    pub fn set_range(&mut self, min_value: f64, max_value: f64) -> Result<(), WidgetError> {
        let scale = LinearScale::new(min_value, max_value)?;
        self.state.apply(&mut self.scale, scale);
        Ok(())
    }

    pub fn set_min_value(&mut self, min_value: f64) -> Result<(), WidgetError> {
        self.set_range(min_value, self.scale.max())
    }

    pub fn set_max_value(&mut self, max_value: f64) -> Result<(), WidgetError> {
        self.set_range(self.scale.min(), max_value)
    }

    /// Series per section. Reallocates the matrix filled with zeros.
    pub fn set_number_of_values(&mut self, n_items: usize) -> Result<(), WidgetError> {
        if n_items == 0 {
            return Err(WidgetError::config("diagram needs at least one series"));
        }
        self.n_items = n_items;
        while self.colors.len() < n_items {
            let next = self.base_colors[self.colors.len() % self.base_colors.len()];
            self.colors.push(next);
        }
        self.reallocate();
        Ok(())
    }

    /// Sections (categories). Reallocates the matrix filled with zeros.
    pub fn set_number_of_sections(&mut self, n_sections: usize) -> Result<(), WidgetError> {
        if n_sections == 0 {
            return Err(WidgetError::config("diagram needs at least one section"));
        }
        self.n_sections = n_sections;
        self.reallocate();
        Ok(())
    }

    /// Replace the whole matrix; it must be `n_sections` rows of `n_items`.
    pub fn set_values(&mut self, values: Vec<Vec<f64>>) -> Result<(), WidgetError> {
        let bad_row = values.iter().find(|row| row.len() != self.n_items);
        if values.len() != self.n_sections || bad_row.is_some() {
            return Err(WidgetError::ShapeMismatch {
                expected_rows: self.n_sections,
                expected_cols: self.n_items,
                rows: values.len(),
                cols: bad_row.or(values.first()).map_or(0, Vec::len),
            });
        }
        self.state.apply(&mut self.values, values);
        Ok(())
    }

    pub fn set_value(&mut self, section: usize, item: usize, value: f64) -> Result<(), WidgetError> {
        if section >= self.n_sections {
            return Err(WidgetError::IndexOutOfRange { index: section, len: self.n_sections });
        }
        if item >= self.n_items {
            return Err(WidgetError::IndexOutOfRange { index: item, len: self.n_items });
        }
        let slot = &mut self.values[section][item];
        self.state.apply(slot, value);
        Ok(())
    }

    /// Override one series colour. Indices past the series count are ignored.
    pub fn set_color(&mut self, item: usize, color: Rgb888) {
        if item >= self.n_items {
            warn!("colour for series {} ignored, diagram has {}", item, self.n_items);
            return;
        }
        let slot = &mut self.colors[item];
        self.state.apply(slot, color);
    }

    pub fn set_title(&mut self, title: &str) {
        if self.title != title {
            self.title = title.to_string();
            self.state.mark_dirty();
        }
    }

    pub fn set_labels<S: AsRef<str>>(&mut self, labels: &[S]) {
        let labels: Vec<String> = labels.iter().map(|s| s.as_ref().to_string()).collect();
        self.state.apply(&mut self.legend, labels);
    }

    pub fn set_section_names<S: AsRef<str>>(&mut self, names: &[S]) {
        let names: Vec<String> = names.iter().map(|s| s.as_ref().to_string()).collect();
        self.state.apply(&mut self.section_names, names);
    }

    pub fn set_geometry(&mut self, origin: Point, size: Size) -> Result<(), WidgetError> {
        if size.width == 0 || size.height == 0 {
            return Err(WidgetError::config("diagram size must be positive"));
        }
        self.origin = origin;
        self.size = size;
        self.state.mark_dirty();
        Ok(())
    }

    /// Rectangle of bar `item` in `section`, value clamped to the scale.
    pub fn bar_rect(&self, section: usize, item: usize) -> Rectangle {
        let (x0, y0) = (self.origin.x as f32, self.origin.y as f32);
        let h = self.size.height as f32;
        let section_w = self.size.width as f32 / self.n_sections as f32;
        let bar_w = grouped_bar_width(section_w, self.n_items);
        let x = grouped_bar_x(x0 + section as f32 * section_w, item, bar_w);
        let (top, bottom) = self.scale.bar_extent(self.values[section][item], y0 + h, y0);
        rect_from_corners(x, top, x + bar_w, bottom)
    }

    fn reallocate(&mut self) {
        debug!("diagram resized to {}x{}, values cleared", self.n_sections, self.n_items);
        self.values = vec![vec![0.0; self.n_items]; self.n_sections];
        self.state.mark_dirty();
    }

    fn plot_area(&self) -> Rectangle {
        Rectangle::new(self.origin, self.size)
    }

    fn draw_bars<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let section_w = self.size.width as f32 / self.n_sections as f32;
        let bar_w = grouped_bar_width(section_w, self.n_items);
        let font = &FONT_9X15;

        for item in 0..self.n_items {
            let fill = self.colors[item];
            let ink = contrast_color(fill);
            for section in 0..self.n_sections {
                let rect = self.bar_rect(section, item);
                fill_rect(target, rect, fill)?;

                let text = format!("{}", self.values[section][item].round() as i64);
                let text_w = text_size(&text, font).width;
                if label_needs_rotation(text_w, bar_w) {
                    let glyph_h = font.character_size.height as i32;
                    let x = rect.top_left.x + (rect.size.width as i32 - glyph_h) / 2;
                    draw_text_rotated(target, &text, Point::new(x, rect.top_left.y + 5), font, ink)?;
                } else {
                    let at = Point::new(rect.top_left.x + rect.size.width as i32 / 2, rect.top_left.y + 5);
                    draw_text(target, &text, at, font, ink, Alignment::Center, Baseline::Top)?;
                }
            }
        }
        Ok(())
    }

    fn draw_axes<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let axis = self.state.colors().axis;
        let (x, y) = (self.origin.x, self.origin.y);
        let (w, h) = (self.size.width as i32, self.size.height as i32);

        draw_line(target, Point::new(x, y + h), Point::new(x + w, y + h), axis, 1)?;
        draw_line(target, Point::new(x, y + h), Point::new(x, y), axis, 1)?;

        let step = (self.scale.max() - self.scale.min()) / 4.0;
        for k in 0..=4 {
            let ty = y + (k as f32 * h as f32 / 4.0).round() as i32;
            let len = if k % 2 == 0 { 5 } else { 3 };
            draw_line(target, Point::new(x, ty), Point::new(x - len, ty), axis, 1)?;
            let label = format!("{}", (self.scale.max() - k as f64 * step).round() as i64);
            draw_text(target, &label, Point::new(x - 10, ty), &FONT_6X10, axis, Alignment::Right, Baseline::Middle)?;
        }
        Ok(())
    }

    fn draw_legend<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        if self.legend.is_empty() {
            return Ok(());
        }
        let colors = self.state.colors();
        let font = &FONT_6X10;
        let rows = self.legend.len().min(self.n_items) as u32;
        let row_h = LEGEND_SWATCH + 4;
        let max_w = self.legend.iter().map(|l| text_size(l, font).width).max().unwrap_or(0);
        let panel = Size::new(max_w + LEGEND_SWATCH + 4 * LEGEND_PADDING, rows * row_h + LEGEND_PADDING + 1);
        let panel_at = Point::new(self.origin.x + self.size.width as i32 - panel.width as i32, self.origin.y);
        let radius = LEGEND_SWATCH / 2;

        let backdrop = colors.legend_panel.over(colors.window);
        draw_rounded_rect(target, Rectangle::new(panel_at, panel), radius, Some(backdrop), None)?;

        let pad = LEGEND_PADDING as i32;
        for (i, label) in self.legend.iter().take(rows as usize).enumerate() {
            let swatch_at = panel_at + Point::new(pad, pad + i as i32 * row_h as i32);
            let swatch = Rectangle::new(swatch_at, Size::new(LEGEND_SWATCH, LEGEND_SWATCH));
            draw_rounded_rect(target, swatch, radius, Some(self.colors[i]), None)?;
            let text_at = swatch_at + Point::new(LEGEND_SWATCH as i32 + pad, LEGEND_SWATCH as i32 / 2);
            draw_text(target, label, text_at, font, self.colors[i], Alignment::Left, Baseline::Middle)?;
        }
        Ok(())
    }
}

impl Renderable for Diagram {
    fn render_state(&self) -> &RenderState {
        &self.state
    }

    fn render_state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn bounds(&self) -> Rectangle {
        Rectangle::new(
            self.origin - Point::new(DIAGRAM_MARGIN_X as i32, DIAGRAM_MARGIN_Y as i32),
            Size::new(self.size.width + 2 * DIAGRAM_MARGIN_X, self.size.height + 2 * DIAGRAM_MARGIN_Y),
        )
    }

    fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let axis = self.state.colors().axis;
        let (x, y) = (self.origin.x, self.origin.y);
        let h = self.size.height as i32;
        let section_w = self.size.width as f32 / self.n_sections as f32;

        let title_box = Rectangle::new(Point::new(x, y - DIAGRAM_MARGIN_Y as i32), Size::new(self.size.width, 20));
        draw_text_in_box(target, &self.title, title_box, &FONT_9X15, axis)?;

        for i in 0..self.n_sections {
            let sx = x as f32 + i as f32 * section_w;
            if i > 0 {
                draw_dotted_vline(target, sx.round() as i32, y, y + h, axis)?;
            }
            if let Some(name) = self.section_names.get(i) {
                let at = Point::new((sx + section_w / 2.0).round() as i32, y + h + 5);
                draw_text(target, name, at, &FONT_6X10, axis, Alignment::Center, Baseline::Top)?;
            }
        }

        let plot = self.plot_area();
        self.draw_bars(&mut target.clipped(&plot))?;
        self.draw_axes(target)?;
        self.draw_legend(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vframebuf::VarFrameBuf;
    use embedded_graphics::primitives::PointsIter;

    fn diagram() -> Diagram {
        let mut palette = PaletteCycle::new();
        Diagram::new(Point::new(50, 25), Size::new(210, 100), &mut palette).unwrap()
    }

    #[test]
    fn test_colours_cycle_from_palette() {
        let mut palette = PaletteCycle::new();
        palette.next();
        let mut d = Diagram::new(Point::new(50, 25), Size::new(210, 100), &mut palette).unwrap();
        d.set_number_of_values(12).unwrap();
        assert_eq!(d.color(0), Some(PALETTE[1]));
        assert_eq!(d.color(9), Some(PALETTE[0]));
        assert_eq!(d.color(10), Some(PALETTE[1]));
        assert_eq!(d.color(12), None);
    }

    #[test]
    fn test_resize_discards_values() {
        let mut d = diagram();
        d.set_number_of_values(2).unwrap();
        d.set_number_of_sections(2).unwrap();
        d.set_values(vec![vec![0.5, 0.7], vec![0.2, 0.9]]).unwrap();

        d.set_number_of_sections(3).unwrap();
        assert_eq!(d.values(), &[vec![0.0, 0.0], vec![0.0, 0.0], vec![0.0, 0.0]]);
        assert!(d.values().iter().flatten().all(|v| *v == 0.0));
    }

    #[test]
    fn test_shape_checked() {
        let mut d = diagram();
        d.set_number_of_values(2).unwrap();
        let err = d.set_values(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap_err();
        assert_eq!(err, WidgetError::ShapeMismatch { expected_rows: 1, expected_cols: 2, rows: 2, cols: 2 });
        assert!(d.set_values(vec![vec![1.0]]).is_err());
        assert!(d.set_value(0, 2, 1.0).is_err());
        assert!(d.set_number_of_values(0).is_err());
    }

    #[test]
    fn test_set_color_ignores_unknown_series() {
        let mut d = diagram();
        d.render_state_mut().complete_repaint();
        d.set_color(3, Rgb888::new(1, 2, 3));
        assert!(!d.render_state().dirty());
        d.set_color(0, Rgb888::new(1, 2, 3));
        assert_eq!(d.color(0), Some(Rgb888::new(1, 2, 3)));
        assert!(d.render_state().dirty());
    }

    #[test]
    fn test_bar_geometry_clamps() {
        let mut d = diagram();
        d.set_number_of_values(2).unwrap();
        d.set_values(vec![vec![0.5, 3.0]]).unwrap();
        // section 210 wide: bar width (210 - 5) / 2 - 5 = 97.5
        let first = d.bar_rect(0, 0);
        assert_eq!(first.top_left, Point::new(55, 75));
        assert_eq!(first.size.height, 50);
        let second = d.bar_rect(0, 1);
        assert_eq!(second.top_left.y, 25);
        assert_eq!(second.size.height, 100);
    }

    #[test]
    fn test_narrow_bar_label_is_vertical() {
        let mut d = diagram();
        d.set_number_of_values(10).unwrap();
        d.set_range(0.0, 100000.0).unwrap();
        d.set_value(0, 0, 90000.0).unwrap();
        let bar = d.bar_rect(0, 0);
        assert!(bar.size.width < text_size("90000", &FONT_9X15).width);

        let mut fb = VarFrameBuf::new(320, 160, Rgb888::BLACK);
        d.render(&mut fb).unwrap();
        let fill = d.color(0).unwrap();
        let inner_bottom = bar.top_left.y + bar.size.height as i32 - 2;
        let ink: Vec<Point> = bar
            .points()
            .filter(|p| p.y < inner_bottom && fb.pixel(*p) != Some(fill))
            .collect();
        assert!(!ink.is_empty());

        let min_x = ink.iter().map(|p| p.x).min().unwrap();
        let max_x = ink.iter().map(|p| p.x).max().unwrap();
        let min_y = ink.iter().map(|p| p.y).min().unwrap();
        let max_y = ink.iter().map(|p| p.y).max().unwrap();
        // glyphs run down the bar, not across it
        assert!(max_y - min_y > 2 * (max_x - min_x));
        assert!(min_y >= bar.top_left.y + 5);
    }

    #[test]
    fn test_render_paints_series_colours() {
        let mut d = diagram();
        d.set_number_of_values(2).unwrap();
        d.set_values(vec![vec![0.5, 1.0]]).unwrap();
        d.set_labels(&["flow", "head"]);
        let mut fb = VarFrameBuf::new(320, 160, Rgb888::BLACK);
        d.render(&mut fb).unwrap();
        assert!(fb.count(PALETTE[0]) > 100);
        assert!(fb.count(PALETTE[1]) > 100);
        // nothing drawn right of the bounds
        assert!((311..320).all(|x| fb.pixel(Point::new(x, 80)) == Some(Rgb888::BLACK)));
    }
}
