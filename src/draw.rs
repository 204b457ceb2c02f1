//! Drawing helpers shared by the widgets: text placement and measurement,
//! rotated text, rounded panels and polylines over an `Rgb888` target.

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_5X8, FONT_6X10, FONT_7X13, FONT_9X15},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::{BinaryColor, Rgb888},
    prelude::*,
    primitives::{
        CornerRadii, Line, Polyline, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle,
        RoundedRectangle, Triangle,
    },
    text::{renderer::TextRenderer, Alignment, Baseline, Text, TextStyleBuilder},
};

use embedded_text::{
    alignment::{HorizontalAlignment, VerticalAlignment},
    style::TextBoxStyleBuilder,
    TextBox,
};

use crate::vframebuf::VarFrameBuf;

/// Fonts from smallest to largest; lookups pick the tallest that fits.
const FONTS: [&MonoFont<'static>; 5] = [&FONT_5X8, &FONT_6X10, &FONT_7X13, &FONT_9X15, &FONT_10X20];

/// Largest built-in mono font whose glyph height does not exceed `px`.
/// Falls back to the smallest font for tiny requests.
pub fn font_for_height(px: u32) -> &'static MonoFont<'static> {
    FONTS
        .iter()
        .rev()
        .find(|f| f.character_size.height <= px)
        .copied()
        .unwrap_or(&FONT_5X8)
}

/// Bounding box size of `text` rendered in `font`.
pub fn text_size(text: &str, font: &MonoFont<'_>) -> Size {
    MonoTextStyle::new(font, BinaryColor::On)
        .measure_string(text, Point::zero(), Baseline::Top)
        .bounding_box
        .size
}

/// Draw `text` with its anchor at `pos` using the given alignment/baseline.
pub fn draw_text<D>(
    target: &mut D,
    text: &str,
    pos: Point,
    font: &MonoFont<'_>,
    color: Rgb888,
    alignment: Alignment,
    baseline: Baseline,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    if text.is_empty() {
        return Ok(());
    }
    let style = TextStyleBuilder::new().alignment(alignment).baseline(baseline).build();
    Text::with_text_style(text, pos, MonoTextStyle::new(font, color), style).draw(target)?;
    Ok(())
}

/// Centre `text` on `center`.
pub fn draw_text_centered<D>(
    target: &mut D,
    text: &str,
    center: Point,
    font: &MonoFont<'_>,
    color: Rgb888,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    draw_text(target, text, center, font, color, Alignment::Center, Baseline::Middle)
}

/// Lay `text` out inside `bounds`, centred both ways and wrapped if needed.
pub fn draw_text_in_box<D>(
    target: &mut D,
    text: &str,
    bounds: Rectangle,
    font: &MonoFont<'_>,
    color: Rgb888,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    if text.is_empty() || bounds.size.width == 0 || bounds.size.height == 0 {
        return Ok(());
    }
    let textbox_style = TextBoxStyleBuilder::new()
        .alignment(HorizontalAlignment::Center)
        .vertical_alignment(VerticalAlignment::Middle)
        .build();
    TextBox::with_textbox_style(text, bounds, MonoTextStyle::new(font, color), textbox_style)
        .draw(target)?;
    Ok(())
}

/// Draw `text` turned a quarter counter-clockwise (reading bottom-to-top).
/// `origin` is the top-left of the rotated block; returns its size.
pub fn draw_text_rotated<D>(
    target: &mut D,
    text: &str,
    origin: Point,
    font: &MonoFont<'_>,
    color: Rgb888,
) -> Result<Size, D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let size = text_size(text, font);
    if size.width == 0 || size.height == 0 {
        return Ok(Size::zero());
    }
    let mut scratch = VarFrameBuf::new(size.width, size.height, BinaryColor::Off);
    let Ok(_) = Text::with_baseline(text, Point::zero(), MonoTextStyle::new(font, BinaryColor::On), Baseline::Top)
        .draw(&mut scratch);
    scratch.blit_rotated_ccw(target, origin, BinaryColor::On, color)?;
    Ok(Size::new(size.height, size.width))
}

/// Stroke a straight line.
pub fn draw_line<D>(target: &mut D, start: Point, end: Point, color: Rgb888, width: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    Line::new(start, end)
        .into_styled(PrimitiveStyle::with_stroke(color, width.max(1)))
        .draw(target)
}

/// Vertical line drawn as 1px dots every third pixel.
pub fn draw_dotted_vline<D>(target: &mut D, x: i32, y0: i32, y1: i32, color: Rgb888) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let (top, bottom) = (y0.min(y1), y0.max(y1));
    target.draw_iter((top..=bottom).step_by(3).map(|y| Pixel(Point::new(x, y), color)))
}

/// Stroke an open polyline.
pub fn draw_polyline<D>(target: &mut D, points: &[Point], color: Rgb888, width: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    if points.len() < 2 {
        return Ok(());
    }
    Polyline::new(points)
        .into_styled(PrimitiveStyle::with_stroke(color, width.max(1)))
        .draw(target)
}

/// Solid axis-aligned rectangle.
pub fn fill_rect<D>(target: &mut D, rect: Rectangle, color: Rgb888) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    if rect.size.width == 0 || rect.size.height == 0 {
        return Ok(());
    }
    rect.into_styled(PrimitiveStyle::with_fill(color)).draw(target)
}

/// Rounded rectangle with optional fill and border.
pub fn draw_rounded_rect<D>(
    target: &mut D,
    rect: Rectangle,
    radius: u32,
    fill: Option<Rgb888>,
    stroke: Option<(Rgb888, u32)>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let mut builder = PrimitiveStyleBuilder::new();
    if let Some(c) = fill {
        builder = builder.fill_color(c);
    }
    if let Some((c, w)) = stroke {
        builder = builder.stroke_color(c).stroke_width(w);
    }
    RoundedRectangle::new(rect, CornerRadii::new(Size::new(radius, radius)))
        .into_styled(builder.build())
        .draw(target)
}

/// Triangle with optional fill and border.
pub fn draw_triangle<D>(
    target: &mut D,
    vertices: [Point; 3],
    fill: Option<Rgb888>,
    stroke: Option<(Rgb888, u32)>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let mut builder = PrimitiveStyleBuilder::new();
    if let Some(c) = fill {
        builder = builder.fill_color(c);
    }
    if let Some((c, w)) = stroke {
        builder = builder.stroke_color(c).stroke_width(w);
    }
    Triangle::new(vertices[0], vertices[1], vertices[2])
        .into_styled(builder.build())
        .draw(target)
}

/// Rectangle spanning two arbitrary corners given in float pixels.
/// Degenerate spans produce an empty rectangle.
pub fn rect_from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Rectangle {
    let (l, r) = (x0.min(x1).round() as i32, x0.max(x1).round() as i32);
    let (t, b) = (y0.min(y1).round() as i32, y0.max(y1).round() as i32);
    Rectangle::new(Point::new(l, t), Size::new((r - l) as u32, (b - t) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_for_height() {
        assert_eq!(font_for_height(10).character_size.height, 10);
        assert_eq!(font_for_height(14).character_size.height, 13);
        assert_eq!(font_for_height(100).character_size.height, 20);
        assert_eq!(font_for_height(1).character_size.height, 8);
    }

    #[test]
    fn test_text_size_scales_with_length() {
        let one = text_size("8", &FONT_6X10);
        let four = text_size("8888", &FONT_6X10);
        assert_eq!(one.width, 6);
        assert_eq!(four.width, 24);
        assert_eq!(four.height, 10);
        assert_eq!(text_size("", &FONT_6X10).width, 0);
    }

    #[test]
    fn test_rotated_text_swaps_extent() {
        let mut fb = VarFrameBuf::new(40, 40, Rgb888::BLACK);
        let size = draw_text_rotated(&mut fb, "123", Point::new(2, 2), &FONT_6X10, Rgb888::WHITE).unwrap();
        assert_eq!(size, Size::new(10, 18));
        assert!(fb.count(Rgb888::WHITE) > 0);
        // nothing lands right of the rotated block
        for y in 0..40 {
            for x in 12..40 {
                assert_eq!(fb.pixel(Point::new(x, y)), Some(Rgb888::BLACK));
            }
        }
    }

    #[test]
    fn test_rect_from_corners_normalises() {
        let r = rect_from_corners(10.0, 30.0, 4.0, 12.0);
        assert_eq!(r.top_left, Point::new(4, 12));
        assert_eq!(r.size, Size::new(6, 18));
    }
}
