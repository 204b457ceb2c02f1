/*
 *  vframebuf.rs
 *
 *  value-widgets - SCADA panel indicators
 *	(c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::PixelColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// A runtime-sized framebuffer for embedded-graphics.
///
/// Serves as scratch surface for rotated text and as an in-memory
/// render target for hosts that composite the panel themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

impl<C: PixelColor + Clone> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Mutable raw access
    pub fn as_mut_slice(&mut self) -> &mut [C] { &mut self.buf }

    /// Immutable raw access
    pub fn as_slice(&self) -> &[C] { &self.buf }

    /// Clear to a color
    pub fn clear_color(&mut self, color: C) {
        self.buf.fill(color);
    }

    /// Pixel at `p`, `None` outside the buffer.
    pub fn pixel(&self, p: Point) -> Option<C> {
        self.idx(p).map(|i| self.buf[i])
    }

    /// Number of pixels equal to `color`.
    pub fn count(&self, color: C) -> usize {
        self.buf.iter().filter(|&&c| c == color).count()
    }

    /// Copy every pixel equal to `key` onto `target`, rotated a quarter
    /// turn counter-clockwise so rows read bottom-to-top. The rotated
    /// image's top-left lands on `origin`; other pixels are painted `color`.
    pub fn blit_rotated_ccw<D, T>(&self, target: &mut D, origin: Point, key: C, color: T) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = T>,
        T: PixelColor,
    {
        let (w, h) = (self.w as i32, self.h as i32);
        let pixels = (0..h).flat_map(move |y| (0..w).map(move |x| Point::new(x, y)))
            .filter(|p| self.pixel(*p) == Some(key))
            .map(|p| Pixel(Point::new(origin.x + p.y, origin.y + (w - 1 - p.x)), color));
        target.draw_iter(pixels)
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor + Clone> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        // clip first, primitives hand us areas hanging off the edge
        let area = area.intersection(&self.bounding_box());
        let Size { width, height } = area.size;
        if width == 0 || height == 0 { return Ok(()); }
        let (x0, y0) = (area.top_left.x as usize, area.top_left.y as usize);
        for row in y0..y0 + height as usize {
            let base = row * self.w + x0;
            self.buf[base..base + width as usize].fill(color);
        }
        Ok(())
    }
}
