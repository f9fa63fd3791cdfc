//! Painting a decoded grid into a displayable overlay layer.

use forecast_common::{Color, GeoBounds};
use raster::RasterGrid;
use rayon::prelude::*;
use tracing::debug;

use crate::png::{self, PngError};
use crate::ramp::ColorRamp;

/// A painted overlay: one RGBA pixel per grid cell, stretched over `bounds`.
///
/// `opacity` is a layer property applied by the map surface; it is not baked
/// into the pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    bounds: GeoBounds,
    width: usize,
    height: usize,
    opacity: f32,
    pixels: Vec<u8>,
}

impl OverlayLayer {
    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Raw RGBA bytes, row-major, north row first.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, row: usize, col: usize) -> Option<Color> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let i = (row * self.width + col) * 4;
        let p = &self.pixels[i..i + 4];
        Some(Color::new(p[0], p[1], p[2], p[3]))
    }

    pub fn to_png(&self) -> Result<Vec<u8>, PngError> {
        png::encode(&self.pixels, self.width, self.height)
    }
}

/// Classify every cell of `grid` with `ramp`.
///
/// Rows are painted in parallel. Opacity is clamped to `[0, 1]`; a non-finite
/// opacity means fully opaque.
pub fn paint(grid: &RasterGrid, ramp: &ColorRamp, opacity: f32) -> OverlayLayer {
    let width = grid.width();
    let height = grid.height();
    let mut pixels = vec![0u8; width * height * 4];

    pixels
        .par_chunks_mut(width * 4)
        .zip(grid.values().par_chunks(width))
        .for_each(|(out, row)| {
            for (px, &cell) in out.chunks_exact_mut(4).zip(row) {
                px.copy_from_slice(&ramp.classify(cell).to_rgba());
            }
        });

    let opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        1.0
    };

    debug!(
        width,
        height,
        valid = grid.valid_count(),
        ramp_version = ramp.version(),
        "Painted overlay"
    );

    OverlayLayer {
        bounds: grid.bounds(),
        width,
        height,
        opacity,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(values: Vec<Option<f32>>, width: usize, height: usize) -> RasterGrid {
        let bounds = GeoBounds::new(30.0, 40.0, -110.0, -100.0).unwrap();
        RasterGrid::new(bounds, width, height, values, None).unwrap()
    }

    #[test]
    fn test_paint_classifies_each_cell() {
        let layer = paint(
            &grid(vec![Some(0.0), Some(26.0), None, Some(130.0)], 2, 2),
            &ColorRamp::precipitation(),
            0.1,
        );

        assert_eq!(layer.pixel(0, 0), Some(Color::rgb(0, 0, 255)));
        assert_eq!(layer.pixel(0, 1), Some(Color::rgb(0, 255, 255)));
        assert_eq!(layer.pixel(1, 0), Some(Color::TRANSPARENT));
        assert_eq!(layer.pixel(1, 1), Some(Color::rgb(255, 0, 0)));
        assert_eq!(layer.pixel(2, 0), None);
        assert_eq!(layer.pixels().len(), 16);
        assert_eq!(layer.bounds(), grid(vec![None; 4], 2, 2).bounds());
    }

    #[test]
    fn test_opacity_clamped() {
        let g = grid(vec![Some(1.0)], 1, 1);
        let ramp = ColorRamp::precipitation();
        assert_eq!(paint(&g, &ramp, 0.1).opacity(), 0.1);
        assert_eq!(paint(&g, &ramp, 3.0).opacity(), 1.0);
        assert_eq!(paint(&g, &ramp, -1.0).opacity(), 0.0);
        assert_eq!(paint(&g, &ramp, f32::NAN).opacity(), 1.0);
    }

    #[test]
    fn test_png_is_indexed() {
        let layer = paint(&grid(vec![Some(0.0), None], 2, 1), &ColorRamp::precipitation(), 1.0);
        let png = layer.to_png().unwrap();
        assert_eq!(&png[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
        assert_eq!(png[25], 3);
    }
}
