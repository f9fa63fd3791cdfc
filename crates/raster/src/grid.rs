//! The decoded raster grid.

use forecast_common::{GeoBounds, LatLng, Sample};

use crate::error::{DecodeError, Result};

/// An immutable lat/lon grid of cell values.
///
/// Cells are stored row-major with row 0 at the northern edge (`lat_max`) and
/// column 0 at the western edge (`lon_min`). `None` marks a no-data cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    bounds: GeoBounds,
    pixel_width: f64,
    pixel_height: f64,
    width: usize,
    height: usize,
    values: Vec<Option<f32>>,
    no_data: Option<f64>,
}

impl RasterGrid {
    /// Build a grid, checking that the value count matches `width * height`.
    ///
    /// Pixel sizes are derived from the bounds.
    pub fn new(
        bounds: GeoBounds,
        width: usize,
        height: usize,
        values: Vec<Option<f32>>,
        no_data: Option<f64>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DecodeError::Empty {
                width: width as u32,
                height: height as u32,
            });
        }
        let expected = width * height;
        if values.len() != expected {
            return Err(DecodeError::DimensionMismatch {
                expected,
                actual: values.len(),
            });
        }

        Ok(Self {
            pixel_width: bounds.lon_span() / width as f64,
            pixel_height: bounds.lat_span() / height as f64,
            bounds,
            width,
            height,
            values,
            no_data,
        })
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    /// Cell size along longitude, in degrees.
    pub fn pixel_width(&self) -> f64 {
        self.pixel_width
    }

    /// Cell size along latitude, in degrees.
    pub fn pixel_height(&self) -> f64 {
        self.pixel_height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The no-data sentinel declared in the raster metadata, if any.
    pub fn no_data(&self) -> Option<f64> {
        self.no_data
    }

    pub fn values(&self) -> &[Option<f32>] {
        &self.values
    }

    /// Iterate over rows from north to south.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<f32>]> {
        self.values.chunks(self.width)
    }

    /// Value at a grid position, or `None` if the position is outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Option<Sample> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(Sample::from(self.values[row * self.width + col]))
    }

    /// Grid position containing a coordinate.
    ///
    /// Coordinates on the southern or eastern edge map to the last row/column.
    pub fn locate(&self, at: LatLng) -> Option<(usize, usize)> {
        if !self.bounds.contains(at) {
            return None;
        }
        let col = ((at.lng - self.bounds.lon_min) / self.pixel_width).floor() as usize;
        let row = ((self.bounds.lat_max - at.lat) / self.pixel_height).floor() as usize;
        Some((row.min(self.height - 1), col.min(self.width - 1)))
    }

    /// Nearest-cell value at a coordinate, `None` outside the grid bounds.
    pub fn sample(&self, at: LatLng) -> Option<Sample> {
        let (row, col) = self.locate(at)?;
        self.cell(row, col)
    }

    /// Number of cells carrying a value.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Minimum and maximum over valid cells.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.values.iter().flatten().fold(None, |range, &v| match range {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
    }
}
