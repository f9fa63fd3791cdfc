//! GeoTIFF payload decoding.
//!
//! Supports north-up EPSG:4326 rasters georeferenced with a single tie point
//! and a pixel scale, which is what the forecast service exports. Only the
//! first band is kept. The no-data sentinel comes from the `GDAL_NODATA` tag.

use std::io::Cursor;

use forecast_common::GeoBounds;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::debug;

use crate::error::{DecodeError, Result};
use crate::grid::RasterGrid;

/// Affine georeferencing read from ModelTiepoint + ModelPixelScale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// Longitude of the western edge.
    pub origin_lon: f64,
    /// Latitude of the northern edge.
    pub origin_lat: f64,
    /// Degrees of longitude per column.
    pub scale_x: f64,
    /// Degrees of latitude per row (positive, rows run southward).
    pub scale_y: f64,
}

impl GeoTransform {
    /// Build from raw tag values.
    ///
    /// The tie point `(i, j, k, x, y, z)` pins raster position `(i, j)` to
    /// model coordinate `(x, y)`; it need not be the upper-left corner.
    pub fn from_tags(tiepoint: &[f64], scale: &[f64]) -> Result<Self> {
        if tiepoint.len() < 6 {
            return Err(DecodeError::invalid_georeference(format!(
                "ModelTiepoint has {} values, expected 6",
                tiepoint.len()
            )));
        }
        if scale.len() < 2 {
            return Err(DecodeError::invalid_georeference(format!(
                "ModelPixelScale has {} values, expected at least 2",
                scale.len()
            )));
        }

        let (scale_x, scale_y) = (scale[0], scale[1]);
        if !(scale_x.is_finite() && scale_x > 0.0 && scale_y.is_finite() && scale_y > 0.0) {
            return Err(DecodeError::invalid_georeference(format!(
                "pixel scale must be positive, got ({}, {})",
                scale_x, scale_y
            )));
        }

        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        Ok(Self {
            origin_lon: x - i * scale_x,
            origin_lat: y + j * scale_y,
            scale_x,
            scale_y,
        })
    }

    /// Bounds covered by a `width` x `height` raster.
    pub fn bounds(&self, width: u32, height: u32) -> Result<GeoBounds> {
        let lat_max = self.origin_lat;
        let lon_min = self.origin_lon;
        Ok(GeoBounds::new(
            lat_max - height as f64 * self.scale_y,
            lat_max,
            lon_min,
            lon_min + width as f64 * self.scale_x,
        )?)
    }
}

/// Decode a GeoTIFF buffer into a [`RasterGrid`].
///
/// Decoding is a pure function of the bytes: the same input always yields an
/// equal grid.
pub fn decode(bytes: &[u8]) -> Result<RasterGrid> {
    let mut decoder = Decoder::new(Cursor::new(bytes))?;

    let (width, height) = decoder.dimensions()?;
    if width == 0 || height == 0 {
        return Err(DecodeError::Empty { width, height });
    }

    let scale = read_f64_tag(&mut decoder, Tag::ModelPixelScaleTag, "ModelPixelScale")?;
    let tiepoint = read_f64_tag(&mut decoder, Tag::ModelTiepointTag, "ModelTiepoint")?;
    let transform = GeoTransform::from_tags(&tiepoint, &scale)?;
    let no_data = read_no_data(&mut decoder)?;

    let samples = samples_as_f64(decoder.read_image()?);
    let cells = width as usize * height as usize;
    let bands = band_count(samples.len(), cells)?;

    let values: Vec<Option<f32>> = samples
        .iter()
        .step_by(bands)
        .map(|&v| to_cell(v, no_data))
        .collect();

    let bounds = transform.bounds(width, height)?;
    debug!(
        width,
        height,
        bands,
        no_data = ?no_data,
        bounds = %bounds,
        "Decoded GeoTIFF"
    );

    RasterGrid::new(bounds, width as usize, height as usize, values, no_data)
}

fn read_f64_tag(
    decoder: &mut Decoder<Cursor<&[u8]>>,
    tag: Tag,
    name: &'static str,
) -> Result<Vec<f64>> {
    match decoder.find_tag(tag)? {
        Some(value) => Ok(value.into_f64_vec()?),
        None => Err(DecodeError::MissingGeoreference(name)),
    }
}

fn read_no_data(decoder: &mut Decoder<Cursor<&[u8]>>) -> Result<Option<f64>> {
    let Some(value) = decoder.find_tag(Tag::GdalNodata)? else {
        return Ok(None);
    };

    let text = value.into_string()?;
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if text.eq_ignore_ascii_case("nan") {
        // NaN cells are already treated as no data
        return Ok(None);
    }
    text.parse::<f64>()
        .map(Some)
        .map_err(|_| DecodeError::invalid_georeference(format!("GDAL_NODATA is not a number: {:?}", text)))
}

/// Samples per pixel for a chunky buffer of `len` samples over `cells` pixels.
fn band_count(len: usize, cells: usize) -> Result<usize> {
    if cells == 0 || len < cells || len % cells != 0 {
        return Err(DecodeError::DimensionMismatch {
            expected: cells,
            actual: len,
        });
    }
    Ok(len / cells)
}

fn to_cell(v: f64, no_data: Option<f64>) -> Option<f32> {
    if v.is_nan() {
        return None;
    }
    // compare at storage precision so f32 rasters match their declared sentinel
    if let Some(nd) = no_data {
        if v as f32 == nd as f32 {
            return None;
        }
    }
    Some(v as f32)
}

fn samples_as_f64(data: DecodingResult) -> Vec<f64> {
    match data {
        DecodingResult::U8(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::U16(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::U32(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::U64(values) => values.into_iter().map(|v| v as f64).collect(),
        DecodingResult::I8(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::I16(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::I32(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::I64(values) => values.into_iter().map(|v| v as f64).collect(),
        DecodingResult::F32(values) => values.into_iter().map(f64::from).collect(),
        DecodingResult::F64(values) => values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_from_upper_left_tiepoint() {
        let t = GeoTransform::from_tags(&[0.0, 0.0, 0.0, -125.0, 49.0, 0.0], &[1.0, 0.5, 0.0])
            .unwrap();
        assert_eq!(t.origin_lon, -125.0);
        assert_eq!(t.origin_lat, 49.0);

        let bounds = t.bounds(59, 48).unwrap();
        assert_eq!(bounds.lon_max, -66.0);
        assert_eq!(bounds.lat_min, 25.0);
    }

    #[test]
    fn test_transform_from_offset_tiepoint() {
        // tie point at pixel (2, 4) instead of the corner
        let t = GeoTransform::from_tags(&[2.0, 4.0, 0.0, -100.0, 40.0, 0.0], &[0.5, 0.25]).unwrap();
        assert_eq!(t.origin_lon, -101.0);
        assert_eq!(t.origin_lat, 41.0);
    }

    #[test]
    fn test_transform_rejects_bad_scale() {
        assert!(matches!(
            GeoTransform::from_tags(&[0.0; 6], &[0.0, 1.0]),
            Err(DecodeError::InvalidGeoreference(_))
        ));
        assert!(matches!(
            GeoTransform::from_tags(&[0.0; 6], &[1.0, -1.0]),
            Err(DecodeError::InvalidGeoreference(_))
        ));
        assert!(matches!(
            GeoTransform::from_tags(&[0.0; 3], &[1.0, 1.0]),
            Err(DecodeError::InvalidGeoreference(_))
        ));
    }

    #[test]
    fn test_to_cell() {
        assert_eq!(to_cell(3.5, Some(-9999.0)), Some(3.5));
        assert_eq!(to_cell(-9999.0, Some(-9999.0)), None);
        assert_eq!(to_cell(f64::NAN, None), None);
        assert_eq!(to_cell(0.0, None), Some(0.0));
    }

    #[test]
    fn test_band_count() {
        assert_eq!(band_count(12, 12).unwrap(), 1);
        assert_eq!(band_count(36, 12).unwrap(), 3);
        assert!(matches!(
            band_count(13, 12),
            Err(DecodeError::DimensionMismatch {
                expected: 12,
                actual: 13
            })
        ));
        assert!(matches!(
            band_count(6, 12),
            Err(DecodeError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            band_count(0, 0),
            Err(DecodeError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_garbage_bytes_are_malformed() {
        assert!(matches!(
            decode(b"definitely not a tiff"),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(decode(&[]), Err(DecodeError::Malformed(_))));
    }
}
