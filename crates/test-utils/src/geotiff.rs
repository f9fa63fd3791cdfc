//! Builder for in-memory GeoTIFF payloads.
//!
//! Produces the layout the forecast service exports: one band, an upper-left
//! tie point, a pixel scale and an optional `GDAL_NODATA` string. Multi-band
//! RGB output is available for decoder edge cases.

use std::io::Cursor;

use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{TiffEncoder, TiffValue};
use tiff::tags::Tag;

/// Builds GeoTIFF bytes for tests.
///
/// # Example
///
/// ```
/// use test_utils::GeoTiffBuilder;
///
/// let bytes = GeoTiffBuilder::new(4, 2)
///     .origin(49.0, -125.0)
///     .pixel_size(1.0, 1.0)
///     .values(vec![0.0; 8])
///     .build();
/// assert!(bytes.starts_with(b"II") || bytes.starts_with(b"MM"));
/// ```
#[derive(Debug, Clone)]
pub struct GeoTiffBuilder {
    width: u32,
    height: u32,
    lat_max: f64,
    lon_min: f64,
    pixel_width: f64,
    pixel_height: f64,
    values: Vec<f32>,
    no_data: Option<String>,
    georeferenced: bool,
}

impl GeoTiffBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            lat_max: 0.0,
            lon_min: 0.0,
            pixel_width: 1.0,
            pixel_height: 1.0,
            values: vec![0.0; (width * height) as usize],
            no_data: None,
            georeferenced: true,
        }
    }

    /// Upper-left corner (northern latitude, western longitude).
    pub fn origin(mut self, lat_max: f64, lon_min: f64) -> Self {
        self.lat_max = lat_max;
        self.lon_min = lon_min;
        self
    }

    pub fn pixel_size(mut self, pixel_width: f64, pixel_height: f64) -> Self {
        self.pixel_width = pixel_width;
        self.pixel_height = pixel_height;
        self
    }

    /// Fit the raster to bounds given as (lat_min, lat_max, lon_min, lon_max).
    pub fn bounds(self, bounds: (f64, f64, f64, f64)) -> Self {
        let (lat_min, lat_max, lon_min, lon_max) = bounds;
        let pixel_width = (lon_max - lon_min) / self.width as f64;
        let pixel_height = (lat_max - lat_min) / self.height as f64;
        self.origin(lat_max, lon_min)
            .pixel_size(pixel_width, pixel_height)
    }

    pub fn values(mut self, values: Vec<f32>) -> Self {
        self.values = values;
        self
    }

    pub fn no_data(mut self, no_data: &str) -> Self {
        self.no_data = Some(no_data.to_string());
        self
    }

    /// Omit the GeoTIFF tags, producing a plain TIFF.
    pub fn without_georeference(mut self) -> Self {
        self.georeferenced = false;
        self
    }

    /// Encode as a single-band 32-bit float GeoTIFF.
    pub fn build(&self) -> Vec<u8> {
        self.encode::<colortype::Gray32Float>(&self.values)
    }

    /// Encode the values as 16-bit unsigned integers (rounded, clamped).
    pub fn build_u16(&self) -> Vec<u8> {
        let data: Vec<u16> = self
            .values
            .iter()
            .map(|v| v.round().clamp(0.0, u16::MAX as f32) as u16)
            .collect();
        self.encode::<colortype::Gray16>(&data)
    }

    /// Encode as a three-band 8-bit RGB image.
    ///
    /// The values (rounded, clamped) go in the first band; the second holds
    /// `255 - value` and the third a constant 7, so a reader that mixes up
    /// bands is caught.
    pub fn build_rgb8(&self) -> Vec<u8> {
        let data: Vec<u8> = self
            .values
            .iter()
            .flat_map(|v| {
                let first = v.round().clamp(0.0, 255.0) as u8;
                [first, 255 - first, 7]
            })
            .collect();
        self.encode::<colortype::RGB8>(&data)
    }

    fn encode<C: ColorType>(&self, data: &[C::Inner]) -> Vec<u8>
    where
        [C::Inner]: TiffValue,
    {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buffer).expect("create TIFF encoder");
            let mut image = encoder
                .new_image::<C>(self.width, self.height)
                .expect("create TIFF image");

            if self.georeferenced {
                let scale = [self.pixel_width, self.pixel_height, 0.0];
                let tiepoint = [0.0, 0.0, 0.0, self.lon_min, self.lat_max, 0.0];
                image
                    .encoder()
                    .write_tag(Tag::ModelPixelScaleTag, &scale[..])
                    .expect("write ModelPixelScale");
                image
                    .encoder()
                    .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
                    .expect("write ModelTiepoint");
            }
            if let Some(no_data) = &self.no_data {
                image
                    .encoder()
                    .write_tag(Tag::GdalNodata, no_data.as_str())
                    .expect("write GDAL_NODATA");
            }

            image.write_data(data).expect("write TIFF data");
        }
        buffer.into_inner()
    }
}
