//! Tests for painting decoded rasters and encoding them as PNG.

use forecast_common::Color;
use renderer::png::{encode, encode_rgba};
use renderer::{paint, ColorRamp};
use test_utils::fixtures::bounds::CONUS;
use test_utils::{create_precip_grid, punch_no_data, GeoTiffBuilder};

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

fn conus_grid() -> raster::RasterGrid {
    let mut values = create_precip_grid(59, 24, 130.0);
    punch_no_data(&mut values, 7, -9999.0);
    let bytes = GeoTiffBuilder::new(59, 24)
        .bounds(CONUS)
        .values(values)
        .no_data("-9999")
        .build();
    raster::decode(&bytes).unwrap()
}

/// Read the IHDR color type byte.
fn color_type(png: &[u8]) -> u8 {
    png[25]
}

#[test]
fn test_paint_decoded_raster() {
    let grid = conus_grid();
    let ramp = ColorRamp::precipitation();
    let layer = paint(&grid, &ramp, 0.1);

    assert_eq!(layer.width(), 59);
    assert_eq!(layer.height(), 24);
    assert_eq!(layer.bounds(), grid.bounds());
    assert_eq!(layer.opacity(), 0.1);

    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let expected = ramp.classify(grid.cell(row, col).unwrap());
            assert_eq!(layer.pixel(row, col), Some(expected));
        }
    }
}

#[test]
fn test_no_data_cells_are_transparent() {
    let layer = paint(&conus_grid(), &ColorRamp::precipitation(), 1.0);
    // stride 7 punches index 0
    assert_eq!(layer.pixel(0, 0), Some(Color::TRANSPARENT));
    // the east edge holds the wettest values
    assert_eq!(layer.pixel(0, 58), Some(Color::rgb(255, 0, 0)));
}

#[test]
fn test_overlay_png_indexed_with_transparency() {
    let png = paint(&conus_grid(), &ColorRamp::precipitation(), 1.0)
        .to_png()
        .unwrap();

    assert_eq!(&png[..8], &PNG_SIGNATURE);
    assert_eq!(color_type(&png), 3);
    assert!(png.windows(4).any(|w| w == b"tRNS"));
}

#[test]
fn test_indexed_smaller_than_rgba() {
    let layer = paint(&conus_grid(), &ColorRamp::precipitation(), 1.0);
    let indexed = encode(layer.pixels(), layer.width(), layer.height()).unwrap();
    let rgba = encode_rgba(layer.pixels(), layer.width(), layer.height()).unwrap();

    assert_eq!(color_type(&rgba), 6);
    assert!(indexed.len() < rgba.len());
}

#[test]
fn test_opaque_image_has_no_trns() {
    let pixels = [0, 0, 255, 255, 255, 0, 0, 255];
    let png = encode(&pixels, 2, 1).unwrap();
    assert_eq!(color_type(&png), 3);
    assert!(!png.windows(4).any(|w| w == b"tRNS"));
}
