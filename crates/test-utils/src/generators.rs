//! Test data generators for synthetic precipitation grids.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);   // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a precipitation-like grid in mm/month.
///
/// Values increase linearly from 0 in the west to `max_mm` in the east, so
/// each column band lands in a predictable color bucket.
pub fn create_precip_grid(width: usize, height: usize, max_mm: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            let t = if width > 1 {
                col as f32 / (width - 1) as f32
            } else {
                0.0
            };
            data.push(t * max_mm);
        }
    }
    data
}

/// Replaces every `stride`-th cell with `no_data`.
pub fn punch_no_data(data: &mut [f32], stride: usize, no_data: f32) {
    for value in data.iter_mut().step_by(stride.max(1)) {
        *value = no_data;
    }
}
