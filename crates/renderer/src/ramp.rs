//! Fixed color ramp and value classification.
//!
//! A ramp is an ordered table of `(lower bound, color)` stops. Bucket `i`
//! covers `[lower_i, lower_{i+1})` and the last bucket is open-ended, so a
//! value equal to a bound belongs to the bucket starting there. The legend is
//! derived from the same table.

use forecast_common::{Color, Sample};
use serde::Serialize;
use thiserror::Error;

/// Color stop: values at or above `lower` (and below the next stop) get `color`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorStop {
    pub lower: f64,
    pub color: Color,
}

impl ColorStop {
    pub const fn new(lower: f64, color: Color) -> Self {
        Self { lower, color }
    }
}

/// A versioned, compile-time ramp definition.
#[derive(Debug, Clone, Copy)]
pub struct RampSpec {
    pub version: u32,
    pub title: &'static str,
    pub units: &'static str,
    pub stops: &'static [ColorStop],
    pub no_data: Color,
}

/// Monthly precipitation ramp shown on the forecast map.
pub const PRECIPITATION_RAMP: RampSpec = RampSpec {
    version: 1,
    title: "Precipitation (mm/month)",
    units: "mm/month",
    stops: &[
        ColorStop::new(0.0, Color::rgb(0x00, 0x00, 0xff)),
        ColorStop::new(26.0, Color::rgb(0x00, 0xff, 0xff)),
        ColorStop::new(52.0, Color::rgb(0xff, 0xff, 0x00)),
        ColorStop::new(78.0, Color::rgb(0xff, 0xa5, 0x00)),
        ColorStop::new(104.0, Color::rgb(0xff, 0x00, 0x00)),
    ],
    no_data: Color::TRANSPARENT,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RampError {
    #[error("color ramp has no stops")]
    Empty,

    #[error("stop {index} has a non-finite bound")]
    NotFinite { index: usize },

    #[error("stop {index} bound {lower} is not above the previous bound {previous}")]
    NotIncreasing {
        index: usize,
        lower: f64,
        previous: f64,
    },
}

/// A validated color ramp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorRamp {
    version: u32,
    title: String,
    units: String,
    stops: Vec<ColorStop>,
    no_data: Color,
}

impl ColorRamp {
    /// Build a ramp, rejecting empty tables and bounds that are not strictly
    /// increasing.
    pub fn new(stops: Vec<ColorStop>, no_data: Color) -> Result<Self, RampError> {
        validate(&stops)?;
        Ok(Self {
            version: 0,
            title: String::new(),
            units: String::new(),
            stops,
            no_data,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>, units: impl Into<String>) -> Self {
        self.title = title.into();
        self.units = units.into();
        self
    }

    pub fn from_spec(spec: &RampSpec) -> Result<Self, RampError> {
        let mut ramp = Self::new(spec.stops.to_vec(), spec.no_data)?.with_title(spec.title, spec.units);
        ramp.version = spec.version;
        Ok(ramp)
    }

    /// The canonical precipitation ramp.
    pub fn precipitation() -> Self {
        let spec = PRECIPITATION_RAMP;
        Self {
            version: spec.version,
            title: spec.title.to_string(),
            units: spec.units.to_string(),
            stops: spec.stops.to_vec(),
            no_data: spec.no_data,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    pub fn no_data_color(&self) -> Color {
        self.no_data
    }

    /// Index of the bucket a value falls in, `None` for no data.
    ///
    /// Finite values below the first bound fall in the first bucket and
    /// `+inf` falls in the last.
    pub fn bucket(&self, sample: impl Into<Sample>) -> Option<usize> {
        let value = sample.into().value()?;
        let above = self.stops.partition_point(|stop| stop.lower <= value);
        Some(above.saturating_sub(1))
    }

    /// Color for a value. Total: every input maps to exactly one color.
    pub fn classify(&self, sample: impl Into<Sample>) -> Color {
        match self.bucket(sample) {
            Some(index) => self.stops[index].color,
            None => self.no_data,
        }
    }

    /// Buckets as `(lower, upper, color)`; the last upper bound is `None`.
    pub fn buckets(&self) -> impl Iterator<Item = (f64, Option<f64>, Color)> + '_ {
        self.stops.iter().enumerate().map(|(i, stop)| {
            let upper = self.stops.get(i + 1).map(|next| next.lower);
            (stop.lower, upper, stop.color)
        })
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::precipitation()
    }
}

fn validate(stops: &[ColorStop]) -> Result<(), RampError> {
    if stops.is_empty() {
        return Err(RampError::Empty);
    }
    for (index, stop) in stops.iter().enumerate() {
        if !stop.lower.is_finite() {
            return Err(RampError::NotFinite { index });
        }
        if index > 0 {
            let previous = stops[index - 1].lower;
            if stop.lower <= previous {
                return Err(RampError::NotIncreasing {
                    index,
                    lower: stop.lower,
                    previous,
                });
            }
        }
    }
    Ok(())
}
