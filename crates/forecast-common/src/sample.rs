//! A single raster cell value, or the absence of one.

/// Input to the color classifier.
///
/// `NoData` is distinct from zero: it marks cells without a measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Value(f64),
    NoData,
}

impl Sample {
    /// The measured value. `Value(NaN)` counts as no data.
    pub fn value(&self) -> Option<f64> {
        match self {
            Sample::Value(v) if !v.is_nan() => Some(*v),
            _ => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.value().is_none()
    }
}

impl From<f64> for Sample {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            Sample::NoData
        } else {
            Sample::Value(v)
        }
    }
}

impl From<f32> for Sample {
    fn from(v: f32) -> Self {
        Sample::from(v as f64)
    }
}

impl From<Option<f64>> for Sample {
    fn from(v: Option<f64>) -> Self {
        v.map(Sample::from).unwrap_or(Sample::NoData)
    }
}

impl From<Option<f32>> for Sample {
    fn from(v: Option<f32>) -> Self {
        v.map(Sample::from).unwrap_or(Sample::NoData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_is_no_data() {
        assert_eq!(Sample::from(f64::NAN), Sample::NoData);
        assert_eq!(Sample::from(Some(f32::NAN)), Sample::NoData);
        assert_eq!(Sample::from(None::<f64>), Sample::NoData);
        assert_eq!(Sample::from(0.0), Sample::Value(0.0));
        assert_eq!(Sample::from(Some(12.5f32)).value(), Some(12.5));
    }

    #[test]
    fn test_nan_value_variant_is_no_data() {
        let sample = Sample::Value(f64::NAN);
        assert_eq!(sample.value(), None);
        assert!(sample.is_no_data());
        assert!(!Sample::Value(f64::INFINITY).is_no_data());
    }
}
