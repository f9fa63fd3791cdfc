//! Common test fixtures for forecast viewer tests.

/// Bounding boxes as (lat_min, lat_max, lon_min, lon_max).
pub mod bounds {
    /// Contiguous United States, the default forecast region
    pub const CONUS: (f64, f64, f64, f64) = (25.0, 49.0, -125.0, -66.0);

    /// A small box around Kansas
    pub const KANSAS: (f64, f64, f64, f64) = (37.0, 40.0, -102.0, -94.5);

    /// A point far outside CONUS (North Atlantic)
    pub const ATLANTIC_POINT: (f64, f64) = (45.0, -30.0);

    /// The click coordinate used in the stats scenarios
    pub const CLICK: (f64, f64) = (40.0, -100.0);
}

/// Model identifiers offered by the form.
pub mod models {
    pub const CFSV2: &str = "NCEP-CFSv2";
    pub const CANESM5: &str = "ECCC-CanESM5";
    pub const GEM_NEMO: &str = "ECCC-GEM5.2-NEMO";
    pub const CESM1: &str = "NCAR-CESM1";
    pub const CCSM4: &str = "NCAR-CCSM4";
    pub const GEOS: &str = "NASA-GEOS-S2S-2";

    pub const ALL: [&str; 6] = [CFSV2, CANESM5, GEM_NEMO, CESM1, CCSM4, GEOS];
}

/// Canned `/stats` response bodies.
pub mod stats {
    /// One model with a forecast value and a null bias ratio.
    pub const SINGLE_MODEL: &str =
        r#"{"NCEP-CFSv2": {"forecastValue": "12.3", "biasRatio": null}}"#;

    /// Two models with every field populated by strings or numbers.
    pub const TWO_MODELS: &str = r#"{
        "NCEP-CFSv2": {"forecastValue": "12.3", "biasRatio": "0.91", "nrmse": "0.44", "acc": "0.52", "nmad": "0.31"},
        "NCAR-CCSM4": {"forecastValue": 8.25, "biasRatio": 1.07, "nrmse": 0.61, "acc": 0.38, "nmad": 0.29}
    }"#;

    /// Parses, but holds nothing usable.
    pub const ALL_NULL: &str = r#"{"NCEP-CFSv2": {"forecastValue": null, "biasRatio": null}}"#;

    /// Not the expected shape.
    pub const MALFORMED: &str = r#"{"NCEP-CFSv2": "12.3"}"#;
}
