//! Forecast selection: which region/model/lead/period/statistic the user is viewing.
//!
//! A [`Selection`] is the form state. It produces the body for the plot
//! generation endpoint and, through a path template, the [`OverlaySource`]
//! handed to the overlay manager.
//!
//! ```rust
//! use forecast_common::{Month, Period, Selection};
//!
//! let selection = Selection::new("us", "NCEP-CFSv2", 0.5, Period::Monthly(Month::Jan), "model_avg")
//!     .unwrap();
//! let source = selection.overlay_source(
//!     "http://localhost:8000",
//!     "/rasters/{region}_{model}_{lead}_{period}_{statistic}.tif",
//! );
//! assert_eq!(source.url, "http://localhost:8000/rasters/us_NCEP-CFSv2_0.5_01_model_avg.tif");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Smallest lead time offered (months).
pub const MIN_LEAD_TIME: f64 = 0.5;
/// Largest lead time offered (months).
pub const MAX_LEAD_TIME: f64 = 11.5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid lead time {0}: expected 0.5 to 11.5 in steps of 1.0")]
    InvalidLeadTime(f64),

    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    #[error("Invalid season: {0}")]
    InvalidSeason(String),

    #[error("Invalid time scale: {0}")]
    InvalidTimeScale(String),
}

/// Calendar month of a monthly forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// 1-based month number.
    pub fn number(&self) -> u8 {
        Self::ALL
            .iter()
            .position(|m| m == self)
            .map(|i| i as u8 + 1)
            .unwrap_or(1)
    }

    /// Zero-padded code used in file names and the submit body ("01".."12").
    pub fn code(&self) -> String {
        format!("{:02}", self.number())
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Month::Jan => "January",
            Month::Feb => "February",
            Month::Mar => "March",
            Month::Apr => "April",
            Month::May => "May",
            Month::Jun => "June",
            Month::Jul => "July",
            Month::Aug => "August",
            Month::Sep => "September",
            Month::Oct => "October",
            Month::Nov => "November",
            Month::Dec => "December",
        }
    }
}

impl FromStr for Month {
    type Err = SelectionError;

    /// Accepts "01".."12", "1".."12" or a month name ("Jan", "january").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| Self::ALL.get(i).copied())
                .ok_or_else(|| SelectionError::InvalidMonth(s.to_string()));
        }

        Self::ALL
            .iter()
            .copied()
            .find(|m| {
                trimmed.eq_ignore_ascii_case(m.short_name()) || trimmed.eq_ignore_ascii_case(m.name())
            })
            .ok_or_else(|| SelectionError::InvalidMonth(s.to_string()))
    }
}

/// Three-month season of a seasonal forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    JanMar,
    AprJun,
    JulSep,
    OctDec,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::JanMar, Season::AprJun, Season::JulSep, Season::OctDec];

    pub fn label(&self) -> &'static str {
        match self {
            Season::JanMar => "Jan-Mar",
            Season::AprJun => "Apr-Jun",
            Season::JulSep => "Jul-Sep",
            Season::OctDec => "Oct-Dec",
        }
    }
}

impl FromStr for Season {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|season| season.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SelectionError::InvalidSeason(s.to_string()))
    }
}

/// Time aggregation of the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Monthly(Month),
    Seasonal(Season),
}

impl Period {
    /// Build from the form's time scale plus its month or season value.
    pub fn parse(time_scale: &str, value: &str) -> Result<Self, SelectionError> {
        match time_scale.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Period::Monthly(value.parse()?)),
            "seasonal" => Ok(Period::Seasonal(value.parse()?)),
            other => Err(SelectionError::InvalidTimeScale(other.to_string())),
        }
    }

    pub fn time_scale(&self) -> &'static str {
        match self {
            Period::Monthly(_) => "monthly",
            Period::Seasonal(_) => "seasonal",
        }
    }

    /// The value substituted for `{period}` in raster path templates.
    pub fn code(&self) -> String {
        match self {
            Period::Monthly(month) => month.code(),
            Period::Seasonal(season) => season.label().to_string(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Monthly(month) => write!(f, "{}", month.short_name()),
            Period::Seasonal(season) => write!(f, "{}", season.label()),
        }
    }
}

/// The forecast configuration chosen by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub region: String,
    pub model: String,
    pub lead_time: f64,
    pub period: Period,
    pub statistic: String,
}

impl Selection {
    pub fn new(
        region: impl Into<String>,
        model: impl Into<String>,
        lead_time: f64,
        period: Period,
        statistic: impl Into<String>,
    ) -> Result<Self, SelectionError> {
        let region = region.into();
        let model = model.into();
        let statistic = statistic.into();

        if region.trim().is_empty() {
            return Err(SelectionError::MissingField("region"));
        }
        if model.trim().is_empty() {
            return Err(SelectionError::MissingField("model"));
        }
        if statistic.trim().is_empty() {
            return Err(SelectionError::MissingField("statistic"));
        }
        if !is_valid_lead_time(lead_time) {
            return Err(SelectionError::InvalidLeadTime(lead_time));
        }

        Ok(Self {
            region,
            model,
            lead_time,
            period,
            statistic,
        })
    }

    /// Body for `POST /submit`.
    pub fn submit_request(&self) -> SubmitRequest {
        let (month, season) = match self.period {
            Period::Monthly(month) => (Some(month.code()), None),
            Period::Seasonal(season) => (None, Some(season.label().to_string())),
        };

        SubmitRequest {
            region: self.region.clone(),
            model: self.model.clone(),
            lead_time: self.lead_time,
            time_scale: self.period.time_scale().to_string(),
            month,
            season,
        }
    }

    /// Expand a raster path template for this selection.
    ///
    /// Placeholders: `{region}`, `{model}`, `{lead}`, `{period}`, `{statistic}`.
    pub fn raster_path(&self, template: &str) -> String {
        template
            .replace("{region}", &self.region)
            .replace("{model}", &self.model)
            .replace("{lead}", &format!("{:.1}", self.lead_time))
            .replace("{period}", &self.period.code())
            .replace("{statistic}", &self.statistic)
    }

    /// Resolve the overlay source for this selection against a service base URL.
    pub fn overlay_source(&self, base_url: &str, template: &str) -> OverlaySource {
        OverlaySource::new(join_url(base_url, &self.raster_path(template)), &self.model)
    }
}

/// All lead times offered by the form.
pub fn lead_times() -> impl Iterator<Item = f64> {
    (0..12).map(|i| MIN_LEAD_TIME + i as f64)
}

fn is_valid_lead_time(lead: f64) -> bool {
    lead.is_finite()
        && (MIN_LEAD_TIME..=MAX_LEAD_TIME).contains(&lead)
        && ((lead - MIN_LEAD_TIME).fract()).abs() < 1e-9
}

/// Join a base URL and a path, or return the path unchanged if it is already absolute.
pub fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// JSON body of the plot generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub region: String,
    pub model: String,
    pub lead_time: f64,
    pub time_scale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
}

/// What the overlay manager needs to load a raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySource {
    /// Absolute URL of the GeoTIFF payload.
    pub url: String,
    /// Model the raster belongs to; labels locally sampled popup rows.
    pub model: String,
}

impl OverlaySource {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly() -> Selection {
        Selection::new("us", "NCEP-CFSv2", 1.5, Period::Monthly(Month::Mar), "model_avg").unwrap()
    }

    #[test]
    fn test_month_parsing() {
        assert_eq!("01".parse::<Month>().unwrap(), Month::Jan);
        assert_eq!("12".parse::<Month>().unwrap(), Month::Dec);
        assert_eq!("7".parse::<Month>().unwrap(), Month::Jul);
        assert_eq!("Feb".parse::<Month>().unwrap(), Month::Feb);
        assert_eq!("september".parse::<Month>().unwrap(), Month::Sep);
        assert!("13".parse::<Month>().is_err());
        assert!("0".parse::<Month>().is_err());
        assert!("Ju".parse::<Month>().is_err());
    }

    #[test]
    fn test_month_rejects_words_sharing_a_prefix() {
        assert_eq!("MARCH".parse::<Month>().unwrap(), Month::Mar);
        assert_eq!("may".parse::<Month>().unwrap(), Month::May);
        assert!("marble".parse::<Month>().is_err());
        assert!("decimal".parse::<Month>().is_err());
        assert!("Janu".parse::<Month>().is_err());
    }

    #[test]
    fn test_month_codes() {
        assert_eq!(Month::Jan.code(), "01");
        assert_eq!(Month::Oct.code(), "10");
        assert_eq!(Month::Dec.number(), 12);
    }

    #[test]
    fn test_season_parsing() {
        assert_eq!("Jan-Mar".parse::<Season>().unwrap(), Season::JanMar);
        assert_eq!("oct-dec".parse::<Season>().unwrap(), Season::OctDec);
        assert!("Winter".parse::<Season>().is_err());
    }

    #[test]
    fn test_period_parse() {
        assert_eq!(Period::parse("monthly", "03").unwrap(), Period::Monthly(Month::Mar));
        assert_eq!(
            Period::parse("Seasonal", "Jul-Sep").unwrap(),
            Period::Seasonal(Season::JulSep)
        );
        assert!(matches!(
            Period::parse("daily", "01"),
            Err(SelectionError::InvalidTimeScale(_))
        ));
    }

    #[test]
    fn test_lead_time_validation() {
        assert!(Selection::new("us", "m", 0.5, Period::Monthly(Month::Jan), "s").is_ok());
        assert!(Selection::new("us", "m", 11.5, Period::Monthly(Month::Jan), "s").is_ok());
        assert_eq!(
            Selection::new("us", "m", 1.0, Period::Monthly(Month::Jan), "s"),
            Err(SelectionError::InvalidLeadTime(1.0))
        );
        assert_eq!(
            Selection::new("us", "m", 12.5, Period::Monthly(Month::Jan), "s"),
            Err(SelectionError::InvalidLeadTime(12.5))
        );
        assert_eq!(lead_times().count(), 12);
        assert_eq!(lead_times().last(), Some(11.5));
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            Selection::new("", "m", 0.5, Period::Monthly(Month::Jan), "s"),
            Err(SelectionError::MissingField("region"))
        );
        assert_eq!(
            Selection::new("us", "m", 0.5, Period::Monthly(Month::Jan), " "),
            Err(SelectionError::MissingField("statistic"))
        );
    }

    #[test]
    fn test_submit_request_monthly() {
        let body = serde_json::to_value(monthly().submit_request()).unwrap();
        assert_eq!(body["region"], "us");
        assert_eq!(body["lead_time"], 1.5);
        assert_eq!(body["time_scale"], "monthly");
        assert_eq!(body["month"], "03");
        assert!(body.get("season").is_none());
    }

    #[test]
    fn test_submit_request_seasonal() {
        let selection =
            Selection::new("us", "NCAR-CCSM4", 0.5, Period::Seasonal(Season::AprJun), "acc").unwrap();
        let body = serde_json::to_value(selection.submit_request()).unwrap();
        assert_eq!(body["time_scale"], "seasonal");
        assert_eq!(body["season"], "Apr-Jun");
        assert!(body.get("month").is_none());
    }

    #[test]
    fn test_raster_path_and_url() {
        let selection = monthly();
        assert_eq!(
            selection.raster_path("{region}/{model}/{statistic}_{lead}_{period}.tif"),
            "us/NCEP-CFSv2/model_avg_1.5_03.tif"
        );

        let source = selection.overlay_source("http://host:8000/", "/r/{model}.tif");
        assert_eq!(source.url, "http://host:8000/r/NCEP-CFSv2.tif");
        assert_eq!(source.model, "NCEP-CFSv2");
    }

    #[test]
    fn test_join_url_keeps_absolute_paths() {
        assert_eq!(
            join_url("http://a", "https://cdn/x.tif"),
            "https://cdn/x.tif"
        );
        assert_eq!(join_url("http://a/", "images/x.tif"), "http://a/images/x.tif");
    }
}
