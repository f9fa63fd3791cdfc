//! Per-model point statistics returned by `POST /stats`.
//!
//! The service answers with a JSON object keyed by model identifier. Each
//! model maps metric names to a string, a number, or `null`:
//!
//! ```json
//! {"NCEP-CFSv2": {"forecastValue": "12.3", "biasRatio": null, "acc": 0.41}}
//! ```
//!
//! Every field is modelled as a [`StatField`] so that missing, `null` and
//! placeholder values all display as an explicit "No data" marker.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Text shown for any field without a value.
pub const NO_DATA_LABEL: &str = "No data";

/// Strings the service uses in place of a value.
const PLACEHOLDERS: [&str; 4] = ["", "n/a", "nan", "none"];

/// One metric value as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatField {
    Value(String),
    #[default]
    NoData,
}

impl StatField {
    pub fn value(v: impl Into<String>) -> Self {
        let v = v.into();
        if PLACEHOLDERS.contains(&v.trim().to_ascii_lowercase().as_str()) {
            StatField::NoData
        } else {
            StatField::Value(v)
        }
    }

    /// Format a sampled number the way the statistics service does (3 decimals).
    pub fn from_number(v: f64) -> Self {
        if v.is_finite() {
            StatField::Value(format!("{:.3}", v))
        } else {
            StatField::NoData
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, StatField::NoData)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StatField::Value(v) => Some(v),
            StatField::NoData => None,
        }
    }
}

impl fmt::Display for StatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatField::Value(v) => f.write_str(v),
            StatField::NoData => f.write_str(NO_DATA_LABEL),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl<'de> Deserialize<'de> for StatField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<RawField>::deserialize(deserializer)? {
            None => StatField::NoData,
            Some(RawField::Text(s)) => StatField::value(s),
            Some(RawField::Number(n)) => StatField::Value(n.to_string()),
            Some(RawField::Flag(b)) => StatField::Value(b.to_string()),
        })
    }
}

impl Serialize for StatField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StatField::Value(v) => serializer.serialize_str(v),
            StatField::NoData => serializer.serialize_none(),
        }
    }
}

/// Metrics for one model at the queried coordinate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStats {
    #[serde(default, alias = "forecast", alias = "forecast_value")]
    pub forecast_value: StatField,
    #[serde(default, alias = "bias_ratio")]
    pub bias_ratio: StatField,
    #[serde(default)]
    pub nrmse: StatField,
    #[serde(default)]
    pub acc: StatField,
    #[serde(default)]
    pub nmad: StatField,
}

impl ModelStats {
    /// Display rows in table order.
    pub fn fields(&self) -> [(&'static str, &StatField); 5] {
        [
            ("Forecast", &self.forecast_value),
            ("Bias ratio", &self.bias_ratio),
            ("NRMSE", &self.nrmse),
            ("ACC", &self.acc),
            ("NMAD", &self.nmad),
        ]
    }

    pub fn has_data(&self) -> bool {
        self.fields().iter().any(|(_, field)| !field.is_no_data())
    }
}

/// Model identifier → statistics, ordered by model name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatResult {
    pub models: BTreeMap<String, ModelStats>,
}

impl StatResult {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }

    pub fn single(model: impl Into<String>, stats: ModelStats) -> Self {
        let mut models = BTreeMap::new();
        models.insert(model.into(), stats);
        Self { models }
    }

    pub fn get(&self, model: &str) -> Option<&ModelStats> {
        self.models.get(model)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// True when at least one field of one model carries a value.
    pub fn has_usable_data(&self) -> bool {
        self.models.values().any(ModelStats::has_data)
    }
}
