use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-specific location identifier, e.g. `WX4FBXXFKE4W`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(String);

impl CityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the city list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityRecord {
    #[serde(rename = "序号")]
    pub seq: String,
    #[serde(rename = "城市ID")]
    pub id: CityId,
    #[serde(rename = "行政归属")]
    pub parent: String,
    /// Short name; districts carry their city as a prefix, e.g. `北京/朝阳`.
    #[serde(rename = "城市简称")]
    pub short_name: String,
    #[serde(rename = "拼音")]
    pub pinyin: String,
    pub lat: f64,
    pub lon: f64,
}

/// One day of the `/weather/daily` payload.
///
/// The provider encodes every value as a string; fields missing from a
/// response decode as empty strings instead of failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyForecast {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub text_day: String,
    pub code_day: String,
    pub text_night: String,
    pub code_night: String,
    /// °C
    pub high: String,
    /// °C
    pub low: String,
    /// mm
    pub rainfall: String,
    /// Probability, 0-1.
    pub precip: String,
    pub wind_direction: String,
    pub wind_direction_degree: String,
    /// km/h
    pub wind_speed: String,
    pub wind_scale: String,
    /// Percent.
    pub humidity: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderLocation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub timezone: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationResult {
    #[serde(default)]
    pub location: Option<ProviderLocation>,
    #[serde(default)]
    pub daily: Option<Vec<DailyForecast>>,
    #[serde(default)]
    pub last_update: Option<String>,
}

/// Envelope returned by `/weather/daily.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderResponse {
    #[serde(default)]
    pub results: Vec<LocationResult>,
}

impl ProviderResponse {
    /// Daily records of the first location, if any.
    pub fn first_daily(&self) -> Option<&[DailyForecast]> {
        self.results.first()?.daily.as_deref()
    }
}

/// Error body sent alongside non-2xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_code: String,
}
