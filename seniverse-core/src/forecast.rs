//! The single entry point used by the command layer.

use anyhow::Context;
use chrono::Utc;
use tracing::{debug, error, instrument};

use crate::{
    client::{SeniverseClient, WeatherClient},
    config::Config,
    error::ForecastError,
    gazetteer::CityTable,
    report::{normalize, today_in_shanghai},
    scheme::AuthScheme,
    signer::{
        RequestParams, SignError, SignedRequest, endpoint_url, sign_private, sign_public,
    },
};

/// Resolves a city, fetches its daily forecast and renders it.
///
/// Holds only read-only state, so one instance can serve concurrent lookups.
#[derive(Debug)]
pub struct Forecaster {
    config: Config,
    table: CityTable,
    client: Box<dyn WeatherClient>,
}

impl Forecaster {
    pub fn new(config: Config, table: CityTable, client: Box<dyn WeatherClient>) -> Self {
        Self { config, table, client }
    }

    /// Validate `config`, load the city list and build the HTTP client.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        config.validate()?;

        let table = match &config.gazetteer {
            Some(path) => CityTable::from_path(path)
                .with_context(|| format!("Failed to load city list: {}", path.display()))?,
            None => CityTable::bundled().context("Failed to load bundled city list")?,
        };
        let client = SeniverseClient::new(config.timeout())?;

        Ok(Self::new(config, table, Box::new(client)))
    }

    /// Forecast text for `city`, or the first failure along the way.
    #[instrument(skip(self))]
    pub async fn forecast(&self, city: &str, day: Option<&str>) -> Result<String, ForecastError> {
        let days = parse_days(day, self.config.default_days)?;
        let location = self
            .table
            .resolve(city)
            .ok_or_else(|| ForecastError::UnknownCity(city.to_string()))?;

        debug!(%location, days, scheme = %self.config.auth_scheme, "requesting daily forecast");
        let request = self.sign(RequestParams::new(location.clone(), days))?;
        let response = self.client.fetch(&request).await?;
        let report = normalize(&response, days, today_in_shanghai())?;

        Ok(report.render())
    }

    /// Text to send back to the user, success or not.
    ///
    /// Internal failures are logged in full here and replaced by a generic
    /// message.
    pub async fn reply(&self, city: &str, day: Option<&str>) -> String {
        match self.forecast(city, day).await {
            Ok(text) => text,
            Err(err) => {
                if err.is_internal() {
                    error!(error = ?err, city, "weather lookup failed");
                } else {
                    debug!(error = %err, city, "weather lookup rejected");
                }
                err.user_message()
            }
        }
    }

    fn sign(&self, params: RequestParams) -> Result<SignedRequest, SignError> {
        let endpoint = endpoint_url(&self.config.base_url)?;

        Ok(match self.config.auth_scheme {
            AuthScheme::Private => sign_private(endpoint, &self.config.private_key, &params),
            AuthScheme::Public => sign_public(
                endpoint,
                &self.config.private_key,
                &self.config.public_key,
                &params,
                Utc::now().timestamp(),
            ),
        })
    }
}

/// A positive day count, or `default` when the user gave none.
pub fn parse_days(input: Option<&str>, default: u32) -> Result<u32, ForecastError> {
    let Some(raw) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };

    match raw.parse::<u32>() {
        Ok(days) if days > 0 => Ok(days),
        _ => Err(ForecastError::InvalidDayCount(raw.to_string())),
    }
}
