//! Core library for the `weather` command.
//!
//! This crate defines:
//! - The city list and name lookup
//! - Request signing for both Seniverse auth schemes
//! - The HTTP client and error classification
//! - Rendering of daily forecasts into chat text
//!
//! [`Forecaster`] ties these together and is the only entry point a command
//! layer needs.

pub mod client;
pub mod config;
pub mod error;
pub mod forecast;
pub mod gazetteer;
pub mod model;
pub mod report;
pub mod scheme;
pub mod signer;

pub use client::{ClientError, SeniverseClient, WeatherClient};
pub use config::Config;
pub use error::ForecastError;
pub use forecast::Forecaster;
pub use gazetteer::{CityTable, GazetteerError};
pub use model::{CityId, CityRecord, DailyForecast, ProviderResponse};
pub use report::ForecastReport;
pub use scheme::AuthScheme;
pub use signer::{RequestParams, SignError, SignedRequest};
