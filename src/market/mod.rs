//! Alpha Vantage client for the historical series shown next to the
//! calculator results. Fetches are display-only: no calculator consumes
//! them, a failure never invalidates an already-computed result, and there
//! is no retry or request fencing.

use std::collections::HashMap;
use std::env;

use log::info;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const API_KEY_VAR: &str = "ALPHA_KEY";

/// Number of most-recent series entries kept for display.
const WINDOW: usize = 12;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("{API_KEY_VAR} is not configured")]
    MissingApiKey,
    #[error("historical data request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

/// Month-over-month change in closing price, labeled with the older of the
/// two months.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPoint {
    pub date: String,
    pub change_percent: f64,
}

/// One annual inflation reading, `value` is a percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InflationPoint {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Deserialize)]
struct MonthlySeriesResponse {
    #[serde(rename = "Monthly Time Series")]
    series: Option<HashMap<String, MonthlyBar>>,
}

#[derive(Debug, Deserialize)]
struct MonthlyBar {
    #[serde(rename = "4. close")]
    close: String,
}

#[derive(Debug, Deserialize)]
struct InflationResponse {
    data: Option<Vec<InflationEntry>>,
}

#[derive(Debug, Deserialize)]
struct InflationEntry {
    date: String,
    value: String,
}

#[derive(Debug, Clone)]
pub struct MarketDataClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl MarketDataClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Reads the API key from the environment; `Err(MissingApiKey)` when the
    /// variable is absent or blank.
    pub fn from_env() -> Result<Self, MarketDataError> {
        match env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(MarketDataError::MissingApiKey),
        }
    }

    /// Month-over-month rates of return for a ticker, oldest to newest,
    /// covering the last twelve monthly closes.
    pub async fn monthly_rate_of_return(
        &self,
        symbol: &str,
    ) -> Result<Vec<HistoricalPoint>, MarketDataError> {
        info!("fetching monthly series for {symbol}");
        let response: MonthlySeriesResponse = self
            .http
            .get(&self.base_url)
            .query(&[
                ("function", "TIME_SERIES_MONTHLY"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        let series = response.series.ok_or_else(|| {
            MarketDataError::UnexpectedShape("missing \"Monthly Time Series\"".to_string())
        })?;
        rate_of_return_points(&series)
    }

    /// Annual U.S. inflation readings, oldest to newest, last twelve years.
    pub async fn inflation_history(&self) -> Result<Vec<InflationPoint>, MarketDataError> {
        info!("fetching inflation series");
        let response: InflationResponse = self
            .http
            .get(&self.base_url)
            .query(&[("function", "INFLATION"), ("apikey", self.api_key.as_str())])
            .send()
            .await?
            .json()
            .await?;

        let entries = response
            .data
            .ok_or_else(|| MarketDataError::UnexpectedShape("missing \"data\"".to_string()))?;
        inflation_points(entries)
    }
}

fn rate_of_return_points(
    series: &HashMap<String, MonthlyBar>,
) -> Result<Vec<HistoricalPoint>, MarketDataError> {
    // Dates are ISO-formatted, so a lexicographic sort is chronological.
    let mut dates: Vec<&String> = series.keys().collect();
    dates.sort_by(|a, b| b.cmp(a));
    dates.truncate(WINDOW);
    dates.reverse();

    let mut closes = Vec::with_capacity(dates.len());
    for date in &dates {
        closes.push(parse_price(&series[*date].close, date)?);
    }

    let mut points = Vec::new();
    for i in 0..dates.len().saturating_sub(1) {
        let change_percent = (closes[i + 1] - closes[i]) / closes[i] * 100.0;
        points.push(HistoricalPoint {
            date: dates[i].clone(),
            change_percent,
        });
    }
    Ok(points)
}

fn inflation_points(entries: Vec<InflationEntry>) -> Result<Vec<InflationPoint>, MarketDataError> {
    // The provider returns newest first.
    let mut points = Vec::new();
    for entry in entries.into_iter().take(WINDOW) {
        let value = parse_price(&entry.value, &entry.date)?;
        points.push(InflationPoint {
            date: entry.date,
            value,
        });
    }
    points.reverse();
    Ok(points)
}

fn parse_price(raw: &str, date: &str) -> Result<f64, MarketDataError> {
    raw.parse::<f64>().map_err(|_| {
        MarketDataError::UnexpectedShape(format!("non-numeric value {raw:?} at {date}"))
    })
}
