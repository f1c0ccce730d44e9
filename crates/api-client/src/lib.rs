use crate::error::ApiError;
use crate::responses::ChartResponse;
use async_trait::async_trait;
use chrono::DateTime;
use configuration::MarketConfig;
use core_types::Candle;
use std::time::Duration;

pub mod error;
pub mod news;
pub mod responses;
pub mod scraper;

// --- Public API ---
pub use news::{NewsClient, NewsDigest};
pub use scraper::ReferenceScraper;

/// The interface the radar uses to obtain price history.
///
/// Implementations own their transport; callers only see candles. This keeps
/// the orchestration testable against a mock provider.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars for `symbol` over `range` (e.g. "1y", "6mo"), oldest first.
    async fn fetch_daily_candles(&self, symbol: &str, range: &str) -> Result<Vec<Candle>, ApiError>;

    /// The most recent close, used for scalar gauges such as the VIX.
    async fn fetch_latest_close(&self, symbol: &str) -> Result<f64, ApiError>;
}

/// Builds the HTTP client shared by every collaborator in this crate.
pub(crate) fn http_client(config: &MarketConfig) -> Result<reqwest::Client, ApiError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()?)
}

/// `MarketDataProvider` backed by Yahoo's v8 chart API.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(config: &MarketConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: http_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_chart(&self, symbol: &str, range: &str) -> Result<ChartResponse, ApiError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        tracing::debug!(symbol, range, "Fetching chart");

        let response = self
            .client
            .get(&url)
            .query(&[("range", range), ("interval", "1d")])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        // Unknown tickers come back as 404 with a chart error body, so try
        // the body before judging the status.
        match serde_json::from_str::<ChartResponse>(&text) {
            Ok(chart) => Ok(chart),
            Err(_) if !status.is_success() => Err(ApiError::Status {
                status: status.as_u16(),
                url,
            }),
            Err(e) => Err(ApiError::Deserialization(e.to_string())),
        }
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch_daily_candles(&self, symbol: &str, range: &str) -> Result<Vec<Candle>, ApiError> {
        let chart = self.fetch_chart(symbol, range).await?;
        let candles = parse_chart(symbol, chart)?;
        tracing::debug!(symbol, bars = candles.len(), "Chart parsed");
        Ok(candles)
    }

    async fn fetch_latest_close(&self, symbol: &str) -> Result<f64, ApiError> {
        let candles = self.fetch_daily_candles(symbol, "5d").await?;
        candles
            .last()
            .map(|c| c.close)
            .ok_or_else(|| ApiError::InvalidData(format!("No recent close for {}", symbol)))
    }
}

/// Converts a chart response into candles dated in the exchange's local time.
///
/// Sessions without a close are dropped; a missing open, high or low falls
/// back to the close.
pub fn parse_chart(symbol: &str, response: ChartResponse) -> Result<Vec<Candle>, ApiError> {
    let chart = response.chart;
    let result = match (chart.result, chart.error) {
        (Some(result), _) => result,
        (None, Some(err)) if err.code == "Not Found" => {
            return Err(ApiError::SymbolNotFound(symbol.to_string()));
        }
        (None, Some(err)) => {
            return Err(ApiError::InvalidData(format!("{}: {}", err.code, err.description)));
        }
        (None, None) => {
            return Err(ApiError::InvalidData("empty result with no error".to_string()));
        }
    };

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::SymbolNotFound(symbol.to_string()))?;
    let offset = data.meta.as_ref().and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::InvalidData("no quote data".to_string()))?;

    let at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

    let mut candles = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(close) = at(&quote.close, i) else {
            continue;
        };
        let date = DateTime::from_timestamp(ts + offset, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| ApiError::InvalidData(format!("invalid timestamp: {}", ts)))?;

        let open = at(&quote.open, i).unwrap_or(close);
        let high = at(&quote.high, i).unwrap_or(close);
        let low = at(&quote.low, i).unwrap_or(close);
        let volume = at(&quote.volume, i).unwrap_or(0.0);

        match Candle::new(date, open, high, low, close, volume) {
            Ok(candle) => candles.push(candle),
            Err(e) => tracing::warn!(symbol, error = %e, "Dropping malformed bar"),
        }
    }

    // The live session can appear twice (last bar and a realtime tick).
    candles.dedup_by(|later, earlier| {
        if later.date == earlier.date {
            std::mem::swap(later, earlier);
            true
        } else {
            false
        }
    });

    Ok(candles)
}
