use crate::error::ApiError;
use crate::http_client;
use configuration::{MarketConfig, MemoryConfig};
use core_types::NewsSentiment;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
}

/// Headline sentiment plus the headlines it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsDigest {
    pub sentiment: NewsSentiment,
    pub titles: Vec<String>,
}

impl NewsDigest {
    pub fn unavailable() -> Self {
        Self {
            sentiment: NewsSentiment::Unavailable,
            titles: Vec::new(),
        }
    }
}

/// Reads a news search feed and scores the newest headlines by keyword.
#[derive(Clone)]
pub struct NewsClient {
    client: reqwest::Client,
    feed_url: String,
    max_items: usize,
    bullish: Vec<String>,
    bearish: Vec<String>,
}

impl NewsClient {
    pub fn new(market: &MarketConfig, memory: &MemoryConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: http_client(market)?,
            feed_url: memory.news_url.clone(),
            max_items: memory.news_items,
            bullish: memory.bullish_keywords.clone(),
            bearish: memory.bearish_keywords.clone(),
        })
    }

    /// Never fails: any fetch or parse problem yields `NewsSentiment::Unavailable`.
    pub async fn fetch_digest(&self) -> NewsDigest {
        match self.fetch_titles().await {
            Ok(titles) => NewsDigest {
                sentiment: classify(&titles, &self.bullish, &self.bearish),
                titles,
            },
            Err(e) => {
                tracing::warn!(url = %self.feed_url, error = %e, "News feed unavailable");
                NewsDigest::unavailable()
            }
        }
    }

    async fn fetch_titles(&self) -> Result<Vec<String>, ApiError> {
        let response = self.client.get(&self.feed_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: self.feed_url.clone(),
            });
        }
        let body = response.text().await?;
        parse_headlines(&body, self.max_items)
    }
}

/// Titles of the first `limit` feed items.
pub fn parse_headlines(xml: &str, limit: usize) -> Result<Vec<String>, ApiError> {
    let rss: Rss =
        quick_xml::de::from_str(xml).map_err(|e| ApiError::Deserialization(e.to_string()))?;
    Ok(rss
        .channel
        .items
        .into_iter()
        .take(limit)
        .map(|item| item.title.trim().to_string())
        .collect())
}

/// Scores headlines in order; each matching headline overrides the previous
/// verdict, bullish keywords checked first.
pub fn classify(titles: &[String], bullish: &[String], bearish: &[String]) -> NewsSentiment {
    let mentions = |title: &str, words: &[String]| words.iter().any(|w| title.contains(w.as_str()));
    titles
        .iter()
        .fold(NewsSentiment::Quiet, |verdict, title| {
            if mentions(title, bullish) {
                NewsSentiment::Bullish
            } else if mentions(title, bearish) {
                NewsSentiment::Bearish
            } else {
                verdict
            }
        })
}
