//! Auxiliary scalars scraped from third-party pages.
//!
//! Nothing here returns an error to the caller. A failed fetch or an
//! unrecognisable page yields the fallback board or `None`, with a warning.

use crate::error::ApiError;
use crate::http_client;
use configuration::{MarketConfig, ScalarSource};
use core_types::{SpotBoard, SpotQuote, SpotTrend};
use scraper::{ElementRef, Html, Selector};

#[derive(Clone)]
pub struct ReferenceScraper {
    client: reqwest::Client,
}

impl ReferenceScraper {
    pub fn new(config: &MarketConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: http_client(config)?,
        })
    }

    async fn fetch_page(&self, url: &str) -> Result<String, ApiError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    /// Memory spot prices from the quote table at `url`.
    ///
    /// Falls back to `SpotBoard::fallback()` when the page cannot be fetched or
    /// contains no recognised rows.
    pub async fn fetch_spot_board(&self, url: &str) -> SpotBoard {
        match self.fetch_page(url).await {
            Ok(html) => {
                let board = parse_spot_board(&html);
                if board.from_fallback {
                    tracing::warn!(url, "No spot quotes recognised, using backup values");
                }
                board
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Spot price fetch failed, using backup values");
                SpotBoard::fallback()
            }
        }
    }

    /// A single number from the first element matching `source.selector`.
    pub async fn fetch_scalar(&self, source: &ScalarSource) -> Option<f64> {
        let html = match self.fetch_page(&source.url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(url = %source.url, error = %e, "Reference page fetch failed");
                return None;
            }
        };
        let value = extract_scalar(&html, &source.selector);
        if value.is_none() {
            tracing::warn!(url = %source.url, selector = %source.selector, "No number found on reference page");
        }
        value
    }
}

/// Reads the spot quote table.
///
/// Rows need at least four cells: spec, price, (unused), change. The first
/// DDR4 row with a readable change sets DRAM and the overall trend; TLC rows
/// of 512Gb (preferred) or 256Gb set NAND; NOR and ROM rows set their quotes.
/// Quotes not found on the page keep their backup values.
pub fn parse_spot_board(html: &str) -> SpotBoard {
    let mut board = SpotBoard::fallback();
    let document = Html::parse_document(html);
    let (Ok(rows), Ok(cells)) = (Selector::parse("tr"), Selector::parse("td")) else {
        return board;
    };

    let mut recognised = false;
    let mut dram_found = false;
    let mut nand_is_512 = false;

    for row in document.select(&rows) {
        let cols: Vec<String> = row.select(&cells).map(cell_text).collect();
        if cols.len() < 4 {
            continue;
        }
        let spec = cols[0].as_str();
        let upper = spec.to_uppercase();
        let quote = SpotQuote::new(parse_number(&cols[1]), spec);

        if upper.contains("DDR4") && !dram_found {
            board.dram = quote;
            recognised = true;
            if let Some(change) = parse_number(&cols[3]) {
                if change > 0.0 {
                    board.trend = SpotTrend::Rising;
                } else if change < 0.0 {
                    board.trend = SpotTrend::Falling;
                }
                dram_found = true;
            }
        } else if upper.contains("TLC") && (spec.contains("512") || spec.contains("256")) {
            let is_512 = spec.contains("512");
            if is_512 || !nand_is_512 {
                board.nand = quote;
                nand_is_512 = is_512;
                recognised = true;
            }
        } else if upper.contains("NOR") {
            board.nor = quote;
            recognised = true;
        } else if upper.contains("ROM") {
            board.rom = quote;
            recognised = true;
        }
    }

    board.from_fallback = !recognised;
    board
}

/// First number inside the element matched by `selector`.
pub fn extract_scalar(html: &str, selector: &str) -> Option<f64> {
    let selector = Selector::parse(selector).ok()?;
    let document = Html::parse_document(html);
    let element = document.select(&selector).next()?;
    parse_number(&cell_text(element))
}

/// Parses a quoted number, ignoring thousands separators, percent signs,
/// a leading plus and surrounding whitespace.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '%' | '+') && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
