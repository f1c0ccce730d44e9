//! Integration tests for the HTTP collaborators against mocked upstreams.

use api_client::{MarketDataProvider, NewsClient, ReferenceScraper, YahooClient};
use api_client::error::ApiError;
use configuration::{MarketConfig, MemoryConfig, ScalarSource};
use core_types::{NewsSentiment, SpotBoard, SpotTrend};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn market_config(server: &MockServer) -> MarketConfig {
    MarketConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        ..MarketConfig::default()
    }
}

fn chart_body(closes: &[f64]) -> serde_json::Value {
    let start = 1_772_413_200_i64;
    let timestamps: Vec<i64> = (0..closes.len() as i64).map(|i| start + i * 86_400).collect();
    serde_json::json!({
        "chart": {
            "result": [{
                "meta": { "symbol": "TEST", "gmtoffset": 28800 },
                "timestamp": timestamps,
                "indicators": { "quote": [{
                    "open": closes,
                    "high": closes.iter().map(|c| c + 1.0).collect::<Vec<_>>(),
                    "low": closes.iter().map(|c| c - 1.0).collect::<Vec<_>>(),
                    "close": closes,
                    "volume": vec![1000; closes.len()],
                }]}
            }],
            "error": null
        }
    })
}

#[tokio::test]
async fn yahoo_client_requests_daily_range() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/00631L.TW"))
        .and(query_param("range", "1y"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&[10.0, 11.0, 12.0])))
        .expect(1)
        .mount(&server)
        .await;

    let client = YahooClient::new(&market_config(&server)).unwrap();
    let candles = client.fetch_daily_candles("00631L.TW", "1y").await.unwrap();

    assert_eq!(candles.len(), 3);
    assert_eq!(candles[2].close, 12.0);
    assert!(candles.windows(2).all(|w| w[0].date < w[1].date));
}

#[tokio::test]
async fn latest_close_reads_last_bar() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("range", "5d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&[18.0, 22.5])))
        .mount(&server)
        .await;

    let client = YahooClient::new(&market_config(&server)).unwrap();
    assert_eq!(client.fetch_latest_close("^VIX").await.unwrap(), 22.5);
}

#[tokio::test]
async fn unknown_symbol_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "chart": { "result": null, "error": { "code": "Not Found", "description": "No data found" } }
        })))
        .mount(&server)
        .await;

    let client = YahooClient::new(&market_config(&server)).unwrap();
    let err = client.fetch_daily_candles("NOPE.TW", "1y").await.unwrap_err();
    assert!(matches!(err, ApiError::SymbolNotFound(_)));
}

#[tokio::test]
async fn server_error_without_body_maps_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let client = YahooClient::new(&market_config(&server)).unwrap();
    let err = client.fetch_daily_candles("X", "1y").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 503, .. }));
}

#[tokio::test]
async fn spot_board_is_scraped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/material5.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<table><tr><td>DDR4 8Gb</td><td>7.10</td><td></td><td>-0.05</td></tr></table>",
        ))
        .mount(&server)
        .await;

    let scraper = ReferenceScraper::new(&market_config(&server)).unwrap();
    let board = scraper
        .fetch_spot_board(&format!("{}/material5.aspx", server.uri()))
        .await;

    assert!(!board.from_fallback);
    assert_eq!(board.dram.price, Some(7.1));
    assert_eq!(board.trend, SpotTrend::Falling);
}

#[tokio::test]
async fn spot_board_falls_back_on_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let scraper = ReferenceScraper::new(&market_config(&server)).unwrap();
    let board = scraper.fetch_spot_board(&server.uri()).await;
    assert_eq!(board, SpotBoard::fallback());
}

#[tokio::test]
async fn scalar_source_reads_selector() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nav"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"<p>NAV <b id="nav">1,076.40</b></p>"#),
        )
        .mount(&server)
        .await;

    let scraper = ReferenceScraper::new(&market_config(&server)).unwrap();
    let source = ScalarSource {
        url: format!("{}/nav", server.uri()),
        selector: "#nav".to_string(),
    };
    assert_eq!(scraper.fetch_scalar(&source).await, Some(1076.4));

    let missing = ScalarSource {
        url: format!("{}/missing", server.uri()),
        selector: "#nav".to_string(),
    };
    assert_eq!(scraper.fetch_scalar(&missing).await, None);
}

#[tokio::test]
async fn news_digest_scores_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<rss><channel><item><title>合約價 回升</title></item></channel></rss>"#,
        ))
        .mount(&server)
        .await;

    let memory = MemoryConfig {
        news_url: format!("{}/rss", server.uri()),
        ..MemoryConfig::default()
    };
    let client = NewsClient::new(&market_config(&server), &memory).unwrap();
    let digest = client.fetch_digest().await;

    assert_eq!(digest.sentiment, NewsSentiment::Bullish);
    assert_eq!(digest.titles, vec!["合約價 回升".to_string()]);
}

#[tokio::test]
async fn news_failure_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let memory = MemoryConfig {
        news_url: format!("{}/rss", server.uri()),
        ..MemoryConfig::default()
    };
    let client = NewsClient::new(&market_config(&server), &memory).unwrap();
    let digest = client.fetch_digest().await;

    assert_eq!(digest.sentiment, NewsSentiment::Unavailable);
    assert!(digest.titles.is_empty());
}
