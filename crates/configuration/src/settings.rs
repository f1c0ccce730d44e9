use core_types::{InstrumentClass, MemoryFocus};
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults matching the scheduled scripts this tool
/// replaces, so an empty (or missing) `config.toml` still yields a working run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub line: LineConfig,
    pub logging: LoggingConfig,
    pub market: MarketConfig,
    pub indicators: IndicatorSettings,
    pub rules: RuleThresholds,
    pub classes: ClassProfiles,
    pub instruments: Vec<InstrumentConfig>,
    pub memory: MemoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line: LineConfig::default(),
            logging: LoggingConfig::default(),
            market: MarketConfig::default(),
            indicators: IndicatorSettings::default(),
            rules: RuleThresholds::default(),
            classes: ClassProfiles::default(),
            instruments: default_instruments(),
            memory: MemoryConfig::default(),
        }
    }
}

/// Credentials and endpoint for the LINE Messaging push API.
///
/// The token and user id are never read from the file; `load_config` injects
/// them from `LINE_CHANNEL_TOKEN` and `LINE_USER_ID`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    pub endpoint: String,
    pub channel_token: String,
    pub user_id: String,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.line.me/v2/bot/message/push".to_string(),
            channel_token: String::new(),
            user_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    /// Emit JSON lines on stderr instead of the human-readable format.
    pub json: bool,
    /// Directory for the daily rolling log file. No file is written when unset.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            directory: None,
            file_prefix: "radar.log".to_string(),
        }
    }
}

/// Where and how daily price history is fetched.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub base_url: String,
    /// Chart range requested per instrument (e.g. "1y"); must cover the longest MA window.
    pub history_range: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Market-wide fear gauge, fetched once per run. Disabled when unset.
    pub volatility_symbol: Option<String>,
    /// Offset of the exchange's local time from UTC, used for the settlement calendar.
    pub utc_offset_hours: i32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            history_range: "1y".to_string(),
            timeout_secs: 15,
            user_agent: "Mozilla/5.0".to_string(),
            volatility_symbol: Some("^VIX".to_string()),
            utc_offset_hours: 8,
        }
    }
}

/// Indicator windows shared by every instrument.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub ma_short: usize,
    pub ma_mid: usize,
    pub ma_long: usize,
    pub adx_period: usize,
    pub stoch_period: usize,
    pub stoch_smooth: usize,
}

impl IndicatorSettings {
    /// Bars needed before a snapshot may be built.
    pub fn longest_window(&self) -> usize {
        self.ma_short.max(self.ma_mid).max(self.ma_long)
    }
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ma_short: 20,
            ma_mid: 60,
            ma_long: 120,
            adx_period: 14,
            stoch_period: 14,
            stoch_smooth: 3,
        }
    }
}

/// Which rule wins when a take-profit tier and the VIX panic override both fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum PanicPriority {
    TakeProfitFirst,
    PanicFirst,
}

/// Thresholds that apply regardless of instrument class.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    /// VIX above this triggers the panic-buy override.
    pub panic_vix: f64,
    /// VIX below this turns a tier-1 bias breach into a range warning.
    pub complacency_vix: f64,
    /// ADX below this is treated as a trendless market.
    pub trend_floor: f64,
    /// Stochastic %K below this counts as oversold.
    pub oversold_k: f64,
    /// Market premium over NAV (percent) above which a leveraged fund is sold.
    pub premium_ceiling: f64,
    /// Bias (percent) above which positions are trimmed the day before settlement.
    pub pre_settlement_bias: f64,
    /// Futures-spot spread (points) considered large on settlement day.
    pub settlement_spread_limit: f64,
    pub panic_priority: PanicPriority,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            panic_vix: 30.0,
            complacency_vix: 13.0,
            trend_floor: 20.0,
            oversold_k: 20.0,
            premium_ceiling: 3.0,
            pre_settlement_bias: 20.0,
            settlement_spread_limit: 50.0,
            panic_priority: PanicPriority::TakeProfitFirst,
        }
    }
}

/// Per-class take-profit ladder and stop behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassProfile {
    pub tier1: f64,
    pub tier2: f64,
    pub tier3: f64,
    /// Treat a close below the short-window average as a stop line.
    #[serde(default)]
    pub short_ma_stop: bool,
    /// Sell on a tier-1 breach even when the VIX is not complacent.
    #[serde(default)]
    pub tier1_take_profit: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassProfiles {
    pub broad_index_fund: ClassProfile,
    pub leveraged_fund: ClassProfile,
    pub equity_or_adr: ClassProfile,
}

impl ClassProfiles {
    /// Every profile with its configuration key.
    pub fn named(&self) -> [(&'static str, &ClassProfile); 3] {
        [
            ("broad_index_fund", &self.broad_index_fund),
            ("leveraged_fund", &self.leveraged_fund),
            ("equity_or_adr", &self.equity_or_adr),
        ]
    }

    pub fn profile(&self, class: InstrumentClass) -> &ClassProfile {
        match class {
            InstrumentClass::BroadIndexFund => &self.broad_index_fund,
            InstrumentClass::LeveragedFund => &self.leveraged_fund,
            InstrumentClass::EquityOrAdr => &self.equity_or_adr,
        }
    }
}

impl Default for ClassProfiles {
    fn default() -> Self {
        Self {
            broad_index_fund: ClassProfile {
                tier1: 15.0,
                tier2: 20.0,
                tier3: 25.0,
                short_ma_stop: false,
                tier1_take_profit: false,
            },
            leveraged_fund: ClassProfile {
                tier1: 15.0,
                tier2: 20.0,
                tier3: 25.0,
                short_ma_stop: true,
                tier1_take_profit: true,
            },
            equity_or_adr: ClassProfile {
                tier1: 20.0,
                tier2: 25.0,
                tier3: 30.0,
                short_ma_stop: false,
                tier1_take_profit: false,
            },
        }
    }
}

/// A page plus CSS selector pointing at a single number (NAV, spread).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScalarSource {
    pub url: String,
    pub selector: String,
}

/// One instrument on the radar.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentConfig {
    /// Chart symbol, including the exchange suffix (e.g. "00631L.TW").
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub class: InstrumentClass,
    /// Tracks monthly index futures, so the settlement calendar applies.
    #[serde(default)]
    pub futures_linked: bool,
    #[serde(default)]
    pub nav_source: Option<ScalarSource>,
    #[serde(default)]
    pub spread_source: Option<ScalarSource>,
}

impl InstrumentConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.symbol)
    }
}

fn default_instruments() -> Vec<InstrumentConfig> {
    ["00631L.TW", "00675L.TW"]
        .into_iter()
        .map(|symbol| InstrumentConfig {
            symbol: symbol.to_string(),
            name: None,
            class: InstrumentClass::LeveragedFund,
            futures_linked: true,
            nav_source: None,
            spread_source: None,
        })
        .collect()
}

/// Inputs for the memory-sector scan.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub spot_url: String,
    pub news_url: String,
    /// Only the newest headlines are considered.
    pub news_items: usize,
    pub bullish_keywords: Vec<String>,
    pub bearish_keywords: Vec<String>,
    pub ma_fast: usize,
    pub ma_slow: usize,
    pub history_range: String,
    pub targets: Vec<MemoryTarget>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            spot_url: "https://www.cnyes.com/futures/material5.aspx".to_string(),
            news_url: "https://news.google.com/rss/search?q=%E8%A8%98%E6%86%B6%E9%AB%94+%E5%90%88%E7%B4%84%E5%83%B9+when:7d&hl=zh-TW&gl=TW&ceid=TW:zh-Hant".to_string(),
            news_items: 3,
            bullish_keywords: vec!["漲".to_string(), "回升".to_string()],
            bearish_keywords: vec!["跌".to_string(), "降".to_string()],
            ma_fast: 20,
            ma_slow: 60,
            history_range: "6mo".to_string(),
            targets: default_memory_targets(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemoryTarget {
    /// Chart symbol with exchange suffix.
    pub symbol: String,
    /// Local listing code shown in the report.
    pub code: String,
    pub name: String,
    pub focus: MemoryFocus,
}

fn default_memory_targets() -> Vec<MemoryTarget> {
    [
        ("8299.TWO", "8299", "Phison", MemoryFocus::Nand),
        ("2337.TW", "2337", "Macronix", MemoryFocus::Nor),
        ("2408.TW", "2408", "Nanya Technology", MemoryFocus::Dram),
        ("2344.TW", "2344", "Winbond", MemoryFocus::Trend),
    ]
    .into_iter()
    .map(|(symbol, code, name, focus)| MemoryTarget {
        symbol: symbol.to_string(),
        code: code.to_string(),
        name: name.to_string(),
        focus,
    })
    .collect()
}
