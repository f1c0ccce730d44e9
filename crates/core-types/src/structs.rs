use crate::enums::{MemoryAction, MemoryFocus, SignalAction, SpotTrend};
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Creates a candle, rejecting bars a chart feed should never produce.
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self, CoreError> {
        if !close.is_finite() || close <= 0.0 {
            return Err(CoreError::InvalidInput(
                format!("close on {}", date),
                close.to_string(),
            ));
        }
        if high < low {
            return Err(CoreError::InvalidInput(
                format!("range on {}", date),
                format!("high {} below low {}", high, low),
            ));
        }
        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// True when the session closed below where it opened.
    pub fn closed_lower(&self) -> bool {
        self.close < self.open
    }
}

/// Everything the evaluator is allowed to look at for one instrument.
///
/// Built fresh from fetched data on every run and discarded afterwards.
/// Every field except `price` may be absent; the evaluator has a defined
/// fallback for each.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub price: f64,
    pub ma_short: Option<f64>,
    pub ma_mid: Option<f64>,
    pub ma_long: Option<f64>,
    /// `(price - ma_mid) / ma_mid * 100`.
    pub bias_pct: Option<f64>,
    /// ADX value; 0 means unknown.
    pub trend_strength: Option<f64>,
    pub stochastic_k: Option<f64>,
    pub volatility_index: Option<f64>,
    pub premium_pct: Option<f64>,
    pub days_to_settlement: Option<u32>,
    /// Futures minus spot, in index points.
    pub settlement_spread: Option<f64>,
    pub is_open_lower: Option<bool>,
}

impl MarketSnapshot {
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            ..Self::default()
        }
    }

    pub fn with_short_average(mut self, ma: f64) -> Self {
        self.ma_short = Some(ma);
        self
    }

    /// Sets the mid-window average and derives the bias from it.
    pub fn with_mid_average(mut self, ma: f64) -> Self {
        self.ma_mid = Some(ma);
        self.bias_pct = if ma > 0.0 {
            Some((self.price - ma) / ma * 100.0)
        } else {
            None
        };
        self
    }

    pub fn with_long_average(mut self, ma: f64) -> Self {
        self.ma_long = Some(ma);
        self
    }

    /// Overrides the bias directly, e.g. when the feed already provides it.
    pub fn with_bias(mut self, bias_pct: f64) -> Self {
        self.bias_pct = Some(bias_pct);
        self
    }

    pub fn with_trend_strength(mut self, adx: f64) -> Self {
        self.trend_strength = Some(adx);
        self
    }

    pub fn with_stochastic_k(mut self, k: f64) -> Self {
        self.stochastic_k = Some(k);
        self
    }

    pub fn with_volatility_index(mut self, vix: f64) -> Self {
        self.volatility_index = Some(vix);
        self
    }

    pub fn with_premium(mut self, premium_pct: f64) -> Self {
        self.premium_pct = Some(premium_pct);
        self
    }

    pub fn with_days_to_settlement(mut self, days: u32) -> Self {
        self.days_to_settlement = Some(days);
        self
    }

    pub fn with_settlement_spread(mut self, spread: f64) -> Self {
        self.settlement_spread = Some(spread);
        self
    }

    pub fn with_open_lower(mut self, lower: bool) -> Self {
        self.is_open_lower = Some(lower);
        self
    }
}

/// The single recommendation produced for a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub action: SignalAction,
    pub severity_icon: &'static str,
    pub reason: String,
}

impl Signal {
    pub fn new(action: SignalAction, reason: impl Into<String>) -> Self {
        Self {
            action,
            severity_icon: action.icon(),
            reason: reason.into(),
        }
    }
}

/// One quoted memory product on the spot board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotQuote {
    pub price: Option<f64>,
    pub spec: String,
    pub unit: String,
}

impl SpotQuote {
    pub fn new(price: Option<f64>, spec: impl Into<String>) -> Self {
        Self {
            price,
            spec: spec.into(),
            unit: "US$".to_string(),
        }
    }
}

impl fmt::Display for SpotQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.price {
            Some(price) => write!(f, "{}{} ({})", self.unit, price, self.spec),
            None => write!(f, "{}N/A ({})", self.unit, self.spec),
        }
    }
}

/// Daily memory spot prices plus the DRAM-led trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotBoard {
    pub dram: SpotQuote,
    pub nand: SpotQuote,
    pub nor: SpotQuote,
    pub rom: SpotQuote,
    pub trend: SpotTrend,
    /// Set when the board was not scraped and the backup values are shown.
    pub from_fallback: bool,
}

impl SpotBoard {
    /// Last-resort values used when the quote page cannot be read.
    pub fn fallback() -> Self {
        Self {
            dram: SpotQuote::new(Some(6.26), "DDR4 4G (Backup)"),
            nand: SpotQuote::new(Some(3.85), "512Gb TLC (Backup)"),
            nor: SpotQuote::new(None, "Generic NOR"),
            rom: SpotQuote::new(None, "Generic ROM"),
            trend: SpotTrend::Flat,
            from_fallback: true,
        }
    }

    /// Text shown for a stock whose report highlights `focus`.
    pub fn focus_line(&self, focus: MemoryFocus) -> String {
        match focus {
            MemoryFocus::Dram => format!("DRAM: {}", self.dram),
            MemoryFocus::Nand => format!("NAND: {}", self.nand),
            MemoryFocus::Nor => format!("NOR: {}", self.nor),
            MemoryFocus::Rom => format!("ROM: {}", self.rom),
            MemoryFocus::Trend => format!("Trend: {}", self.trend),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemorySignal {
    pub action: MemoryAction,
    pub reason: String,
}
