use serde::{Deserialize, Serialize};
use std::fmt;

/// The family an instrument belongs to. Decides which rule branches of the
/// evaluator apply and which take-profit profile is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentClass {
    BroadIndexFund,
    LeveragedFund,
    EquityOrAdr,
}

impl fmt::Display for InstrumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstrumentClass::BroadIndexFund => "broad index fund",
            InstrumentClass::LeveragedFund => "leveraged fund",
            InstrumentClass::EquityOrAdr => "equity / ADR",
        };
        f.write_str(name)
    }
}

/// The closed set of recommendations the evaluator can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalAction {
    Hold,
    AccumulateSmall,
    AccumulateLarge,
    TakeProfitTier1,
    TakeProfitTier2,
    TakeProfitTier3,
    DefensiveSell,
    PanicBuy,
    PremiumArbitrageSell,
    RangeWarning,
    AwaitSettlement,
    AbortEntry,
}

impl SignalAction {
    /// Presentation tag shown next to the action in reports.
    pub fn icon(&self) -> &'static str {
        match self {
            SignalAction::Hold => "👀",
            SignalAction::AccumulateSmall => "🟢",
            SignalAction::AccumulateLarge => "🟢🟢",
            SignalAction::TakeProfitTier1 => "🟠",
            SignalAction::TakeProfitTier2 => "💰",
            SignalAction::TakeProfitTier3 => "💰💰",
            SignalAction::DefensiveSell => "🔴",
            SignalAction::PanicBuy => "🚨",
            SignalAction::PremiumArbitrageSell => "💸",
            SignalAction::RangeWarning => "⚠️",
            SignalAction::AwaitSettlement => "⏳",
            SignalAction::AbortEntry => "⛔",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalAction::Hold => "Hold / keep position",
            SignalAction::AccumulateSmall => "Accumulate (buy 10%)",
            SignalAction::AccumulateLarge => "Heavy accumulate (buy 20%)",
            SignalAction::TakeProfitTier1 => "Grid take-profit 1 (sell 10%)",
            SignalAction::TakeProfitTier2 => "Grid take-profit 2 (sell 10%)",
            SignalAction::TakeProfitTier3 => "Grid take-profit 3 (sell 10%)",
            SignalAction::DefensiveSell => "Defensive exit (sell 1/3)",
            SignalAction::PanicBuy => "Panic buy",
            SignalAction::PremiumArbitrageSell => "Premium arbitrage sell",
            SignalAction::RangeWarning => "Range warning (trim / stay light)",
            SignalAction::AwaitSettlement => "Await settlement",
            SignalAction::AbortEntry => "Abort new entries",
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.label())
    }
}

/// Direction of the benchmark memory spot quote on the latest session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpotTrend {
    Rising,
    Falling,
    Flat,
}

impl fmt::Display for SpotTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SpotTrend::Rising => "🔺 rising",
            SpotTrend::Falling => "🔻 falling",
            SpotTrend::Flat => "flat",
        };
        f.write_str(text)
    }
}

/// Tone of recent contract-price headlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewsSentiment {
    Bullish,
    Bearish,
    Quiet,
    Unavailable,
}

impl fmt::Display for NewsSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NewsSentiment::Bullish => "📈 expected up",
            NewsSentiment::Bearish => "📉 expected down",
            NewsSentiment::Quiet => "no major news",
            NewsSentiment::Unavailable => "N/A",
        };
        f.write_str(text)
    }
}

/// Which spot quote a memory stock's report block highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryFocus {
    Dram,
    Nand,
    Nor,
    Rom,
    Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryAction {
    FollowTrendBuy,
    HedgeSell,
    ValueAccumulate,
    Wait,
}

impl fmt::Display for MemoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MemoryAction::FollowTrendBuy => "🔥 Follow-trend buy",
            MemoryAction::HedgeSell => "⚠️ Hedge sell",
            MemoryAction::ValueAccumulate => "💎 Value accumulation",
            MemoryAction::Wait => "Wait",
        };
        f.write_str(text)
    }
}
