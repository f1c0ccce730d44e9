//! Memory-sector scan: spot-price direction and contract-news sentiment
//! combined with each stock's position against its averages.

use crate::error::StrategyError;
use crate::indicators::sma;
use core_types::{Candle, MemoryAction, MemorySignal, NewsSentiment, SpotTrend};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryAverages {
    pub price: f64,
    pub ma_fast: f64,
    pub ma_slow: f64,
}

/// Last close plus the fast and slow averages. Needs `slow` bars.
pub fn memory_averages(
    candles: &[Candle],
    fast: usize,
    slow: usize,
) -> Result<MemoryAverages, StrategyError> {
    let insufficient = || StrategyError::InsufficientData {
        required: slow,
        available: candles.len(),
    };
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let price = *closes.last().ok_or_else(insufficient)?;
    let ma_fast = sma(&closes, fast).ok_or_else(insufficient)?;
    let ma_slow = sma(&closes, slow).ok_or_else(insufficient)?;
    Ok(MemoryAverages {
        price,
        ma_fast,
        ma_slow,
    })
}

/// First match wins: follow a rising spot market, hedge a falling one, buy
/// weakness on good news, otherwise wait.
pub fn evaluate_memory(
    averages: &MemoryAverages,
    trend: SpotTrend,
    news: NewsSentiment,
) -> MemorySignal {
    let MemoryAverages {
        price,
        ma_fast,
        ma_slow,
    } = *averages;

    let (action, reason) = if trend == SpotTrend::Rising && price > ma_fast {
        (
            MemoryAction::FollowTrendBuy,
            "Spot prices rising and price holds above the fast average".to_string(),
        )
    } else if trend == SpotTrend::Falling && price < ma_fast {
        (
            MemoryAction::HedgeSell,
            "Spot prices falling and price broke the fast average".to_string(),
        )
    } else if news == NewsSentiment::Bullish && price < ma_slow {
        (
            MemoryAction::ValueAccumulate,
            format!(
                "Contract prices expected up while price {:.2} sits below the slow average {:.2}",
                price, ma_slow
            ),
        )
    } else {
        (MemoryAction::Wait, "No clear direction".to_string())
    };
    MemorySignal { action, reason }
}
