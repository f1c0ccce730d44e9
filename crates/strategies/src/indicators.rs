//! Indicator calculations over daily candles.
//!
//! Moving averages and the stochastic oscillator come from the `ta` crate.
//! ADX is computed here with Wilder smoothing since `ta` does not ship one.

use crate::error::StrategyError;
use core_types::Candle;
use ta::indicators::{FastStochastic, SimpleMovingAverage as Sma};
use ta::{DataItem, Next};

/// Simple moving average of the last `period` closes.
///
/// Returns `None` when there is not enough history or `period` is zero.
pub fn sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let mut ma = Sma::new(period).ok()?;
    closes[closes.len() - period..]
        .iter()
        .fold(None, |_, &close| Some(ma.next(close)))
}

/// Percentage deviation of `price` from `ma`.
pub fn bias_pct(price: f64, ma: f64) -> Option<f64> {
    if ma > 0.0 {
        Some((price - ma) / ma * 100.0)
    } else {
        None
    }
}

/// Average Directional Index (Wilder).
///
/// Steps:
/// 1. True range, +DM and -DM from consecutive bars
/// 2. Wilder-smooth all three over `period`
/// 3. +DI / -DI from the smoothed values, then DX
/// 4. ADX = mean of the first `period` DX values, Wilder-smoothed afterwards
///
/// Needs `2 * period` bars; the result lies in [0, 100].
pub fn adx(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < 2 * period {
        return None;
    }

    let n = period as f64;
    let mut smooth_tr = 0.0;
    let mut smooth_plus = 0.0;
    let mut smooth_minus = 0.0;
    let mut dx_sum = 0.0;
    let mut adx: Option<f64> = None;

    for (i, pair) in candles.windows(2).enumerate() {
        let (prev, cur) = (&pair[0], &pair[1]);
        let tr = true_range(cur, prev.close);
        let up_move = cur.high - prev.high;
        let down_move = prev.low - cur.low;
        let plus_dm = if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 };
        let minus_dm = if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 };

        let seen = i + 1;
        if seen <= period {
            smooth_tr += tr;
            smooth_plus += plus_dm;
            smooth_minus += minus_dm;
            if seen < period {
                continue;
            }
        } else {
            smooth_tr = smooth_tr - smooth_tr / n + tr;
            smooth_plus = smooth_plus - smooth_plus / n + plus_dm;
            smooth_minus = smooth_minus - smooth_minus / n + minus_dm;
        }

        let dx = directional_index(smooth_plus, smooth_minus, smooth_tr);
        let dx_seen = seen - period + 1;
        if dx_seen < period {
            dx_sum += dx;
        } else if dx_seen == period {
            dx_sum += dx;
            adx = Some(dx_sum / n);
        } else {
            adx = adx.map(|prev| (prev * (n - 1.0) + dx) / n);
        }
    }

    adx.filter(|v| v.is_finite())
}

/// Stochastic %K line: fast %K over `period` bars smoothed by an SMA of `smooth` bars.
///
/// `Ok(None)` when there is not enough history.
pub fn stochastic_k(
    candles: &[Candle],
    period: usize,
    smooth: usize,
) -> Result<Option<f64>, StrategyError> {
    let mut fast = FastStochastic::new(period).map_err(|e| {
        StrategyError::InvalidParameters(format!("Failed to initialize stochastic: {:?}", e))
    })?;
    let mut smoother = Sma::new(smooth).map_err(|e| {
        StrategyError::InvalidParameters(format!("Failed to initialize %K smoothing: {:?}", e))
    })?;

    if candles.len() < period + smooth - 1 {
        return Ok(None);
    }

    let mut k = None;
    for candle in candles {
        let item = to_data_item(candle)?;
        k = Some(smoother.next(fast.next(&item)));
    }
    Ok(k)
}

/// True when the bar closed below its open.
pub fn is_open_lower(candle: &Candle) -> bool {
    candle.closed_lower()
}

fn true_range(candle: &Candle, prev_close: f64) -> f64 {
    let hl = candle.high - candle.low;
    let hc = (candle.high - prev_close).abs();
    let lc = (candle.low - prev_close).abs();
    hl.max(hc).max(lc)
}

fn directional_index(plus: f64, minus: f64, tr: f64) -> f64 {
    if tr == 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * plus / tr;
    let minus_di = 100.0 * minus / tr;
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        0.0
    } else {
        100.0 * (plus_di - minus_di).abs() / di_sum
    }
}

fn to_data_item(candle: &Candle) -> Result<DataItem, StrategyError> {
    // Feeds occasionally report an open just outside the high/low range.
    let high = candle.high.max(candle.open).max(candle.close);
    let low = candle.low.min(candle.open).min(candle.close);
    DataItem::builder()
        .open(candle.open)
        .high(high)
        .low(low)
        .close(candle.close)
        .volume(candle.volume.max(0.0))
        .build()
        .map_err(|e| {
            StrategyError::IndicatorError(format!("Invalid bar on {}: {:?}", candle.date, e))
        })
}
