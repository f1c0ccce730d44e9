use crate::error::StrategyError;
use crate::indicators::{adx, is_open_lower, sma, stochastic_k};
use configuration::IndicatorSettings;
use core_types::{Candle, MarketSnapshot};

/// Scalars that do not come from the instrument's own price history.
///
/// All of them are optional; the scrapers and the VIX lookup hand back `None`
/// on failure and the evaluator has a fallback for each.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AuxiliaryInputs {
    pub volatility_index: Option<f64>,
    /// Net asset value per unit; turned into a premium against the last close.
    pub nav: Option<f64>,
    pub settlement_spread: Option<f64>,
    pub days_to_settlement: Option<u32>,
}

/// Turns a daily candle history into a `MarketSnapshot`.
pub struct SnapshotBuilder {
    settings: IndicatorSettings,
}

impl SnapshotBuilder {
    pub fn new(settings: &IndicatorSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// Bars needed before any snapshot is built.
    pub fn required_history(&self) -> usize {
        self.settings.longest_window()
    }

    /// Computes every indicator for `symbol` from `candles` (oldest first).
    ///
    /// Fails with `InsufficientData` when the history cannot cover the longest
    /// moving-average window; the evaluator must not be invoked in that case.
    pub fn build(
        &self,
        symbol: &str,
        candles: &[Candle],
        aux: AuxiliaryInputs,
    ) -> Result<MarketSnapshot, StrategyError> {
        let required = self.required_history();
        let insufficient = StrategyError::InsufficientData {
            required,
            available: candles.len(),
        };
        if candles.len() < required {
            return Err(insufficient);
        }
        let Some(last) = candles.last() else {
            return Err(insufficient);
        };

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let s = &self.settings;

        let mut snapshot =
            MarketSnapshot::new(symbol, last.close).with_open_lower(is_open_lower(last));
        if let Some(ma) = sma(&closes, s.ma_short) {
            snapshot = snapshot.with_short_average(ma);
        }
        if let Some(ma) = sma(&closes, s.ma_mid) {
            snapshot = snapshot.with_mid_average(ma);
        }
        if let Some(ma) = sma(&closes, s.ma_long) {
            snapshot = snapshot.with_long_average(ma);
        }
        if let Some(strength) = adx(candles, s.adx_period) {
            snapshot = snapshot.with_trend_strength(strength);
        }
        if let Some(k) = stochastic_k(candles, s.stoch_period, s.stoch_smooth)? {
            snapshot = snapshot.with_stochastic_k(k);
        }

        if let Some(vix) = aux.volatility_index {
            snapshot = snapshot.with_volatility_index(vix);
        }
        if let Some(nav) = aux.nav.filter(|nav| *nav > 0.0) {
            snapshot = snapshot.with_premium((last.close - nav) / nav * 100.0);
        }
        if let Some(spread) = aux.settlement_spread {
            snapshot = snapshot.with_settlement_spread(spread);
        }
        if let Some(days) = aux.days_to_settlement {
            snapshot = snapshot.with_days_to_settlement(days);
        }

        tracing::debug!(
            symbol,
            price = snapshot.price,
            bias = ?snapshot.bias_pct,
            adx = ?snapshot.trend_strength,
            "Snapshot built"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::tests::candles;
    use approx::assert_relative_eq;

    fn settings() -> IndicatorSettings {
        IndicatorSettings {
            ma_short: 3,
            ma_mid: 5,
            ma_long: 8,
            adx_period: 3,
            stoch_period: 3,
            stoch_smooth: 2,
        }
    }

    fn rising(count: usize) -> Vec<Candle> {
        let data: Vec<_> = (1..=count)
            .map(|i| {
                let close = i as f64 * 10.0;
                (close - 1.0, close + 1.0, close - 2.0, close)
            })
            .collect();
        candles(&data)
    }

    #[test]
    fn short_history_is_rejected() {
        let builder = SnapshotBuilder::new(&settings());
        let err = builder
            .build("TEST", &rising(7), AuxiliaryInputs::default())
            .unwrap_err();
        assert_eq!(
            err,
            StrategyError::InsufficientData {
                required: 8,
                available: 7
            }
        );
    }

    #[test]
    fn averages_and_bias_come_from_closes() {
        let builder = SnapshotBuilder::new(&settings());
        let snapshot = builder
            .build("TEST", &rising(8), AuxiliaryInputs::default())
            .unwrap();

        assert_eq!(snapshot.symbol, "TEST");
        assert_relative_eq!(snapshot.price, 80.0);
        assert_relative_eq!(snapshot.ma_short.unwrap(), 70.0);
        assert_relative_eq!(snapshot.ma_mid.unwrap(), 60.0);
        assert_relative_eq!(snapshot.ma_long.unwrap(), 45.0);
        assert_relative_eq!(snapshot.bias_pct.unwrap(), 100.0 / 3.0, epsilon = 1e-9);
        assert!(snapshot.trend_strength.is_some());
        assert!(snapshot.stochastic_k.is_some());
        assert_eq!(snapshot.is_open_lower, Some(false));
        assert_eq!(snapshot.volatility_index, None);
        assert_eq!(snapshot.premium_pct, None);
    }

    #[test]
    fn auxiliary_inputs_are_carried_over() {
        let builder = SnapshotBuilder::new(&settings());
        let aux = AuxiliaryInputs {
            volatility_index: Some(32.5),
            nav: Some(76.0),
            settlement_spread: Some(-12.0),
            days_to_settlement: Some(1),
        };
        let snapshot = builder.build("TEST", &rising(8), aux).unwrap();

        assert_eq!(snapshot.volatility_index, Some(32.5));
        assert_relative_eq!(snapshot.premium_pct.unwrap(), 4.0 / 76.0 * 100.0, epsilon = 1e-9);
        assert_eq!(snapshot.settlement_spread, Some(-12.0));
        assert_eq!(snapshot.days_to_settlement, Some(1));
    }

    #[test]
    fn zero_nav_yields_no_premium() {
        let builder = SnapshotBuilder::new(&settings());
        let aux = AuxiliaryInputs {
            nav: Some(0.0),
            ..AuxiliaryInputs::default()
        };
        let snapshot = builder.build("TEST", &rising(8), aux).unwrap();
        assert_eq!(snapshot.premium_pct, None);
    }
}
