use configuration::{ClassProfile, PanicPriority, RuleThresholds};
use core_types::{InstrumentClass, MarketSnapshot, Signal, SignalAction};

/// The threshold-rule evaluator for one instrument class.
///
/// Rules are checked in a fixed priority order and the first match wins:
///
/// 1. Settlement-day guard (leveraged funds with a settlement countdown)
/// 2. Premium-arbitrage guard (leveraged funds)
/// 3. Take-profit tiers and the VIX panic override, ordered by `panic_priority`
/// 4. Pyramid accumulation below the long/mid averages (equities, leveraged funds)
/// 5. Short-average stop line (classes with `short_ma_stop`)
/// 6. Trendless-market warning
/// 7. Oscillator / open-lower accumulation (broad index funds)
/// 8. Hold
///
/// Evaluation is pure and never fails; missing snapshot fields simply skip the
/// rules that need them.
#[derive(Debug, Clone)]
pub struct SignalEvaluator {
    class: InstrumentClass,
    profile: ClassProfile,
    thresholds: RuleThresholds,
}

impl SignalEvaluator {
    pub fn new(class: InstrumentClass, profile: ClassProfile, thresholds: RuleThresholds) -> Self {
        Self {
            class,
            profile,
            thresholds,
        }
    }

    pub fn class(&self) -> InstrumentClass {
        self.class
    }

    pub fn evaluate(&self, snapshot: &MarketSnapshot) -> Signal {
        if let Some(signal) = self.settlement_guard(snapshot) {
            return signal;
        }
        if let Some(signal) = self.premium_guard(snapshot) {
            return signal;
        }

        let overrides = match self.thresholds.panic_priority {
            PanicPriority::TakeProfitFirst => self
                .take_profit(snapshot)
                .or_else(|| self.panic_buy(snapshot)),
            PanicPriority::PanicFirst => self
                .panic_buy(snapshot)
                .or_else(|| self.take_profit(snapshot)),
        };
        if let Some(signal) = overrides {
            return signal;
        }

        self.accumulation(snapshot)
            .or_else(|| self.defensive_exit(snapshot))
            .or_else(|| self.trendless_warning(snapshot))
            .or_else(|| self.broad_index_entry(snapshot))
            .unwrap_or_else(|| self.hold(snapshot))
    }

    fn settlement_guard(&self, s: &MarketSnapshot) -> Option<Signal> {
        if self.class != InstrumentClass::LeveragedFund {
            return None;
        }
        let limit = self.thresholds.settlement_spread_limit;
        match s.days_to_settlement? {
            0 => Some(match s.settlement_spread {
                Some(spread) if spread > limit => Signal::new(
                    SignalAction::AbortEntry,
                    format!(
                        "Settlement day, futures spread +{:.0} pts: risk down, no new entries",
                        spread
                    ),
                ),
                Some(spread) if spread < -limit => Signal::new(
                    SignalAction::Hold,
                    format!(
                        "Settlement day, spread {:.0} pts: discount may close, mild optimism",
                        spread
                    ),
                ),
                Some(spread) => Signal::new(
                    SignalAction::AwaitSettlement,
                    format!("Settlement day, futures spread {:.0} pts: observe only", spread),
                ),
                None => Signal::new(SignalAction::AwaitSettlement, "Settlement day: observe only"),
            }),
            1 => {
                let bias = s.bias_pct?;
                (bias > self.thresholds.pre_settlement_bias).then(|| {
                    Signal::new(
                        SignalAction::TakeProfitTier1,
                        format!(
                            "Pre-settlement de-risk: bias {:.2}% > {}%",
                            bias, self.thresholds.pre_settlement_bias
                        ),
                    )
                })
            }
            _ => None,
        }
    }

    fn premium_guard(&self, s: &MarketSnapshot) -> Option<Signal> {
        if self.class != InstrumentClass::LeveragedFund {
            return None;
        }
        let premium = s.premium_pct?;
        (premium > self.thresholds.premium_ceiling).then(|| {
            Signal::new(
                SignalAction::PremiumArbitrageSell,
                format!(
                    "Premium {:.2}% over NAV exceeds {}%",
                    premium, self.thresholds.premium_ceiling
                ),
            )
        })
    }

    fn take_profit(&self, s: &MarketSnapshot) -> Option<Signal> {
        let bias = s.bias_pct?;
        let p = &self.profile;
        if bias > p.tier3 {
            return Some(Signal::new(
                SignalAction::TakeProfitTier3,
                format!("Bias {:.2}% > {}%: take profit tier 3", bias, p.tier3),
            ));
        }
        if bias > p.tier2 {
            return Some(Signal::new(
                SignalAction::TakeProfitTier2,
                format!("Bias {:.2}% > {}%: take profit tier 2", bias, p.tier2),
            ));
        }
        if bias > p.tier1 {
            let complacent = s
                .volatility_index
                .is_some_and(|vix| vix < self.thresholds.complacency_vix);
            if complacent {
                return Some(Signal::new(
                    SignalAction::RangeWarning,
                    format!(
                        "Bias {:.2}% > {}% with VIX below {}: market complacent, trim",
                        bias, p.tier1, self.thresholds.complacency_vix
                    ),
                ));
            }
            if p.tier1_take_profit {
                return Some(Signal::new(
                    SignalAction::TakeProfitTier1,
                    format!("Bias {:.2}% > {}%: take profit tier 1", bias, p.tier1),
                ));
            }
        }
        None
    }

    fn panic_buy(&self, s: &MarketSnapshot) -> Option<Signal> {
        let vix = s.volatility_index?;
        if vix <= self.thresholds.panic_vix {
            return None;
        }
        let reason = match s.ma_long {
            Some(ma) if s.price < ma => {
                format!("VIX breach + below long-window average (VIX {:.1}, MA {:.2})", vix, ma)
            }
            _ => format!("VIX breach (VIX {:.1} > {})", vix, self.thresholds.panic_vix),
        };
        Some(Signal::new(SignalAction::PanicBuy, reason))
    }

    fn accumulation(&self, s: &MarketSnapshot) -> Option<Signal> {
        if self.class == InstrumentClass::BroadIndexFund {
            return None;
        }
        if let Some(ma) = s.ma_long.filter(|ma| s.price < *ma) {
            return Some(Signal::new(
                SignalAction::AccumulateLarge,
                format!("Price {:.2} below long-window average {:.2}", s.price, ma),
            ));
        }
        s.ma_mid.filter(|ma| s.price < *ma).map(|ma| {
            Signal::new(
                SignalAction::AccumulateSmall,
                format!("Price {:.2} below mid-window average {:.2}", s.price, ma),
            )
        })
    }

    fn defensive_exit(&self, s: &MarketSnapshot) -> Option<Signal> {
        if !self.profile.short_ma_stop {
            return None;
        }
        s.ma_short.filter(|ma| s.price < *ma).map(|ma| {
            Signal::new(
                SignalAction::DefensiveSell,
                format!("Price {:.2} broke the short-window stop {:.2}", s.price, ma),
            )
        })
    }

    fn trendless_warning(&self, s: &MarketSnapshot) -> Option<Signal> {
        // ADX of 0 means the indicator could not be computed.
        let strength = s.trend_strength.filter(|adx| *adx > 0.0)?;
        (strength < self.thresholds.trend_floor).then(|| {
            Signal::new(
                SignalAction::RangeWarning,
                format!(
                    "No trend (ADX {:.1} < {}), avoid decay",
                    strength, self.thresholds.trend_floor
                ),
            )
        })
    }

    fn broad_index_entry(&self, s: &MarketSnapshot) -> Option<Signal> {
        if self.class != InstrumentClass::BroadIndexFund {
            return None;
        }
        if let Some(k) = s.stochastic_k.filter(|k| *k < self.thresholds.oversold_k) {
            return Some(Signal::new(
                SignalAction::AccumulateSmall,
                format!("Oscillator oversold (K {:.1} < {})", k, self.thresholds.oversold_k),
            ));
        }
        (s.is_open_lower == Some(true)).then(|| {
            Signal::new(
                SignalAction::AccumulateSmall,
                "Close below open, scheduled accumulation",
            )
        })
    }

    /// Names the first field this class's rules needed but did not get.
    fn missing_field(&self, s: &MarketSnapshot) -> Option<&'static str> {
        let broad = self.class == InstrumentClass::BroadIndexFund;
        [
            ("ma_mid", s.ma_mid.is_none()),
            ("bias_pct", s.bias_pct.is_none()),
            ("ma_long", !broad && s.ma_long.is_none()),
            ("ma_short", self.profile.short_ma_stop && s.ma_short.is_none()),
            ("stochastic_k", broad && s.stochastic_k.is_none()),
        ]
        .into_iter()
        .find_map(|(field, missing)| missing.then_some(field))
    }

    fn hold(&self, s: &MarketSnapshot) -> Signal {
        match self.missing_field(s) {
            Some(field) => {
                Signal::new(SignalAction::Hold, format!("insufficient data for {}", field))
            }
            None => Signal::new(SignalAction::Hold, "no threshold condition met"),
        }
    }
}


/// Evaluates one snapshot for `class` with the given thresholds.
pub fn evaluate(
    snapshot: &MarketSnapshot,
    class: InstrumentClass,
    profile: &ClassProfile,
    thresholds: &RuleThresholds,
) -> Signal {
    SignalEvaluator::new(class, profile.clone(), thresholds.clone()).evaluate(snapshot)
}
