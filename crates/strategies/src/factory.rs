use crate::error::StrategyError;
use crate::evaluator::SignalEvaluator;
use configuration::Config;
use core_types::InstrumentClass;

/// Creates the evaluator for `class` from the loaded configuration.
///
/// The evaluator is handed its thresholds here; it never reads configuration
/// itself.
pub fn create_evaluator(
    class: InstrumentClass,
    config: &Config,
) -> Result<SignalEvaluator, StrategyError> {
    let profile = config.classes.profile(class).clone();
    if !(profile.tier1 < profile.tier2 && profile.tier2 < profile.tier3) {
        return Err(StrategyError::InvalidParameters(format!(
            "Take-profit tiers for {} must be strictly ascending (got {}/{}/{})",
            class, profile.tier1, profile.tier2, profile.tier3
        )));
    }

    let rules = config.rules.clone();
    let thresholds = [
        rules.panic_vix,
        rules.complacency_vix,
        rules.trend_floor,
        rules.oversold_k,
        rules.premium_ceiling,
        rules.pre_settlement_bias,
        rules.settlement_spread_limit,
    ];
    if thresholds.iter().any(|v| !v.is_finite()) {
        return Err(StrategyError::InvalidParameters(
            "Rule thresholds must be finite numbers".to_string(),
        ));
    }

    Ok(SignalEvaluator::new(class, profile, rules))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_defaults() {
        let config = Config::default();
        let evaluator = create_evaluator(InstrumentClass::EquityOrAdr, &config).unwrap();
        assert_eq!(evaluator.class(), InstrumentClass::EquityOrAdr);
    }

    #[test]
    fn rejects_unordered_tiers() {
        let mut config = Config::default();
        config.classes.leveraged_fund.tier2 = 30.0;
        let err = create_evaluator(InstrumentClass::LeveragedFund, &config).unwrap_err();
        assert!(matches!(
            err,
            StrategyError::InvalidParameters(msg) if msg.contains("leveraged fund")
        ));
    }

    #[test]
    fn rejects_nan_threshold() {
        let mut config = Config::default();
        config.rules.panic_vix = f64::NAN;
        assert!(create_evaluator(InstrumentClass::BroadIndexFund, &config).is_err());
    }
}
