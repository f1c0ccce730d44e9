use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_logging;
pub use settings::{
    ClassProfile, ClassProfiles, Config, IndicatorSettings, InstrumentConfig, LineConfig,
    LoggingConfig, MarketConfig, MemoryConfig, MemoryTarget, PanicPriority, RuleThresholds,
    ScalarSource,
};

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

/// Loads the application configuration.
///
/// Sources, lowest precedence first:
/// 1. Built-in defaults.
/// 2. The TOML file at `path` (optional; a missing file is not an error).
/// 3. `RADAR_*` environment variables, `__` separating nested keys
///    (e.g. `RADAR_RULES__PANIC_VIX=28`).
/// 4. `LINE_CHANNEL_TOKEN` / `LINE_USER_ID` for the push credentials.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = with_class_defaults(config::Config::builder())?
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("RADAR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("line.channel_token", std::env::var("LINE_CHANNEL_TOKEN").ok())?
        .set_override_option("line.user_id", std::env::var("LINE_USER_ID").ok())?
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;
    Ok(config)
}

/// Parses configuration from a TOML string, without consulting the environment.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config = with_class_defaults(config::Config::builder())?
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    validate(&config)?;
    Ok(config)
}

/// Seeds every class-profile key with its built-in value.
///
/// Profiles differ per class, so serde field defaults cannot express them; a
/// partial `[classes.<name>]` table or a single `RADAR_CLASSES__...` variable
/// only replaces the keys it names.
fn with_class_defaults(mut builder: Builder) -> Result<Builder, ConfigError> {
    let defaults = ClassProfiles::default();
    for (name, profile) in defaults.named() {
        builder = builder
            .set_default(format!("classes.{name}.tier1"), profile.tier1)?
            .set_default(format!("classes.{name}.tier2"), profile.tier2)?
            .set_default(format!("classes.{name}.tier3"), profile.tier3)?
            .set_default(format!("classes.{name}.short_ma_stop"), profile.short_ma_stop)?
            .set_default(
                format!("classes.{name}.tier1_take_profit"),
                profile.tier1_take_profit,
            )?;
    }
    Ok(builder)
}

/// Rejects settings the evaluator cannot work with.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let ind = &config.indicators;
    if ind.ma_short == 0 || ind.adx_period == 0 || ind.stoch_period == 0 || ind.stoch_smooth == 0 {
        return Err(ConfigError::ValidationError(
            "Indicator periods cannot be zero".to_string(),
        ));
    }
    if !(ind.ma_short < ind.ma_mid && ind.ma_mid < ind.ma_long) {
        return Err(ConfigError::ValidationError(format!(
            "Moving-average windows must be ordered short < mid < long (got {}/{}/{})",
            ind.ma_short, ind.ma_mid, ind.ma_long
        )));
    }

    for (name, profile) in config.classes.named() {
        if !(profile.tier1 < profile.tier2 && profile.tier2 < profile.tier3) {
            return Err(ConfigError::ValidationError(format!(
                "Take-profit tiers for {} must be strictly ascending (got {}/{}/{})",
                name, profile.tier1, profile.tier2, profile.tier3
            )));
        }
    }

    if config.rules.complacency_vix >= config.rules.panic_vix {
        return Err(ConfigError::ValidationError(
            "complacency_vix must be below panic_vix".to_string(),
        ));
    }

    if config.instruments.is_empty() {
        return Err(ConfigError::ValidationError(
            "At least one instrument must be configured".to_string(),
        ));
    }

    let memory = &config.memory;
    if memory.ma_fast == 0 || memory.ma_fast >= memory.ma_slow {
        return Err(ConfigError::ValidationError(
            "Memory scan requires 0 < ma_fast < ma_slow".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{InstrumentClass, MemoryFocus};

    #[test]
    fn empty_file_yields_script_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.indicators.ma_long, 120);
        assert_eq!(config.rules.panic_vix, 30.0);
        assert_eq!(config.rules.panic_priority, PanicPriority::TakeProfitFirst);
        assert_eq!(config.instruments.len(), 2);
        assert_eq!(config.instruments[0].symbol, "00631L.TW");
        assert_eq!(config.memory.targets.len(), 4);
        assert_eq!(config.memory.targets[0].focus, MemoryFocus::Nand);
        assert!(config.line.channel_token.is_empty());
    }

    #[test]
    fn instruments_and_classes_parse_from_toml() {
        let toml = r##"
            [rules]
            panic_vix = 28
            panic_priority = "panic_first"

            [classes.equity_or_adr]
            tier1 = 18
            tier2 = 24
            tier3 = 32

            [[instruments]]
            symbol = "TSM"
            name = "TSMC ADR"
            class = "equity_or_adr"

            [[instruments]]
            symbol = "0050.TW"
            class = "broad_index_fund"
            nav_source = { url = "https://example.test/nav", selector = "#nav" }
        "##;
        let config = parse_config(toml).unwrap();

        assert_eq!(config.rules.panic_vix, 28.0);
        assert_eq!(config.rules.complacency_vix, 13.0);
        assert_eq!(config.rules.panic_priority, PanicPriority::PanicFirst);
        assert_eq!(config.classes.profile(InstrumentClass::EquityOrAdr).tier3, 32.0);
        assert_eq!(config.classes.profile(InstrumentClass::LeveragedFund).tier1, 15.0);

        assert_eq!(config.instruments.len(), 2);
        assert_eq!(config.instruments[0].display_name(), "TSMC ADR");
        assert_eq!(config.instruments[1].display_name(), "0050.TW");
        assert!(!config.instruments[1].futures_linked);
        assert_eq!(
            config.instruments[1].nav_source.as_ref().map(|s| s.selector.as_str()),
            Some("#nav")
        );
    }

    #[test]
    fn retuned_tiers_keep_class_flags() {
        let toml = r#"
            [classes.leveraged_fund]
            tier1 = 12
            tier2 = 18
            tier3 = 24
        "#;
        let config = parse_config(toml).unwrap();
        let profile = config.classes.profile(InstrumentClass::LeveragedFund);

        assert_eq!((profile.tier1, profile.tier2, profile.tier3), (12.0, 18.0, 24.0));
        assert!(profile.short_ma_stop);
        assert!(profile.tier1_take_profit);
    }

    #[test]
    fn single_class_key_overrides_only_that_key() {
        let config = parse_config("[classes.equity_or_adr]\ntier3 = 35\n").unwrap();
        let profile = config.classes.profile(InstrumentClass::EquityOrAdr);

        assert_eq!((profile.tier1, profile.tier2, profile.tier3), (20.0, 25.0, 35.0));
        assert!(!profile.short_ma_stop);
        assert_eq!(
            config.classes.profile(InstrumentClass::BroadIndexFund),
            &ClassProfiles::default().broad_index_fund
        );
    }

    #[test]
    fn descending_tiers_are_rejected() {
        let toml = r#"
            [classes.broad_index_fund]
            tier1 = 25
            tier2 = 20
            tier3 = 15
        "#;
        let err = parse_config(toml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError(msg) if msg.contains("broad_index_fund")
        ));
    }

    #[test]
    fn unordered_windows_are_rejected() {
        let toml = r#"
            [indicators]
            ma_short = 60
            ma_mid = 20
        "#;
        assert!(matches!(parse_config(toml), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn empty_instrument_list_is_rejected() {
        assert!(matches!(
            parse_config("instruments = []"),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
