use chrono::NaiveDate;
use configuration::IndicatorSettings;
use core_types::{MarketSnapshot, Signal};
use serde::Serialize;
use std::fmt::Write;

pub(crate) const RULE: &str = "------------------";

/// Moving-average window lengths, used for labels such as "MA60".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaWindows {
    pub short: usize,
    pub mid: usize,
    pub long: usize,
}

impl From<&IndicatorSettings> for MaWindows {
    fn from(settings: &IndicatorSettings) -> Self {
        Self {
            short: settings.ma_short,
            mid: settings.ma_mid,
            long: settings.ma_long,
        }
    }
}

/// One evaluated instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentReport {
    pub name: String,
    pub snapshot: MarketSnapshot,
    pub signal: Signal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportEntry {
    Evaluated(InstrumentReport),
    /// History too short to build a snapshot; the evaluator was not run.
    InsufficientData { symbol: String, required: usize },
    /// Fetching or building failed for another reason.
    Failed { symbol: String, error: String },
}

impl ReportEntry {
    pub fn symbol(&self) -> &str {
        match self {
            ReportEntry::Evaluated(report) => &report.snapshot.symbol,
            ReportEntry::InsufficientData { symbol, .. } | ReportEntry::Failed { symbol, .. } => symbol,
        }
    }
}

/// The daily radar message covering every configured instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarReport {
    pub date: NaiveDate,
    pub windows: MaWindows,
    pub entries: Vec<ReportEntry>,
}

impl RadarReport {
    pub fn new(date: NaiveDate, windows: MaWindows) -> Self {
        Self {
            date,
            windows,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    /// Renders the push-message text.
    pub fn render(&self) -> String {
        let mut out = format!("📅 {} Investment Radar", self.date);
        for entry in &self.entries {
            out.push_str("\n\n");
            match entry {
                ReportEntry::Evaluated(report) => self.render_block(&mut out, report),
                ReportEntry::InsufficientData { symbol, required } => {
                    let _ = write!(out, "⚠️ {} insufficient data (needs ≥ {} bars)", symbol, required);
                }
                ReportEntry::Failed { symbol, error } => {
                    let _ = write!(out, "⚠️ {} analysis error: {}", symbol, error);
                }
            }
        }
        out
    }

    fn render_block(&self, out: &mut String, report: &InstrumentReport) {
        let s = &report.snapshot;
        let w = &self.windows;

        let title = if report.name == s.symbol {
            s.symbol.clone()
        } else {
            format!("{} ({})", report.name, s.symbol)
        };
        let _ = writeln!(out, "📊 {}", title);
        let _ = writeln!(out, "Price: {:.2}", s.price);
        let _ = writeln!(out, "Bias: {} (vs MA{})", signed_pct(s.bias_pct), w.mid);
        let _ = writeln!(
            out,
            "MA{} / MA{} / MA{}: {} / {} / {}",
            w.short,
            w.mid,
            w.long,
            number(s.ma_short, 1),
            number(s.ma_mid, 1),
            number(s.ma_long, 1)
        );
        let _ = writeln!(
            out,
            "ADX: {} | VIX: {}",
            number(s.trend_strength, 1),
            number(s.volatility_index, 1)
        );
        if s.premium_pct.is_some() {
            let _ = writeln!(out, "Premium: {}", signed_pct(s.premium_pct));
        }
        if let Some(days) = s.days_to_settlement {
            let when = match days {
                0 => "today".to_string(),
                1 => "in 1 trading day".to_string(),
                n => format!("in {} trading days", n),
            };
            match s.settlement_spread {
                Some(spread) => {
                    let _ = writeln!(out, "Settlement: {}, spread {:+.0} pts", when, spread);
                }
                None => {
                    let _ = writeln!(out, "Settlement: {}", when);
                }
            }
        }
        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out, "💡 Advice: {}", report.signal.action);
        let _ = write!(out, "📝 Reason: {}", report.signal.reason);
    }
}

pub(crate) fn number(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.*}", decimals, v))
}

pub(crate) fn signed_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:+.2}%", v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::SignalAction;

    fn windows() -> MaWindows {
        MaWindows::from(&IndicatorSettings::default())
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 17).unwrap()
    }

    #[test]
    fn renders_evaluated_block() {
        let snapshot = MarketSnapshot::new("00631L.TW", 100.0)
            .with_short_average(98.0)
            .with_mid_average(95.0)
            .with_long_average(90.0)
            .with_trend_strength(30.0)
            .with_days_to_settlement(1)
            .with_settlement_spread(12.0);
        let mut report = RadarReport::new(date(), windows());
        report.push(ReportEntry::Evaluated(InstrumentReport {
            name: "00631L.TW".to_string(),
            snapshot,
            signal: Signal::new(SignalAction::Hold, "no threshold condition met"),
        }));

        let text = report.render();
        let expected = "📅 2026-03-17 Investment Radar\n\n\
            📊 00631L.TW\n\
            Price: 100.00\n\
            Bias: +5.26% (vs MA60)\n\
            MA20 / MA60 / MA120: 98.0 / 95.0 / 90.0\n\
            ADX: 30.0 | VIX: N/A\n\
            Settlement: in 1 trading day, spread +12 pts\n\
            ------------------\n\
            💡 Advice: 👀 Hold / keep position\n\
            📝 Reason: no threshold condition met";
        assert_eq!(text, expected);
    }

    #[test]
    fn renders_unavailable_entries() {
        let mut report = RadarReport::new(date(), windows());
        report.push(ReportEntry::InsufficientData {
            symbol: "NEW.TW".to_string(),
            required: 120,
        });
        report.push(ReportEntry::Failed {
            symbol: "GONE.TW".to_string(),
            error: "Symbol not found: GONE.TW".to_string(),
        });

        let text = report.render();
        assert!(text.contains("⚠️ NEW.TW insufficient data (needs ≥ 120 bars)"));
        assert!(text.contains("⚠️ GONE.TW analysis error: Symbol not found: GONE.TW"));
        assert_eq!(report.entries[1].symbol(), "GONE.TW");
    }

    #[test]
    fn named_instrument_shows_symbol_and_premium() {
        let mut report = RadarReport::new(date(), windows());
        report.push(ReportEntry::Evaluated(InstrumentReport {
            name: "Yuanta S&P 500 2x".to_string(),
            snapshot: MarketSnapshot::new("00647L.TW", 50.0).with_premium(4.0),
            signal: Signal::new(SignalAction::PremiumArbitrageSell, "Premium 4.00% over NAV exceeds 3%"),
        }));

        let text = report.render();
        assert!(text.contains("📊 Yuanta S&P 500 2x (00647L.TW)"));
        assert!(text.contains("Bias: N/A (vs MA60)"));
        assert!(text.contains("Premium: +4.00%"));
        assert!(text.contains("💡 Advice: 💸 Premium arbitrage sell"));
    }

    #[test]
    fn entries_serialize_with_status_tag() {
        let entry = ReportEntry::InsufficientData {
            symbol: "X".to_string(),
            required: 60,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["status"], "insufficient_data");
        assert_eq!(json["required"], 60);
    }
}
