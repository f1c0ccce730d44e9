use chrono::NaiveDate;
use core_types::{MemoryFocus, MemorySignal, NewsSentiment, SpotBoard};
use serde::Serialize;
use std::fmt::Write;

const MEMORY_RULE: &str = "----------------------";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryStockReport {
    pub code: String,
    pub name: String,
    pub focus: MemoryFocus,
    pub price: f64,
    pub ma_slow: f64,
    pub signal: MemorySignal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MemoryEntry {
    Evaluated(MemoryStockReport),
    InsufficientData { name: String },
    Failed { name: String, error: String },
}

/// The memory-sector message: spot board context plus one block per stock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryReport {
    pub date: NaiveDate,
    pub board: SpotBoard,
    pub news: NewsSentiment,
    /// Contract-news titles, newest first.
    pub headlines: Vec<String>,
    pub slow_window: usize,
    pub entries: Vec<MemoryEntry>,
}

impl MemoryReport {
    pub fn new(
        date: NaiveDate,
        board: SpotBoard,
        news: NewsSentiment,
        headlines: Vec<String>,
        slow_window: usize,
    ) -> Self {
        Self {
            date,
            board,
            news,
            headlines,
            slow_window,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: MemoryEntry) {
        self.entries.push(entry);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "⚡ Memory Sector Report {}", self.date);
        let _ = writeln!(out, "{}", MEMORY_RULE);
        let _ = writeln!(out, "Spot trend: {}", self.board.trend);
        let _ = writeln!(out, "Contract news: {}", self.news);
        let _ = writeln!(
            out,
            "Headline: {}",
            self.headlines.first().map_or("none", String::as_str)
        );
        if self.board.from_fallback {
            let _ = writeln!(out, "(spot quotes unavailable, showing backup values)");
        }

        for entry in &self.entries {
            out.push('\n');
            match entry {
                MemoryEntry::Evaluated(stock) => {
                    let _ = writeln!(out, "💾 {} {}", stock.name, stock.code);
                    let _ = writeln!(
                        out,
                        "Price: {:.1} (MA{}: {:.1})",
                        stock.price, self.slow_window, stock.ma_slow
                    );
                    let _ = writeln!(out, "Focus: {}", self.board.focus_line(stock.focus));
                    let _ = writeln!(out, "💡 {} ({})", stock.signal.action, stock.signal.reason);
                }
                MemoryEntry::InsufficientData { name } => {
                    let _ = writeln!(out, "⚠️ {} insufficient data", name);
                }
                MemoryEntry::Failed { name, error } => {
                    let _ = writeln!(out, "⚠️ {} fetch error: {}", name, error);
                }
            }
        }
        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::MemoryAction;

    #[test]
    fn renders_memory_report() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 17).unwrap();
        let headlines = vec![
            "DRAM contract prices 回升 in Q2".to_string(),
            "NAND makers cut output".to_string(),
        ];
        let mut report =
            MemoryReport::new(date, SpotBoard::fallback(), NewsSentiment::Bullish, headlines, 60);
        report.push(MemoryEntry::Evaluated(MemoryStockReport {
            code: "2408".to_string(),
            name: "Nanya Technology".to_string(),
            focus: MemoryFocus::Dram,
            price: 75.3,
            ma_slow: 80.04,
            signal: MemorySignal {
                action: MemoryAction::ValueAccumulate,
                reason: "Contract prices expected up".to_string(),
            },
        }));
        report.push(MemoryEntry::InsufficientData {
            name: "Phison".to_string(),
        });

        let text = report.render();
        assert!(text.starts_with("⚡ Memory Sector Report 2026-03-17\n----------------------\n"));
        assert!(
            text.contains("Contract news: 📈 expected up\nHeadline: DRAM contract prices 回升 in Q2\n")
        );
        assert!(text.contains("backup values"));
        assert!(text.contains("💾 Nanya Technology 2408\nPrice: 75.3 (MA60: 80.0)\n"));
        assert!(text.contains("Focus: DRAM: US$6.26 (DDR4 4G (Backup))"));
        assert!(text.contains("💡 💎 Value accumulation (Contract prices expected up)"));
        assert!(text.ends_with("⚠️ Phison insufficient data"));
    }

    #[test]
    fn missing_headlines_render_none() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 17).unwrap();
        let report = MemoryReport::new(
            date,
            SpotBoard::fallback(),
            NewsSentiment::Unavailable,
            Vec::new(),
            60,
        );
        assert!(report.render().contains("Contract news: N/A\nHeadline: none\n"));
    }
}
