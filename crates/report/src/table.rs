use crate::memory::{MemoryEntry, MemoryReport};
use crate::radar::{RadarReport, ReportEntry, number, signed_pct};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};

/// Terminal overview of a radar run, printed on dry runs.
pub fn summary_table(report: &RadarReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Symbol", "Price", "Bias", "ADX", "VIX", "Advice", "Reason"]);

    for entry in &report.entries {
        let row = match entry {
            ReportEntry::Evaluated(r) => vec![
                Cell::new(&r.snapshot.symbol),
                Cell::new(format!("{:.2}", r.snapshot.price)),
                Cell::new(signed_pct(r.snapshot.bias_pct)),
                Cell::new(number(r.snapshot.trend_strength, 1)),
                Cell::new(number(r.snapshot.volatility_index, 1)),
                Cell::new(r.signal.action.to_string()),
                Cell::new(&r.signal.reason),
            ],
            ReportEntry::InsufficientData { symbol, required } => {
                unavailable_row(symbol, format!("insufficient data (needs ≥ {} bars)", required))
            }
            ReportEntry::Failed { symbol, error } => unavailable_row(symbol, error.clone()),
        };
        table.add_row(row);
    }
    table
}

/// Terminal overview of a memory-sector run.
pub fn memory_table(report: &MemoryReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Code", "Name", "Price", "Slow MA", "Focus", "Advice"]);

    for entry in &report.entries {
        let row = match entry {
            MemoryEntry::Evaluated(s) => vec![
                Cell::new(&s.code),
                Cell::new(&s.name),
                Cell::new(format!("{:.1}", s.price)),
                Cell::new(format!("{:.1}", s.ma_slow)),
                Cell::new(report.board.focus_line(s.focus)),
                Cell::new(s.signal.action.to_string()),
            ],
            MemoryEntry::InsufficientData { name } => {
                vec![Cell::new("-"), Cell::new(name), Cell::new("insufficient data")]
            }
            MemoryEntry::Failed { name, error } => {
                vec![Cell::new("-"), Cell::new(name), Cell::new(error)]
            }
        };
        table.add_row(row);
    }
    table
}

fn unavailable_row(symbol: &str, note: String) -> Vec<Cell> {
    vec![
        Cell::new(symbol),
        Cell::new("-"),
        Cell::new("-"),
        Cell::new("-"),
        Cell::new("-"),
        Cell::new("⚠️ unavailable"),
        Cell::new(note),
    ]
}
