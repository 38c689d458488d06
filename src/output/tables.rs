use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::insights::DurationStats;

fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// One-row table of duration statistics, in minutes. Only the mean and
/// percentiles are colour coded.
pub fn duration_stats_table(stats: &DurationStats) -> Table {
    let mut table = create_table();
    table.set_header(
        ["Mean", "P50", "P95", "Min", "Max"]
            .into_iter()
            .map(|label| Cell::new(label).fg(TableColor::Cyan)),
    );
    table.add_row(vec![
        minutes_cell(stats.mean),
        minutes_cell(stats.duration_p50),
        minutes_cell(stats.duration_p95),
        Cell::new(format!("{:.1}min", stats.min)),
        Cell::new(format!("{:.1}min", stats.max)),
    ]);
    table
}

/// Green up to 10 minutes, yellow up to 15, red beyond.
fn minutes_cell(minutes: f64) -> Cell {
    let text = format!("{minutes:.1}min");
    let color = if minutes <= 10.0 {
        TableColor::Green
    } else if minutes <= 15.0 {
        TableColor::Yellow
    } else {
        TableColor::Red
    };
    Cell::new(text).fg(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_table_shows_one_decimal_minutes() {
        let stats = DurationStats {
            mean: 12.3,
            min: 1.0,
            max: 20.0,
            duration_p50: 11.0,
            duration_p95: 19.5,
        };
        let rendered = console::strip_ansi_codes(&duration_stats_table(&stats).to_string()).into_owned();
        for expected in ["Mean", "P95", "12.3min", "1.0min", "20.0min", "19.5min"] {
            assert!(rendered.contains(expected), "missing {expected} in {rendered}");
        }
    }
}
