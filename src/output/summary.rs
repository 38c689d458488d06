use std::fmt::Write;

use crate::dashboard::{Dashboard, FetchStatus};
use crate::insights::BuildTimes;

use super::chart::render_chart;
use super::styling::{bright, cyan, dim, status_styled};
use super::tables::duration_stats_table;
use super::{FAILED_MESSAGE, LOADING_MESSAGE};

/// Prints a human-readable summary of a loaded build history to stdout.
///
/// Shows an overview (repository, build count, date range), a duration table
/// and the build-duration chart.
pub fn print_summary(report: &BuildTimes) {
    println!("{}", render_summary(report));
}

/// Summary without terminal styling, for writing to a file.
pub fn summary_text(report: &BuildTimes) -> String {
    console::strip_ansi_codes(&render_summary(report)).into_owned()
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn render_summary(report: &BuildTimes) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Overview");
    let _ = writeln!(output, "  {} {}", dim("Repository:"), cyan(&report.repository));
    let _ = writeln!(
        output,
        "  {} {}",
        dim("Builds analyzed:"),
        cyan(report.total_builds)
    );
    if let (Some(first), Some(last)) = (report.builds.first(), report.builds.last()) {
        let _ = writeln!(
            output,
            "  {} {} → {}",
            dim("Date range:"),
            first.date.format("%Y-%m-%d"),
            last.date.format("%Y-%m-%d")
        );
    }
    let _ = writeln!(
        output,
        "  {} {}",
        dim("Analysis date:"),
        report.collected_at.format("%Y-%m-%d %H:%M UTC")
    );
    output.push('\n');

    if report.builds.is_empty() {
        let _ = writeln!(output, "  {}", dim("No passed builds found."));
        return output;
    }

    add_section_header(&mut output, "⏱️", "Build Duration");
    let _ = writeln!(output, "{}\n", duration_stats_table(&report.stats));

    add_section_header(&mut output, "📈", "Chart");
    let _ = writeln!(output, "{}", render_chart(&report.builds));

    output
}

/// Status line for the dashboard, if the status shows one.
pub fn status_line(status: FetchStatus) -> Option<String> {
    match status {
        FetchStatus::Loading => Some(LOADING_MESSAGE.to_string()),
        FetchStatus::Failed => Some(status_styled(FAILED_MESSAGE, status).to_string()),
        FetchStatus::Idle | FetchStatus::Loaded => None,
    }
}

/// Full dashboard view: status line, plus the chart once builds are loaded.
pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut output = String::new();
    if let Some(line) = status_line(dashboard.status()) {
        let _ = writeln!(output, "{line}");
    }
    if dashboard.status() == FetchStatus::Loaded {
        if dashboard.builds().is_empty() {
            let _ = writeln!(output, "{}", dim("No passed builds found."));
        } else {
            let _ = writeln!(output, "{}", render_chart(dashboard.builds()));
        }
    }
    output
}
