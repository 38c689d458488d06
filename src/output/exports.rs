use anyhow::Result;
use std::io::Write;

use crate::config::OutputFormat;
use crate::insights::BuildTimes;

use super::chart::Y_AXIS_TITLE;

/// Exports build times to a machine-readable or standalone format.
///
/// - JSON: programmatic access
/// - CSV: spreadsheet analysis
/// - HTML: self-contained page drawing the chart with Chart.js
///
/// The summary format is rendered by [`super::print_summary`] instead.
pub fn export_build_times(
    report: &BuildTimes,
    format: OutputFormat,
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Summary => {
            anyhow::bail!("Summary format is rendered to the terminal, not exported")
        }
        OutputFormat::Json => export_json(report, pretty, output),
        OutputFormat::Csv => export_csv(report, output),
        OutputFormat::Html => export_html(report, output),
    }
}

fn export_json(report: &BuildTimes, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}

fn export_csv(report: &BuildTimes, output: &mut dyn Write) -> Result<()> {
    writeln!(output, "date,duration_minutes")?;
    for build in &report.builds {
        writeln!(output, "{},{}", build.iso_date(), build.duration)?;
    }
    Ok(())
}

fn export_html(report: &BuildTimes, output: &mut dyn Write) -> Result<()> {
    let repository = escape_html(&report.repository);
    let labels: Vec<String> = report.builds.iter().map(|b| b.iso_date()).collect();
    let durations: Vec<f64> = report.builds.iter().map(|b| b.duration).collect();
    let labels = script_safe(&serde_json::to_string(&labels)?);
    let durations = script_safe(&serde_json::to_string(&durations)?);

    writeln!(output, "<!DOCTYPE html>")?;
    writeln!(output, "<html lang=\"en\">")?;
    writeln!(output, "<head>")?;
    writeln!(output, "    <meta charset=\"UTF-8\">")?;
    writeln!(output, "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">")?;
    writeln!(output, "    <title>Travis Build Times - {repository}</title>")?;
    writeln!(output, "    <script src=\"https://cdn.jsdelivr.net/npm/chart.js@4\"></script>")?;
    writeln!(output, "    <script src=\"https://cdn.jsdelivr.net/npm/chartjs-adapter-date-fns@3\"></script>")?;
    writeln!(output, "    <style>")?;
    writeln!(output, "        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 1rem; }}")?;
    writeln!(output, "        .failed {{ color: red; }}")?;
    writeln!(output, "    </style>")?;
    writeln!(output, "</head>")?;
    writeln!(output, "<body>")?;
    writeln!(output, "    <h1>Travis Build Times</h1>")?;
    writeln!(output, "    <p><strong>Repository:</strong> {repository}</p>")?;
    writeln!(output, "    <p><strong>Builds:</strong> {}</p>", report.total_builds)?;

    if report.builds.is_empty() {
        writeln!(output, "    <p>No passed builds found.</p>")?;
    } else {
        writeln!(output, "    <div><canvas id=\"build-times\"></canvas></div>")?;
        writeln!(output, "    <script>")?;
        writeln!(output, "        new Chart(document.getElementById('build-times'), {{")?;
        writeln!(output, "            type: 'line',")?;
        writeln!(output, "            data: {{")?;
        writeln!(output, "                labels: {labels},")?;
        writeln!(output, "                datasets: [{{")?;
        writeln!(output, "                    label: '{Y_AXIS_TITLE}',")?;
        writeln!(output, "                    data: {durations},")?;
        writeln!(output, "                    borderColor: 'rgb(75, 192, 192)'")?;
        writeln!(output, "                }}]")?;
        writeln!(output, "            }},")?;
        writeln!(output, "            options: {{")?;
        writeln!(output, "                scales: {{")?;
        writeln!(output, "                    x: {{ type: 'time' }},")?;
        writeln!(output, "                    y: {{ beginAtZero: true }}")?;
        writeln!(output, "                }}")?;
        writeln!(output, "            }}")?;
        writeln!(output, "        }});")?;
        writeln!(output, "    </script>")?;
    }

    writeln!(
        output,
        "    <footer><p>Generated by travis-build-times v{} on {}</p></footer>",
        env!("CARGO_PKG_VERSION"),
        report.collected_at.format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(output, "</body>")?;
    writeln!(output, "</html>")?;

    Ok(())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Keeps embedded JSON from closing the surrounding `<script>` element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
