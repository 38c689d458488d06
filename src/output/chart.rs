//! Terminal line chart of build durations, drawn with a `ratatui` [`Chart`].
//!
//! The x axis is time-scaled: points sit at their start time in epoch
//! milliseconds. The y axis starts at zero.

use std::sync::OnceLock;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Widget};

use crate::insights::BuildSample;

pub const Y_AXIS_TITLE: &str = "Build duration (minutes)";

const CHART_WIDTH: u16 = 72;
const CHART_HEIGHT: u16 = 16;

static MARKER: OnceLock<Marker> = OnceLock::new();

/// Picks the point marker for this terminal. Only the first call does any work.
pub fn init() -> Marker {
    *MARKER.get_or_init(|| {
        if console::Term::stdout().features().wants_emoji() {
            Marker::Braille
        } else {
            Marker::Dot
        }
    })
}

/// Renders the chart with the terminal's marker.
pub fn render_chart(samples: &[BuildSample]) -> String {
    render_buffer(samples, init(), CHART_WIDTH, CHART_HEIGHT)
        .map(|buf| buffer_to_string(&buf))
        .unwrap_or_default()
}

/// Draws `samples` (sorted by date) into a `width` x `height` buffer.
/// Returns `None` when there is nothing to plot.
pub fn render_buffer(samples: &[BuildSample], marker: Marker, width: u16, height: u16) -> Option<Buffer> {
    let (first, last) = (samples.first()?, samples.last()?);
    let points = chart_points(samples);

    let y_max = nice_ceiling(samples.iter().map(|s| s.duration).fold(0.0, f64::max));
    let dataset = Dataset::default()
        .marker(marker)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points);

    let start = first.date.format("%Y-%m-%d").to_string();
    let end = last.date.format("%Y-%m-%d").to_string();
    // Axes only draw labels when given at least two.
    let x_labels = vec![Span::raw(start), Span::raw(end)];

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .bounds(x_bounds(&points))
                .labels(x_labels)
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .title(Y_AXIS_TITLE)
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::raw("0.0"),
                    Span::raw(format!("{:.1}", y_max / 2.0)),
                    Span::raw(format!("{y_max:.1}")),
                ])
                .style(Style::default().fg(Color::DarkGray)),
        );

    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    chart.render(area, &mut buf);
    Some(buf)
}

/// `(epoch millis, minutes)` for every sample.
#[allow(clippy::cast_precision_loss)]
fn chart_points(samples: &[BuildSample]) -> Vec<(f64, f64)> {
    samples
        .iter()
        .map(|s| (s.date.timestamp_millis() as f64, s.duration))
        .collect()
}

/// Spans the first to the last build. A single instant is widened by a
/// second each side so the point lands mid-chart.
fn x_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let start = points.first().map_or(0.0, |p| p.0);
    let end = points.last().map_or(0.0, |p| p.0);
    if end > start {
        [start, end]
    } else {
        [start - 1000.0, start + 1000.0]
    }
}

/// Plain text of the buffer, one line per row, trailing blanks trimmed.
pub fn buffer_to_string(buf: &Buffer) -> String {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            let row: String = (area.left()..area.right())
                .map(|x| buf.cell((x, y)).map_or(" ", |cell| cell.symbol()))
                .collect();
            row.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Smallest 1/2/5 x 10^n at or above `value`; 1.0 for empty or zero data.
fn nice_ceiling(value: f64) -> f64 {
    if value <= 0.0 || !value.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(value.log10().floor());
    for step in [1.0, 2.0, 5.0] {
        let candidate = step * magnitude;
        if candidate >= value - f64::EPSILON * value {
            return candidate;
        }
    }
    10.0 * magnitude
}
