mod chart;
mod exports;
mod progress;
mod styling;
mod summary;
mod tables;

pub use chart::init as init_chart;
pub use exports::export_build_times;
pub use progress::FetchProgress;
pub use styling::{dim, magenta_bold};
pub use summary::{print_summary, render_dashboard, summary_text};

pub const LOADING_MESSAGE: &str = "Waiting...";
pub const FAILED_MESSAGE: &str = "Failed to fetch build times";

/// Prints the banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("⏱️ Travis Build Times"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Build duration dashboard")
    );
}
