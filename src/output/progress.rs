use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::dashboard::FetchStatus;

use super::styling::status_styled;
use super::{FAILED_MESSAGE, LOADING_MESSAGE};

/// Spinner shown on stderr while a fetch is in flight.
#[derive(Default)]
pub struct FetchProgress {
    pb: Option<ProgressBar>,
}

impl FetchProgress {
    /// Follows the dashboard status: starts on `Loading`, finishes on
    /// `Loaded`/`Failed`.
    pub fn update(&mut self, status: FetchStatus, builds: usize) {
        match status {
            FetchStatus::Loading => {
                if self.pb.is_none() {
                    self.pb = Some(create_spinner(status_styled(LOADING_MESSAGE, status).to_string()));
                }
            }
            FetchStatus::Loaded => {
                if let Some(pb) = self.pb.take() {
                    pb.finish_with_message(
                        status_styled(format!("Fetched {builds} builds ✓"), status).to_string(),
                    );
                }
            }
            FetchStatus::Failed => {
                if let Some(pb) = self.pb.take() {
                    pb.finish_with_message(status_styled(FAILED_MESSAGE, status).to_string());
                }
            }
            FetchStatus::Idle => {}
        }
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_spinner().template("  {msg} {spinner}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
