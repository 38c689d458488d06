use console::{style, StyledObject};

use crate::dashboard::FetchStatus;

/// Colours text by fetch status: yellow while loading, green once loaded,
/// red on failure.
pub fn status_styled(text: impl std::fmt::Display, status: FetchStatus) -> StyledObject<String> {
    let styled = style(text.to_string()).bright();
    match status {
        FetchStatus::Loading => styled.yellow(),
        FetchStatus::Loaded => styled.green(),
        FetchStatus::Failed => styled.red(),
        FetchStatus::Idle => styled,
    }
}

pub fn cyan(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).cyan()
}

pub fn dim(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn bright(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).bright()
}

pub fn magenta_bold(text: impl std::fmt::Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}
