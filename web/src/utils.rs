use gridplay_core::{BoardConfig, CellCount, Coord, GameError};
use thiserror::Error;
use yew::prelude::*;

/// Helper function to use JavaScript's Math.random
pub(crate) fn js_random_seed() -> u64 {
    use js_sys::Math::random;
    u64::from_be_bytes([
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
    ])
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConfigInputError {
    #[error("Board size must be a number from 1 to 255")]
    Size,
    #[error("Mine count must be a whole number")]
    Mines,
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Parses the board size and mine count typed into the settings inputs.
pub(crate) fn parse_config(size: &str, mines: &str) -> Result<BoardConfig, ConfigInputError> {
    let size: Coord = size.trim().parse().map_err(|_| ConfigInputError::Size)?;
    let mines: CellCount = mines.trim().parse().map_err(|_| ConfigInputError::Mines)?;
    Ok(BoardConfig::new(size, mines)?)
}

/// Value of the `<input>` or `<textarea>` that fired the event.
pub(crate) fn input_value(e: &InputEvent) -> String {
    use web_sys::{HtmlInputElement, HtmlTextAreaElement};

    if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
        input.value()
    } else if let Some(area) = e.target_dyn_into::<HtmlTextAreaElement>() {
        area.value()
    } else {
        String::new()
    }
}
