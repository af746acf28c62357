use clap::{Parser, ValueEnum};
use wasm_bindgen::prelude::*;

mod crossword;
mod mine;
mod storage;
mod utils;

#[derive(ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
enum Tool {
    #[default]
    Minesweeper,
    Crossword,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Which grid tool to mount
    #[arg(long, value_enum, default_value_t)]
    tool: Tool,

    #[command(flatten)]
    mine: mine::MineProps,

    #[command(flatten)]
    crossword: crossword::CrosswordProps,
}

impl Args {
    /// Reads arguments from a location hash such as `#-vv&--tool=crossword`.
    fn from_hash(location_hash: &str) -> Result<Self, clap::Error> {
        Self::try_parse_from(location_hash.split(['#', '&']))
    }
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{body, document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    let args = Args::from_hash(&location_hash).unwrap_or_else(|err| {
        gloo::console::warn!(format!("Ignoring hash arguments: {err}"));
        Args::parse_from([""])
    });
    if let Some(log_level) = args.verbose.log_level()
        && let Err(err) = console_log::init_with_level(log_level)
    {
        gloo::console::error!(format!("Error initializing logger: {err}"));
    }
    log::debug!("args: {:?}", args);

    let root = document()
        .get_element_by_id("app")
        .unwrap_or_else(|| body().into());

    log::debug!("App started");
    match args.tool {
        Tool::Minesweeper => {
            yew::Renderer::<mine::MineView>::with_root_and_props(root, args.mine).render();
        }
        Tool::Crossword => {
            yew::Renderer::<crossword::CrosswordView>::with_root_and_props(root, args.crossword)
                .render();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_hash_uses_defaults() {
        let args = Args::from_hash("").unwrap();

        assert_eq!(args.tool, Tool::Minesweeper);
        assert_eq!(args.mine.seed, None);
        assert_eq!(args.mine.size, gridplay_core::BoardConfig::DEFAULT_SIZE);
        assert_eq!(args.mine.mines, gridplay_core::BoardConfig::DEFAULT_MINES);
        assert!(!args.mine.lock_after_win);
        assert!(!args.crossword.play);
    }

    #[test]
    fn hash_arguments_are_split_on_ampersands() {
        let args = Args::from_hash("#--seed=42&--size=9&--mines=10&--lock-after-win").unwrap();

        assert_eq!(args.mine.seed, Some(42));
        assert_eq!(args.mine.size, 9);
        assert_eq!(args.mine.mines, 10);
        assert!(args.mine.lock_after_win);
    }

    #[test]
    fn hash_selects_crossword_tool() {
        let args = Args::from_hash("#--tool=crossword&--play").unwrap();

        assert_eq!(args.tool, Tool::Crossword);
        assert!(args.crossword.play);
    }

    #[test]
    fn bad_hash_is_an_error() {
        assert!(Args::from_hash("#--size=nine").is_err());
    }
}
