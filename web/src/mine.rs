use crate::storage::{LocalSnapshotStore, MINESWEEPER_KEY};
use crate::utils::*;
use clap::Args;
use gloo::timers::callback::Timeout;
use gridplay_core as game;
use game::{Snapshot, SnapshotStore};
use yew::prelude::*;

const FLAG_GLYPH: &str = "🚩";
const NOTICE_MILLIS: u32 = 3000;

/// A board being played together with the store it is persisted to.
#[derive(Debug)]
pub(crate) struct MineSession<S> {
    engine: game::PlayEngine,
    post_win: game::PostWinPolicy,
    store: S,
}

impl<S: SnapshotStore<Item = game::Board>> MineSession<S> {
    /// Resumes the stored board if there is a readable one, otherwise builds an empty board.
    fn new(config: game::BoardConfig, post_win: game::PostWinPolicy, store: S) -> Self {
        let engine = match store.load() {
            Some(board) => {
                log::debug!("Resuming stored {}x{} board", board.size(), board.size());
                game::PlayEngine::new(board).with_post_win_policy(post_win)
            }
            None => Self::empty_engine(config, post_win),
        };
        Self {
            engine,
            post_win,
            store,
        }
    }

    fn empty_engine(config: game::BoardConfig, post_win: game::PostWinPolicy) -> game::PlayEngine {
        game::PlayEngine::new(game::Board::empty(config)).with_post_win_policy(post_win)
    }

    fn engine(&self) -> &game::PlayEngine {
        &self.engine
    }

    fn config(&self) -> game::BoardConfig {
        self.engine.board().config()
    }

    /// Discards the current board; mines go in on the next [`Self::place_mines`].
    fn build(&mut self, config: game::BoardConfig) {
        log::debug!("New board: {:?}", config);
        self.engine = Self::empty_engine(config, self.post_win);
        self.store.clear();
    }

    fn needs_mines(&self) -> bool {
        !self.engine.board().is_populated()
    }

    fn place_mines(&mut self, seed: u64) {
        if !self.needs_mines() {
            return;
        }
        log::debug!("Placing mines with seed {}", seed);
        self.engine.place_mines(game::RejectionSampler::new(seed));
        self.store.save(self.engine.board());
    }

    fn reveal(&mut self, coords: game::Coord2) -> Option<game::RevealOutcome> {
        match self.engine.reveal(coords) {
            Ok(outcome) => {
                if outcome.has_update() {
                    self.store.save(self.engine.board());
                }
                Some(outcome)
            }
            Err(err) => {
                log::debug!("Reveal at {:?} ignored: {}", coords, err);
                None
            }
        }
    }

    fn toggle_flag(&mut self, coords: game::Coord2) -> bool {
        match self.engine.toggle_flag(coords) {
            Ok(outcome) if outcome.has_update() => {
                self.store.save(self.engine.board());
                true
            }
            Ok(_) => false,
            Err(err) => {
                log::debug!("Flag at {:?} ignored: {}", coords, err);
                false
            }
        }
    }

    fn export(&self) -> Result<String, game::SnapshotError> {
        self.engine.board().export()
    }

    /// Replaces the board with an imported one; the current board survives a failed import.
    fn import(&mut self, data: &str) -> Result<(), game::SnapshotError> {
        let board = game::Board::import(data)?;
        self.engine = game::PlayEngine::new(board).with_post_win_policy(self.post_win);
        self.store.save(self.engine.board());
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum ViewCellState {
    Hidden,
    Flagged,
    Revealed(u8),
    Mine,
    TriggeredMine,
}

impl ViewCellState {
    fn of(cell: game::Cell, triggered: bool) -> Self {
        match cell {
            game::Cell { revealed: false, flagged: true, .. } => Self::Flagged,
            game::Cell { revealed: false, .. } => Self::Hidden,
            game::Cell { is_mine: true, .. } if triggered => Self::TriggeredMine,
            game::Cell { is_mine: true, .. } => Self::Mine,
            game::Cell { adjacent_mines, .. } => Self::Revealed(adjacent_mines),
        }
    }
}

fn cell_label(cell: game::Cell) -> String {
    if cell.revealed {
        cell.display_value()
    } else if cell.flagged {
        FLAG_GLYPH.to_string()
    } else {
        String::new()
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum CellMsg {
    Reveal,
    Flag,
}

pub(crate) enum Msg {
    Cell(game::Coord2, CellMsg),
    NewGame,
    SizeInput(String),
    MinesInput(String),
    Export,
    SnapshotInput(String),
    Import,
    ClearNotice,
}

#[derive(Properties, Clone, PartialEq)]
struct CellProps {
    coords: game::Coord2,
    cell_state: ViewCellState,
    label: String,
    callback: Callback<(game::Coord2, CellMsg)>,
}

#[function_component(CellView)]
fn cell_component(props: &CellProps) -> Html {
    use ViewCellState::*;

    let CellProps {
        coords,
        cell_state,
        label,
        callback,
    } = props.clone();

    let class = classes!(
        "cell",
        match cell_state {
            Hidden => classes!(),
            Flagged => classes!("flag"),
            Revealed(count) => classes!("open", format!("num-{}", count)),
            Mine => classes!("open", "mine"),
            TriggeredMine => classes!("open", "mine", "oops"),
        }
    );

    let onclick = {
        let callback = callback.clone();
        Callback::from(move |_: MouseEvent| {
            log::trace!("{:?} click", coords);
            callback.emit((coords, CellMsg::Reveal));
        })
    };

    let oncontextmenu = Callback::from(move |e: MouseEvent| {
        e.prevent_default();
        log::trace!("{:?} context menu", coords);
        callback.emit((coords, CellMsg::Flag));
    });

    html! {
        <td {class} {onclick} {oncontextmenu}>{label}</td>
    }
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct MineProps {
    /// Force a seed instead of random
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Board side length
    #[arg(long, default_value_t = game::BoardConfig::DEFAULT_SIZE)]
    pub size: game::Coord,

    /// Number of mines to place
    #[arg(long, default_value_t = game::BoardConfig::DEFAULT_MINES)]
    pub mines: game::CellCount,

    /// Refuse reveals and flags once the board is won
    #[arg(long)]
    pub lock_after_win: bool,
}

pub(crate) struct MineView {
    session: MineSession<LocalSnapshotStore<game::Board>>,
    size_input: String,
    mines_input: String,
    snapshot_text: String,
    notice: Option<String>,
    _notice_timeout: Option<Timeout>,
}

impl MineView {
    fn show_notice(&mut self, ctx: &Context<Self>, notice: impl Into<String>) {
        let link = ctx.link().clone();
        self.notice = Some(notice.into());
        self._notice_timeout = Some(Timeout::new(NOTICE_MILLIS, move || {
            link.send_message(Msg::ClearNotice)
        }));
    }

    fn sync_inputs(&mut self) {
        let config = self.session.config();
        self.size_input = config.size.to_string();
        self.mines_input = config.mines.to_string();
    }

    fn state_class(&self) -> &'static str {
        match self.session.engine().state() {
            game::EngineState::Active => "in-progress",
            game::EngineState::Won => "win",
            game::EngineState::Lost => "lose",
        }
    }
}

impl Component for MineView {
    type Message = Msg;
    type Properties = MineProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let config = game::BoardConfig::new(props.size, props.mines).unwrap_or_else(|err| {
            log::warn!(
                "Invalid board settings ({} side, {} mines): {}",
                props.size,
                props.mines,
                err
            );
            game::BoardConfig::default()
        });
        let post_win = if props.lock_after_win {
            game::PostWinPolicy::Lock
        } else {
            game::PostWinPolicy::Explore
        };

        let mut view = Self {
            session: MineSession::new(config, post_win, LocalSnapshotStore::new(MINESWEEPER_KEY)),
            size_input: String::new(),
            mines_input: String::new(),
            snapshot_text: String::new(),
            notice: None,
            _notice_timeout: None,
        };
        view.sync_inputs();
        view
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Cell(coords, CellMsg::Reveal) => match self.session.reveal(coords) {
                Some(game::RevealOutcome::HitMine) => {
                    gloo::dialogs::alert("You hit a mine!");
                    true
                }
                Some(game::RevealOutcome::Won) => {
                    self.show_notice(ctx, "You won!");
                    true
                }
                Some(outcome) => outcome.has_update(),
                None => false,
            },
            Cell(coords, CellMsg::Flag) => self.session.toggle_flag(coords),
            NewGame => {
                match parse_config(&self.size_input, &self.mines_input) {
                    Ok(config) => {
                        self.session.build(config);
                        self.notice = None;
                        self._notice_timeout = None;
                    }
                    Err(err) => {
                        log::warn!("Not building board: {}", err);
                        self.show_notice(ctx, err.to_string());
                    }
                }
                true
            }
            SizeInput(text) => {
                self.size_input = text;
                true
            }
            MinesInput(text) => {
                self.mines_input = text;
                true
            }
            Export => {
                match self.session.export() {
                    Ok(data) => self.snapshot_text = data,
                    Err(err) => self.show_notice(ctx, format!("Could not export board: {err}")),
                }
                true
            }
            SnapshotInput(text) => {
                self.snapshot_text = text;
                true
            }
            Import => {
                match self.session.import(&self.snapshot_text) {
                    Ok(()) => {
                        self.sync_inputs();
                        self.show_notice(ctx, "Board loaded");
                    }
                    Err(err) => {
                        log::warn!("Rejected board snapshot: {}", err);
                        self.show_notice(ctx, format!("Could not load board: {err}"));
                    }
                }
                true
            }
            ClearNotice => {
                self._notice_timeout = None;
                self.notice.take().is_some()
            }
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, _first_render: bool) {
        if self.session.needs_mines() {
            let seed = ctx.props().seed.unwrap_or_else(js_random_seed);
            self.session.place_mines(seed);
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let engine = self.session.engine();
        let size = engine.size();
        let triggered = engine.triggered_mine();

        let cb_new_game = ctx.link().callback(|e: MouseEvent| {
            e.stop_propagation();
            NewGame
        });
        let cb_size = ctx.link().callback(|e: InputEvent| SizeInput(input_value(&e)));
        let cb_mines = ctx.link().callback(|e: InputEvent| MinesInput(input_value(&e)));
        let cb_snapshot = ctx.link().callback(|e: InputEvent| SnapshotInput(input_value(&e)));
        let cb_export = ctx.link().callback(|_: MouseEvent| Export);
        let cb_import = ctx.link().callback(|_: MouseEvent| Import);

        html! {
            <div class="gridplay minesweeper">
                <nav>
                    <aside>{engine.mines_left().to_string()}</aside>
                    <span><button class={self.state_class()} onclick={cb_new_game}>{"Build"}</button></span>
                    <label>{"Size "}<input type="number" min="1" max="255" value={self.size_input.clone()} oninput={cb_size}/></label>
                    <label>{"Mines "}<input type="number" min="0" value={self.mines_input.clone()} oninput={cb_mines}/></label>
                </nav>
                if let Some(notice) = &self.notice {
                    <p class="notice">{notice.clone()}</p>
                }
                <table class={(!engine.is_finished()).then_some("playable")}>
                    {
                        for (0..size).map(|row| html! {
                            <tr>
                                {
                                    for (0..size).map(|col| {
                                        let coords = (row, col);
                                        let cell = engine.cell_at(coords).unwrap_or_default();
                                        let cell_state = ViewCellState::of(cell, triggered == Some(coords));
                                        let label = cell_label(cell);
                                        let callback = ctx
                                            .link()
                                            .callback(|(coords, cell_msg): (game::Coord2, CellMsg)| Cell(coords, cell_msg));
                                        html! {
                                            <CellView {coords} {cell_state} {label} {callback}/>
                                        }
                                    })
                                }
                            </tr>
                        })
                    }
                </table>
                <section class="snapshot">
                    <textarea value={self.snapshot_text.clone()} oninput={cb_snapshot}/>
                    <button onclick={cb_export}>{"Export"}</button>
                    <button onclick={cb_import}>{"Load"}</button>
                </section>
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game::MemorySnapshotStore;

    type TestSession = MineSession<MemorySnapshotStore<game::Board>>;

    fn session(config: game::BoardConfig, post_win: game::PostWinPolicy) -> TestSession {
        MineSession::new(config, post_win, MemorySnapshotStore::new())
    }

    fn stored_session(mines: &[game::Coord2], post_win: game::PostWinPolicy) -> TestSession {
        let mut store = MemorySnapshotStore::<game::Board>::new();
        store.save(&game::Board::from_mine_coords(3, mines).unwrap());
        MineSession::new(game::BoardConfig::default(), post_win, store)
    }

    #[test]
    fn fresh_session_places_mines_once() {
        let mut session = session(game::BoardConfig::new(6, 5).unwrap(), Default::default());
        assert!(session.needs_mines());
        assert!(session.store.load().is_none());

        session.place_mines(7);
        let placed = session.engine().board().clone();
        session.place_mines(8);

        assert!(!session.needs_mines());
        assert_eq!(session.engine().total_mines(), 5);
        assert_eq!(session.engine().board(), &placed);
        assert_eq!(session.store.load().as_ref(), Some(&placed));
    }

    #[test]
    fn stored_board_is_resumed() {
        let session = stored_session(&[(0, 0)], Default::default());

        assert!(!session.needs_mines());
        assert_eq!(session.config(), game::BoardConfig::new_unchecked(3, 1));
    }

    #[test]
    fn moves_are_persisted() {
        let mut session = stored_session(&[(0, 0)], Default::default());

        assert_eq!(session.reveal((1, 1)), Some(game::RevealOutcome::Revealed));
        assert!(session.toggle_flag((0, 0)));

        let stored = session.store.load().unwrap();
        assert!(stored[(1, 1)].revealed);
        assert!(stored[(0, 0)].flagged);
    }

    #[test]
    fn locked_session_ignores_moves_after_win() {
        let mut session = stored_session(&[(2, 2)], game::PostWinPolicy::Lock);

        assert_eq!(session.reveal((0, 0)), Some(game::RevealOutcome::Won));
        assert_eq!(session.reveal((2, 2)), None);
        assert!(!session.toggle_flag((2, 2)));
    }

    #[test]
    fn build_discards_board_and_store() {
        let mut session = stored_session(&[(0, 0)], Default::default());
        session.reveal((2, 2));

        session.build(game::BoardConfig::new(4, 2).unwrap());

        assert!(session.needs_mines());
        assert_eq!(session.config(), game::BoardConfig::new_unchecked(4, 2));
        assert!(session.store.load().is_none());
    }

    #[test]
    fn failed_import_keeps_current_board() {
        let mut session = stored_session(&[(0, 0)], Default::default());
        session.reveal((1, 1));
        let before = session.engine().board().clone();

        assert!(session.import("{\"board\": [[]]}").is_err());
        assert!(session.import("not json").is_err());

        assert_eq!(session.engine().board(), &before);
    }

    #[test]
    fn import_replaces_board_and_infers_state() {
        let mut other = session(Default::default(), Default::default());
        let mut source = stored_session(&[(0, 0)], Default::default());
        source.reveal((2, 2));
        source.reveal((0, 0));
        let data = source.export().unwrap();

        other.import(&data).unwrap();

        assert_eq!(other.engine().state(), game::EngineState::Lost);
        assert_eq!(other.config().size, 3);
        assert_eq!(other.store.load().as_ref(), Some(other.engine().board()));
    }

    #[test]
    fn view_state_follows_cell_flags() {
        let hidden = game::Cell::default();
        let flagged = game::Cell {
            flagged: true,
            ..hidden
        };
        let mine = game::Cell {
            is_mine: true,
            revealed: true,
            ..hidden
        };
        let two = game::Cell {
            adjacent_mines: 2,
            revealed: true,
            ..hidden
        };

        assert_eq!(ViewCellState::of(hidden, false), ViewCellState::Hidden);
        assert_eq!(ViewCellState::of(flagged, false), ViewCellState::Flagged);
        assert_eq!(ViewCellState::of(mine, false), ViewCellState::Mine);
        assert_eq!(ViewCellState::of(mine, true), ViewCellState::TriggeredMine);
        assert_eq!(ViewCellState::of(two, false), ViewCellState::Revealed(2));
        assert_eq!(cell_label(flagged), FLAG_GLYPH);
        assert_eq!(cell_label(two), "2");
        assert_eq!(cell_label(hidden), "");
    }
}
