use crate::storage::{CROSSWORD_KEY, CROSSWORD_PLAY_KEY, LocalSnapshotStore};
use crate::utils::*;
use clap::Args;
use gridplay_core as game;
use game::{Direction, Highlight, Snapshot, SnapshotStore};
use yew::prelude::*;

/// A crossword grid together with the store it is persisted to.
#[derive(Debug)]
pub(crate) struct CrosswordSession<S> {
    grid: game::CrosswordGrid,
    store: S,
}

impl<S: SnapshotStore<Item = game::CrosswordGrid>> CrosswordSession<S> {
    fn new(store: S) -> Self {
        let grid = store.load().unwrap_or_default();
        Self { grid, store }
    }

    fn grid(&self) -> &game::CrosswordGrid {
        &self.grid
    }

    /// Runs `edit` on the grid and persists it when something changed.
    fn edit(&mut self, edit: impl FnOnce(&mut game::CrosswordGrid) -> bool) -> bool {
        let changed = edit(&mut self.grid);
        if changed {
            self.store.save(&self.grid);
        }
        changed
    }

    fn clear(&mut self) {
        self.grid.clear();
        self.store.clear();
    }

    fn export(&self) -> Result<String, game::SnapshotError> {
        self.grid.export()
    }

    fn import(&mut self, data: &str) -> Result<(), game::SnapshotError> {
        self.grid = game::CrosswordGrid::import(data)?;
        self.store.save(&self.grid);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Select(game::Coord2),
    ToggleBlack(game::Coord2),
    Letter(char),
    Backspace,
    SetMirror(bool),
    NumberInput(String),
    ClueInput(String),
    Connect(u16, Direction, bool),
    Export,
    SnapshotInput(String),
    Import,
    Clear,
}

/// Maps a `KeyboardEvent::key` value onto a typing message.
fn key_msg(key: &str) -> Option<Msg> {
    if key == "Backspace" {
        return Some(Msg::Backspace);
    }
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => Some(Msg::Letter(letter)),
        _ => None,
    }
}

/// Empty input clears the number; anything unparsable is ignored.
fn parse_cell_number(text: &str) -> Option<Option<u16>> {
    let text = text.trim();
    if text.is_empty() {
        Some(None)
    } else {
        text.parse().ok().map(Some)
    }
}

/// Solving keeps its own grid so a player never sees or overwrites the puzzle being built.
fn store_key(play: bool) -> &'static str {
    if play {
        CROSSWORD_PLAY_KEY
    } else {
        CROSSWORD_KEY
    }
}

/// Builder controls on screen: the mirror switch always, the square editor once a square is
/// selected. Solving shows neither.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct BuilderPanels {
    mirror_switch: bool,
    square_editor: bool,
}

impl BuilderPanels {
    fn new(play: bool, cursor: Option<game::Cursor>) -> Self {
        Self {
            mirror_switch: !play,
            square_editor: !play && cursor.is_some(),
        }
    }
}

fn direction_title(direction: Direction) -> &'static str {
    match direction {
        Direction::Row => "Across",
        Direction::Column => "Down",
    }
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct CrosswordProps {
    /// Solve a loaded puzzle instead of editing one
    #[arg(long)]
    pub play: bool,
}

pub(crate) struct CrosswordView {
    session: CrosswordSession<LocalSnapshotStore<game::CrosswordGrid>>,
    mirror: bool,
    snapshot_text: String,
    notice: Option<String>,
}

impl CrosswordView {
    fn view_square(&self, ctx: &Context<Self>, coords: game::Coord2) -> Html {
        let grid = self.session.grid();
        let Some(square) = grid.square(coords) else {
            return html! {};
        };

        let class = classes!(
            "square",
            square.is_black().then_some("black"),
            match grid.highlight(coords) {
                Highlight::None => None,
                Highlight::Cursor => Some("cursor"),
                Highlight::Word => Some("word"),
            }
        );
        let onclick = ctx.link().callback(move |_: MouseEvent| Msg::Select(coords));
        let ondblclick = (!ctx.props().play)
            .then(|| ctx.link().callback(move |_: MouseEvent| Msg::ToggleBlack(coords)));

        html! {
            <td {class} {onclick} {ondblclick}>
                if let Some(number) = square.cell_number {
                    <sup>{number.to_string()}</sup>
                }
                {square.value.map(String::from).unwrap_or_default()}
            </td>
        }
    }

    fn view_clues(&self, ctx: &Context<Self>, direction: Direction) -> Html {
        let grid = self.session.grid();
        let play = ctx.props().play;

        html! {
            <section class="clues">
                <h3>{direction_title(direction)}</h3>
                <ol>
                    {
                        for grid.clues(direction).into_iter().map(|entry| {
                            let cell_number = entry.cell_number;
                            let connected = grid
                                .connected_words()
                                .iter()
                                .any(|word| word.cell_number == cell_number && word.direction == direction);
                            let onchange = ctx.link().callback(move |e: Event| {
                                let checked = e
                                    .target_dyn_into::<web_sys::HtmlInputElement>()
                                    .is_some_and(|input| input.checked());
                                Msg::Connect(cell_number, direction, checked)
                            });
                            html! {
                                <li>
                                    if !play {
                                        <input type="checkbox" checked={connected} {onchange}/>
                                    }
                                    {format!("{}. {}", cell_number, entry.clue)}
                                </li>
                            }
                        })
                    }
                </ol>
            </section>
        }
    }

    fn view_mirror_switch(&self, ctx: &Context<Self>) -> Html {
        let onchange = ctx.link().callback(|e: Event| {
            Msg::SetMirror(
                e.target_dyn_into::<web_sys::HtmlInputElement>()
                    .is_some_and(|input| input.checked()),
            )
        });

        html! {
            <label class="mirror">
                <input type="checkbox" checked={self.mirror} {onchange}/>
                {"Mirror black cells"}
            </label>
        }
    }

    fn view_editor(&self, ctx: &Context<Self>) -> Html {
        let grid = self.session.grid();
        let Some(cursor) = grid.cursor() else {
            return html! {};
        };
        let square = grid.square(cursor.coords).cloned().unwrap_or_default();

        let cb_number = ctx.link().callback(|e: InputEvent| Msg::NumberInput(input_value(&e)));
        let cb_clue = ctx.link().callback(|e: InputEvent| Msg::ClueInput(input_value(&e)));

        html! {
            <section class="editor">
                <label>
                    {"Number "}
                    <input
                        type="number"
                        min="1"
                        value={square.cell_number.map(|n| n.to_string()).unwrap_or_default()}
                        oninput={cb_number}
                    />
                </label>
                <label>
                    {format!("{} clue ", direction_title(cursor.direction))}
                    <textarea value={square.clue.get(cursor.direction).to_string()} oninput={cb_clue}/>
                </label>
            </section>
        }
    }
}

impl Component for CrosswordView {
    type Message = Msg;
    type Properties = CrosswordProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            session: CrosswordSession::new(LocalSnapshotStore::new(store_key(ctx.props().play))),
            mirror: true,
            snapshot_text: String::new(),
            notice: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        let play = ctx.props().play;
        match msg {
            Select(coords) => self.session.edit(|grid| grid.select(coords).is_some()),
            ToggleBlack(coords) if !play => {
                let mirror = self.mirror;
                self.session.edit(|grid| grid.toggle_black(coords, mirror))
            }
            ToggleBlack(_) => false,
            Letter(letter) => self.session.edit(|grid| grid.enter_letter(letter)),
            Backspace => self.session.edit(|grid| grid.backspace()),
            SetMirror(mirror) => {
                self.mirror = mirror;
                true
            }
            NumberInput(text) if !play => match parse_cell_number(&text) {
                Some(number) => self.session.edit(|grid| grid.set_cell_number(number)),
                None => false,
            },
            ClueInput(text) if !play => self.session.edit(|grid| grid.set_clue(&text)),
            Connect(cell_number, direction, true) if !play => self
                .session
                .edit(|grid| grid.connect_word(cell_number, direction)),
            Connect(cell_number, direction, false) if !play => self.session.edit(|grid| {
                grid.disconnect_word(cell_number, direction);
                true
            }),
            NumberInput(_) | ClueInput(_) | Connect(..) => false,
            Export => {
                match self.session.export() {
                    Ok(data) => self.snapshot_text = data,
                    Err(err) => self.notice = Some(format!("Could not export crossword: {err}")),
                }
                true
            }
            SnapshotInput(text) => {
                self.snapshot_text = text;
                true
            }
            Import => {
                self.notice = match self.session.import(&self.snapshot_text) {
                    Ok(()) => None,
                    Err(err) => {
                        log::warn!("Rejected crossword snapshot: {}", err);
                        Some(format!("Could not load crossword: {err}"))
                    }
                };
                true
            }
            Clear => {
                self.session.clear();
                self.snapshot_text.clear();
                self.notice = None;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let size = self.session.grid().size();
        let play = ctx.props().play;
        let panels = BuilderPanels::new(play, self.session.grid().cursor());

        let onkeydown = ctx.link().batch_callback(|e: KeyboardEvent| {
            let msg = key_msg(&e.key());
            if msg.is_some() {
                e.prevent_default();
            }
            msg
        });
        let cb_snapshot = ctx.link().callback(|e: InputEvent| Msg::SnapshotInput(input_value(&e)));
        let cb_export = ctx.link().callback(|_: MouseEvent| Msg::Export);
        let cb_import = ctx.link().callback(|_: MouseEvent| Msg::Import);
        let cb_clear = ctx.link().callback(|_: MouseEvent| Msg::Clear);

        html! {
            <div class={classes!("gridplay", "crossword", play.then_some("play"))}>
                if panels.mirror_switch {
                    { self.view_mirror_switch(ctx) }
                }
                if panels.square_editor {
                    { self.view_editor(ctx) }
                }
                <table tabindex="0" {onkeydown}>
                    {
                        for (0..size).map(|row| html! {
                            <tr>
                                { for (0..size).map(|col| self.view_square(ctx, (row, col))) }
                            </tr>
                        })
                    }
                </table>
                { self.view_clues(ctx, Direction::Row) }
                { self.view_clues(ctx, Direction::Column) }
                if let Some(notice) = &self.notice {
                    <p class="notice">{notice.clone()}</p>
                }
                <section class="snapshot">
                    <textarea value={self.snapshot_text.clone()} oninput={cb_snapshot}/>
                    if !play {
                        <button onclick={cb_export}>{"Export"}</button>
                    }
                    <button onclick={cb_import}>{"Load"}</button>
                    if !play {
                        <button onclick={cb_clear}>{"Clear"}</button>
                    }
                </section>
            </div>
        }
    }
}
