use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use crate::board::{LogicalBoard, PADDED_SIZE, image_for};
use crate::config::DEFAULT_PROMPT;
use crate::error::{HarnessError, HarnessResult};
use crate::host::{BoardInjection, HostPage};
use crate::types::{PageLink, PieceState, Square, TurnFlags};

pub(crate) const IMAGE_BASE: &str = "https://www.gamesforthebrain.com/game/checkers/";
pub(crate) const CONTINUE_MESSAGE: &str =
    "Complete the double jump or click on your piece to stay still.";
pub(crate) const WRONG_SQUARE_MESSAGE: &str =
    "Click on your orange piece, then click where you want to move it.";
pub(crate) const WIN_MESSAGE: &str = "You win. Game over.";
pub(crate) const RULES_HREF: &str = "https://www.gamesforthebrain.com/game/checkers/rules/";

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn sq(file: u8, rank: u8) -> Square {
    Square::new(file, rank).unwrap()
}

/// One loaded document: everything a reload throws away.
#[derive(Default)]
struct Document {
    loaded: bool,
    board: LogicalBoard,
    images: HashMap<Square, String>,
    message: Option<String>,
    flags: TurnFlags,
    busy_polls: u32,
    selected: Option<Square>,
    markers: HashSet<String>,
}

impl Document {
    fn loaded() -> Self {
        let mut doc = Self {
            loaded: true,
            board: LogicalBoard::initial(),
            message: Some(DEFAULT_PROMPT.to_string()),
            flags: TurnFlags::player_to_move(),
            ..Self::default()
        };
        doc.render();
        doc
    }

    fn render(&mut self) {
        for square in Square::all() {
            let piece = self.board.get(square);
            let name = if self.selected == Some(square) {
                match piece {
                    PieceState::RedKing => "you2k.gif",
                    _ => "you2.gif",
                }
            } else {
                image_for(piece, square)
            };
            self.images.insert(square, format!("{IMAGE_BASE}{name}"));
        }
    }

    fn say(&mut self, text: &str) {
        self.message = Some(text.to_string());
    }

    fn think(&mut self, polls: u32) {
        self.flags.host_busy = true;
        self.busy_polls = polls;
    }

    fn end_turn(&mut self, polls: u32) {
        self.selected = None;
        self.flags.player_turn = false;
        self.flags.selection_active = false;
        self.flags.continuation_pending = false;
        self.think(polls);
    }

    fn win(&mut self) {
        self.selected = None;
        self.flags = TurnFlags {
            game_over: true,
            ..TurnFlags::default()
        };
        self.say(WIN_MESSAGE);
    }

    fn handle_click(&mut self, square: Square, polls: u32) {
        let flags = self.flags;
        if !flags.is_ready() || !flags.player_turn {
            return;
        }
        let piece = self.board.get(square);

        if piece.is_red() {
            if flags.continuation_pending && self.selected == Some(square) {
                self.end_turn(polls);
            } else if self.selected == Some(square) {
                self.selected = None;
                self.flags.selection_active = false;
            } else {
                self.selected = Some(square);
                self.flags.selection_active = true;
            }
            return;
        }

        let Some(from) = self.selected else {
            self.say(WRONG_SQUARE_MESSAGE);
            return;
        };
        if !piece.is_empty() {
            return;
        }
        self.try_move(from, square, flags.continuation_pending, polls);
    }

    fn try_move(&mut self, from: Square, to: Square, continuing: bool, polls: u32) {
        let mover = self.board.get(from);
        let df = i16::from(to.file()) - i16::from(from.file());
        let dr = i16::from(to.rank()) - i16::from(from.rank());
        let forward_ok = dr > 0 || mover.is_king();

        if df.abs() == 1 && dr.abs() == 1 && forward_ok && !continuing {
            self.relocate(from, to);
            self.end_turn(polls);
            return;
        }
        if df.abs() != 2 || dr.abs() != 2 || !forward_ok {
            return;
        }
        let Some(middle) = from.offset((df / 2) as i8, (dr / 2) as i8) else {
            return;
        };
        if !self.board.get(middle).is_blue() {
            return;
        }

        self.board.set(middle, PieceState::Empty);
        let promoted = self.relocate(from, to);
        if !self.board.pieces().any(|(_, piece)| piece.is_blue()) {
            self.win();
        } else if !promoted && self.can_capture_from(to) {
            self.selected = Some(to);
            self.flags.continuation_pending = true;
            self.say(CONTINUE_MESSAGE);
            self.think(polls);
        } else {
            self.end_turn(polls);
        }
    }

    /// Returns whether the piece was promoted on arrival.
    fn relocate(&mut self, from: Square, to: Square) -> bool {
        let mut piece = self.board.get(from);
        let promoted = piece == PieceState::Red && to.rank() == 7;
        if promoted {
            piece = PieceState::RedKing;
        }
        self.board.set(from, PieceState::Empty);
        self.board.set(to, piece);
        promoted
    }

    fn can_capture_from(&self, square: Square) -> bool {
        let king = self.board.get(square).is_king();
        [(1, 1), (-1, 1), (1, -1), (-1, -1)]
            .into_iter()
            .filter(|&(_, dr)| dr > 0 || king)
            .any(|(df, dr)| {
                let over = square.offset(df, dr);
                let land = square.offset(2 * df, 2 * dr);
                matches!((over, land), (Some(over), Some(land))
                    if self.board.get(over).is_blue() && self.board.get(land).is_empty())
            })
    }

    /// One poll of the busy flag; the reply lands once the countdown is spent.
    fn poll_flags(&mut self) -> TurnFlags {
        if self.flags.host_busy {
            if self.busy_polls == 0 {
                let continuing = self.flags.continuation_pending;
                self.flags.host_busy = false;
                self.flags.player_turn = true;
                if !continuing {
                    self.say("Make a move.");
                }
            } else {
                self.busy_polls -= 1;
            }
        }
        self.flags
    }
}

/// In-memory host page.
///
/// Draws squares the way the real page does and plays a scripted subset of
/// its click handling. The computer never moves; after a number of flag polls
/// it just hands the turn back. Following the restart link replaces the
/// document only after a number of further reads.
pub(crate) struct SimHost {
    doc: RefCell<Document>,
    think_polls: u32,
    stuck: bool,
    reload_delay: u32,
    pending_reload: Cell<Option<u32>>,
    pub clicks: Vec<Square>,
    pub navigations: Vec<String>,
    pub injections: usize,
}

impl SimHost {
    /// A host that has finished loading the default position.
    pub fn new() -> Self {
        let host = Self::unloaded();
        host.doc.replace(Document::loaded());
        host
    }

    /// A page on which the host script has not run yet.
    pub fn unloaded() -> Self {
        Self {
            doc: RefCell::new(Document::default()),
            think_polls: 3,
            stuck: false,
            reload_delay: 3,
            pending_reload: Cell::new(None),
            clicks: Vec::new(),
            navigations: Vec::new(),
            injections: 0,
        }
    }

    /// Flag polls the host stays busy for after handing off the turn.
    pub fn with_think_polls(mut self, polls: u32) -> Self {
        self.think_polls = polls;
        self
    }

    /// Reads the old document survives after the restart link is followed.
    pub fn with_reload_delay(mut self, reads: u32) -> Self {
        self.reload_delay = reads;
        self
    }

    /// The readiness flag never settles.
    pub fn stuck(mut self) -> Self {
        self.stuck = true;
        self
    }

    /// Puts a piece on a sentinel cell, as a faulty earlier write might.
    pub fn with_dirty_sentinel(self) -> Self {
        {
            let mut doc = self.doc.borrow_mut();
            let mut codes = doc.board.to_codes();
            codes[PADDED_SIZE - 1][3] = PieceState::Blue.code();
            codes[0][0] = PieceState::Red.code();
            doc.board = LogicalBoard::from_codes(&codes).unwrap();
        }
        self
    }

    pub fn set_image(&mut self, square: Square, src: &str) {
        self.doc.get_mut().images.insert(square, src.to_string());
    }

    pub fn remove_image(&mut self, square: Square) {
        self.doc.get_mut().images.remove(&square);
    }

    pub fn remove_message(&mut self) {
        self.doc.get_mut().message = None;
    }

    pub fn flags(&self) -> TurnFlags {
        self.doc.borrow().flags
    }

    /// Counts one read against a pending reload and swaps the document in
    /// when it is due.
    fn tick(&self) {
        match self.pending_reload.get() {
            Some(0) => {
                self.pending_reload.set(None);
                self.doc.replace(Document::loaded());
            }
            Some(reads) => self.pending_reload.set(Some(reads - 1)),
            None => {}
        }
    }
}

impl HostPage for SimHost {
    fn navigate(&mut self, url: &str) -> HarnessResult<()> {
        self.navigations.push(url.to_string());
        self.pending_reload.set(None);
        self.doc.replace(Document::loaded());
        Ok(())
    }

    fn read_board(&self) -> HarnessResult<Option<Vec<Vec<f64>>>> {
        self.tick();
        let doc = self.doc.borrow();
        Ok(doc.loaded.then(|| doc.board.to_codes()))
    }

    fn square_image(&self, square: Square) -> HarnessResult<Option<String>> {
        Ok(self.doc.borrow().images.get(&square).cloned())
    }

    fn message_text(&self) -> HarnessResult<Option<String>> {
        Ok(self.doc.borrow().message.clone())
    }

    fn read_flags(&self) -> HarnessResult<Option<TurnFlags>> {
        self.tick();
        let mut doc = self.doc.borrow_mut();
        if !doc.loaded {
            return Ok(None);
        }
        if self.stuck {
            return Ok(Some(TurnFlags {
                host_busy: true,
                ..doc.flags
            }));
        }
        Ok(Some(doc.poll_flags()))
    }

    fn click_square(&mut self, square: Square) -> HarnessResult<()> {
        self.clicks.push(square);
        let doc = self.doc.get_mut();
        doc.handle_click(square, self.think_polls);
        doc.render();
        Ok(())
    }

    fn apply(&mut self, injection: &BoardInjection) -> HarnessResult<()> {
        let doc = self.doc.get_mut();
        if !doc.loaded {
            return Err(HarnessError::unavailable("board"));
        }
        self.injections += 1;
        doc.board = injection.board;
        doc.selected = None;
        for (square, image) in injection.images() {
            doc.images.insert(square, format!("{IMAGE_BASE}{image}"));
        }
        doc.flags = injection.flags;
        doc.busy_polls = 0;
        doc.say(&injection.message);
        Ok(())
    }

    fn write_flags(&mut self, flags: TurnFlags) -> HarnessResult<()> {
        let doc = self.doc.get_mut();
        if !doc.loaded {
            return Err(HarnessError::unavailable("turn flags"));
        }
        doc.flags = flags;
        doc.busy_polls = 0;
        Ok(())
    }

    fn follow_link(&mut self, link: PageLink) -> HarnessResult<()> {
        match link {
            PageLink::Restart => self.pending_reload.set(Some(self.reload_delay)),
            PageLink::Rules => *self.doc.get_mut() = Document::default(),
        }
        Ok(())
    }

    fn link_href(&self, link: PageLink) -> HarnessResult<Option<String>> {
        Ok(match link {
            PageLink::Restart => Some("./".to_string()),
            PageLink::Rules => Some(RULES_HREF.to_string()),
        })
    }

    fn mark_page(&mut self, marker: &str) -> HarnessResult<()> {
        self.doc.get_mut().markers.insert(marker.to_string());
        Ok(())
    }

    fn page_marked(&self, marker: &str) -> HarnessResult<bool> {
        self.tick();
        Ok(self.doc.borrow().markers.contains(marker))
    }
}
