use crate::board::{LogicalBoard, image_for};
use crate::error::HarnessResult;
use crate::types::{PageLink, Square, TurnFlags};

/// The automation substrate: whatever can read from and act on the host page.
///
/// Reads take `&self` and never change the page. Implementations do not cache;
/// every call goes to the page.
pub trait HostPage {
    fn navigate(&mut self, url: &str) -> HarnessResult<()>;

    /// The host's board as padded numeric codes, `codes[0]` being file -2.
    /// `None` until the host has initialized it.
    fn read_board(&self) -> HarnessResult<Option<Vec<Vec<f64>>>>;

    /// Image identifier (`src`) of a square's element, `None` if the element is
    /// missing.
    fn square_image(&self, square: Square) -> HarnessResult<Option<String>>;

    fn message_text(&self) -> HarnessResult<Option<String>>;

    /// `None` until the host has defined its turn globals.
    fn read_flags(&self) -> HarnessResult<Option<TurnFlags>>;

    /// Clicks a square. A square without a handler is not an error.
    fn click_square(&mut self, square: Square) -> HarnessResult<()>;

    /// Writes a complete injection. No intermediate state may be observable
    /// by other readers of the page, so this has to be one round-trip.
    fn apply(&mut self, injection: &BoardInjection) -> HarnessResult<()>;

    fn write_flags(&mut self, flags: TurnFlags) -> HarnessResult<()>;

    fn follow_link(&mut self, link: PageLink) -> HarnessResult<()>;

    fn link_href(&self, link: PageLink) -> HarnessResult<Option<String>>;

    /// Leaves `marker` on the current document. Loading a new document drops it.
    fn mark_page(&mut self, marker: &str) -> HarnessResult<()>;

    fn page_marked(&self, marker: &str) -> HarnessResult<bool>;
}

/// Everything a board injection writes to the host in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardInjection {
    /// Includes the sentinel border, which is always empty here.
    pub board: LogicalBoard,
    pub flags: TurnFlags,
    pub message: String,
}

impl BoardInjection {
    pub fn new(board: LogicalBoard, message: impl Into<String>) -> Self {
        Self {
            board,
            flags: TurnFlags::player_to_move(),
            message: message.into(),
        }
    }

    /// Square images, drawn with the host's own rule.
    pub fn images(&self) -> impl Iterator<Item = (Square, &'static str)> + '_ {
        Square::all().map(|square| (square, image_for(self.board.get(square), square)))
    }
}
