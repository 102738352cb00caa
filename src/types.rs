use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult};

/// Width and height of the playing area.
pub const BOARD_SIZE: u8 = 8;

/// A board coordinate. `file` is the host's x axis and `rank` its y axis;
/// red starts on ranks 0..=2 and moves towards rank 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSquare", into = "RawSquare")]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub fn new(file: u8, rank: u8) -> HarnessResult<Self> {
        if file >= BOARD_SIZE || rank >= BOARD_SIZE {
            return Err(HarnessError::OutOfBounds {
                file: file.into(),
                rank: rank.into(),
            });
        }
        Ok(Self { file, rank })
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    /// All 64 squares, file-major (the order the host stores its board in).
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|file| (0..BOARD_SIZE).map(move |rank| Square { file, rank }))
    }

    /// Dark squares are the only ones that ever hold pieces.
    pub fn is_playable(self) -> bool {
        (self.file + self.rank) % 2 == 0
    }

    /// The `name` attribute of the host's image element for this square.
    pub fn element_name(self) -> String {
        format!("space{}{}", self.file, self.rank)
    }

    /// Returns the square `(df, dr)` away, if it is still on the board.
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let file = i16::from(self.file) + i16::from(df);
        let rank = i16::from(self.rank) + i16::from(dr);
        let file = u8::try_from(file).ok()?;
        let rank = u8::try_from(rank).ok()?;
        Square::new(file, rank).ok()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.file, self.rank)
    }
}

impl TryFrom<(u8, u8)> for Square {
    type Error = HarnessError;

    fn try_from((file, rank): (u8, u8)) -> HarnessResult<Self> {
        Square::new(file, rank)
    }
}

/// Wire shape used by page-object test scripts: `{ x, y }`.
#[derive(Serialize, Deserialize)]
struct RawSquare {
    x: u8,
    y: u8,
}

impl TryFrom<RawSquare> for Square {
    type Error = HarnessError;

    fn try_from(raw: RawSquare) -> HarnessResult<Self> {
        Square::new(raw.x, raw.y)
    }
}

impl From<Square> for RawSquare {
    fn from(square: Square) -> Self {
        Self {
            x: square.file,
            y: square.rank,
        }
    }
}

/// Logical content of one square, as held in the host's numeric board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PieceState {
    #[default]
    Empty,
    Red,
    Blue,
    RedKing,
    BlueKing,
}

impl PieceState {
    pub const PIECES: [PieceState; 4] = [
        PieceState::Red,
        PieceState::Blue,
        PieceState::RedKing,
        PieceState::BlueKing,
    ];

    /// The number the host stores for this state.
    pub fn code(self) -> f64 {
        match self {
            PieceState::Empty => 0.0,
            PieceState::Red => 1.0,
            PieceState::Blue => -1.0,
            PieceState::RedKing => 1.1,
            PieceState::BlueKing => -1.1,
        }
    }

    /// Exact inverse of [`PieceState::code`].
    pub fn from_code(code: f64) -> Option<Self> {
        if code == 0.0 {
            return Some(PieceState::Empty);
        }
        Self::PIECES.into_iter().find(|piece| piece.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            PieceState::Empty => "empty",
            PieceState::Red => "red",
            PieceState::Blue => "blue",
            PieceState::RedKing => "redKing",
            PieceState::BlueKing => "blueKing",
        }
    }

    pub fn is_empty(self) -> bool {
        self == PieceState::Empty
    }

    pub fn is_king(self) -> bool {
        matches!(self, PieceState::RedKing | PieceState::BlueKing)
    }

    pub fn is_red(self) -> bool {
        matches!(self, PieceState::Red | PieceState::RedKing)
    }

    pub fn is_blue(self) -> bool {
        matches!(self, PieceState::Blue | PieceState::BlueKing)
    }
}

impl fmt::Display for PieceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of a board setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPlacement", into = "RawPlacement")]
pub struct Placement {
    pub square: Square,
    pub piece: PieceState,
}

impl Placement {
    pub fn new(square: Square, piece: PieceState) -> Self {
        Self { square, piece }
    }
}

#[derive(Serialize, Deserialize)]
struct RawPlacement {
    x: u8,
    y: u8,
    piece: PieceState,
}

impl TryFrom<RawPlacement> for Placement {
    type Error = HarnessError;

    fn try_from(raw: RawPlacement) -> HarnessResult<Self> {
        Ok(Placement::new(Square::new(raw.x, raw.y)?, raw.piece))
    }
}

impl From<Placement> for RawPlacement {
    fn from(placement: Placement) -> Self {
        Self {
            x: placement.square.file,
            y: placement.square.rank,
            piece: placement.piece,
        }
    }
}

/// Snapshot of the host's turn-control globals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnFlags {
    /// The host expects a click from the player.
    pub player_turn: bool,
    /// The host is computing its reply or animating.
    pub host_busy: bool,
    pub selection_active: bool,
    /// A capture landed and the host demands another jump.
    pub continuation_pending: bool,
    pub game_over: bool,
}

impl TurnFlags {
    /// Player's turn, nothing selected, game not over.
    pub const fn player_to_move() -> Self {
        Self {
            player_turn: true,
            host_busy: false,
            selection_active: false,
            continuation_pending: false,
            game_over: false,
        }
    }

    /// Contract:
    /// - `false` while the host is busy, whatever the other flags say.
    /// - `true` once the host awaits input or the game has ended.
    pub fn is_ready(&self) -> bool {
        !self.host_busy && (self.player_turn || self.game_over)
    }
}

/// Navigation links on the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageLink {
    Restart,
    Rules,
}
