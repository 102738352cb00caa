use std::fmt;
use std::ops::Index;

use serde::{Serialize, Serializer};

use crate::error::{HarnessError, HarnessResult};
use crate::types::{BOARD_SIZE, PieceState, Placement, Square};

const SIZE: usize = BOARD_SIZE as usize;
/// Sentinel rows/columns on each side of the playing area.
const PADDING: usize = 2;
pub const PADDED_SIZE: usize = SIZE + 2 * PADDING;
pub const FIRST_PADDED: i32 = -(PADDING as i32);
pub const LAST_PADDED: i32 = (SIZE + PADDING) as i32 - 1;

/// Square images, most specific first. A selected-piece file name may contain
/// its base name in some host encodings, so the first match wins.
const IMAGE_PATTERNS: [(&str, SquareLabel); 10] = [
    ("you2k.gif", SquareLabel::Piece { piece: PieceState::RedKing, selected: true }),
    ("me2k.gif", SquareLabel::Piece { piece: PieceState::BlueKing, selected: true }),
    ("you2.gif", SquareLabel::Piece { piece: PieceState::Red, selected: true }),
    ("me2.gif", SquareLabel::Piece { piece: PieceState::Blue, selected: true }),
    ("you1k.gif", SquareLabel::Piece { piece: PieceState::RedKing, selected: false }),
    ("me1k.gif", SquareLabel::Piece { piece: PieceState::BlueKing, selected: false }),
    ("you1.gif", SquareLabel::Piece { piece: PieceState::Red, selected: false }),
    ("me1.gif", SquareLabel::Piece { piece: PieceState::Blue, selected: false }),
    ("gray.gif", SquareLabel::Empty),
    ("black.gif", SquareLabel::NonPlayable),
];

/// The image the host itself draws for `piece` on `square`.
pub fn image_for(piece: PieceState, square: Square) -> &'static str {
    match piece {
        PieceState::Red => "you1.gif",
        PieceState::Blue => "me1.gif",
        PieceState::RedKing => "you1k.gif",
        PieceState::BlueKing => "me1k.gif",
        PieceState::Empty if square.is_playable() => "gray.gif",
        PieceState::Empty => "black.gif",
    }
}

/// The host's numeric board, sentinel border included.
///
/// Cells are addressed `[file][rank]` like the host; padded coordinates run
/// from -2 to 9 on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalBoard {
    cells: [[PieceState; PADDED_SIZE]; PADDED_SIZE],
}

impl LogicalBoard {
    pub fn empty() -> Self {
        Self {
            cells: [[PieceState::Empty; PADDED_SIZE]; PADDED_SIZE],
        }
    }

    /// Standard starting arrangement: red on the playable squares of ranks
    /// 0..=2, blue on ranks 5..=7.
    pub fn initial() -> Self {
        let mut board = Self::empty();
        for square in Square::all().filter(|sq| sq.is_playable()) {
            match square.rank() {
                0..=2 => board.set(square, PieceState::Red),
                5..=7 => board.set(square, PieceState::Blue),
                _ => {}
            }
        }
        board
    }

    /// Later placements overwrite earlier ones on the same square.
    pub fn from_placements(placements: &[Placement]) -> Self {
        let mut board = Self::empty();
        for placement in placements {
            board.set(placement.square, placement.piece);
        }
        board
    }

    /// Parses padded host codes (`codes[0]` is file -2). Cells the host never
    /// allocated read as empty, which is how the host itself treats them.
    pub fn from_codes(codes: &[Vec<f64>]) -> HarnessResult<Self> {
        let mut board = Self::empty();
        for (file_idx, column) in codes.iter().take(PADDED_SIZE).enumerate() {
            for (rank_idx, &code) in column.iter().take(PADDED_SIZE).enumerate() {
                board.cells[file_idx][rank_idx] =
                    PieceState::from_code(code).ok_or_else(|| {
                        HarnessError::UnrecognizedPieceCode {
                            code,
                            file: file_idx as i32 + FIRST_PADDED,
                            rank: rank_idx as i32 + FIRST_PADDED,
                        }
                    })?;
            }
        }
        Ok(board)
    }

    /// Padded `PADDED_SIZE x PADDED_SIZE` host codes.
    pub fn to_codes(&self) -> Vec<Vec<f64>> {
        self.cells
            .iter()
            .map(|column| column.iter().map(|piece| piece.code()).collect())
            .collect()
    }

    pub fn get(&self, square: Square) -> PieceState {
        let (file, rank) = padded_index(square);
        self.cells[file][rank]
    }

    pub fn set(&mut self, square: Square, piece: PieceState) {
        let (file, rank) = padded_index(square);
        self.cells[file][rank] = piece;
    }

    /// Lookup by padded coordinate; `None` outside -2..=9.
    pub fn get_padded(&self, file: i32, rank: i32) -> Option<PieceState> {
        let range = FIRST_PADDED..=LAST_PADDED;
        if !range.contains(&file) || !range.contains(&rank) {
            return None;
        }
        Some(self.cells[(file - FIRST_PADDED) as usize][(rank - FIRST_PADDED) as usize])
    }

    /// Whether every cell outside the 8x8 area is empty.
    pub fn sentinels_clear(&self) -> bool {
        (FIRST_PADDED..=LAST_PADDED).all(|file| {
            (FIRST_PADDED..=LAST_PADDED).all(|rank| {
                let inside = (0..SIZE as i32).contains(&file) && (0..SIZE as i32).contains(&rank);
                inside || self.get_padded(file, rank) == Some(PieceState::Empty)
            })
        })
    }

    /// The playing area as `[file][rank]`.
    pub fn rows(&self) -> [[PieceState; SIZE]; SIZE] {
        let mut rows = [[PieceState::Empty; SIZE]; SIZE];
        for square in Square::all() {
            rows[square.file() as usize][square.rank() as usize] = self.get(square);
        }
        rows
    }

    /// Occupied squares in file-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, PieceState)> + '_ {
        Square::all()
            .map(|square| (square, self.get(square)))
            .filter(|(_, piece)| !piece.is_empty())
    }

    pub fn count(&self, piece: PieceState) -> usize {
        Square::all().filter(|&sq| self.get(sq) == piece).count()
    }
}

impl Default for LogicalBoard {
    fn default() -> Self {
        Self::empty()
    }
}

impl Index<Square> for LogicalBoard {
    type Output = PieceState;

    fn index(&self, square: Square) -> &PieceState {
        let (file, rank) = padded_index(square);
        &self.cells[file][rank]
    }
}

impl Serialize for LogicalBoard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows().serialize(serializer)
    }
}

fn padded_index(square: Square) -> (usize, usize) {
    (
        square.file() as usize + PADDING,
        square.rank() as usize + PADDING,
    )
}

/// What a square looks like on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SquareLabel {
    /// `piece` is never [`PieceState::Empty`].
    Piece { piece: PieceState, selected: bool },
    /// A playable square with nothing on it.
    Empty,
    NonPlayable,
    /// The image matched no known pattern.
    Unknown,
}

impl SquareLabel {
    pub fn piece(piece: PieceState) -> Self {
        if piece.is_empty() {
            SquareLabel::Empty
        } else {
            SquareLabel::Piece {
                piece,
                selected: false,
            }
        }
    }

    pub fn selected(piece: PieceState) -> Self {
        match Self::piece(piece) {
            SquareLabel::Piece { piece, .. } => SquareLabel::Piece {
                piece,
                selected: true,
            },
            other => other,
        }
    }

    /// Maps an image identifier (bare file name or full URL) to a label.
    pub fn from_image(src: &str) -> Self {
        IMAGE_PATTERNS
            .iter()
            .find(|(pattern, _)| src.contains(pattern))
            .map(|&(_, label)| label)
            .unwrap_or(SquareLabel::Unknown)
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, SquareLabel::Piece { selected: true, .. })
    }

    pub fn without_selection(self) -> Self {
        match self {
            SquareLabel::Piece { piece, .. } => SquareLabel::piece(piece),
            other => other,
        }
    }

    /// Whether this label shows the same piece identity as the logical value.
    /// The selection bit is ignored; both empty and non-playable squares agree
    /// with an empty cell.
    pub fn agrees_with(&self, logical: PieceState) -> bool {
        match self {
            SquareLabel::Piece { piece, .. } => *piece == logical,
            SquareLabel::Empty | SquareLabel::NonPlayable => logical.is_empty(),
            SquareLabel::Unknown => false,
        }
    }
}

impl fmt::Display for SquareLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareLabel::Piece {
                piece,
                selected: false,
            } => f.write_str(piece.label()),
            SquareLabel::Piece {
                piece,
                selected: true,
            } => write!(f, "{} - selected", piece.label()),
            SquareLabel::Empty => f.write_str("empty"),
            SquareLabel::NonPlayable => f.write_str("non-playable"),
            SquareLabel::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for SquareLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The rendered board, one label per square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualBoard {
    labels: [[SquareLabel; SIZE]; SIZE],
}

impl VisualBoard {
    pub fn try_from_fn<E>(
        mut label_at: impl FnMut(Square) -> Result<SquareLabel, E>,
    ) -> Result<Self, E> {
        let mut labels = [[SquareLabel::Unknown; SIZE]; SIZE];
        for square in Square::all() {
            labels[square.file() as usize][square.rank() as usize] = label_at(square)?;
        }
        Ok(Self { labels })
    }

    pub fn get(&self, square: Square) -> SquareLabel {
        self.labels[square.file() as usize][square.rank() as usize]
    }

    /// Squares whose label shows a selection.
    pub fn selected_squares(&self) -> Vec<Square> {
        Square::all().filter(|&sq| self.get(sq).is_selected()).collect()
    }

    /// Squares whose label disagrees with `logical`.
    pub fn mismatches(&self, logical: &LogicalBoard) -> Vec<Square> {
        Square::all()
            .filter(|&sq| !self.get(sq).agrees_with(logical.get(sq)))
            .collect()
    }
}

impl Index<Square> for VisualBoard {
    type Output = SquareLabel;

    fn index(&self, square: Square) -> &SquareLabel {
        &self.labels[square.file() as usize][square.rank() as usize]
    }
}

impl Serialize for VisualBoard {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.labels.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(file: u8, rank: u8) -> Square {
        Square::new(file, rank).unwrap()
    }

    #[test]
    fn initial_position_has_twelve_pieces_per_side() {
        let board = LogicalBoard::initial();

        assert_eq!(board.count(PieceState::Red), 12);
        assert_eq!(board.count(PieceState::Blue), 12);
        assert_eq!(board[sq(0, 0)], PieceState::Red);
        assert_eq!(board[sq(1, 1)], PieceState::Red);
        assert_eq!(board[sq(0, 6)], PieceState::Blue);
        assert_eq!(board[sq(7, 7)], PieceState::Blue);
        assert_eq!(board[sq(3, 3)], PieceState::Empty);
        assert_eq!(board[sq(1, 0)], PieceState::Empty);
        assert!(board.sentinels_clear());
    }

    #[test]
    fn image_patterns_never_shadow_later_entries() {
        for (i, (earlier, _)) in IMAGE_PATTERNS.iter().enumerate() {
            for (later, _) in &IMAGE_PATTERNS[i + 1..] {
                assert!(
                    !later.contains(earlier),
                    "{earlier} would shadow {later}"
                );
            }
        }
    }

    #[test]
    fn from_image_matches_full_urls() {
        let base = "https://www.gamesforthebrain.com/game/checkers/";

        assert_eq!(
            SquareLabel::from_image(&format!("{base}you2k.gif")).to_string(),
            "redKing - selected"
        );
        assert_eq!(
            SquareLabel::from_image(&format!("{base}me2.gif")).to_string(),
            "blue - selected"
        );
        assert_eq!(SquareLabel::from_image("me1k.gif").to_string(), "blueKing");
        assert_eq!(SquareLabel::from_image("you1.gif").to_string(), "red");
        assert_eq!(SquareLabel::from_image("gray.gif"), SquareLabel::Empty);
        assert_eq!(SquareLabel::from_image("black.gif"), SquareLabel::NonPlayable);
        assert_eq!(SquareLabel::from_image("spinner.png"), SquareLabel::Unknown);
        assert_eq!(SquareLabel::from_image(""), SquareLabel::Unknown);
    }

    #[test]
    fn native_images_read_back_as_their_piece() {
        for square in [sq(2, 2), sq(3, 2)] {
            for piece in PieceState::PIECES {
                let label = SquareLabel::from_image(image_for(piece, square));
                assert_eq!(label, SquareLabel::piece(piece));
            }
        }
        assert_eq!(
            SquareLabel::from_image(image_for(PieceState::Empty, sq(2, 2))),
            SquareLabel::Empty
        );
        assert_eq!(
            SquareLabel::from_image(image_for(PieceState::Empty, sq(3, 2))),
            SquareLabel::NonPlayable
        );
    }

    #[test]
    fn from_codes_treats_missing_sentinels_as_empty() {
        let mut codes = vec![Vec::new(); PADDING];
        for file in 0..SIZE {
            let mut column = vec![0.0; PADDED_SIZE];
            if file == 2 {
                column[PADDING + 2] = 1.0;
                column[PADDING + 5] = -1.1;
            }
            codes.push(column);
        }

        let board = LogicalBoard::from_codes(&codes).unwrap();

        assert_eq!(board[sq(2, 2)], PieceState::Red);
        assert_eq!(board[sq(2, 5)], PieceState::BlueKing);
        assert!(board.sentinels_clear());
        assert_eq!(board.get_padded(-2, -2), Some(PieceState::Empty));
        assert_eq!(board.get_padded(10, 0), None);
    }

    #[test]
    fn from_codes_rejects_unknown_code_with_padded_position() {
        let mut codes = LogicalBoard::empty().to_codes();
        codes[0][1] = 3.0;

        let err = LogicalBoard::from_codes(&codes).unwrap_err();

        assert!(matches!(
            err,
            HarnessError::UnrecognizedPieceCode { file: -2, rank: -1, .. }
        ));
    }

    #[test]
    fn dirty_sentinel_is_detected() {
        let mut codes = LogicalBoard::empty().to_codes();
        codes[PADDED_SIZE - 1][4] = 1.0;

        let board = LogicalBoard::from_codes(&codes).unwrap();

        assert!(!board.sentinels_clear());
        assert_eq!(board.get_padded(9, 2), Some(PieceState::Red));
    }

    #[test]
    fn from_placements_last_write_wins() {
        let board = LogicalBoard::from_placements(&[
            Placement::new(sq(4, 4), PieceState::Red),
            Placement::new(sq(4, 4), PieceState::BlueKing),
        ]);

        assert_eq!(board[sq(4, 4)], PieceState::BlueKing);
        assert_eq!(board.pieces().count(), 1);
    }

    #[test]
    fn label_agreement_ignores_selection() {
        let selected = SquareLabel::selected(PieceState::RedKing);

        assert!(selected.is_selected());
        assert!(selected.agrees_with(PieceState::RedKing));
        assert!(!selected.agrees_with(PieceState::Red));
        assert_eq!(selected.without_selection(), SquareLabel::piece(PieceState::RedKing));
        assert!(SquareLabel::NonPlayable.agrees_with(PieceState::Empty));
        assert!(!SquareLabel::Unknown.agrees_with(PieceState::Empty));
        assert_eq!(SquareLabel::selected(PieceState::Empty), SquareLabel::Empty);
    }
}
