use std::fmt;

use shakmaty::{Bitboard, Color, File, Piece, Rank, Role, Square};

/// Back rank layout from the a-file to the h-file.
const BACK_RANK: [Role; 8] = [
    Role::Rook,
    Role::Knight,
    Role::Bishop,
    Role::Queen,
    Role::King,
    Role::Bishop,
    Role::Knight,
    Role::Rook,
];

/// Zero-based board coordinates, as used by screen-oriented callers.
///
/// `x` is the file index (a = 0) and `y` counts down from the eighth rank
/// (rank 8 = 0, rank 1 = 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: u8,
    pub y: u8,
}

impl Coord {
    /// Create a coordinate, or `None` if it falls off the board.
    #[inline]
    pub const fn new(x: u8, y: u8) -> Option<Self> {
        if x < 8 && y < 8 {
            Some(Self { x, y })
        } else {
            None
        }
    }

    pub fn from_square(square: Square) -> Self {
        Self {
            x: u32::from(square.file()) as u8,
            y: 7 - u32::from(square.rank()) as u8,
        }
    }

    pub fn to_square(self) -> Square {
        Square::from_coords(
            File::new(u32::from(self.x)),
            Rank::new(7 - u32::from(self.y)),
        )
    }
}

/// Convert a `('a'..='h', 1..=8)` square name into board coordinates.
pub fn square_to_xy(file: char, rank: u8) -> Option<Coord> {
    if !('a'..='h').contains(&file) || !(1..=8).contains(&rank) {
        return None;
    }
    Coord::new(file as u8 - b'a', 8 - rank)
}

/// Convert board coordinates back into a `(file, rank)` square name.
pub fn xy_to_square(coord: Coord) -> (char, u8) {
    ((b'a' + coord.x) as char, 8 - coord.y)
}

/// The square `df` files and `dr` ranks away from `square`, if still on the board.
pub fn offset(square: Square, df: i32, dr: i32) -> Option<Square> {
    let file = u32::from(square.file()) as i32 + df;
    let rank = u32::from(square.rank()) as i32 + dr;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some(Square::from_coords(
            File::new(file as u32),
            Rank::new(rank as u32),
        ))
    } else {
        None
    }
}

/// Signed file distance from `from` to `to`.
#[inline]
pub fn file_delta(from: Square, to: Square) -> i32 {
    u32::from(to.file()) as i32 - u32::from(from.file()) as i32
}

/// Signed rank distance from `from` to `to`.
#[inline]
pub fn rank_delta(from: Square, to: Square) -> i32 {
    u32::from(to.rank()) as i32 - u32::from(from.rank()) as i32
}

/// Lowercase color name, as used in outcome strings.
pub const fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

/// Two character code of a piece in position keys, e.g. `wK` or `bP`.
pub fn piece_code(piece: Piece) -> [char; 2] {
    let color = match piece.color {
        Color::White => 'w',
        Color::Black => 'b',
    };
    [color, piece.role.upper_char()]
}

/// Piece occupancy of all 64 squares.
///
/// Every square always has a cell; moves only ever change what a cell holds.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Piece>; 64],
}

impl Board {
    pub const fn empty() -> Self {
        Self { cells: [None; 64] }
    }

    /// The standard starting position.
    pub fn standard() -> Self {
        let mut board = Self::empty();
        for (file, role) in File::ALL.into_iter().zip(BACK_RANK) {
            board.set(
                Square::from_coords(file, Rank::First),
                Some(Piece {
                    color: Color::White,
                    role,
                }),
            );
            board.set(
                Square::from_coords(file, Rank::Second),
                Some(Piece {
                    color: Color::White,
                    role: Role::Pawn,
                }),
            );
            board.set(
                Square::from_coords(file, Rank::Seventh),
                Some(Piece {
                    color: Color::Black,
                    role: Role::Pawn,
                }),
            );
            board.set(
                Square::from_coords(file, Rank::Eighth),
                Some(Piece {
                    color: Color::Black,
                    role,
                }),
            );
        }
        board
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.cells[usize::from(square)]
    }

    /// Put `piece` on `square`, returning whatever was there before.
    #[inline]
    pub fn set(&mut self, square: Square, piece: Option<Piece>) -> Option<Piece> {
        std::mem::replace(&mut self.cells[usize::from(square)], piece)
    }

    /// Empty `square`, returning its previous occupant.
    #[inline]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.set(square, None)
    }

    /// All occupied squares with their pieces, a1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::ALL
            .into_iter()
            .filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    pub fn occupied(&self) -> Bitboard {
        let mut bb = Bitboard::EMPTY;
        for (square, _) in self.pieces() {
            bb.add(square);
        }
        bb
    }

    pub fn by_color(&self, color: Color) -> Bitboard {
        let mut bb = Bitboard::EMPTY;
        for (square, piece) in self.pieces() {
            if piece.color == color {
                bb.add(square);
            }
        }
        bb
    }

    /// Whether `square` holds a piece of `color`.
    #[inline]
    pub fn is_color(&self, square: Square, color: Color) -> bool {
        self.piece_at(square).is_some_and(|piece| piece.color == color)
    }

    pub fn king_of(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, piece)| piece.color == color && piece.role == Role::King)
            .map(|(square, _)| square)
    }

    /// Board part of the position key, file-major from a1 to h8.
    pub fn layout_key(&self) -> String {
        let mut key = String::with_capacity(128);
        for file in File::ALL {
            for rank in Rank::ALL {
                match self.piece_at(Square::from_coords(file, rank)) {
                    Some(piece) => key.extend(piece_code(piece)),
                    None => key.push('.'),
                }
            }
        }
        key
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for rank in Rank::ALL.iter().rev() {
            for file in File::ALL {
                let cell = self
                    .piece_at(Square::from_coords(file, *rank))
                    .map_or('.', Piece::char);
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Home squares whose occupants decide castling rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSquare {
    A1,
    E1,
    H1,
    A8,
    E8,
    H8,
}

impl CastleSquare {
    pub const ALL: [CastleSquare; 6] = [
        Self::A1,
        Self::E1,
        Self::H1,
        Self::A8,
        Self::E8,
        Self::H8,
    ];

    pub fn from_square(square: Square) -> Option<Self> {
        Self::ALL.into_iter().find(|cs| cs.square() == square)
    }

    pub const fn square(self) -> Square {
        match self {
            Self::A1 => Square::A1,
            Self::E1 => Square::E1,
            Self::H1 => Square::H1,
            Self::A8 => Square::A8,
            Self::E8 => Square::E8,
            Self::H8 => Square::H8,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// "Has the original occupant ever left this square" for the six castling homes.
///
/// Flags only ever go from `false` to `true`; re-occupying a home square does not
/// restore the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MoveFlags {
    moved: [bool; 6],
}

impl MoveFlags {
    /// Every castling home already left, i.e. no castling rights at all.
    pub const ALL_MOVED: MoveFlags = MoveFlags { moved: [true; 6] };

    /// Squares outside the six castling homes are reported as moved.
    pub fn has_moved(&self, square: Square) -> bool {
        CastleSquare::from_square(square).is_none_or(|cs| self.moved[cs.index()])
    }

    pub fn mark_moved(&mut self, square: Square) {
        if let Some(cs) = CastleSquare::from_square(square) {
            self.moved[cs.index()] = true;
        }
    }

    pub(crate) fn mark_unmoved(&mut self, square: Square) {
        if let Some(cs) = CastleSquare::from_square(square) {
            self.moved[cs.index()] = false;
        }
    }
}

/// The most recent real move, kept for en passant detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LastMove {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
}

impl LastMove {
    /// Whether this was a pawn advancing two ranks.
    pub fn is_double_step(&self) -> bool {
        self.piece.role == Role::Pawn && rank_delta(self.from, self.to).abs() == 2
    }

    /// The square skipped by a double step.
    pub fn en_passant_square(&self) -> Option<Square> {
        if !self.is_double_step() {
            return None;
        }
        offset(self.from, 0, rank_delta(self.from, self.to) / 2)
    }
}
