//! Pseudo-legal move generation and attack detection.
//!
//! Nothing here looks at whether a move leaves the mover's own king in check; that is
//! the job of [`crate::position::Position::legal_moves`].

use shakmaty::{Bitboard, Color, File, Piece, Rank, Role, Square, attacks};

use crate::board::{Board, LastMove, MoveFlags, file_delta, offset};

/// Rank direction pawns of `color` advance in.
#[inline]
pub const fn forward(color: Color) -> i32 {
    match color {
        Color::White => 1,
        Color::Black => -1,
    }
}

const fn pawn_start_rank(color: Color) -> Rank {
    match color {
        Color::White => Rank::Second,
        Color::Black => Rank::Seventh,
    }
}

/// Rank pawns of `color` promote on.
pub const fn promotion_rank(color: Color) -> Rank {
    match color {
        Color::White => Rank::Eighth,
        Color::Black => Rank::First,
    }
}

pub const fn back_rank(color: Color) -> Rank {
    match color {
        Color::White => Rank::First,
        Color::Black => Rank::Eighth,
    }
}

/// One of the two ways to castle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastlingSide {
    KingSide,
    QueenSide,
}

impl CastlingSide {
    pub const ALL: [CastlingSide; 2] = [Self::KingSide, Self::QueenSide];

    /// The side a king move of exactly two files belongs to.
    pub fn from_king_move(from: Square, to: Square) -> Option<Self> {
        if from.rank() != to.rank() {
            return None;
        }
        match file_delta(from, to) {
            2 => Some(Self::KingSide),
            -2 => Some(Self::QueenSide),
            _ => None,
        }
    }

    pub const fn rook_file(self) -> File {
        match self {
            Self::KingSide => File::H,
            Self::QueenSide => File::A,
        }
    }

    /// File the rook lands on after castling.
    pub const fn rook_target_file(self) -> File {
        match self {
            Self::KingSide => File::F,
            Self::QueenSide => File::D,
        }
    }

    /// File the king lands on after castling.
    pub const fn king_target_file(self) -> File {
        match self {
            Self::KingSide => File::G,
            Self::QueenSide => File::C,
        }
    }

    /// Files strictly between king and rook that must be empty.
    const fn gap(self) -> &'static [File] {
        match self {
            Self::KingSide => &[File::F, File::G],
            Self::QueenSide => &[File::B, File::C, File::D],
        }
    }
}

/// Squares `piece` standing on `square` attacks.
///
/// Sliders stop at, and include, the first occupied square in each direction. Whose
/// piece stands on an attacked square does not matter.
pub fn attack_set(board: &Board, square: Square, piece: Piece) -> Bitboard {
    match piece.role {
        Role::Pawn => attacks::pawn_attacks(piece.color, square),
        Role::Knight => attacks::knight_attacks(square),
        Role::Bishop => attacks::bishop_attacks(square, board.occupied()),
        Role::Rook => attacks::rook_attacks(square, board.occupied()),
        Role::Queen => attacks::queen_attacks(square, board.occupied()),
        Role::King => attacks::king_attacks(square),
    }
}

/// Whether any piece of `defender`'s opponent attacks `square`.
pub fn is_square_attacked(board: &Board, defender: Color, square: Square) -> bool {
    let attacker = defender.other();
    board
        .pieces()
        .filter(|(_, piece)| piece.color == attacker)
        .any(|(from, piece)| attack_set(board, from, piece).contains(square))
}

/// Whether `color`'s king is attacked. A missing king is never in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.king_of(color) {
        Some(king) => is_square_attacked(board, color, king),
        None => {
            log::warn!("no {color:?} king on the board");
            false
        }
    }
}

/// Candidate destinations for the piece on `from`, never including friendly squares.
pub fn pseudo_legal(
    board: &Board,
    flags: &MoveFlags,
    last_move: Option<&LastMove>,
    from: Square,
) -> Bitboard {
    let Some(piece) = board.piece_at(from) else {
        return Bitboard::EMPTY;
    };
    let targets = match piece.role {
        Role::Pawn => pawn_targets(board, last_move, from, piece.color),
        Role::King => {
            attacks::king_attacks(from) | castling_targets(board, flags, from, piece.color)
        }
        _ => attack_set(board, from, piece),
    };
    targets & !board.by_color(piece.color)
}

fn pawn_targets(
    board: &Board,
    last_move: Option<&LastMove>,
    from: Square,
    color: Color,
) -> Bitboard {
    let dir = forward(color);
    let mut targets = Bitboard::EMPTY;

    if let Some(one) = offset(from, 0, dir)
        && board.piece_at(one).is_none()
    {
        targets.add(one);
        if from.rank() == pawn_start_rank(color)
            && let Some(two) = offset(from, 0, 2 * dir)
            && board.piece_at(two).is_none()
        {
            targets.add(two);
        }
    }

    targets |= attacks::pawn_attacks(color, from) & board.by_color(color.other());

    if let Some(target) = en_passant_target(board, last_move, from, color) {
        targets.add(target);
    }
    targets
}

/// The en passant landing square for a `color` pawn on `from`, if the last move allows it.
///
/// The last move must be an enemy pawn's double step ending beside `from` on the same rank.
pub fn en_passant_target(
    board: &Board,
    last_move: Option<&LastMove>,
    from: Square,
    color: Color,
) -> Option<Square> {
    let last = last_move?;
    if !last.is_double_step()
        || last.to.rank() != from.rank()
        || file_delta(from, last.to).abs() != 1
    {
        return None;
    }
    let passed = Piece {
        color: color.other(),
        role: Role::Pawn,
    };
    if board.piece_at(last.to) != Some(passed) {
        return None;
    }
    let target = offset(last.to, 0, forward(color))?;
    board.piece_at(target).is_none().then_some(target)
}

/// King destinations two files away that castling currently allows.
pub fn castling_targets(board: &Board, flags: &MoveFlags, from: Square, color: Color) -> Bitboard {
    let rank = back_rank(color);
    let home = Square::from_coords(File::E, rank);
    let mut targets = Bitboard::EMPTY;
    if from != home || flags.has_moved(home) || is_square_attacked(board, color, home) {
        return targets;
    }

    for side in CastlingSide::ALL {
        let rook_square = Square::from_coords(side.rook_file(), rank);
        let rook = Piece {
            color,
            role: Role::Rook,
        };
        if board.piece_at(rook_square) != Some(rook) || flags.has_moved(rook_square) {
            continue;
        }
        let gap_clear = side
            .gap()
            .iter()
            .all(|&file| board.piece_at(Square::from_coords(file, rank)).is_none());
        if !gap_clear {
            continue;
        }
        let passed = Square::from_coords(side.rook_target_file(), rank);
        let target = Square::from_coords(side.king_target_file(), rank);
        if !is_square_attacked(board, color, passed) && !is_square_attacked(board, color, target) {
            targets.add(target);
        }
    }
    targets
}
