use std::collections::HashMap;

use shakmaty::{Bitboard, Color, File, Piece, Role, Square, fen::Fen};
use thiserror::Error;

use crate::board::{Board, LastMove, MoveFlags, color_name, offset};
use crate::movegen::{
    CastlingSide, back_rank, en_passant_target, forward, is_in_check, promotion_rank,
    pseudo_legal,
};

/// Errors from setting up a position from FEN.
#[derive(Debug, Error)]
pub enum FenError {
    #[error("invalid FEN: {0}")]
    Parse(#[from] shakmaty::fen::ParseFenError),
    #[error("no {} king on the board", color_name(*.0))]
    MissingKing(Color),
}

/// What the executor did to a board for one ordinary move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    /// The piece that moved, before any promotion.
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub en_passant: bool,
    pub castled: Option<CastlingSide>,
    pub promoted: Option<Role>,
}

/// Whether moving the piece on `from` to `to` ends on its promotion rank.
pub fn is_promotion(board: &Board, from: Square, to: Square) -> bool {
    board
        .piece_at(from)
        .is_some_and(|piece| piece.role == Role::Pawn && to.rank() == promotion_rank(piece.color))
}

/// Apply an ordinary move to `board` and `flags` without any legality checks.
///
/// Handles en passant removal, castling rook relocation and promotion to
/// `promotion`; a pawn or king choice becomes a queen. Returns `None` only if
/// `from` is empty, in which case nothing was touched.
pub fn execute(
    board: &mut Board,
    flags: &mut MoveFlags,
    last_move: Option<&LastMove>,
    from: Square,
    to: Square,
    promotion: Role,
) -> Option<Applied> {
    let piece = board.piece_at(from)?;
    let mut applied = Applied {
        piece,
        captured: None,
        en_passant: false,
        castled: None,
        promoted: None,
    };

    if piece.role == Role::Pawn
        && from.file() != to.file()
        && board.piece_at(to).is_none()
        && en_passant_target(board, last_move, from, piece.color) == Some(to)
    {
        let passed = Square::from_coords(to.file(), from.rank());
        applied.captured = board.take(passed);
        applied.en_passant = true;
    }

    if piece.role == Role::King
        && from.rank() == back_rank(piece.color)
        && let Some(side) = CastlingSide::from_king_move(from, to)
    {
        let rank = from.rank();
        let rook_from = Square::from_coords(side.rook_file(), rank);
        let rook = Piece {
            color: piece.color,
            role: Role::Rook,
        };
        if board.piece_at(rook_from) == Some(rook) {
            board.take(rook_from);
            board.set(Square::from_coords(side.rook_target_file(), rank), Some(rook));
            flags.mark_moved(rook_from);
            applied.castled = Some(side);
        }
    }

    let mut landed = piece;
    if piece.role == Role::Pawn && to.rank() == promotion_rank(piece.color) {
        let role = match promotion {
            Role::Pawn | Role::King => Role::Queen,
            role => role,
        };
        landed.role = role;
        applied.promoted = Some(role);
    }

    board.take(from);
    if let Some(captured) = board.set(to, Some(landed)) {
        applied.captured = Some(captured);
        // the captured occupant of a home square has left it for good
        flags.mark_moved(to);
    }
    flags.mark_moved(from);
    Some(applied)
}

/// Full state of a game in progress, apart from variant additions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    flags: MoveFlags,
    last_move: Option<LastMove>,
    turn: Color,
    repetitions: HashMap<String, u32>,
    captured: Vec<Piece>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// The standard starting position, counted once in the repetition table.
    pub fn new() -> Self {
        Self::seeded(Board::standard(), MoveFlags::default(), None, Color::White)
    }

    fn seeded(board: Board, flags: MoveFlags, last_move: Option<LastMove>, turn: Color) -> Self {
        let mut position = Self {
            board,
            flags,
            last_move,
            turn,
            repetitions: HashMap::new(),
            captured: Vec::new(),
        };
        position.record_key();
        position
    }

    /// Set up a position from FEN.
    ///
    /// Each castling right keeps the named rook home and its king home unmoved. An
    /// en passant square is turned into the double step that would have produced it.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let setup = fen.parse::<Fen>()?.into_setup();

        let mut board = Board::empty();
        for square in Square::ALL {
            board.set(square, setup.board.piece_at(square));
        }
        for color in Color::ALL {
            if board.king_of(color).is_none() {
                return Err(FenError::MissingKing(color));
            }
        }

        let mut flags = MoveFlags::ALL_MOVED;
        for rook in setup.castling_rights {
            flags.mark_unmoved(rook);
            flags.mark_unmoved(Square::from_coords(File::E, rook.rank()));
        }

        let mover = setup.turn.other();
        let last_move = setup.ep_square.and_then(|ep| {
            let from = offset(ep, 0, -forward(mover))?;
            let to = offset(ep, 0, forward(mover))?;
            let pawn = Piece {
                color: mover,
                role: Role::Pawn,
            };
            (board.piece_at(to) == Some(pawn)).then_some(LastMove {
                from,
                to,
                piece: pawn,
            })
        });

        Ok(Self::seeded(board, flags, last_move, setup.turn))
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn flags(&self) -> &MoveFlags {
        &self.flags
    }

    #[inline]
    pub fn last_move(&self) -> Option<&LastMove> {
        self.last_move.as_ref()
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Pieces removed by real moves, oldest first.
    #[inline]
    pub fn captured(&self) -> &[Piece] {
        &self.captured
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.piece_at(square)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        is_in_check(&self.board, color)
    }

    /// Canonical key: board layout, side to move, castling rights and en passant square.
    pub fn key(&self) -> String {
        let turn = match self.turn {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let ep = self
            .last_move
            .and_then(|last| last.en_passant_square())
            .map_or_else(|| "-".to_owned(), |square| square.to_string());
        format!(
            "{}_{}_{}_{}",
            self.board.layout_key(),
            turn,
            self.castling_rights(),
            ep
        )
    }

    /// Castling rights as a sorted subset of `KQkq`, or `-`.
    pub fn castling_rights(&self) -> String {
        let mut rights: Vec<char> = [
            ('K', Square::H1, Square::E1, Color::White),
            ('Q', Square::A1, Square::E1, Color::White),
            ('k', Square::H8, Square::E8, Color::Black),
            ('q', Square::A8, Square::E8, Color::Black),
        ]
        .into_iter()
        .filter(|&(_, rook, king, color)| {
            self.board.piece_at(rook)
                == Some(Piece {
                    color,
                    role: Role::Rook,
                })
                && !self.flags.has_moved(rook)
                && !self.flags.has_moved(king)
        })
        .map(|(right, ..)| right)
        .collect();
        if rights.is_empty() {
            return "-".to_owned();
        }
        rights.sort_unstable();
        rights.into_iter().collect()
    }

    /// How often the current position has occurred.
    pub fn repetitions(&self) -> u32 {
        self.repetitions_of(&self.key())
    }

    /// How often the position with `key` has occurred.
    pub fn repetitions_of(&self, key: &str) -> u32 {
        self.repetitions.get(key).copied().unwrap_or(0)
    }

    fn record_key(&mut self) {
        *self.repetitions.entry(self.key()).or_insert(0) += 1;
    }

    /// Legal destinations for the piece on `from`, whoever's turn it is.
    pub fn legal_moves(&self, from: Square) -> Bitboard {
        let Some(piece) = self.board.piece_at(from) else {
            return Bitboard::EMPTY;
        };
        pseudo_legal(&self.board, &self.flags, self.last_move(), from)
            .into_iter()
            .filter(|&to| {
                let mut board = self.board;
                let mut flags = self.flags;
                execute(
                    &mut board,
                    &mut flags,
                    self.last_move(),
                    from,
                    to,
                    Role::Queen,
                )
                .is_some()
                    && !is_in_check(&board, piece.color)
            })
            .collect()
    }

    /// Whether `color` has any legal move at all. Stops at the first one found.
    pub fn has_any_legal_move(&self, color: Color) -> bool {
        self.board
            .pieces()
            .filter(|(_, piece)| piece.color == color)
            .any(|(from, _)| !self.legal_moves(from).is_empty())
    }

    /// Every legal `(from, to)` pair for `color`.
    pub fn all_legal_moves(&self, color: Color) -> Vec<(Square, Square)> {
        self.board
            .pieces()
            .filter(|(_, piece)| piece.color == color)
            .flat_map(|(from, _)| self.legal_moves(from).into_iter().map(move |to| (from, to)))
            .collect()
    }

    /// Whether nothing but the two kings is left on the board.
    pub fn only_kings_left(&self) -> bool {
        self.board.pieces().all(|(_, piece)| piece.role == Role::King)
    }

    /// Play an ordinary move for real, with no legality checks.
    ///
    /// Returns `None` without touching anything if `from` is empty.
    pub fn play(&mut self, from: Square, to: Square, promotion: Role) -> Option<Applied> {
        let mut board = self.board;
        let mut flags = self.flags;
        let applied = execute(
            &mut board,
            &mut flags,
            self.last_move(),
            from,
            to,
            promotion,
        )?;
        let last = LastMove {
            from,
            to,
            piece: applied.piece,
        };
        self.commit(board, flags, last, applied.captured.as_slice());
        Some(applied)
    }

    /// Replace the board with the result of a real half-move and do the bookkeeping.
    pub(crate) fn commit(
        &mut self,
        board: Board,
        flags: MoveFlags,
        last_move: LastMove,
        captured: &[Piece],
    ) {
        self.board = board;
        self.flags = flags;
        self.captured.extend_from_slice(captured);
        self.last_move = Some(last_move);
        self.turn = self.turn.other();
        self.record_key();
    }
}
