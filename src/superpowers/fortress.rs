use shakmaty::{Bitboard, Color, Square, attacks};

/// A temporary 3x3 area the owner's opponent may not move into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FortressZone {
    owner: Color,
    center: Square,
    squares: Bitboard,
    ttl: u8,
}

impl FortressZone {
    /// A zone on `center` and every square around it, clipped to the board.
    pub fn around(owner: Color, center: Square, ttl: u8) -> Self {
        Self {
            owner,
            center,
            squares: attacks::king_attacks(center) | Bitboard::from_square(center),
            ttl,
        }
    }

    #[inline]
    pub fn owner(&self) -> Color {
        self.owner
    }

    #[inline]
    pub fn center(&self) -> Square {
        self.center
    }

    #[inline]
    pub fn squares(&self) -> Bitboard {
        self.squares
    }

    /// Half-moves left before the zone comes down.
    #[inline]
    pub fn ttl(&self) -> u8 {
        self.ttl
    }

    /// Whether a piece of `mover` is kept out of `square`.
    #[inline]
    pub fn blocks(&self, mover: Color, square: Square) -> bool {
        self.owner != mover && self.squares.contains(square)
    }

    /// Age the zone by one half-move. Returns whether it is still standing.
    pub fn tick(&mut self) -> bool {
        self.ttl = self.ttl.saturating_sub(1);
        self.ttl > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Square::E4, 9; "open board")]
    #[test_case(Square::A8, 4; "corner")]
    #[test_case(Square::H4, 6; "edge")]
    fn test_zone_is_clipped_to_board(center: Square, size: usize) {
        let zone = FortressZone::around(Color::Black, center, 2);
        assert_eq!(zone.squares().count(), size);
        assert!(zone.squares().contains(center));
    }

    #[test]
    fn test_only_opponent_is_blocked() {
        let zone = FortressZone::around(Color::Black, Square::D7, 2);
        assert!(zone.blocks(Color::White, Square::E6));
        assert!(!zone.blocks(Color::Black, Square::E6));
        assert!(!zone.blocks(Color::White, Square::D5));
    }

    #[test]
    fn test_tick_counts_down() {
        let mut zone = FortressZone::around(Color::White, Square::A1, 2);
        assert!(zone.tick());
        assert_eq!(zone.ttl(), 1);
        assert!(!zone.tick());
        assert!(!zone.tick(), "stays down");
    }
}
