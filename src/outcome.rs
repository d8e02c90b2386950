use std::fmt;

use shakmaty::Color;

use crate::board::color_name;

/// Terminal state of a game. Once set, no further moves are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    ThreefoldRepetition,
    /// Assigned by an external clock.
    Timeout { winner: Color },
    /// Assigned by an external material counter.
    InsufficientMaterial,
}

impl Outcome {
    /// The winning side, or `None` for a draw.
    pub fn winner(self) -> Option<Color> {
        match self {
            Self::Checkmate { winner } | Self::Timeout { winner } => Some(winner),
            Self::Stalemate | Self::ThreefoldRepetition | Self::InsufficientMaterial => None,
        }
    }

    pub fn is_draw(self) -> bool {
        self.winner().is_none()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkmate { winner } => write!(f, "Checkmate:{}", color_name(*winner)),
            Self::Stalemate => f.write_str("Stalemate"),
            Self::ThreefoldRepetition => f.write_str("ThreefoldRepetition"),
            Self::Timeout { winner } => write!(f, "Timeout:{}", color_name(*winner)),
            Self::InsufficientMaterial => f.write_str("InsufficientMaterial"),
        }
    }
}

/// What the board looks like for the side that has to reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub opponent_in_check: bool,
    pub opponent_can_move: bool,
    /// Occurrences of the current position, this one included.
    pub repetitions: u32,
}

/// Decide the outcome after a real half-move by `mover`.
///
/// Checkmate wins over stalemate, which wins over repetition.
pub fn judge(mover: Color, verdict: Verdict, repetition_limit: u32) -> Option<Outcome> {
    if !verdict.opponent_can_move {
        return Some(if verdict.opponent_in_check {
            Outcome::Checkmate { winner: mover }
        } else {
            Outcome::Stalemate
        });
    }
    (verdict.repetitions >= repetition_limit).then_some(Outcome::ThreefoldRepetition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Outcome::Checkmate { winner: Color::White }, "Checkmate:white")]
    #[test_case(Outcome::Checkmate { winner: Color::Black }, "Checkmate:black")]
    #[test_case(Outcome::Stalemate, "Stalemate")]
    #[test_case(Outcome::ThreefoldRepetition, "ThreefoldRepetition")]
    #[test_case(Outcome::Timeout { winner: Color::Black }, "Timeout:black")]
    #[test_case(Outcome::InsufficientMaterial, "InsufficientMaterial")]
    fn test_outcome_strings(outcome: Outcome, expected: &str) {
        assert_eq!(outcome.to_string(), expected);
    }

    #[test_case(true, false, 3, Some(Outcome::Checkmate { winner: Color::White }); "mate beats repetition")]
    #[test_case(false, false, 3, Some(Outcome::Stalemate); "stalemate beats repetition")]
    #[test_case(false, true, 3, Some(Outcome::ThreefoldRepetition); "third occurrence")]
    #[test_case(true, true, 2, None; "check is not an outcome")]
    #[test_case(false, true, 1, None; "ongoing")]
    fn test_judge(in_check: bool, can_move: bool, repetitions: u32, expected: Option<Outcome>) {
        let verdict = Verdict {
            opponent_in_check: in_check,
            opponent_can_move: can_move,
            repetitions,
        };
        assert_eq!(judge(Color::White, verdict, 3), expected);
    }

    #[test]
    fn test_draws_have_no_winner() {
        assert!(Outcome::Stalemate.is_draw());
        assert_eq!(
            Outcome::Timeout {
                winner: Color::White
            }
            .winner(),
            Some(Color::White)
        );
    }
}
