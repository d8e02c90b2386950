//! A placeholder opponent: prefers captures, otherwise plays at random, and now and
//! then spends a charge on a random superpower.

use rand::{Rng, SeedableRng, rngs::SmallRng, seq::IteratorRandom};
use shakmaty::Square;

use crate::game_logic::{GameEngine, MoveRecord};

/// A player which makes random moves, with a preference for captures.
#[derive(Debug)]
pub struct RandomPlayer {
    /// How we decide what to do
    rng: SmallRng,
    /// Chance per turn of trying a superpower when a charge is available.
    power_probability: f64,
}

impl RandomPlayer {
    pub const DEFAULT_POWER_PROBABILITY: f64 = 0.35;

    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// A player whose choices are reproducible.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            rng,
            power_probability: Self::DEFAULT_POWER_PROBABILITY,
        }
    }

    /// Set the chance of trying a superpower, clamped to `0.0..=1.0`.
    pub fn with_power_probability(mut self, probability: f64) -> Self {
        self.power_probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    #[inline]
    pub fn power_probability(&self) -> f64 {
        self.power_probability
    }

    /// Play one half-move for the side to move.
    ///
    /// Returns `None` if the game is over or there is nothing to play.
    pub fn play(&mut self, engine: &mut GameEngine) -> Option<MoveRecord> {
        if engine.outcome().is_some() {
            return None;
        }
        let mover = engine.turn();
        if engine.charges(mover) > 0
            && self.rng.gen_bool(self.power_probability)
            && let Some(record) = self.try_superpower(engine)
        {
            return Some(record);
        }

        let moves = engine.all_legal_moves(mover);
        let captures = moves
            .iter()
            .copied()
            .filter(|&(_, to)| engine.board().is_color(to, mover.other()));
        let (from, to) = captures
            .choose(&mut self.rng)
            .or_else(|| moves.iter().copied().choose(&mut self.rng))?;

        let auto_promote = engine.auto_promote();
        engine.set_auto_promote(true);
        let result = engine.attempt_move(from, to);
        engine.set_auto_promote(auto_promote);
        match result {
            Ok(record) => Some(record),
            Err(err) => {
                log::warn!("generated move {from}{to} was refused: {err}");
                None
            }
        }
    }

    /// Pick a piece with at least one usable target, then a target, and commit it.
    fn try_superpower(&mut self, engine: &mut GameEngine) -> Option<MoveRecord> {
        let mover = engine.turn();
        let pieces: Vec<Square> = engine
            .board()
            .pieces()
            .filter(|(_, piece)| piece.color == mover)
            .map(|(square, _)| square)
            .filter(|&square| {
                engine
                    .superpower_targets(square)
                    .is_ok_and(|targets| !targets.is_empty())
            })
            .collect();
        let from = pieces.into_iter().choose(&mut self.rng)?;
        let targets = engine.begin_superpower_preview(from).ok()?;
        let Some(target) = targets.into_iter().choose(&mut self.rng) else {
            engine.cancel_superpower_preview();
            return None;
        };
        match engine.commit_superpower_preview(target) {
            Ok(record) => Some(record),
            Err(err) => {
                log::warn!("generated activation {from}->{target} was refused: {err}");
                None
            }
        }
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game_logic::MoveKind;
    use quickcheck::quickcheck;
    use shakmaty::Color;

    #[test]
    fn test_prefers_captures() {
        let mut engine =
            GameEngine::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", GameConfig::classic())
                .expect("valid FEN");
        let mut player = RandomPlayer::seeded(7);

        let record = player.play(&mut engine).expect("white has moves");

        assert_eq!(record.from, Square::E4);
        assert_eq!(record.to, Some(Square::D5));
    }

    #[test]
    fn test_always_uses_power_when_certain() {
        let mut engine = GameEngine::superchess();
        engine.set_charges(Color::White, 1);
        let mut player = RandomPlayer::seeded(1).with_power_probability(1.0);

        let record = player.play(&mut engine).expect("white can move");

        assert!(matches!(record.kind, MoveKind::Ability(_)));
        assert_eq!(engine.charges(Color::White), 0);
    }

    #[test]
    fn test_never_uses_power_when_disabled() {
        let mut engine = GameEngine::superchess();
        engine.set_charges(Color::White, 3);
        let mut player = RandomPlayer::seeded(1).with_power_probability(0.0);

        let record = player.play(&mut engine).expect("white can move");

        assert_eq!(record.kind, MoveKind::Ordinary);
        assert_eq!(engine.charges(Color::White), 3);
    }

    #[test]
    fn test_power_probability_is_clamped() {
        let player = RandomPlayer::seeded(0);
        assert_eq!(
            player.power_probability(),
            RandomPlayer::DEFAULT_POWER_PROBABILITY
        );
        assert_eq!(
            RandomPlayer::seeded(0)
                .with_power_probability(1.5)
                .power_probability(),
            1.0
        );
        assert_eq!(
            RandomPlayer::seeded(0)
                .with_power_probability(f64::NAN)
                .power_probability(),
            0.0
        );
    }

    #[test]
    fn test_nothing_to_play_after_game_over() {
        let mut engine = GameEngine::classic();
        engine.set_outcome(crate::outcome::Outcome::InsufficientMaterial);
        assert!(RandomPlayer::seeded(3).play(&mut engine).is_none());
    }

    quickcheck! {
        fn test_random_games_keep_charges_in_bounds(seed: u64) -> bool {
            let mut engine = GameEngine::superchess();
            let mut player = RandomPlayer::seeded(seed).with_power_probability(0.5);
            for _ in 0..30 {
                if player.play(&mut engine).is_none() {
                    break;
                }
                if engine.charges(Color::White) > 3 || engine.charges(Color::Black) > 3 {
                    return false;
                }
            }
            true
        }
    }
}
